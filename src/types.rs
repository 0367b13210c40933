use serde::{Deserialize, Serialize};

/// Word-like span produced by a tokenizer.
///
/// Interval is `[start, end)` in UTF-16 code units of the tokenized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub start: u16,
    pub end: u16,
}

impl Token {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        usize::from(self.end.saturating_sub(self.start))
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when `[start, end)` shares at least one code unit with this token.
    pub fn intersects(&self, start: u16, end: u16) -> bool {
        start < end && self.start < end && start < self.end
    }
}

/// A FROM-text span paired with a TO-text span.
///
/// Both intervals are half-open and always oriented to the caller's FROM/TO languages,
/// regardless of which pass discovered the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alignment {
    pub from_start: u16,
    pub from_end: u16,
    pub to_start: u16,
    pub to_end: u16,
}

impl Alignment {
    pub fn new(from_start: u16, from_end: u16, to_start: u16, to_end: u16) -> Self {
        Self {
            from_start,
            from_end,
            to_start,
            to_end,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.from_start < self.from_end && self.to_start < self.to_end
    }

    /// Bounding union on both sides.
    pub fn union(&self, other: &Alignment) -> Alignment {
        Alignment {
            from_start: self.from_start.min(other.from_start),
            from_end: self.from_end.max(other.from_end),
            to_start: self.to_start.min(other.to_start),
            to_end: self.to_end.max(other.to_end),
        }
    }
}

/// Raw answer of the question-answering model to one question, in the context's indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub score: f64,
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub answer: String,
}

impl Prediction {
    pub fn new(score: f64, start: i32, end: i32, answer: impl Into<String>) -> Self {
        Self {
            score,
            start,
            end,
            answer: answer.into(),
        }
    }
}
