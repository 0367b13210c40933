//! Word tokenizers producing UTF-16 [`Token`] spans.

#[cfg(feature = "japanese")]
mod japanese;

#[cfg(feature = "japanese")]
pub use japanese::JapaneseTokenizer;

use crate::types::Token;

/// Lazy English word iterator over one sentence.
///
/// Rules:
/// - a word is a run of alphanumeric characters;
/// - apostrophes inside a word keep it whole (`I'm`, `wouldn't've`);
/// - `,` and `.` between two digits keep a numeral whole (`9,000.00`);
/// - hyphens split words, unless the hyphen touches an apostrophe (`rock-'n'-roll`);
/// - combining marks following a letter belong to that letter's word;
/// - leading and trailing punctuation or quotes never become part of a token.
///
/// Iteration ends at the first word reaching past `u16::MAX`; [`count_words`] counts the
/// words of longer texts.
#[derive(Debug, Clone)]
pub struct EnglishTokens {
    chars: Vec<(usize, char)>,
    end_offset: usize,
    pos: usize,
}

impl EnglishTokens {
    pub fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offset = 0usize;
        for c in text.chars() {
            chars.push((offset, c));
            offset += c.len_utf16();
        }
        Self {
            chars,
            end_offset: offset,
            pos: 0,
        }
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).map(|&(_, c)| c)
    }

    fn offset_at(&self, idx: usize) -> usize {
        self.chars
            .get(idx)
            .map(|&(offset, _)| offset)
            .unwrap_or(self.end_offset)
    }

    /// Whether the non-word character at `idx` may continue the current word.
    fn is_connector(&self, idx: usize) -> bool {
        let Some(c) = self.char_at(idx) else {
            return false;
        };
        let prev = idx.checked_sub(1).and_then(|i| self.char_at(i));
        let next = self.char_at(idx + 1);
        if is_apostrophe(c) {
            return true;
        }
        if is_hyphen(c) {
            return prev.is_some_and(is_apostrophe) || next.is_some_and(is_apostrophe);
        }
        if c == ',' || c == '.' {
            return prev.is_some_and(char::is_numeric) && next.is_some_and(char::is_numeric);
        }
        false
    }
}

impl EnglishTokens {
    /// Next word as a UTF-16 `[start, end)` range, without the `u16` bound of [`Token`].
    fn next_span(&mut self) -> Option<(usize, usize)> {
        let n = self.chars.len();
        while self.pos < n && !is_word_char(self.chars[self.pos].1) {
            self.pos += 1;
        }
        if self.pos >= n {
            return None;
        }

        let first = self.pos;
        let mut past_last_word_char = first + 1;
        let mut idx = first + 1;
        while idx < n {
            let c = self.chars[idx].1;
            // Combining marks stay with the base letter they decorate (`cafe\u{301}`).
            if is_word_char(c) || (is_combining_mark(c) && past_last_word_char == idx) {
                idx += 1;
                past_last_word_char = idx;
            } else if self.is_connector(idx) {
                idx += 1;
            } else {
                break;
            }
        }
        self.pos = idx;
        Some((self.offset_at(first), self.offset_at(past_last_word_char)))
    }
}

impl Iterator for EnglishTokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let (start, end) = self.next_span()?;
        Some(Token::new(u16::try_from(start).ok()?, u16::try_from(end).ok()?))
    }
}

/// Number of English words in `text`, with no limit on its length.
pub fn count_words(text: &str) -> usize {
    let mut words = EnglishTokens::new(text);
    std::iter::from_fn(|| words.next_span()).count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Nonspacing combining marks of the common diacritic blocks and the kana voicing marks.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{0483}'..='\u{0489}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{3099}'..='\u{309A}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}' | '\u{02BC}')
}

fn is_hyphen(c: char) -> bool {
    matches!(c, '-' | '\u{2010}' | '\u{2011}')
}
