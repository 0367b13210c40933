use std::collections::HashSet;

use crate::alignment::snapping::snap_prediction;
use crate::alignment::text::Utf16Text;
use crate::types::{Alignment, Prediction, Token};

/// Which side issued the questions of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDirection {
    /// FROM tokens asked against the TO text.
    Forward,
    /// TO tokens asked against the FROM text.
    Reverse,
}

impl PassDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }

    fn orient(self, pivot: Token, answer: (u16, u16)) -> Alignment {
        match self {
            Self::Forward => Alignment::new(pivot.start, pivot.end, answer.0, answer.1),
            Self::Reverse => Alignment::new(answer.0, answer.1, pivot.start, pivot.end),
        }
    }
}

/// Alignments surviving one pass, oriented FROM/TO.
///
/// `predictions[i]` answers the question built from `pivots[i]`.
pub fn pass_alignments(
    direction: PassDirection,
    pivots: &[Token],
    context: &Utf16Text<'_>,
    context_tokens: &[Token],
    predictions: &[Prediction],
    min_confidence: f64,
) -> Vec<Alignment> {
    debug_assert_eq!(pivots.len(), predictions.len());
    let alignments: Vec<Alignment> = pivots
        .iter()
        .zip(predictions)
        .filter_map(|(&pivot, prediction)| {
            snap_prediction(prediction, context, context_tokens, min_confidence)
                .map(|answer| direction.orient(pivot, answer))
        })
        .collect();

    tracing::debug!(
        direction = direction.as_str(),
        questions = pivots.len(),
        surviving = alignments.len(),
        discarded = pivots.len() - alignments.len(),
        "combine: pass finished"
    );
    alignments
}

/// Union of both passes. Order is forward first, then reverse; exact duplicates keep
/// their first position.
pub fn union_alignments(forward: Vec<Alignment>, reverse: Vec<Alignment>) -> Vec<Alignment> {
    let mut seen = HashSet::with_capacity(forward.len() + reverse.len());
    forward
        .into_iter()
        .chain(reverse)
        .filter(|alignment| seen.insert(*alignment))
        .collect()
}
