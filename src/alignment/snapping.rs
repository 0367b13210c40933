use crate::alignment::text::Utf16Text;
use crate::types::{Prediction, Token};

/// Widens `[start, end)` to the bounding union of every context token it intersects.
///
/// A span touching no token is returned unchanged.
pub fn snap_to_tokens(tokens: &[Token], start: u16, end: u16) -> (u16, u16) {
    let mut hit = tokens.iter().filter(|t| t.intersects(start, end));
    let Some(first) = hit.next() else {
        return (start, end);
    };
    hit.fold((first.start, first.end), |(lo, hi), t| {
        (lo.min(t.start), hi.max(t.end))
    })
}

/// `score <= min_confidence` (and NaN) is rejected.
pub fn is_confident(prediction: &Prediction, min_confidence: f64) -> bool {
    prediction.score > min_confidence
}

/// Turns one raw prediction into a snapped context span.
///
/// Returns `None` when the prediction is not confident enough, or when its span is
/// still empty after clamping into the context and snapping.
pub fn snap_prediction(
    prediction: &Prediction,
    context: &Utf16Text<'_>,
    context_tokens: &[Token],
    min_confidence: f64,
) -> Option<(u16, u16)> {
    if !is_confident(prediction, min_confidence) {
        return None;
    }
    let start = context.clamp(prediction.start);
    let end = context.clamp(prediction.end);
    let (start, end) = snap_to_tokens(context_tokens, start, end.max(start));
    (start < end).then_some((start, end))
}
