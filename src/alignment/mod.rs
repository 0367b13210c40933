pub mod codec;
pub mod combine;
pub mod question;
pub mod report;
pub mod simplify;
pub mod snapping;
pub mod text;
pub mod tokenization;

use crate::alignment::combine::{pass_alignments, union_alignments, PassDirection};
use crate::alignment::simplify::simplify;
use crate::alignment::text::Utf16Text;
use crate::types::{Alignment, Prediction, Token};

/// Tokens and text of one side of a sentence pair.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a, 'b> {
    pub text: &'b Utf16Text<'a>,
    pub tokens: &'b [Token],
}

/// Snap, filter, combine and simplify already-obtained predictions of both passes.
///
/// `forward[i]` answers FROM token `i` against the TO text; `reverse[i]` answers TO token
/// `i` against the FROM text. Predictions of a pass that [`pass_is_asked`] rejects are ignored.
pub fn align_from_predictions(
    from: Side<'_, '_>,
    to: Side<'_, '_>,
    forward: &[Prediction],
    reverse: &[Prediction],
    min_confidence: f64,
) -> Vec<Alignment> {
    let forward = if pass_is_asked(from.tokens, to.text) {
        pass_alignments(
            PassDirection::Forward,
            from.tokens,
            to.text,
            to.tokens,
            forward,
            min_confidence,
        )
    } else {
        Vec::new()
    };
    let reverse = if pass_is_asked(to.tokens, from.text) {
        pass_alignments(
            PassDirection::Reverse,
            to.tokens,
            from.text,
            from.tokens,
            reverse,
            min_confidence,
        )
    } else {
        Vec::new()
    };
    simplify(union_alignments(forward, reverse), from.text, to.text)
}

/// A pass asks one question per pivot token, and only when there is a context to search.
pub fn pass_is_asked(pivots: &[Token], context: &Utf16Text<'_>) -> bool {
    !pivots.is_empty() && !context.is_empty()
}

/// Panics unless `tokens` are non-empty spans inside `text`, strictly increasing and
/// non-overlapping.
pub(crate) fn assert_well_formed(tokens: &[Token], text: &Utf16Text<'_>) {
    let mut prev_end = 0u16;
    for (i, token) in tokens.iter().enumerate() {
        assert!(
            token.start < token.end && token.end <= text.len(),
            "tokenizer produced malformed span {}..{} for text of length {}",
            token.start,
            token.end,
            text.len()
        );
        assert!(
            i == 0 || token.start >= prev_end,
            "tokenizer produced overlapping or unordered span {}..{} after end {}",
            token.start,
            token.end,
            prev_end
        );
        prev_end = token.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_from_predictions_runs_pure_stages() {
        let from_text = Utf16Text::new("foo bar").unwrap();
        let to_text = Utf16Text::new("ほげ\u{3000}ぴよ").unwrap();
        let from_tokens = [Token::new(0, 3), Token::new(4, 7)];
        let to_tokens = [Token::new(0, 2), Token::new(3, 5)];
        let forward = [
            Prediction::new(1.0, 0, 2, "ほげ"),
            Prediction::new(1.0, 3, 5, "ぴよ"),
        ];
        let reverse = [
            Prediction::new(1.0, 0, 3, "foo"),
            Prediction::new(0.0, 0, 3, "foo"),
        ];
        let out = align_from_predictions(
            Side {
                text: &from_text,
                tokens: &from_tokens,
            },
            Side {
                text: &to_text,
                tokens: &to_tokens,
            },
            &forward,
            &reverse,
            0.01,
        );
        assert_eq!(out, [Alignment::new(0, 3, 0, 2), Alignment::new(4, 7, 3, 5)]);
    }

    #[test]
    fn pass_needs_pivots_and_a_context() {
        let text = Utf16Text::new("   ").unwrap();
        let empty = Utf16Text::new("").unwrap();
        assert!(pass_is_asked(&[Token::new(0, 3)], &text));
        assert!(!pass_is_asked(&[Token::new(0, 3)], &empty));
        assert!(!pass_is_asked(&[], &text));
    }

    #[test]
    fn pass_against_tokenless_context_keeps_raw_span() {
        let from_text = Utf16Text::new("foo").unwrap();
        let to_text = Utf16Text::new("「」").unwrap();
        let out = align_from_predictions(
            Side {
                text: &from_text,
                tokens: &[Token::new(0, 3)],
            },
            Side {
                text: &to_text,
                tokens: &[],
            },
            &[Prediction::new(0.9, 0, 2, "「」")],
            &[],
            0.01,
        );
        assert_eq!(out, [Alignment::new(0, 3, 0, 2)]);
    }

    #[test]
    fn well_formed_tokens_pass() {
        let text = Utf16Text::new("foo bar").unwrap();
        assert_well_formed(&[Token::new(0, 3), Token::new(3, 7)], &text);
        assert_well_formed(&[], &text);
    }

    #[test]
    #[should_panic(expected = "overlapping or unordered")]
    fn overlapping_tokens_fail_fast() {
        let text = Utf16Text::new("foo bar").unwrap();
        assert_well_formed(&[Token::new(0, 4), Token::new(3, 7)], &text);
    }

    #[test]
    #[should_panic(expected = "malformed span")]
    fn out_of_range_token_fails_fast() {
        let text = Utf16Text::new("foo").unwrap();
        assert_well_formed(&[Token::new(0, 4)], &text);
    }
}
