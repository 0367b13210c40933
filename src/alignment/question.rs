use crate::alignment::text::Utf16Text;
use crate::types::Token;

/// Delimiter wrapped around the pivot word of a question.
pub const PIVOT_MARKER: &str = " ¶ ";

/// Builds the question for one pivot token: the sentence with the token wrapped in
/// [`PIVOT_MARKER`]s. Surrounding text is copied untouched, so whitespace next to the
/// token is doubled up with the marker padding.
///
/// Panics when the token is empty or reaches past the end of the text.
pub fn synthesize_question(text: &Utf16Text<'_>, token: Token) -> String {
    assert!(
        token.start < token.end && token.end <= text.len(),
        "malformed token span {}..{} for text of length {}",
        token.start,
        token.end,
        text.len()
    );
    let mut question = String::with_capacity(text.as_str().len() + 2 * PIVOT_MARKER.len());
    question.push_str(&text.slice(0, token.start));
    question.push_str(PIVOT_MARKER);
    question.push_str(&text.slice(token.start, token.end));
    question.push_str(PIVOT_MARKER);
    question.push_str(&text.slice(token.end, text.len()));
    question
}

/// One question per token, in token order.
pub fn synthesize_questions(text: &Utf16Text<'_>, tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|&token| synthesize_question(text, token))
        .collect()
}
