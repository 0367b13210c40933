use std::future::Future;
use std::pin::Pin;

use crate::error::AlignmentError;
use crate::types::{Prediction, Token};

pub trait Tokenizer: Send + Sync {
    /// Ordered, non-overlapping word spans of `text`.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn word_count(&self, text: &str) -> usize {
        self.tokenize(text).len()
    }
}

pub type PredictionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Prediction>, AlignmentError>> + Send + 'a>>;

/// Question-answering backend locating the answer to each question inside `context`.
///
/// Implementations return exactly one prediction per question, in question order, with
/// spans in `context`'s UTF-16 indexing. Dropping the returned future cancels the call.
pub trait Predictor: Send + Sync {
    fn predict<'a>(&'a self, questions: &'a [String], context: &'a str) -> PredictionFuture<'a>;

    fn backend_label(&self) -> String {
        "custom".to_string()
    }
}
