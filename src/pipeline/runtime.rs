use crate::alignment::question::synthesize_questions;
use crate::alignment::text::Utf16Text;
use crate::alignment::{align_from_predictions, assert_well_formed, pass_is_asked, Side};
use crate::error::AlignmentError;
use crate::pipeline::predictor::{Cancellation, SharedPredictor};
use crate::pipeline::traits::Tokenizer;
use crate::types::{Alignment, Prediction};

pub struct SymmetricAligner {
    predictor: SharedPredictor,
    from_tokenizer: Box<dyn Tokenizer>,
    to_tokenizer: Box<dyn Tokenizer>,
    min_confidence: f64,
}

pub(crate) struct SymmetricAlignerParts {
    pub predictor: SharedPredictor,
    pub from_tokenizer: Box<dyn Tokenizer>,
    pub to_tokenizer: Box<dyn Tokenizer>,
    pub min_confidence: f64,
}

impl SymmetricAligner {
    pub(crate) fn from_parts(parts: SymmetricAlignerParts) -> Self {
        Self {
            predictor: parts.predictor,
            from_tokenizer: parts.from_tokenizer,
            to_tokenizer: parts.to_tokenizer,
            min_confidence: parts.min_confidence,
        }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    pub fn from_tokenizer(&self) -> &dyn Tokenizer {
        self.from_tokenizer.as_ref()
    }

    pub fn to_tokenizer(&self) -> &dyn Tokenizer {
        self.to_tokenizer.as_ref()
    }

    pub fn predictor(&self) -> &SharedPredictor {
        &self.predictor
    }

    pub async fn align_symmetric(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<Alignment>, AlignmentError> {
        self.align_symmetric_with_cancel(from, to, &Cancellation::new())
            .await
    }

    /// Aligns a sentence pair in both directions and returns the simplified union.
    ///
    /// Cancelling `cancel` aborts the pending predictor call and yields
    /// [`AlignmentError::Cancelled`]; nothing partial is returned.
    pub async fn align_symmetric_with_cancel(
        &self,
        from: &str,
        to: &str,
        cancel: &Cancellation,
    ) -> Result<Vec<Alignment>, AlignmentError> {
        let from_text = Utf16Text::new(from)?;
        let to_text = Utf16Text::new(to)?;
        if cancel.is_cancelled() {
            return Err(AlignmentError::Cancelled);
        }

        let from_tokens = self.from_tokenizer.tokenize(from);
        let to_tokens = self.to_tokenizer.tokenize(to);
        assert_well_formed(&from_tokens, &from_text);
        assert_well_formed(&to_tokens, &to_text);
        let ask_forward = pass_is_asked(&from_tokens, &to_text);
        let ask_reverse = pass_is_asked(&to_tokens, &from_text);
        if !ask_forward && !ask_reverse {
            tracing::debug!(
                from_tokens = from_tokens.len(),
                to_tokens = to_tokens.len(),
                "align: no pass has questions to ask"
            );
            return Ok(Vec::new());
        }

        let forward = if ask_forward {
            let questions = synthesize_questions(&from_text, &from_tokens);
            self.predict_cancellable(&questions, to, cancel).await?
        } else {
            Vec::new()
        };
        let reverse = if ask_reverse {
            let questions = synthesize_questions(&to_text, &to_tokens);
            self.predict_cancellable(&questions, from, cancel).await?
        } else {
            Vec::new()
        };

        let alignments = align_from_predictions(
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
            self.min_confidence,
        );
        tracing::debug!(
            from_tokens = from_tokens.len(),
            to_tokens = to_tokens.len(),
            alignments = alignments.len(),
            "align: symmetric alignment finished"
        );
        Ok(alignments)
    }

    async fn predict_cancellable(
        &self,
        questions: &[String],
        context: &str,
        cancel: &Cancellation,
    ) -> Result<Vec<Prediction>, AlignmentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AlignmentError::Cancelled),
            result = self.predictor.predict(questions, context) => result,
        }
    }
}
