#[cfg(feature = "japanese")]
use std::path::Path;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
#[cfg(feature = "japanese")]
use crate::alignment::tokenization::JapaneseTokenizer;
use crate::pipeline::defaults::EnglishTokenizer;
use crate::pipeline::predictor::{ProcessPredictor, SharedPredictor};
use crate::pipeline::runtime::{SymmetricAligner, SymmetricAlignerParts};
use crate::pipeline::traits::{Predictor, Tokenizer};

pub struct SymmetricAlignerBuilder {
    config: AlignerConfig,
    predictor: Option<SharedPredictor>,
    from_tokenizer: Option<Box<dyn Tokenizer>>,
    to_tokenizer: Option<Box<dyn Tokenizer>>,
}

impl SymmetricAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            predictor: None,
            from_tokenizer: None,
            to_tokenizer: None,
        }
    }

    pub fn with_predictor(self, predictor: impl Predictor + 'static) -> Self {
        self.with_shared_predictor(SharedPredictor::new(predictor))
    }

    /// Reuses a predictor (and its call queue) already shared with other aligners.
    pub fn with_shared_predictor(mut self, predictor: SharedPredictor) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn with_from_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.from_tokenizer = Some(tokenizer);
        self
    }

    pub fn with_to_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.to_tokenizer = Some(tokenizer);
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.config.min_confidence = min_confidence;
        self
    }

    pub fn build(self) -> Result<SymmetricAligner, AlignmentError> {
        let min_confidence = self.config.min_confidence;
        if !min_confidence.is_finite() {
            return Err(AlignmentError::invalid_input(format!(
                "min_confidence must be finite, got {min_confidence}"
            )));
        }

        let predictor = match (self.predictor, self.config.predictor.as_ref()) {
            (Some(predictor), _) => predictor,
            (None, Some(command)) => SharedPredictor::new(ProcessPredictor::new(command.clone())),
            (None, None) => {
                return Err(AlignmentError::invalid_input(
                    "no predictor configured; set `predictor` or call with_predictor",
                ))
            }
        };
        let to_tokenizer = match self.to_tokenizer {
            Some(tokenizer) => tokenizer,
            None => default_to_tokenizer(&self.config)?,
        };

        tracing::debug!(
            backend = predictor.backend_label(),
            min_confidence,
            "symmetric aligner built"
        );
        Ok(SymmetricAligner::from_parts(SymmetricAlignerParts {
            predictor,
            from_tokenizer: self
                .from_tokenizer
                .unwrap_or_else(|| Box::new(EnglishTokenizer)),
            to_tokenizer,
            min_confidence,
        }))
    }
}

#[cfg(feature = "japanese")]
fn default_to_tokenizer(config: &AlignerConfig) -> Result<Box<dyn Tokenizer>, AlignmentError> {
    let path = config.japanese_dictionary_path.as_deref().ok_or_else(|| {
        AlignmentError::invalid_input(
            "no TO tokenizer configured; set `japanese_dictionary_path` or call with_to_tokenizer",
        )
    })?;
    Ok(Box::new(JapaneseTokenizer::from_dictionary_path(Path::new(path))?))
}

#[cfg(not(feature = "japanese"))]
fn default_to_tokenizer(_config: &AlignerConfig) -> Result<Box<dyn Tokenizer>, AlignmentError> {
    Err(AlignmentError::invalid_input(
        "no TO tokenizer configured and Japanese support is disabled; enable the `japanese` cargo feature or call with_to_tokenizer",
    ))
}
