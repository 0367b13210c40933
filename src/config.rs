use std::path::Path;

use serde::Deserialize;

use crate::error::AlignmentError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Predictions scoring at or below this value are discarded before combination.
    pub min_confidence: f64,
    /// vibrato dictionary used by the Japanese tokenizer (`.dic` or `.dic.zst`).
    pub japanese_dictionary_path: Option<String>,
    pub predictor: Option<PredictorCommand>,
}

/// Command line of an out-of-process inference service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PredictorCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AlignerConfig {
    pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.01;

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse aligner config", e))
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            min_confidence: Self::DEFAULT_MIN_CONFIDENCE,
            japanese_dictionary_path: None,
            predictor: None,
        }
    }
}
