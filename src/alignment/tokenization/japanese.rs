use std::path::Path;

use vibrato_rkyv::{CacheStrategy, Dictionary, LoadMode, Tokenizer};

use crate::alignment::text::byte_to_utf16_offsets;
use crate::error::AlignmentError;
use crate::types::Token;

/// Japanese word boundaries taken from the vibrato morphological analyzer.
///
/// Whitespace carried by a morpheme is trimmed; morphemes that are only whitespace are dropped.
pub struct JapaneseTokenizer {
    tokenizer: Tokenizer,
}

impl JapaneseTokenizer {
    pub fn from_dictionary_path(path: &Path) -> Result<Self, AlignmentError> {
        let is_zstd = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"));
        let dict = if is_zstd {
            Dictionary::from_zstd(path, CacheStrategy::GlobalCache)
        } else {
            Dictionary::from_path(path, LoadMode::Validate)
        }
        .map_err(|e| AlignmentError::runtime("load vibrato dictionary", e))?;

        tracing::info!(path = %path.display(), "japanese tokenizer dictionary loaded");
        Ok(Self::from_dictionary(dict))
    }

    pub fn from_dictionary(dict: Dictionary) -> Self {
        Self {
            tokenizer: Tokenizer::new(dict),
        }
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        let offsets = byte_to_utf16_offsets(text);
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        worker
            .token_iter()
            .filter_map(|token| {
                let range = token.range_byte();
                let surface = &text[range.clone()];
                let trimmed = surface.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let lead = surface.len() - surface.trim_start().len();
                let start = range.start + lead;
                let end = start + trimmed.len();
                let start = u16::try_from(offsets[start]).ok()?;
                let end = u16::try_from(offsets[end]).ok()?;
                Some(Token::new(start, end))
            })
            .collect()
    }
}
