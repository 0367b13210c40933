#[cfg(feature = "japanese")]
use crate::alignment::tokenization::JapaneseTokenizer;
use crate::alignment::tokenization::{count_words, EnglishTokens};
use crate::pipeline::traits::Tokenizer;
use crate::types::Token;

pub struct EnglishTokenizer;

impl Tokenizer for EnglishTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        EnglishTokens::new(text).collect()
    }

    fn word_count(&self, text: &str) -> usize {
        count_words(text)
    }
}

#[cfg(feature = "japanese")]
impl Tokenizer for JapaneseTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        JapaneseTokenizer::tokenize(self, text)
    }
}
