pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

pub use alignment::codec::{decode_alignments, encode_alignments};
pub use alignment::report::{
    best_min_confidence, build_report, evaluate_threshold, load_fixture_cases, replay_case,
    write_report, FixtureCase, Meta, Report, ThresholdReport,
};
pub use alignment::simplify::simplify;
#[cfg(feature = "japanese")]
pub use alignment::tokenization::JapaneseTokenizer;
pub use config::{AlignerConfig, PredictorCommand};
pub use error::AlignmentError;
pub use pipeline::builder::SymmetricAlignerBuilder;
pub use pipeline::defaults::EnglishTokenizer;
pub use pipeline::predictor::{Cancellation, ProcessPredictor, SharedPredictor};
pub use pipeline::runtime::SymmetricAligner;
pub use pipeline::traits::{PredictionFuture, Predictor, Tokenizer};
pub use types::{Alignment, Prediction, Token};
