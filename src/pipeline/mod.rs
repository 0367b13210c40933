pub mod builder;
pub mod defaults;
pub mod predictor;
pub mod runtime;
pub mod traits;
