pub mod advice;
pub mod evaluator;
pub mod fallback;
pub mod flags;
pub mod generator;
pub mod normalizer;
pub mod resolver;
pub mod validator;

pub use evaluator::{advise, SuitabilityEvaluator, SuitabilityQuery, DEFAULT_THRESHOLD};
pub use generator::SampleGenerator;
