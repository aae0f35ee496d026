pub mod api;
pub mod engine;
pub mod fuzzy;
pub mod section;
pub(crate) mod util;

pub use api::{ApiError, CategorizeRequest, CategorizeResponse, LearnRequest, LearnResponse};
pub use engine::{CategorizationEngine, CategorizationResult, EngineError};
pub use fuzzy::FuzzyScorer;
pub use section::SectionDetector;
