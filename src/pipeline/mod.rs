//! Email classification pipeline.
//!
//! Every email flows through:
//! 1. `EmailContent::new()`: boundary validation
//! 2. `RemoteClassifier::classify()`: remote model, `KeywordScorer` fallback
//! 3. `ReplyComposer::compose()`: remote generation, template fallback
//!
//! Only validation can fail. Remote outages degrade to local answers.

pub mod classifier;
pub mod composer;
pub mod labels;
pub mod processor;
pub mod rules;
pub mod types;

pub use classifier::RemoteClassifier;
pub use composer::ReplyComposer;
pub use labels::{LabelMap, LabelPreset};
pub use processor::ClassificationPipeline;
pub use rules::{KeywordPreset, KeywordRule, KeywordScorer};
pub use types::{Category, ClassificationResult, EmailContent, Source, TriageOutcome};
