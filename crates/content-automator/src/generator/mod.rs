//! Content generation.
//!
//! The worker only depends on the [`ContentGenerator`] trait. The shipped
//! implementation, [`TemplateGenerator`], renders a fixed article template and
//! picks the richer variant when a local model file is present.

pub mod model;
pub mod template;

use thiserror::Error;

pub use model::{find_model, ModelStatus};
pub use template::TemplateGenerator;

/// Errors a generator may report. The worker records them as a failed job.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Produces article text for a topic.
pub trait ContentGenerator: Send + Sync {
    fn generate(&self, topic: &str) -> Result<String, GenerateError>;

    /// Describes the generation source, for status display.
    fn model_status(&self) -> ModelStatus;
}
