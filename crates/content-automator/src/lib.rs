pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod job;
pub mod store;
pub mod telemetry;
pub mod worker;

pub use config::{load_config, Config};
pub use db::Database;
pub use error::{AutomatorError, ConfigError, JobError, Result, WorkerError};
pub use generator::{ContentGenerator, GenerateError, ModelStatus, TemplateGenerator};
pub use job::{Job, JobStatus};
pub use store::{JobStore, StatusCounts};
pub use worker::{ContentWorker, JobProcessor, SweepSummary, WorkerSettings};
