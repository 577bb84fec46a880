pub mod config;
pub mod error;
pub mod model;
pub mod preprocessing;
pub mod server;
pub mod telemetry;
pub mod validation;

// Re-export common types
pub use error::InferenceError;
pub use model::{service::ClassifierService, Classifier};
