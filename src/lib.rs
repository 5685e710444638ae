//! Nutrition Insights Server Library
//!
//! Loads a recipe dataset once and serves read-only nutrition analytics
//! over it. The modules are exposed for the binaries and for testing.

pub mod analytics;
pub mod config;
pub mod dataset;
pub mod server;

// Re-export commonly used types for convenience
pub use analytics::{NutritionEngine, QueryError};
pub use dataset::{load_dataset, DatasetError, Metric};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
