//! Task configuration resolution and process lifecycle for the `dts` data
//! transfer tool.

// Configuration and classification
pub mod config;
pub mod registry;
pub mod task;

// Process surface
pub mod cli;
pub mod commands;
pub mod error;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ValidatedConfig;
pub use error::{Error, Result};
pub use lifecycle::ShutdownController;
pub use task::TaskType;
