//! Task resolution and dispatch.
//!
//! # Data Flow
//! ```text
//! ValidatedConfig
//!     → resolver.rs (extract/sink pair → TaskType via compatibility matrix)
//!     → dispatcher.rs (connection checks, cancellation check)
//!     → TaskExecutor (execution engine)
//! ```

pub mod dispatcher;
pub mod resolver;

pub use dispatcher::{check_connections, DispatchError, Dispatcher, LoggingExecutor, TaskExecutor};
pub use resolver::{resolve, TaskType, UnsupportedCombinationError};
