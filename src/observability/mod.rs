//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (section, field, task_type)
//!     → logging.rs (filter + fmt layer on stderr)
//! ```

pub mod logging;
