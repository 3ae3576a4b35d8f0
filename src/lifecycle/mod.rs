//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Apply overrides → Resolve → Dispatch
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → mpsc channel → shutdown controller
//!
//! Shutdown (shutdown.rs):
//!     First signal → cancel token → grace period countdown
//!         → task finishes: complete() → normal exit
//!         → deadline passes: error log → exit(0)
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then resolution, then dispatch
//! - Exactly one shutdown session per process; repeated signals are ignored
//! - Shutdown has timeout: forced exit after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{ShutdownController, ShutdownSession, ShutdownState};
pub use signals::Signal;
pub use startup::{PreparedTask, RunContext, RunOutcome};
