//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! task file (INI)
//!     → ini.rs (sections and raw key/value pairs)
//!     → loader.rs (read from disk, required sections present)
//!     → validation.rs (registry normalization, ranges, defaults)
//!     → ValidatedConfig (immutable)
//!     → overrides.rs (command-line values layered on top)
//!     → task resolver and dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; overrides produce a new value
//! - Every optional field has a documented default
//! - Parsing (structure) is separate from validation (meaning)

pub mod filter;
pub mod ini;
pub mod loader;
pub mod overrides;
pub mod router;
pub mod schema;
pub mod validation;

pub use filter::FilterConfig;
pub use ini::ConfigTree;
pub use loader::{load_config, load_validated, ConfigError, LoadError};
pub use overrides::Overrides;
pub use router::RouterConfig;
pub use schema::ValidatedConfig;
pub use validation::{validate_config, ValidationError};
