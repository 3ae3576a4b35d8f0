//! Configuration schema definitions.
//!
//! Typed form of every task configuration section. Values only reach these
//! structs through `validation.rs`, so every instance has passed registry and
//! range checks and carries defaults for anything the file left out.

use serde::Serialize;

use crate::config::filter::FilterConfig;
use crate::config::router::RouterConfig;
use crate::registry::{DbType, ExtractType, ParallelType, PipelineType, SinkType};

// sections
pub const EXTRACTOR: &str = "extractor";
pub const SINKER: &str = "sinker";
pub const RUNTIME: &str = "runtime";
pub const PARALLELIZER: &str = "parallelizer";
pub const PIPELINE: &str = "pipeline";
pub const FILTER: &str = "filter";
pub const ROUTER: &str = "router";
pub const RESUMER: &str = "resumer";

/// Sections that must be declared in every task configuration file.
pub const REQUIRED_SECTIONS: [&str; 8] = [
    EXTRACTOR,
    SINKER,
    RUNTIME,
    PARALLELIZER,
    PIPELINE,
    FILTER,
    ROUTER,
    RESUMER,
];

// keys
pub const DB_TYPE: &str = "db_type";
pub const EXTRACT_TYPE: &str = "extract_type";
pub const SINK_TYPE: &str = "sink_type";
pub const URL: &str = "url";
pub const BATCH_SIZE: &str = "batch_size";
pub const LOG_LEVEL: &str = "log_level";
pub const LOG_DIR: &str = "log_dir";
pub const PARALLEL_TYPE: &str = "parallel_type";
pub const PARALLEL_SIZE: &str = "parallel_size";
pub const PIPELINE_TYPE: &str = "pipeline_type";
pub const BUFFER_SIZE: &str = "buffer_size";
pub const BUFFER_MEMORY_MB: &str = "buffer_memory_mb";
pub const MAX_RPS: &str = "max_rps";
pub const CHECKPOINT_INTERVAL_SECS: &str = "checkpoint_interval_secs";
pub const HTTP_HOST: &str = "http_host";
pub const HTTP_PORT: &str = "http_port";
pub const RESUME_TYPE: &str = "resume_type";
pub const CONFIG_FILE: &str = "config_file";
pub const TABLE_FULL_NAME: &str = "table_full_name";

// defaults
pub const DEFAULT_BATCH_SIZE: usize = 200;
pub const DEFAULT_PARALLEL_SIZE: usize = 1;
pub const DEFAULT_BUFFER_SIZE: usize = 16_000;
/// No memory budget.
pub const DEFAULT_BUFFER_MEMORY_MB: u64 = 0;
/// Unthrottled.
pub const DEFAULT_MAX_RPS: u64 = 0;
pub const DEFAULT_CHECKPOINT_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 10231;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "./logs";

/// A fully validated task configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedConfig {
    pub extractor: ExtractorBasic,
    pub sinker: SinkerBasic,
    pub runtime: RuntimeConfig,
    pub parallelizer: ParallelizerConfig,
    pub pipeline: PipelineConfig,
    pub filter: FilterConfig,
    pub router: RouterConfig,
    pub resumer: ResumerConfig,
}

/// Source side of the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractorBasic {
    pub db_type: DbType,
    pub extract_type: ExtractType,

    /// Connection descriptor; only checked for presence at dispatch time.
    pub url: String,
}

/// Target side of the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkerBasic {
    pub db_type: DbType,
    pub sink_type: SinkType,
    pub url: String,

    /// Rows written per batch.
    pub batch_size: usize,
}

/// Process-level settings carried with the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    /// One of trace, debug, info, warn, error.
    pub log_level: String,
    pub log_dir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

/// Sink worker partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParallelizerConfig {
    pub parallel_type: ParallelType,

    /// Number of sink workers, at least 1.
    pub parallel_size: usize,
}

impl ParallelizerConfig {
    /// Defaults appropriate for an extract mode.
    pub fn default_for(extract_type: ExtractType) -> Self {
        Self {
            parallel_type: ParallelType::default_for(extract_type),
            parallel_size: DEFAULT_PARALLEL_SIZE,
        }
    }
}

/// Buffering and flow control between extractor and sinker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub pipeline_type: PipelineType,

    /// Maximum queued items.
    pub buffer_size: usize,

    /// Memory budget for queued items in MB (0 = none).
    pub buffer_memory_mb: u64,

    /// Requests-per-second ceiling (0 = unthrottled).
    pub max_rps: u64,

    /// Position checkpoint interval in seconds.
    pub checkpoint_interval_secs: u64,

    /// Bind host when `pipeline_type = http_server`.
    pub http_host: String,

    /// Bind port when `pipeline_type = http_server`.
    pub http_port: u16,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pipeline_type: PipelineType::Basic,
            buffer_size: DEFAULT_BUFFER_SIZE,
            buffer_memory_mb: DEFAULT_BUFFER_MEMORY_MB,
            max_rps: DEFAULT_MAX_RPS,
            checkpoint_interval_secs: DEFAULT_CHECKPOINT_INTERVAL_SECS,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

/// Where an interrupted task resumes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "resume_type", rename_all = "snake_case")]
pub enum ResumerConfig {
    /// Start from scratch every time.
    #[default]
    Dummy,

    /// Positions recorded in the task's own log directory.
    FromLog {
        log_dir: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        config_file: Option<String>,
    },

    /// Positions recorded in a table on the target.
    FromTarget {
        #[serde(skip_serializing_if = "Option::is_none")]
        table_full_name: Option<String>,
    },
}
