//! Configuration validation.
//!
//! # Responsibilities
//! - Turn a raw `ConfigTree` into a typed `ValidatedConfig`
//! - Normalize enumerated fields through the type registry
//! - Apply documented defaults to absent or zero numeric fields
//! - Reject negative, non-numeric or oversized numbers
//!
//! # Design Decisions
//! - All-or-nothing: the first error aborts and names section and field
//! - Pure function of the tree; re-validating the same tree yields the same value
//! - Sections are checked in dependency order (extractor before parallelizer,
//!   runtime before resumer)

use thiserror::Error;

use crate::config::filter::{self, FilterConfig, Pattern};
use crate::config::ini::{ConfigTree, Section};
use crate::config::router::{self, RouterConfig};
use crate::config::schema::*;
use crate::observability::logging::parse_level;
use crate::registry::{EventType, ExtractType, ParallelType, PipelineType, Registered, ResumeType, UnknownKindError};

/// A section failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An enumerated field with no default is absent or empty.
    #[error("[{section}] {field} is required")]
    MissingRequiredField {
        section: &'static str,
        field: &'static str,
    },

    /// An enumerated value is not in its registry.
    #[error("[{section}] {field}: {source}")]
    UnknownKind {
        section: &'static str,
        field: &'static str,
        #[source]
        source: UnknownKindError,
    },

    /// A numeric value is negative, not a whole number, or too large.
    #[error("[{section}] {field} = '{value}' is out of range: {reason}")]
    OutOfRange {
        section: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A free-form value (pattern, mapping, level) is malformed.
    #[error("[{section}] {field} = '{value}' is invalid: {reason}")]
    InvalidValue {
        section: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ValidationError {
    /// Section the offending field belongs to.
    pub fn section(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { section, .. }
            | ValidationError::UnknownKind { section, .. }
            | ValidationError::OutOfRange { section, .. }
            | ValidationError::InvalidValue { section, .. } => *section,
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingRequiredField { field, .. }
            | ValidationError::UnknownKind { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidValue { field, .. } => *field,
        }
    }
}

type Result<T> = std::result::Result<T, ValidationError>;

/// Read-only view of one section with typed accessors.
struct SectionReader<'a> {
    name: &'static str,
    entries: Option<&'a Section>,
}

impl<'a> SectionReader<'a> {
    fn new(tree: &'a ConfigTree, name: &'static str) -> Self {
        Self {
            name,
            entries: tree.section(name),
        }
    }

    /// Present, non-empty raw value.
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.entries?
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn required_kind<T: Registered>(&self, key: &'static str) -> Result<T> {
        let raw = self.raw(key).ok_or(ValidationError::MissingRequiredField {
            section: self.name,
            field: key,
        })?;
        self.kind(key, raw)
    }

    fn kind_or<T: Registered>(&self, key: &'static str, default: T) -> Result<T> {
        match self.raw(key) {
            Some(raw) => self.kind(key, raw),
            None => Ok(default),
        }
    }

    fn kind<T: Registered>(&self, key: &'static str, raw: &str) -> Result<T> {
        T::normalize(raw).map_err(|source| ValidationError::UnknownKind {
            section: self.name,
            field: key,
            source,
        })
    }

    /// Non-negative integer; absent or zero yields `default`.
    fn number<T>(&self, key: &'static str, default: T) -> Result<T>
    where
        T: TryFrom<i128> + PartialEq + Default,
    {
        let Some(raw) = self.raw(key) else {
            return Ok(default);
        };
        let out_of_range = |reason: &str| ValidationError::OutOfRange {
            section: self.name,
            field: key,
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let parsed: i128 = raw
            .parse()
            .map_err(|_| out_of_range("not a whole number"))?;
        if parsed < 0 {
            return Err(out_of_range("must not be negative"));
        }
        let value = T::try_from(parsed).map_err(|_| out_of_range("exceeds the maximum allowed value"))?;
        if value == T::default() {
            Ok(default)
        } else {
            Ok(value)
        }
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }

    fn optional_string(&self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    fn list(&self, key: &str) -> Vec<String> {
        self.raw(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn pattern(&self, key: &'static str) -> Result<Option<Pattern>> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };
        Pattern::new(raw)
            .map(Some)
            .map_err(|e| self.invalid(key, raw, e.to_string()))
    }

    fn invalid(&self, key: &'static str, raw: &str, reason: impl Into<String>) -> ValidationError {
        ValidationError::InvalidValue {
            section: self.name,
            field: key,
            value: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Validate every section of `tree`.
pub fn validate_config(tree: &ConfigTree) -> Result<ValidatedConfig> {
    let extractor = validate_extractor(&SectionReader::new(tree, EXTRACTOR))?;
    let sinker = validate_sinker(&SectionReader::new(tree, SINKER))?;
    let runtime = validate_runtime(&SectionReader::new(tree, RUNTIME))?;
    let parallelizer = validate_parallelizer(&SectionReader::new(tree, PARALLELIZER), extractor.extract_type)?;
    let pipeline = validate_pipeline(&SectionReader::new(tree, PIPELINE))?;
    let filter = validate_filter(&SectionReader::new(tree, FILTER))?;
    let router = validate_router(&SectionReader::new(tree, ROUTER))?;
    let resumer = validate_resumer(&SectionReader::new(tree, RESUMER), &runtime)?;

    Ok(ValidatedConfig {
        extractor,
        sinker,
        runtime,
        parallelizer,
        pipeline,
        filter,
        router,
        resumer,
    })
}

fn validate_extractor(section: &SectionReader<'_>) -> Result<ExtractorBasic> {
    Ok(ExtractorBasic {
        db_type: section.required_kind(DB_TYPE)?,
        extract_type: section.required_kind(EXTRACT_TYPE)?,
        url: section.string_or(URL, ""),
    })
}

fn validate_sinker(section: &SectionReader<'_>) -> Result<SinkerBasic> {
    Ok(SinkerBasic {
        db_type: section.required_kind(DB_TYPE)?,
        sink_type: section.required_kind(SINK_TYPE)?,
        url: section.string_or(URL, ""),
        batch_size: section.number(BATCH_SIZE, DEFAULT_BATCH_SIZE)?,
    })
}

fn validate_runtime(section: &SectionReader<'_>) -> Result<RuntimeConfig> {
    let log_level = match section.raw(LOG_LEVEL) {
        Some(raw) => parse_level(raw)
            .map(|level| level.to_string().to_ascii_lowercase())
            .ok_or_else(|| section.invalid(LOG_LEVEL, raw, "expected one of: trace, debug, info, warn, error"))?,
        None => DEFAULT_LOG_LEVEL.to_string(),
    };

    Ok(RuntimeConfig {
        log_level,
        log_dir: section.string_or(LOG_DIR, DEFAULT_LOG_DIR),
    })
}

fn validate_parallelizer(section: &SectionReader<'_>, extract_type: ExtractType) -> Result<ParallelizerConfig> {
    let defaults = ParallelizerConfig::default_for(extract_type);
    Ok(ParallelizerConfig {
        parallel_type: section.kind_or::<ParallelType>(PARALLEL_TYPE, defaults.parallel_type)?,
        parallel_size: section.number(PARALLEL_SIZE, defaults.parallel_size)?,
    })
}

fn validate_pipeline(section: &SectionReader<'_>) -> Result<PipelineConfig> {
    let defaults = PipelineConfig::default();
    Ok(PipelineConfig {
        pipeline_type: section.kind_or::<PipelineType>(PIPELINE_TYPE, defaults.pipeline_type)?,
        buffer_size: section.number(BUFFER_SIZE, defaults.buffer_size)?,
        buffer_memory_mb: section.number(BUFFER_MEMORY_MB, defaults.buffer_memory_mb)?,
        max_rps: section.number(MAX_RPS, defaults.max_rps)?,
        checkpoint_interval_secs: section.number(CHECKPOINT_INTERVAL_SECS, defaults.checkpoint_interval_secs)?,
        http_host: section.string_or(HTTP_HOST, &defaults.http_host),
        http_port: section.number(HTTP_PORT, defaults.http_port)?,
    })
}

fn validate_filter(section: &SectionReader<'_>) -> Result<FilterConfig> {
    let do_events = section.list(filter::DO_EVENTS);
    let do_events = if do_events.is_empty() || do_events.iter().any(|e| e == "*") {
        EventType::ALL.to_vec()
    } else {
        let mut events = Vec::with_capacity(do_events.len());
        for raw in &do_events {
            let event: EventType = section.kind(filter::DO_EVENTS, raw)?;
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    };

    Ok(FilterConfig {
        do_schemas: section.list(filter::DO_SCHEMAS),
        ignore_schemas: section.list(filter::IGNORE_SCHEMAS),
        do_tbs: section.list(filter::DO_TBS),
        ignore_tbs: section.list(filter::IGNORE_TBS),
        do_schemas_regex: section.pattern(filter::DO_SCHEMAS_REGEX)?,
        ignore_schemas_regex: section.pattern(filter::IGNORE_SCHEMAS_REGEX)?,
        do_tbs_regex: section.pattern(filter::DO_TBS_REGEX)?,
        ignore_tbs_regex: section.pattern(filter::IGNORE_TBS_REGEX)?,
        do_cols: section.list(filter::DO_COLS),
        ignore_cols: section.list(filter::IGNORE_COLS),
        do_cols_regex: section.pattern(filter::DO_COLS_REGEX)?,
        ignore_cols_regex: section.pattern(filter::IGNORE_COLS_REGEX)?,
        do_events,
    })
}

fn validate_router(section: &SectionReader<'_>) -> Result<RouterConfig> {
    let schema_raw = section.raw(router::SCHEMA_MAP).unwrap_or("");
    let schema_map = RouterConfig::parse_schema_map(schema_raw)
        .map_err(|reason| section.invalid(router::SCHEMA_MAP, schema_raw, reason))?;

    let tb_raw = section.raw(router::TB_MAP).unwrap_or("");
    let tb_map = RouterConfig::parse_tb_map(tb_raw).map_err(|reason| section.invalid(router::TB_MAP, tb_raw, reason))?;

    let col_raw = section.raw(router::COL_MAP).unwrap_or("");
    let col_map =
        RouterConfig::parse_col_map(col_raw).map_err(|reason| section.invalid(router::COL_MAP, col_raw, reason))?;

    let topic_raw = section.raw(router::TOPIC_MAP).unwrap_or("");
    let topic_map = RouterConfig::parse_topic_map(topic_raw)
        .map_err(|reason| section.invalid(router::TOPIC_MAP, topic_raw, reason))?;

    Ok(RouterConfig {
        schema_map,
        tb_map,
        col_map,
        topic_map,
    })
}

fn validate_resumer(section: &SectionReader<'_>, runtime: &RuntimeConfig) -> Result<ResumerConfig> {
    Ok(match section.kind_or(RESUME_TYPE, ResumeType::Dummy)? {
        ResumeType::Dummy => ResumerConfig::Dummy,
        ResumeType::FromLog => ResumerConfig::FromLog {
            log_dir: section.string_or(LOG_DIR, &runtime.log_dir),
            config_file: section.optional_string(CONFIG_FILE),
        },
        ResumeType::FromTarget => ResumerConfig::FromTarget {
            table_full_name: section.optional_string(TABLE_FULL_NAME),
        },
    })
}
