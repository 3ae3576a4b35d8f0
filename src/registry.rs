//! Closed registries of the kinds a task configuration may name.
//!
//! # Responsibilities
//! - One tagged enum per category (database, extract mode, sink mode, ...)
//! - Canonical name plus accepted aliases for every variant
//! - Normalize raw configuration strings into registry values
//!
//! # Design Decisions
//! - Membership is fixed at build time; no runtime registration
//! - Matching is trimmed and case-insensitive
//! - Values serialize as their canonical name

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// The registry categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    DbType,
    ExtractType,
    SinkType,
    ParallelType,
    PipelineType,
    ResumeType,
    EventType,
}

impl RegistryKind {
    /// Configuration-facing name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryKind::DbType => "db_type",
            RegistryKind::ExtractType => "extract_type",
            RegistryKind::SinkType => "sink_type",
            RegistryKind::ParallelType => "parallel_type",
            RegistryKind::PipelineType => "pipeline_type",
            RegistryKind::ResumeType => "resume_type",
            RegistryKind::EventType => "event_type",
        }
    }

    /// Canonical names of every member of the category.
    pub fn canonical_names(&self) -> Vec<&'static str> {
        match self {
            RegistryKind::DbType => names::<DbType>(),
            RegistryKind::ExtractType => names::<ExtractType>(),
            RegistryKind::SinkType => names::<SinkType>(),
            RegistryKind::ParallelType => names::<ParallelType>(),
            RegistryKind::PipelineType => names::<PipelineType>(),
            RegistryKind::ResumeType => names::<ResumeType>(),
            RegistryKind::EventType => names::<EventType>(),
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw string did not match any member of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{raw}', expected one of: {}", .expected.join(", "))]
pub struct UnknownKindError {
    /// The string as it appeared in the configuration.
    pub raw: String,
    /// The category it was checked against.
    pub kind: RegistryKind,
    /// Canonical names of that category.
    pub expected: Vec<&'static str>,
}

impl UnknownKindError {
    pub fn new(raw: impl Into<String>, kind: RegistryKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
            expected: kind.canonical_names(),
        }
    }
}

/// Implemented by every registry enum.
pub trait Registered: Sized + Copy + PartialEq + 'static {
    /// Category this enum belongs to.
    const KIND: RegistryKind;

    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// The single canonical name.
    fn canonical(&self) -> &'static str;

    /// Additional accepted spellings.
    fn aliases(&self) -> &'static [&'static str];

    /// Resolve a raw string to a member.
    fn normalize(raw: &str) -> Result<Self, UnknownKindError> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.canonical() == needle || member.aliases().contains(&needle.as_str()))
            .ok_or_else(|| UnknownKindError::new(raw, Self::KIND))
    }
}

fn names<T: Registered>() -> Vec<&'static str> {
    T::ALL.iter().map(|member| member.canonical()).collect()
}

/// Normalize `raw` against the registry named by `kind`, returning the canonical name.
pub fn normalize(raw: &str, kind: RegistryKind) -> Result<&'static str, UnknownKindError> {
    match kind {
        RegistryKind::DbType => DbType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::ExtractType => ExtractType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::SinkType => SinkType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::ParallelType => ParallelType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::PipelineType => PipelineType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::ResumeType => ResumeType::normalize(raw).map(|v| v.canonical()),
        RegistryKind::EventType => EventType::normalize(raw).map(|v| v.canonical()),
    }
}

macro_rules! registry_enum {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $canonical:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl Registered for $name {
            const KIND: RegistryKind = RegistryKind::$kind;
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn canonical(&self) -> &'static str {
                match self {
                    $( $name::$variant => $canonical ),+
                }
            }

            fn aliases(&self) -> &'static [&'static str] {
                match self {
                    $( $name::$variant => &[ $( $alias ),* ] ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.canonical())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKindError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::normalize(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.canonical())
            }
        }
    };
}

registry_enum! {
    /// Database engines a task can read from or write to.
    DbType => DbType {
        Mysql = "mysql",
        Pg = "pg" | "postgres" | "postgresql",
        Mongo = "mongo" | "mongodb",
        Redis = "redis",
        Kafka = "kafka",
        StarRocks = "starrocks",
        Doris = "doris",
        ClickHouse = "clickhouse" | "ch",
        Tidb = "tidb",
        Foxlake = "foxlake",
    }
}

registry_enum! {
    /// Operation requested of the source side.
    ExtractType => ExtractType {
        Snapshot = "snapshot",
        Cdc = "cdc",
        Struct = "struct",
        Check = "check",
        Review = "review",
        Revise = "revise",
    }
}

registry_enum! {
    /// Operation requested of the target side.
    SinkType => SinkType {
        Write = "write",
        Check = "check",
        Struct = "struct",
    }
}

registry_enum! {
    /// How extracted data is partitioned across sink workers.
    ParallelType => ParallelType {
        Serial = "serial",
        Snapshot = "snapshot",
        RdbPartition = "rdb_partition",
        RdbMerge = "rdb_merge",
        RdbCheck = "rdb_check",
        Table = "table",
        Mongo = "mongo",
        Redis = "redis",
    }
}

registry_enum! {
    /// Transport between extractor and sinker.
    PipelineType => PipelineType {
        /// In-process bounded queue.
        Basic = "basic" | "memory" | "queue",
        /// Data exposed to consumers over HTTP.
        HttpServer = "http_server" | "http",
    }
}

registry_enum! {
    /// Where an interrupted task picks its position back up from.
    ResumeType => ResumeType {
        Dummy = "dummy",
        FromLog = "from_log",
        FromTarget = "from_target",
    }
}

registry_enum! {
    /// Row-level change events.
    EventType => EventType {
        Insert = "insert",
        Update = "update",
        Delete = "delete",
    }
}

impl ParallelType {
    /// Default strategy for an extract mode when none is configured.
    pub fn default_for(extract_type: ExtractType) -> Self {
        match extract_type {
            ExtractType::Snapshot => ParallelType::Snapshot,
            ExtractType::Cdc => ParallelType::RdbMerge,
            ExtractType::Struct => ParallelType::Serial,
            ExtractType::Check | ExtractType::Review | ExtractType::Revise => ParallelType::RdbCheck,
        }
    }
}
