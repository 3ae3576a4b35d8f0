//! Task type resolution.
//!
//! # Responsibilities
//! - Map an (extract mode, sink mode) pair to exactly one task type
//! - Reject every pair the compatibility matrix does not list
//!
//! # Design Decisions
//! - The matrix is an explicit table; no wildcard or fallback entry
//! - Resolution is a pure function of its two inputs
//! - Database kinds do not gate resolution; they are validated separately

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::ValidatedConfig;
use crate::registry::{ExtractType, SinkType};

/// Canonical end-to-end operation a configuration requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    SnapshotMigration,
    CdcReplication,
    StructureMigration,
    ConsistencyCheck,
    QualityReview,
    DataRevision,
}

impl TaskType {
    pub const ALL: [TaskType; 6] = [
        TaskType::SnapshotMigration,
        TaskType::CdcReplication,
        TaskType::StructureMigration,
        TaskType::ConsistencyCheck,
        TaskType::QualityReview,
        TaskType::DataRevision,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::SnapshotMigration => "snapshot-migration",
            TaskType::CdcReplication => "cdc-replication",
            TaskType::StructureMigration => "structure-migration",
            TaskType::ConsistencyCheck => "consistency-check",
            TaskType::QualityReview => "quality-review",
            TaskType::DataRevision => "data-revision",
        }
    }

    /// Resolve the task type of a validated configuration.
    pub fn from_config(config: &ValidatedConfig) -> Result<Self, UnsupportedCombinationError> {
        resolve(config.extractor.extract_type, config.sinker.sink_type)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every supported (extract mode, sink mode) pair.
pub const COMPATIBILITY_MATRIX: [(ExtractType, SinkType, TaskType); 6] = [
    (ExtractType::Snapshot, SinkType::Write, TaskType::SnapshotMigration),
    (ExtractType::Cdc, SinkType::Write, TaskType::CdcReplication),
    (ExtractType::Struct, SinkType::Write, TaskType::StructureMigration),
    (ExtractType::Check, SinkType::Check, TaskType::ConsistencyCheck),
    (ExtractType::Review, SinkType::Check, TaskType::QualityReview),
    (ExtractType::Revise, SinkType::Write, TaskType::DataRevision),
];

/// The pair has no entry in the compatibility matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported combination: extract_type '{extract_type}' with sink_type '{sink_type}'")]
pub struct UnsupportedCombinationError {
    pub extract_type: ExtractType,
    pub sink_type: SinkType,
}

pub fn resolve(
    extract_type: ExtractType,
    sink_type: SinkType,
) -> Result<TaskType, UnsupportedCombinationError> {
    COMPATIBILITY_MATRIX
        .iter()
        .find(|(extract, sink, _)| *extract == extract_type && *sink == sink_type)
        .map(|(_, _, task_type)| *task_type)
        .ok_or(UnsupportedCombinationError {
            extract_type,
            sink_type,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registered;

    #[test]
    fn test_supported_pairs() {
        let cases = [
            ("snapshot", "write", "snapshot-migration"),
            ("cdc", "write", "cdc-replication"),
            ("struct", "write", "structure-migration"),
            ("check", "check", "consistency-check"),
            ("review", "check", "quality-review"),
            ("revise", "write", "data-revision"),
        ];
        for (extract, sink, label) in cases {
            let extract: ExtractType = extract.parse().unwrap();
            let sink: SinkType = sink.parse().unwrap();
            assert_eq!(resolve(extract, sink).unwrap().label(), label);
        }
    }

    #[test]
    fn test_unlisted_pair_is_rejected() {
        let err = resolve(ExtractType::Cdc, SinkType::Struct).unwrap_err();
        assert_eq!(err.extract_type, ExtractType::Cdc);
        assert_eq!(err.sink_type, SinkType::Struct);
        assert!(err.to_string().contains("'cdc'"));
        assert!(err.to_string().contains("'struct'"));
    }

    #[test]
    fn test_only_matrix_pairs_resolve() {
        let mut resolved = 0;
        for extract in ExtractType::ALL {
            for sink in SinkType::ALL {
                if resolve(*extract, *sink).is_ok() {
                    resolved += 1;
                }
            }
        }
        assert_eq!(resolved, COMPATIBILITY_MATRIX.len());
    }

    #[test]
    fn test_every_task_type_is_reachable() {
        for task_type in TaskType::ALL {
            assert!(COMPATIBILITY_MATRIX.iter().any(|(_, _, t)| *t == task_type));
        }
    }

    #[test]
    fn test_serializes_label() {
        assert_eq!(
            serde_json::to_string(&TaskType::CdcReplication).unwrap(),
            "\"cdc-replication\""
        );
    }
}
