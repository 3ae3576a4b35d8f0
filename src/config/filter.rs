//! Schema, table, column and event filtering rules from the `[filter]` section.
//!
//! # Design Decisions
//! - Ignore rules win over do rules
//! - An empty do rule means "everything"
//! - Table rules match either `schema.table` or the bare table name
//! - Column rules match `schema.table.col`, `table.col` or the bare column name
//! - Patterns are compiled once, during validation

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::registry::{EventType, Registered};

pub const DO_SCHEMAS: &str = "do_schemas";
pub const IGNORE_SCHEMAS: &str = "ignore_schemas";
pub const DO_TBS: &str = "do_tbs";
pub const IGNORE_TBS: &str = "ignore_tbs";
pub const DO_SCHEMAS_REGEX: &str = "do_schemas_regex";
pub const IGNORE_SCHEMAS_REGEX: &str = "ignore_schemas_regex";
pub const DO_TBS_REGEX: &str = "do_tbs_regex";
pub const IGNORE_TBS_REGEX: &str = "ignore_tbs_regex";
pub const DO_COLS: &str = "do_cols";
pub const IGNORE_COLS: &str = "ignore_cols";
pub const DO_COLS_REGEX: &str = "do_cols_regex";
pub const IGNORE_COLS_REGEX: &str = "ignore_cols_regex";
pub const DO_EVENTS: &str = "do_events";

const WILDCARD: &str = "*";

/// A compiled regular expression that compares and serializes by its source.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Validated filter rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterConfig {
    pub do_schemas: Vec<String>,
    pub ignore_schemas: Vec<String>,
    pub do_tbs: Vec<String>,
    pub ignore_tbs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_schemas_regex: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_schemas_regex: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_tbs_regex: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_tbs_regex: Option<Pattern>,
    pub do_cols: Vec<String>,
    pub ignore_cols: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_cols_regex: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_cols_regex: Option<Pattern>,
    pub do_events: Vec<EventType>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            do_schemas: Vec::new(),
            ignore_schemas: Vec::new(),
            do_tbs: Vec::new(),
            ignore_tbs: Vec::new(),
            do_schemas_regex: None,
            ignore_schemas_regex: None,
            do_tbs_regex: None,
            ignore_tbs_regex: None,
            do_cols: Vec::new(),
            ignore_cols: Vec::new(),
            do_cols_regex: None,
            ignore_cols_regex: None,
            do_events: EventType::ALL.to_vec(),
        }
    }
}

fn listed(list: &[String], candidates: &[&str]) -> bool {
    list.iter()
        .any(|entry| entry == WILDCARD || candidates.contains(&entry.as_str()))
}

impl FilterConfig {
    pub fn should_include_schema(&self, schema: &str) -> bool {
        if listed(&self.ignore_schemas, &[schema]) {
            return false;
        }
        if let Some(re) = &self.ignore_schemas_regex {
            if re.is_match(schema) {
                return false;
            }
        }
        if let Some(re) = &self.do_schemas_regex {
            if !re.is_match(schema) {
                return false;
            }
        }
        self.do_schemas.is_empty() || listed(&self.do_schemas, &[schema])
    }

    pub fn should_include_table(&self, schema: &str, table: &str) -> bool {
        if !self.should_include_schema(schema) {
            return false;
        }

        let full_name = format!("{schema}.{table}");
        let candidates = [full_name.as_str(), table];

        if listed(&self.ignore_tbs, &candidates) {
            return false;
        }
        if let Some(re) = &self.ignore_tbs_regex {
            if candidates.iter().any(|c| re.is_match(c)) {
                return false;
            }
        }
        if let Some(re) = &self.do_tbs_regex {
            if !candidates.iter().any(|c| re.is_match(c)) {
                return false;
            }
        }
        self.do_tbs.is_empty() || listed(&self.do_tbs, &candidates)
    }

    /// Column rules only; the caller is expected to have accepted the table already.
    pub fn should_include_column(&self, schema: &str, table: &str, column: &str) -> bool {
        let full_name = format!("{schema}.{table}.{column}");
        let tb_col = format!("{table}.{column}");
        let candidates = [full_name.as_str(), tb_col.as_str(), column];

        if let Some(re) = &self.do_cols_regex {
            if !candidates.iter().any(|c| re.is_match(c)) {
                return false;
            }
        }
        if let Some(re) = &self.ignore_cols_regex {
            if candidates.iter().any(|c| re.is_match(c)) {
                return false;
            }
        }
        if listed(&self.ignore_cols, &candidates) {
            return false;
        }
        self.do_cols.is_empty() || listed(&self.do_cols, &candidates)
    }

    pub fn should_include_event(&self, event: EventType) -> bool {
        self.do_events.contains(&event)
    }
}
