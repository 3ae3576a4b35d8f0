//! Schema, table and column renaming plus topic selection from the `[router]` section.
//!
//! ```text
//! [router]
//! schema_map = shop:shop_v2
//! tb_map = shop.users:crm.customers
//! col_map = json:[{"db":"shop","tb":"users","col_map":{"mail":"email"}}]
//! topic_map = *.*:default,shop.*:shop_events,shop.orders:orders
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SCHEMA_MAP: &str = "schema_map";
pub const TB_MAP: &str = "tb_map";
pub const COL_MAP: &str = "col_map";
pub const TOPIC_MAP: &str = "topic_map";

const JSON_PREFIX: &str = "json:";
const WILDCARD: &str = "*";

/// Column renames → `source column → target column`.
pub type ColumnMap = BTreeMap<String, String>;

/// Fully qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TableName {
    pub schema: String,
    pub table: String,
}

impl TableName {
    fn parse(raw: &str) -> Option<Self> {
        let (schema, table) = raw.trim().split_once('.')?;
        let (schema, table) = (schema.trim(), table.trim());
        if schema.is_empty() || table.is_empty() {
            return None;
        }
        Some(Self {
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    fn key(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

/// Validated routing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouterConfig {
    /// Source schema → target schema.
    pub schema_map: BTreeMap<String, String>,

    /// `schema.table` → target table.
    pub tb_map: BTreeMap<String, TableName>,

    /// `schema.table` → column renames for that table.
    pub col_map: BTreeMap<String, ColumnMap>,

    /// `schema.table`, `schema.*` or `*.*` → topic.
    pub topic_map: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct TableColumnMap {
    db: String,
    tb: String,
    col_map: ColumnMap,
}

/// Split `a:b,c:d` into pairs, rejecting anything that is not exactly `src:dst`.
fn pairs(raw: &str) -> Result<Vec<(&str, &str)>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once(':') {
            Some((src, dst)) if !src.trim().is_empty() && !dst.trim().is_empty() && !dst.contains(':') => {
                Ok((src.trim(), dst.trim()))
            }
            _ => Err(format!("'{pair}' is not a 'source:target' pair")),
        })
        .collect()
}

impl RouterConfig {
    /// Parse `src_schema:dst_schema,...`.
    pub fn parse_schema_map(raw: &str) -> Result<BTreeMap<String, String>, String> {
        Ok(pairs(raw)?
            .into_iter()
            .map(|(src, dst)| (src.to_string(), dst.to_string()))
            .collect())
    }

    /// Parse `src_schema.src_tb:dst_schema.dst_tb,...`.
    pub fn parse_tb_map(raw: &str) -> Result<BTreeMap<String, TableName>, String> {
        pairs(raw)?
            .into_iter()
            .map(|(src, dst)| -> Result<(String, TableName), String> {
                let src = TableName::parse(src).ok_or_else(|| format!("'{src}' is not 'schema.table'"))?;
                let dst = TableName::parse(dst).ok_or_else(|| format!("'{dst}' is not 'schema.table'"))?;
                Ok((src.key(), dst))
            })
            .collect()
    }

    /// Parse `[json:][{"db":..,"tb":..,"col_map":{"src":"dst",..}},..]`.
    pub fn parse_col_map(raw: &str) -> Result<BTreeMap<String, ColumnMap>, String> {
        let raw = raw.trim();
        let json = raw.strip_prefix(JSON_PREFIX).unwrap_or(raw).trim();
        if json.is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries: Vec<TableColumnMap> =
            serde_json::from_str(json).map_err(|e| format!("invalid column map JSON: {e}"))?;
        let mut col_map: BTreeMap<String, ColumnMap> = BTreeMap::new();
        for entry in entries {
            if entry.db.trim().is_empty() || entry.tb.trim().is_empty() {
                return Err("column map entries need a non-empty 'db' and 'tb'".to_string());
            }
            col_map
                .entry(format!("{}.{}", entry.db.trim(), entry.tb.trim()))
                .or_default()
                .extend(entry.col_map);
        }
        Ok(col_map)
    }

    /// Parse `schema.table:topic,...`, where either part of the name may be `*`.
    pub fn parse_topic_map(raw: &str) -> Result<BTreeMap<String, String>, String> {
        pairs(raw)?
            .into_iter()
            .map(|(name, topic)| -> Result<(String, String), String> {
                let name = TableName::parse(name).ok_or_else(|| format!("'{name}' is not 'schema.table'"))?;
                Ok((name.key(), topic.to_string()))
            })
            .collect()
    }

    /// Target schema for `schema`.
    pub fn route_schema<'a>(&'a self, schema: &'a str) -> &'a str {
        self.schema_map.get(schema).map(String::as_str).unwrap_or(schema)
    }

    /// Target `(schema, table)`; table rules take precedence over schema rules.
    pub fn route_table<'a>(&'a self, schema: &'a str, table: &'a str) -> (&'a str, &'a str) {
        if let Some(dst) = self.tb_map.get(&format!("{schema}.{table}")) {
            return (dst.schema.as_str(), dst.table.as_str());
        }
        (self.route_schema(schema), table)
    }

    /// Column renames for a source table.
    pub fn col_map_for(&self, schema: &str, table: &str) -> Option<&ColumnMap> {
        self.col_map.get(&format!("{schema}.{table}"))
    }

    /// Target name of `column` in a source table.
    pub fn route_column<'a>(&'a self, schema: &str, table: &str, column: &'a str) -> &'a str {
        self.col_map_for(schema, table)
            .and_then(|cols| cols.get(column))
            .map(String::as_str)
            .unwrap_or(column)
    }

    /// Topic for a table: exact name, then `schema.*`, then `*.*`.
    pub fn get_topic(&self, schema: &str, table: &str) -> Option<&str> {
        [
            format!("{schema}.{table}"),
            format!("{schema}.{WILDCARD}"),
            format!("{WILDCARD}.{WILDCARD}"),
        ]
        .iter()
        .find_map(|key| self.topic_map.get(key))
        .map(String::as_str)
    }

    /// Rules mapping targets back to sources.
    ///
    /// Column maps are keyed by the routed target table. Topics are not reversed.
    pub fn reverse(&self) -> Self {
        let schema_map = self
            .schema_map
            .iter()
            .map(|(src, dst)| (dst.clone(), src.clone()))
            .collect();
        let tb_map = self
            .tb_map
            .iter()
            .filter_map(|(src, dst)| TableName::parse(src).map(|src| (dst.key(), src)))
            .collect();
        let col_map = self
            .col_map
            .iter()
            .filter_map(|(src, cols)| {
                let src = TableName::parse(src)?;
                let (schema, table) = self.route_table(&src.schema, &src.table);
                let reversed: ColumnMap = cols.iter().map(|(from, to)| (to.clone(), from.clone())).collect();
                Some((format!("{schema}.{table}"), reversed))
            })
            .collect();
        Self {
            schema_map,
            tb_map,
            col_map,
            topic_map: self.topic_map.clone(),
        }
    }
}
