//! Static schema catalog.

use std::collections::{BTreeMap, HashSet};

use access_policy_sdk::SchemaCatalog;

use super::defaults::default_schema;
use crate::config::TableSchemaConfig;

#[derive(Debug, Clone, Default)]
struct TableColumns {
    columns: Vec<String>,
    sensitive: Vec<String>,
}

/// In-memory [`SchemaCatalog`] built from configuration or the built-in
/// table metadata.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaCatalog {
    tables: BTreeMap<String, TableColumns>,
}

impl StaticSchemaCatalog {
    /// Catalog of the built-in sales tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_config(&default_schema())
    }

    #[must_use]
    pub fn from_config(schema: &BTreeMap<String, TableSchemaConfig>) -> Self {
        schema.iter().fold(Self::default(), |catalog, (table, cfg)| {
            catalog.with_table(table.as_str(), &cfg.columns, &cfg.sensitive_columns)
        })
    }

    /// Register `table`. Duplicate names collapse to their first occurrence,
    /// and a sensitive column also listed as regular is kept as regular.
    #[must_use]
    pub fn with_table(
        mut self,
        table: impl Into<String>,
        columns: &[String],
        sensitive: &[String],
    ) -> Self {
        let mut seen = HashSet::new();
        let columns: Vec<String> = columns
            .iter()
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect();
        let sensitive: Vec<String> = sensitive
            .iter()
            .filter(|c| seen.insert(c.as_str()))
            .cloned()
            .collect();

        self.tables
            .insert(table.into(), TableColumns { columns, sensitive });
        self
    }
}

impl SchemaCatalog for StaticSchemaCatalog {
    fn columns(&self, table: &str) -> Option<&[String]> {
        self.tables.get(table).map(|t| t.columns.as_slice())
    }

    fn sensitive_columns(&self, table: &str) -> &[String] {
        match self.tables.get(table) {
            Some(t) => &t.sensitive,
            None => &[],
        }
    }
}
