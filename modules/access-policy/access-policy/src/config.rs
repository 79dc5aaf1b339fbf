//! Configuration for the access policy module.
//!
//! ```yaml
//! use_default_policies: true
//! policies:
//!   auditor:
//!     tables:
//!       "*":                    # quote the wildcard key, bare `*` is a YAML alias
//!         allowed_fields: ["*"]
//!         denied_fields: [cost_total, profit, margin]
//! schema:
//!   sales_orders:
//!     columns: [id, so_no, amount_total]
//!     sensitive_columns: [cost_total]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use figment::Figment;
use figment::providers::{Format, Yaml};
use serde::Deserialize;

use crate::domain::DomainError;

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessPolicyConfig {
    /// Seed the registry with the built-in role policies.
    pub use_default_policies: bool,

    /// Role policies keyed by role name. A role listed here replaces a
    /// built-in role of the same name as a whole.
    pub policies: BTreeMap<String, RolePolicyConfig>,

    /// Table columns for `"*"` expansion. `None` uses the built-in catalog.
    pub schema: Option<BTreeMap<String, TableSchemaConfig>>,
}

impl Default for AccessPolicyConfig {
    fn default() -> Self {
        Self {
            use_default_policies: true,
            policies: BTreeMap::new(),
            schema: None,
        }
    }
}

impl AccessPolicyConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Config` if the file is missing or does not
    /// match the configuration shape.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DomainError::Config(format!(
                "policy file not found: {}",
                path.display()
            )));
        }
        Ok(Figment::new().merge(Yaml::file(path)).extract()?)
    }

    /// Load configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Config` if the text does not match the
    /// configuration shape.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        Ok(Figment::new().merge(Yaml::string(yaml)).extract()?)
    }
}

/// Per-role table rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RolePolicyConfig {
    /// Rules keyed by table name; `"*"` applies to every table.
    pub tables: BTreeMap<String, TableRuleConfig>,
}

/// Raw rule as written in configuration; validated when the registry is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableRuleConfig {
    /// Visible fields; `"*"` means every column.
    pub allowed_fields: Vec<String>,

    /// Hidden fields, overriding `allowed_fields`. Must not contain `"*"`.
    pub denied_fields: Vec<String>,

    /// Row filter template. Blank text is treated as no restriction.
    pub row_filter: Option<String>,
}

impl TableRuleConfig {
    /// The row filter with blank text normalised away.
    #[must_use]
    pub fn effective_row_filter(&self) -> Option<&str> {
        self.row_filter
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Column metadata for one table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableSchemaConfig {
    /// Regular columns, in projection order.
    pub columns: Vec<String>,

    /// Columns withheld from default visibility.
    pub sensitive_columns: Vec<String>,
}
