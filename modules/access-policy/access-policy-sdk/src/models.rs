//! Rule model for table and row access.

use std::collections::{BTreeMap, BTreeSet};

use access_security::UserSecurityContext;
use serde::Serialize;

use crate::error::RuleError;
use crate::row_filter::RowFilterTemplate;

/// Sentinel meaning "every field" in an allowed set, or "every table" as a
/// policy table key.
pub const WILDCARD: &str = "*";

/// Permission for one table: visible fields and an optional row restriction.
///
/// `denied_fields` always wins over `allowed_fields`. A `row_filter` of
/// `None` means every row is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableAccessRule {
    allowed_fields: BTreeSet<String>,
    denied_fields: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    row_filter: Option<RowFilterTemplate>,
}

impl TableAccessRule {
    /// Create a validated rule.
    ///
    /// # Errors
    ///
    /// Returns `DeniedFieldsWildcard` if `denied` contains `"*"`.
    pub fn new<A, D, S>(
        allowed: A,
        denied: D,
        row_filter: Option<RowFilterTemplate>,
    ) -> Result<Self, RuleError>
    where
        A: IntoIterator<Item = S>,
        D: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let denied_fields: BTreeSet<String> = denied.into_iter().map(Into::into).collect();
        if denied_fields.contains(WILDCARD) {
            return Err(RuleError::DeniedFieldsWildcard);
        }

        Ok(Self {
            allowed_fields: allowed.into_iter().map(Into::into).collect(),
            denied_fields,
            row_filter,
        })
    }

    /// All fields, no denials, no row restriction.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            allowed_fields: BTreeSet::from([WILDCARD.to_owned()]),
            denied_fields: BTreeSet::new(),
            row_filter: None,
        }
    }

    #[must_use]
    pub fn allowed_fields(&self) -> &BTreeSet<String> {
        &self.allowed_fields
    }

    #[must_use]
    pub fn denied_fields(&self) -> &BTreeSet<String> {
        &self.denied_fields
    }

    #[must_use]
    pub fn row_filter(&self) -> Option<&RowFilterTemplate> {
        self.row_filter.as_ref()
    }

    /// `true` when the allowed set is the `"*"` sentinel.
    #[must_use]
    pub fn allows_all_fields(&self) -> bool {
        self.allowed_fields.contains(WILDCARD)
    }

    /// Deny first, then allow: a denied field is hidden even under `"*"`.
    #[must_use]
    pub fn is_field_visible(&self, field: &str) -> bool {
        if self.denied_fields.contains(field) {
            return false;
        }
        self.allows_all_fields() || self.allowed_fields.contains(field)
    }

    /// Keep the visible fields of `requested`, preserving its order.
    #[must_use]
    pub fn filter_fields(&self, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .filter(|f| self.is_field_visible(f))
            .cloned()
            .collect()
    }

    /// Merge two rules held through different roles into a new rule.
    ///
    /// The composition is permissive; the result is never narrower than
    /// either input:
    /// - allowed fields: `{"*"}` if either side has `"*"`, else the union
    /// - denied fields: the intersection (denied only if both sides deny)
    /// - row filter: `None` if either side is unrestricted, the shared text
    ///   if both are identical, else `(A) OR (B)`
    ///
    /// Neither input is modified.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let allowed_fields = if self.allows_all_fields() || other.allows_all_fields() {
            BTreeSet::from([WILDCARD.to_owned()])
        } else {
            self.allowed_fields
                .union(&other.allowed_fields)
                .cloned()
                .collect()
        };

        let denied_fields = self
            .denied_fields
            .intersection(&other.denied_fields)
            .cloned()
            .collect();

        let row_filter = match (&self.row_filter, &other.row_filter) {
            (Some(a), Some(b)) => Some(a.or(b)),
            _ => None,
        };

        Self {
            allowed_fields,
            denied_fields,
            row_filter,
        }
    }
}

/// The per-table rules attached to one role.
///
/// The table key `"*"` holds a rule applied to every table before the
/// table-specific rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAccessPolicy {
    role_name: String,
    table_rules: BTreeMap<String, TableAccessRule>,
}

impl RoleAccessPolicy {
    #[must_use]
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            table_rules: BTreeMap::new(),
        }
    }

    /// Attach `rule` to `table`, replacing any previous rule for it.
    #[must_use]
    pub fn with_rule(mut self, table: impl Into<String>, rule: TableAccessRule) -> Self {
        self.table_rules.insert(table.into(), rule);
        self
    }

    #[must_use]
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    #[must_use]
    pub fn table_rules(&self) -> &BTreeMap<String, TableAccessRule> {
        &self.table_rules
    }

    /// Rule under the `"*"` table key.
    #[must_use]
    pub fn wildcard_rule(&self) -> Option<&TableAccessRule> {
        self.table_rules.get(WILDCARD)
    }

    /// Rule registered for exactly `table`.
    #[must_use]
    pub fn table_rule(&self, table: &str) -> Option<&TableAccessRule> {
        self.table_rules.get(table)
    }
}

/// Cache key for callers that memoise resolution results outside the engine.
///
/// Resolution depends only on the role set, the admin flag and the table, so
/// two requests with equal keys resolve to equal rules. Rendered row filters
/// depend on the user's attributes and must not be cached under this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleRuleCacheKey {
    pub is_admin: bool,
    pub roles: Vec<String>,
    pub table: String,
}

impl RoleRuleCacheKey {
    #[must_use]
    pub fn for_request(table: &str, user: &UserSecurityContext) -> Self {
        Self {
            is_admin: user.is_admin(),
            roles: user.roles().iter().cloned().collect(),
            table: table.to_owned(),
        }
    }
}
