//! Domain service: access resolution, field filtering and row filter
//! compilation.

use std::sync::Arc;

use access_policy_sdk::{SchemaCatalog, TableAccessRule, WILDCARD};
use access_security::UserSecurityContext;
use tracing::{debug, warn};

use super::catalog::StaticSchemaCatalog;
use super::error::DomainError;
use super::registry::PolicyRegistry;
use crate::config::AccessPolicyConfig;

/// Access policy service.
///
/// Holds the registry and schema catalog it was built with; every method is
/// a pure function of those and its arguments, so one instance serves all
/// request workers concurrently.
#[derive(Clone)]
pub struct Service {
    registry: Arc<PolicyRegistry>,
    catalog: Arc<dyn SchemaCatalog>,
}

impl Service {
    #[must_use]
    pub fn new(registry: Arc<PolicyRegistry>, catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Build the registry and catalog described by `cfg`.
    ///
    /// # Errors
    ///
    /// Returns the first policy validation failure; see [`DomainError`].
    pub fn from_config(cfg: &AccessPolicyConfig) -> Result<Self, DomainError> {
        let registry = PolicyRegistry::from_config(cfg)?;
        let catalog = cfg
            .schema
            .as_ref()
            .map_or_else(StaticSchemaCatalog::builtin, StaticSchemaCatalog::from_config);
        Ok(Self::new(Arc::new(registry), Arc::new(catalog)))
    }

    #[must_use]
    pub fn registry(&self) -> &PolicyRegistry {
        &self.registry
    }

    /// Effective rule of `user` on `table`.
    ///
    /// Admins get [`TableAccessRule::unrestricted`] without consulting roles.
    /// Otherwise every role contributes its `"*"` rule and then its rule for
    /// `table`, merged permissively. `None` when nothing was contributed.
    #[must_use]
    #[tracing::instrument(level = "debug", skip_all, fields(table = %table))]
    pub fn resolve(&self, table: &str, user: &UserSecurityContext) -> Option<TableAccessRule> {
        if user.is_admin() {
            debug!("Admin bypass");
            return Some(TableAccessRule::unrestricted());
        }

        let mut effective: Option<TableAccessRule> = None;
        for role in user.roles() {
            let Some(policy) = self.registry.lookup(role) else {
                debug!(role = %role, "Role has no policy, ignored");
                continue;
            };

            for rule in [policy.wildcard_rule(), policy.table_rule(table)]
                .into_iter()
                .flatten()
            {
                effective = Some(match effective {
                    Some(acc) => acc.merge(rule),
                    None => rule.clone(),
                });
            }
        }

        if effective.is_none() {
            debug!("No role grants access");
        }
        effective
    }

    /// Whether `field` is visible. Denials are checked before allowances.
    #[must_use]
    pub fn is_field_allowed(&self, table: &str, field: &str, user: &UserSecurityContext) -> bool {
        self.resolve(table, user)
            .is_some_and(|rule| rule.is_field_visible(field))
    }

    /// Visible subset of `requested` in request order, resolving once.
    #[must_use]
    pub fn filter_allowed_fields(
        &self,
        table: &str,
        requested: &[String],
        user: &UserSecurityContext,
    ) -> Vec<String> {
        self.resolve(table, user)
            .map(|rule| rule.filter_fields(requested))
            .unwrap_or_default()
    }

    /// Row restriction of `user` on `table` with placeholders bound to the
    /// user's attributes. `None` means every row is visible.
    ///
    /// An array placeholder the user has no values for stays in the output
    /// verbatim; the fragment then fails in the query layer instead of
    /// silently widening or narrowing the row set.
    #[must_use]
    pub fn row_level_filter(&self, table: &str, user: &UserSecurityContext) -> Option<String> {
        let rule = self.resolve(table, user)?;
        let rendered = rule.row_filter()?.render(user);

        if !rendered.is_complete() {
            let tokens: Vec<&str> = rendered.unresolved.iter().map(|p| p.token()).collect();
            warn!(
                table = %table,
                user_id = %user.user_id(),
                unresolved = %tokens.join(", "),
                "Row filter placeholders left unsubstituted, query will be rejected"
            );
        }

        Some(rendered.sql)
    }

    #[must_use]
    pub fn can_access_table(&self, table: &str, user: &UserSecurityContext) -> bool {
        self.resolve(table, user).is_some()
    }

    /// Concrete visible columns of `table`.
    ///
    /// Known tables yield the catalog's columns followed by its sensitive
    /// columns, each kept only if visible. Tables the catalog does not know
    /// yield only the literal allowed fields that are not denied.
    #[must_use]
    pub fn visible_columns(&self, table: &str, user: &UserSecurityContext) -> Vec<String> {
        let Some(rule) = self.resolve(table, user) else {
            return Vec::new();
        };

        match self.catalog.columns(table) {
            Some(columns) => columns
                .iter()
                .chain(self.catalog.sensitive_columns(table))
                .filter(|c| rule.is_field_visible(c))
                .cloned()
                .collect(),
            None => rule
                .allowed_fields()
                .iter()
                .filter(|f| f.as_str() != WILDCARD && rule.is_field_visible(f))
                .cloned()
                .collect(),
        }
    }
}
