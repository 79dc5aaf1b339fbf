//! Local (in-process) client for the access policy engine.

use std::sync::Arc;

use access_policy_sdk::{AccessPolicyClient, AccessPolicyError, TableAccessRule};
use access_security::UserSecurityContext;

use super::{DomainError, Service};
use crate::config::AccessPolicyConfig;

/// Local client wrapping the service.
pub struct AccessPolicyLocalClient {
    svc: Arc<Service>,
}

impl AccessPolicyLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }

    /// Build the service from `cfg` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` or `Config` if the policies fail validation.
    pub fn from_config(cfg: &AccessPolicyConfig) -> Result<Self, AccessPolicyError> {
        let svc = Service::from_config(cfg).map_err(|e| log_and_convert("from_config", e))?;
        Ok(Self::new(Arc::new(svc)))
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AccessPolicyError {
    tracing::error!(operation = op, error = %e, "access_policy configuration rejected");
    e.into()
}

impl AccessPolicyClient for AccessPolicyLocalClient {
    fn resolve(&self, table: &str, user: &UserSecurityContext) -> Option<TableAccessRule> {
        self.svc.resolve(table, user)
    }

    fn is_field_allowed(&self, table: &str, field: &str, user: &UserSecurityContext) -> bool {
        self.svc.is_field_allowed(table, field, user)
    }

    fn filter_allowed_fields(
        &self,
        table: &str,
        requested: &[String],
        user: &UserSecurityContext,
    ) -> Vec<String> {
        self.svc.filter_allowed_fields(table, requested, user)
    }

    fn row_level_filter(&self, table: &str, user: &UserSecurityContext) -> Option<String> {
        self.svc.row_level_filter(table, user)
    }

    fn can_access_table(&self, table: &str, user: &UserSecurityContext) -> bool {
        self.svc.can_access_table(table, user)
    }

    fn visible_columns(&self, table: &str, user: &UserSecurityContext) -> Vec<String> {
        self.svc.visible_columns(table, user)
    }
}
