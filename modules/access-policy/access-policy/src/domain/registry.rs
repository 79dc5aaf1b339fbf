//! Immutable role → policy registry, validated at construction.

use std::collections::{BTreeMap, HashMap};

use access_policy_sdk::{RoleAccessPolicy, RowFilterTemplate, TableAccessRule};
use tracing::info;

use super::defaults::default_policies;
use super::error::DomainError;
use crate::config::{AccessPolicyConfig, TableRuleConfig};

/// Role policies keyed by role name.
///
/// Built once before the first request and never mutated, so concurrent
/// readers need no synchronisation. Looking up an unknown role is a normal
/// outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, RoleAccessPolicy>,
}

impl PolicyRegistry {
    /// Build a registry from already-constructed policies.
    ///
    /// # Errors
    ///
    /// - `EmptyRoleName` / `EmptyTableName` for blank keys
    /// - `DuplicateRole` if two policies share a role name
    pub fn new(policies: impl IntoIterator<Item = RoleAccessPolicy>) -> Result<Self, DomainError> {
        let mut by_role = HashMap::new();

        for policy in policies {
            validate_policy(&policy)?;
            let role = policy.role_name().to_owned();
            if by_role.contains_key(&role) {
                return Err(DomainError::DuplicateRole { role });
            }
            by_role.insert(role, policy);
        }

        info!(roles = by_role.len(), "Access policy registry built");
        Ok(Self { policies: by_role })
    }

    /// Build and validate a registry from configuration.
    ///
    /// Configured roles replace built-in roles of the same name.
    ///
    /// # Errors
    ///
    /// Any rule that fails validation aborts construction; see [`DomainError`].
    pub fn from_config(cfg: &AccessPolicyConfig) -> Result<Self, DomainError> {
        let mut role_configs = if cfg.use_default_policies {
            default_policies()
        } else {
            BTreeMap::new()
        };
        role_configs.extend(
            cfg.policies
                .iter()
                .map(|(role, role_cfg)| (role.clone(), role_cfg.clone())),
        );

        let mut policies = Vec::with_capacity(role_configs.len());
        for (role, role_cfg) in &role_configs {
            let mut policy = RoleAccessPolicy::new(role.as_str());
            for (table, rule_cfg) in &role_cfg.tables {
                policy = policy.with_rule(table.as_str(), build_rule(role, table, rule_cfg)?);
            }
            policies.push(policy);
        }

        Self::new(policies)
    }

    /// Policy attached to `role`, if any.
    #[must_use]
    pub fn lookup(&self, role: &str) -> Option<&RoleAccessPolicy> {
        self.policies.get(role)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Registered role names, sorted.
    #[must_use]
    pub fn role_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn validate_policy(policy: &RoleAccessPolicy) -> Result<(), DomainError> {
    if policy.role_name().trim().is_empty() {
        return Err(DomainError::EmptyRoleName);
    }
    if policy.table_rules().keys().any(|t| t.trim().is_empty()) {
        return Err(DomainError::EmptyTableName {
            role: policy.role_name().to_owned(),
        });
    }
    Ok(())
}

fn build_rule(
    role: &str,
    table: &str,
    cfg: &TableRuleConfig,
) -> Result<TableAccessRule, DomainError> {
    let row_filter = cfg
        .effective_row_filter()
        .map(RowFilterTemplate::parse)
        .transpose()
        .map_err(|e| DomainError::in_rule(role, table, e))?;

    TableAccessRule::new(
        cfg.allowed_fields.iter().map(String::as_str),
        cfg.denied_fields.iter().map(String::as_str),
        row_filter,
    )
    .map_err(|e| DomainError::in_rule(role, table, e))
}
