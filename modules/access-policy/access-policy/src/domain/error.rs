//! Domain errors for the access policy module.

use access_policy_sdk::{AccessPolicyError, RuleError};

/// Internal domain errors. All of them are configuration errors detected
/// while building the registry; request-time evaluation never fails.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("role '{role}', table '{table}': denied_fields must not contain \"*\"")]
    DeniedFieldsWildcard { role: String, table: String },

    #[error("role '{role}', table '{table}': unknown row filter placeholder '{placeholder}'")]
    UnknownPlaceholder {
        role: String,
        table: String,
        placeholder: String,
    },

    #[error("policy role name must not be empty")]
    EmptyRoleName,

    #[error("role '{role}' has a rule with an empty table name")]
    EmptyTableName { role: String },

    #[error("role '{role}' is defined more than once")]
    DuplicateRole { role: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Attach the role and table a rule error was found in.
    pub(crate) fn in_rule(role: &str, table: &str, err: RuleError) -> Self {
        let (role, table) = (role.to_owned(), table.to_owned());
        match err {
            RuleError::DeniedFieldsWildcard => Self::DeniedFieldsWildcard { role, table },
            RuleError::UnknownPlaceholder(placeholder) => Self::UnknownPlaceholder {
                role,
                table,
                placeholder,
            },
        }
    }
}

impl From<figment::Error> for DomainError {
    fn from(e: figment::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<DomainError> for AccessPolicyError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::DeniedFieldsWildcard { role, table } => Self::InvalidPolicy {
                role,
                table,
                reason: RuleError::DeniedFieldsWildcard.to_string(),
            },
            DomainError::UnknownPlaceholder {
                role,
                table,
                placeholder,
            } => Self::InvalidPolicy {
                role,
                table,
                reason: RuleError::UnknownPlaceholder(placeholder).to_string(),
            },
            DomainError::EmptyRoleName
            | DomainError::EmptyTableName { .. }
            | DomainError::DuplicateRole { .. } => Self::Config(e.to_string()),
            DomainError::Config(reason) => Self::Config(reason),
        }
    }
}
