//! Error types for the access policy module.

use thiserror::Error;

/// Errors surfaced to hosts that build or load policies.
///
/// Access denial is never an error: it is expressed as `None`, `false` or an
/// empty column list by [`crate::AccessPolicyClient`].
#[derive(Debug, Error)]
pub enum AccessPolicyError {
    /// A policy definition violates a rule invariant.
    #[error("invalid policy for role '{role}' on table '{table}': {reason}")]
    InvalidPolicy {
        role: String,
        table: String,
        reason: String,
    },

    /// Policy configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A single rule or template failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// `"*"` in the denied set is ambiguous next to any allowance.
    #[error("denied fields must not contain the wildcard \"*\"")]
    DeniedFieldsWildcard,

    /// The template references a placeholder outside the closed vocabulary.
    #[error("unknown placeholder '{0}'")]
    UnknownPlaceholder(String),
}
