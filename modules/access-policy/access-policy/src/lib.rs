//! Access Policy Module
//!
//! This module holds the immutable role policy registry and answers, per
//! request, which columns and rows of a table a user may see. Policies are
//! loaded and validated once at startup; a malformed policy aborts startup.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::AccessPolicyConfig;
pub use domain::{
    AccessPolicyLocalClient, DomainError, PolicyRegistry, Service, StaticSchemaCatalog,
};
pub use module::AccessPolicyModule;
