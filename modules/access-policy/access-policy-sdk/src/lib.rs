#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Access Policy SDK
//!
//! This crate provides the public contract of the `access_policy` module:
//!
//! - [`AccessPolicyClient`] - Public API trait for query builders
//! - [`TableAccessRule`], [`RoleAccessPolicy`] - Rule model and the permissive merge
//! - [`RowFilterTemplate`], [`Placeholder`] - Closed row filter placeholder vocabulary
//! - [`SchemaCatalog`] - Column catalog collaborator used to expand `"*"`
//! - [`AccessPolicyError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use access_policy_sdk::AccessPolicyClient;
//!
//! let policy: Arc<dyn AccessPolicyClient> = /* built once at startup */;
//!
//! if !policy.can_access_table("sales_orders", &user) {
//!     return Err(Forbidden);
//! }
//! let columns = policy.filter_allowed_fields("sales_orders", &requested, &user);
//! if let Some(predicate) = policy.row_level_filter("sales_orders", &user) {
//!     query.and_where(format!("({predicate})"));
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod error;
pub mod models;
pub mod row_filter;

// Re-export main types at crate root
pub use access_security::UserSecurityContext;
pub use api::AccessPolicyClient;
pub use catalog::SchemaCatalog;
pub use error::{AccessPolicyError, RuleError};
pub use models::{RoleAccessPolicy, RoleRuleCacheKey, TableAccessRule, WILDCARD};
pub use row_filter::{Placeholder, RenderedRowFilter, RowFilterTemplate};
