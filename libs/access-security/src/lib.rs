#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod context;
pub mod sql_literal;

pub use context::{UserSecurityContext, UserSecurityContextBuilder};
