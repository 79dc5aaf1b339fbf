//! Domain layer for the access policy module.

pub mod catalog;
pub mod defaults;
pub mod error;
pub mod local_client;
pub mod registry;
pub mod service;

pub use catalog::StaticSchemaCatalog;
pub use error::DomainError;
pub use local_client::AccessPolicyLocalClient;
pub use registry::PolicyRegistry;
pub use service::Service;
