//! Access policy module lifecycle.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use access_policy_sdk::AccessPolicyClient;
use anyhow::Context;
use tracing::info;

use crate::config::AccessPolicyConfig;
use crate::domain::{AccessPolicyLocalClient, Service};

/// Access policy module.
///
/// `init` runs once during host startup, before any request worker asks for
/// the client. A configuration error fails `init` and must abort startup.
#[derive(Default)]
pub struct AccessPolicyModule {
    service: OnceLock<Arc<Service>>,
}

impl AccessPolicyModule {
    pub const MODULE_NAME: &'static str = "access-policy";

    /// Validate `cfg`, build the registry and publish the service.
    ///
    /// # Errors
    ///
    /// Fails on invalid policies or when called a second time.
    #[tracing::instrument(skip_all)]
    pub fn init(&self, cfg: &AccessPolicyConfig) -> anyhow::Result<()> {
        info!(
            use_default_policies = cfg.use_default_policies,
            configured_roles = cfg.policies.len(),
            "Initializing {} module",
            Self::MODULE_NAME
        );

        let svc = Service::from_config(cfg).context("invalid access policy configuration")?;
        let roles = svc.registry().len();
        self.service
            .set(Arc::new(svc))
            .map_err(|_| anyhow::anyhow!("{} module already initialized", Self::MODULE_NAME))?;

        info!(roles, "{} module initialized successfully", Self::MODULE_NAME);
        Ok(())
    }

    /// Load configuration from a YAML file, then [`Self::init`].
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be loaded or the policies are invalid.
    pub fn init_from_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let cfg = AccessPolicyConfig::from_yaml_file(path)
            .with_context(|| format!("loading access policies from {}", path.display()))?;
        self.init(&cfg)
    }

    /// The client registered by [`Self::init`].
    ///
    /// # Errors
    ///
    /// Fails if the module has not been initialized.
    pub fn client(&self) -> anyhow::Result<Arc<dyn AccessPolicyClient>> {
        let svc = self
            .service
            .get()
            .ok_or_else(|| anyhow::anyhow!("{} module not initialized", Self::MODULE_NAME))?;
        Ok(Arc::new(AccessPolicyLocalClient::new(Arc::clone(svc))))
    }
}
