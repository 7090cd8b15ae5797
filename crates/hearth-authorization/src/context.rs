//! Collaborators shared by every engine
//!
//! A [`CoreContext`] bundles the token store, clock, randomness, oracles and runtime
//! handles. It is cheap to clone; engines are built from it on demand.

use hearth_core::effects::{
    AdminOracle, GrainDirectory, GrainRuntime, NotificationEffects, PermissionOracle,
    PhysicalTimeEffects, RandomEffects, TokenStore, ViewTokenMinter,
};
use hearth_core::{generate_secret, CoreConfig, HearthError, PhysicalTime, Result, Secret};
use std::fmt;
use std::sync::Arc;

/// Everything the capability core talks to
#[derive(Clone)]
pub struct CoreContext {
    pub(crate) store: Arc<dyn TokenStore>,
    pub(crate) time: Arc<dyn PhysicalTimeEffects>,
    pub(crate) random: Arc<dyn RandomEffects>,
    pub(crate) permissions: Arc<dyn PermissionOracle>,
    pub(crate) admins: Arc<dyn AdminOracle>,
    pub(crate) runtime: Arc<dyn GrainRuntime>,
    pub(crate) views: Arc<dyn ViewTokenMinter>,
    pub(crate) notifications: Arc<dyn NotificationEffects>,
    pub(crate) grains: Arc<dyn GrainDirectory>,
    pub(crate) config: CoreConfig,
}

impl CoreContext {
    /// Start building a context
    pub fn builder() -> CoreContextBuilder {
        CoreContextBuilder::default()
    }

    /// Active configuration
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Token store
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Notification store
    pub fn notifications(&self) -> &Arc<dyn NotificationEffects> {
        &self.notifications
    }

    pub(crate) async fn now(&self) -> Result<PhysicalTime> {
        self.time.physical_time().await
    }

    pub(crate) async fn fresh_secret(&self) -> Secret {
        generate_secret(self.random.as_ref(), self.config.secret_length).await
    }
}

impl fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CoreContext`]. Every collaborator is required.
#[derive(Default)]
pub struct CoreContextBuilder {
    store: Option<Arc<dyn TokenStore>>,
    time: Option<Arc<dyn PhysicalTimeEffects>>,
    random: Option<Arc<dyn RandomEffects>>,
    permissions: Option<Arc<dyn PermissionOracle>>,
    admins: Option<Arc<dyn AdminOracle>>,
    runtime: Option<Arc<dyn GrainRuntime>>,
    views: Option<Arc<dyn ViewTokenMinter>>,
    notifications: Option<Arc<dyn NotificationEffects>>,
    grains: Option<Arc<dyn GrainDirectory>>,
    config: Option<CoreConfig>,
}

impl CoreContextBuilder {
    /// Set the token store
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the clock
    pub fn with_time(mut self, time: Arc<dyn PhysicalTimeEffects>) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the randomness source
    pub fn with_random(mut self, random: Arc<dyn RandomEffects>) -> Self {
        self.random = Some(random);
        self
    }

    /// Set the permission oracle
    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionOracle>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Set the admin-membership oracle
    pub fn with_admins(mut self, admins: Arc<dyn AdminOracle>) -> Self {
        self.admins = Some(admins);
        self
    }

    /// Set the grain runtime
    pub fn with_runtime(mut self, runtime: Arc<dyn GrainRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Set the view-minting subsystem
    pub fn with_views(mut self, views: Arc<dyn ViewTokenMinter>) -> Self {
        self.views = Some(views);
        self
    }

    /// Set the notification store
    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationEffects>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Set the grain directory
    pub fn with_grains(mut self, grains: Arc<dyn GrainDirectory>) -> Self {
        self.grains = Some(grains);
        self
    }

    /// Set configuration; defaults apply otherwise
    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate configuration and assemble the context
    pub fn build(self) -> Result<CoreContext> {
        fn required<T>(value: Option<T>, name: &str) -> Result<T> {
            value.ok_or_else(|| HearthError::invalid(format!("CoreContext is missing {name}")))
        }

        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CoreContext {
            store: required(self.store, "token store")?,
            time: required(self.time, "clock")?,
            random: required(self.random, "randomness")?,
            permissions: required(self.permissions, "permission oracle")?,
            admins: required(self.admins, "admin oracle")?,
            runtime: required(self.runtime, "grain runtime")?,
            views: required(self.views, "view minter")?,
            notifications: required(self.notifications, "notification store")?,
            grains: required(self.grains, "grain directory")?,
            config,
        })
    }
}
