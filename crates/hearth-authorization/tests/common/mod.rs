//! Shared wiring for integration tests

#![allow(dead_code)]

use hearth_authorization::CoreContext;
use hearth_core::CoreConfig;
use hearth_testkit::TestEnvironment;

/// Context over every double in `env`
pub fn context(env: &TestEnvironment) -> CoreContext {
    context_with(env, env.config.clone())
}

/// Context over `env` with a specific configuration
pub fn context_with(env: &TestEnvironment, config: CoreConfig) -> CoreContext {
    hearth_testkit::init_test_tracing();
    CoreContext::builder()
        .with_store(env.store.clone())
        .with_time(env.clock.clone())
        .with_random(env.random.clone())
        .with_permissions(env.permissions.clone())
        .with_admins(env.admins.clone())
        .with_runtime(env.runtime.clone())
        .with_views(env.views.clone())
        .with_notifications(env.notifications.clone())
        .with_grains(env.grains.clone())
        .with_config(config)
        .build()
        .unwrap()
}
