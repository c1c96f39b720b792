use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use sa_engine::{Clock, SystemClock};

use crate::{
    ApiConfig, config::Environment, generation::GenerationGateway, quiz::SessionRegistry,
    store::Store,
};

/// What the bearer token extractor needs from the state
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ApiState {
    pub store: Store,
    pub sessions: Arc<SessionRegistry>,
    pub gateway: GenerationGateway,
    pub clock: Arc<dyn Clock>,
    pub auth: AuthConfig,
    pub environment: Environment,
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

impl ApiState {
    /// Assemble the state from its parts. The session registry shares the
    /// store and clock so countdown expiry persists through the same store.
    pub fn new(
        store: Store,
        gateway: GenerationGateway,
        clock: Arc<dyn Clock>,
        auth: AuthConfig,
        environment: Environment,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(store.clone(), Arc::clone(&clock)));
        Self {
            store,
            sessions,
            gateway,
            clock,
            auth,
            environment,
        }
    }

    /// State for a running server, on the wall clock.
    pub fn from_config(config: &ApiConfig, store: Store) -> Self {
        let gateway = GenerationGateway::new(
            config.ai_service_url.clone(),
            Duration::from_secs(config.ai_service_timeout_secs),
        );

        Self::new(
            store,
            gateway,
            Arc::new(SystemClock),
            AuthConfig {
                jwt_secret: config.jwt_secret.clone(),
            },
            config.env,
        )
    }
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}
