use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    db::{Cache, Store},
    middleware::JwtVerifier,
    services::{DecisionEngine, Suggester},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: DecisionEngine,
    pub store: Arc<dyn Store>,
    pub verifier: Arc<JwtVerifier>,
    /// Stats cache; `None` when Redis is not configured
    pub cache: Option<Cache>,
    pub stats_ttl: u64,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        suggester: Arc<dyn Suggester>,
        verifier: JwtVerifier,
        cache: Option<Cache>,
        stats_ttl: u64,
    ) -> Self {
        Self {
            engine: DecisionEngine::new(store.clone(), suggester),
            store,
            verifier: Arc::new(verifier),
            cache,
            stats_ttl,
        }
    }
}

impl FromRef<AppState> for Arc<JwtVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}
