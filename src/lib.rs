pub mod config;
pub mod engine;
pub mod identity;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::EngineConfig;
use crate::engine::ProgressEngine;
use crate::identity::{HttpIdentityProvider, IdentityProvider, NullIdentityProvider};
use crate::state::AppState;
use crate::store::postgres::PgProgressStore;
use crate::store::StoreError;

pub async fn create_app() -> Result<axum::Router, StoreError> {
    let store = Arc::new(PgProgressStore::from_env().await?);

    let http_identity = HttpIdentityProvider::from_env();
    let identity: Arc<dyn IdentityProvider> = if http_identity.is_available() {
        Arc::new(http_identity)
    } else {
        Arc::new(NullIdentityProvider)
    };

    let engine = Arc::new(ProgressEngine::new(store, identity, EngineConfig::from_env()));
    let state = AppState::new(engine);

    Ok(routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
