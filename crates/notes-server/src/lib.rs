//! Shared-note web service
//!
//! Visitors are redirected to a randomly named note they can edit in the
//! browser or fetch as plain text. Notes can be protected with a single shared
//! password. Everything is stored as plain files in one directory.

pub mod config;
pub mod credentials;
pub mod note_id;
pub mod notes;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    routing::{any, post},
};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::store::NoteStore;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: NoteStore,
}

impl AppState {
    /// Build state from configuration, creating the data directory if needed.
    pub async fn new(config: Config) -> Result<Self, store::StoreError> {
        let store = NoteStore::new(&config.data_dir).await?;
        Ok(Self { config, store })
    }
}

/// Build the router for all note endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    let base = state.config.base_path.clone();

    Router::new()
        .route("/", any(notes::root))
        .route(&base, any(notes::new_note))
        .route(&format!("{}/", base), any(notes::new_note))
        .route(
            &format!("{}/{{note}}", base),
            post(notes::mutate::handler).fallback(notes::view::handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
