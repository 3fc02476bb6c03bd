//! Note endpoints
//!
//! - `ANY /` and `ANY {base}` redirect to a freshly generated note
//! - `POST {base}/{note}` updates content and password state
//! - any other method on `{base}/{note}` serves the raw text or the editor page

pub mod html;
pub mod mutate;
pub mod view;

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::AppState;
use crate::config::Config;
use crate::credentials::CredentialError;
use crate::note_id::NoteId;
use crate::store::StoreError;

/// JSON body returned by mutation requests
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MutationResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            reason: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("password required")]
    PasswordRequired,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl NoteError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PasswordRequired | Self::IncorrectPassword => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reason = match &self {
            Self::PasswordRequired | Self::IncorrectPassword => {
                tracing::debug!("Rejected note update: {}", self);
                Some(self.to_string())
            }
            Self::Store(_) | Self::Credential(_) => {
                tracing::error!("Note update failed: {}", self);
                None
            }
        };

        (
            status,
            Json(MutationResponse {
                success: false,
                reason,
            }),
        )
            .into_response()
    }
}

/// `302 Found` to the given location.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Redirect to a newly generated note id.
pub fn redirect_to_new_note(config: &Config) -> Response {
    let id = NoteId::generate();
    tracing::debug!("Redirecting to new note {}", id);
    found(&config.note_url(id.as_str()))
}

/// Handler for `ANY /`
pub async fn root(State(state): State<Arc<AppState>>) -> Response {
    found(&state.config.base_path)
}

/// Handler for `ANY {base}`
pub async fn new_note(State(state): State<Arc<AppState>>) -> Response {
    redirect_to_new_note(&state.config)
}
