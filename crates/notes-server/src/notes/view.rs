//! `GET {base}/{note}` - raw text or the editor page

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::AppState;
use crate::note_id::NoteId;

use super::html;

/// Body of the 401 returned for raw reads of protected notes.
pub const PROTECTED_MESSAGE: &str =
    "This note is password protected. Open it in a browser to view it.";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// User agents that get raw text without asking for it.
const RAW_USER_AGENTS: &[&str] = &["curl", "Wget"];

/// Whether the request asks for raw text: a `raw` query parameter with any
/// value, or a command line client.
pub fn wants_raw(query: Option<&str>, headers: &HeaderMap) -> bool {
    let raw_param = query.is_some_and(|q| {
        q.split('&')
            .any(|pair| pair.split('=').next() == Some("raw"))
    });

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let raw_client = RAW_USER_AGENTS.iter().any(|ua| user_agent.starts_with(ua));

    raw_param || raw_client
}

/// Handler for non-POST requests on `{base}/{note}`
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(note): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let Ok(id) = NoteId::parse(&note) else {
        return super::redirect_to_new_note(&state.config);
    };

    let meta = match state.store.read_metadata(&id).await {
        Ok(meta) => meta,
        Err(e) => {
            tracing::error!("Failed to read metadata for note {}: {}", id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let raw = wants_raw(query.as_deref(), &headers);

    // Raw mode has no way to pass a password.
    if raw && meta.has_password {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            PROTECTED_MESSAGE,
        )
            .into_response();
    }

    let content = match state.store.read_content(&id).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!("Failed to read note {}: {}", id, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if raw {
        return match content {
            Some(text) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        };
    }

    Html(html::note_page(
        &state.config.base_path,
        &id,
        content.as_deref().unwrap_or_default(),
        meta.has_password,
    ))
    .into_response()
}
