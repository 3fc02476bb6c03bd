//! `POST {base}/{note}` - content and password updates

use std::fmt;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Path, Request, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, de};

use crate::AppState;
use crate::credentials::{self, PasswordHash};
use crate::note_id::NoteId;
use crate::store::Metadata;

use super::{MutationResponse, NoteError};

/// `action` value for requests that only check the password.
pub const VERIFY_ACTION: &str = "verifyPassword";

/// `clearPassword` value that removes protection.
const CLEAR_VALUE: &str = "true";

/// Body of a note update, accepted as JSON or url-encoded form.
///
/// Requests with any other content type (or no body) are treated as an
/// update with no fields set.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    /// New password; enables protection
    #[serde(default)]
    pub password: Option<String>,

    /// Disable protection and forget the stored hash. Only the exact string
    /// `"true"` counts; any other value is ignored.
    #[serde(default)]
    pub clear_password: Option<serde_json::Value>,

    /// Caller claims it already verified the password for this note
    #[serde(default, deserialize_with = "flag")]
    pub password_verified: bool,

    #[serde(default)]
    pub action: Option<String>,

    /// New content; empty deletes the note text
    #[serde(default)]
    pub text: Option<String>,
}

impl NoteUpdate {
    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    fn clears_password(&self) -> bool {
        matches!(&self.clear_password, Some(serde_json::Value::String(v)) if v == CLEAR_VALUE)
    }

    fn is_verify_only(&self) -> bool {
        self.action.as_deref() == Some(VERIFY_ACTION)
    }
}

impl<S> FromRequest<S> for NoteUpdate
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(update) = Json::<NoteUpdate>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(update)
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(update) = Form::<NoteUpdate>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(update)
        } else {
            Ok(NoteUpdate::default())
        }
    }
}

/// Lenient boolean: JSON bools, numbers, or strings. A string is true unless
/// it is empty, `"false"` or `"0"`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> de::Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or a string")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            Ok(!matches!(v, "" | "false" | "0"))
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }

        fn visit_none<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Handler for `POST {base}/{note}`
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Path(note): Path<String>,
    update: NoteUpdate,
) -> Response {
    let Ok(id) = NoteId::parse(&note) else {
        return super::redirect_to_new_note(&state.config);
    };

    match apply(&state, &id, update).await {
        Ok(()) => Json(MutationResponse::ok()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run one update against a note: password check, password change, content.
pub async fn apply(state: &AppState, id: &NoteId, update: NoteUpdate) -> Result<(), NoteError> {
    let mut meta = state.store.read_metadata(id).await?;

    if meta.has_password && !update.password_verified {
        let password = update.password().ok_or(NoteError::PasswordRequired)?;
        let stored = PasswordHash::parse(meta.password_hash.as_deref().unwrap_or_default())?;

        if !credentials::verify_password(password.to_string(), stored).await? {
            tracing::info!("Incorrect password for note {}", id);
            return Err(NoteError::IncorrectPassword);
        }

        if update.is_verify_only() {
            return Ok(());
        }
    }

    if let Some(password) = update.password() {
        let hash = credentials::hash_password(password.to_string()).await?;
        meta.has_password = true;
        meta.password_hash = Some(hash.to_string());
        state.store.write_metadata(id, &meta).await?;
        tracing::info!("Password set for note {}", id);
    } else if update.clears_password() {
        meta = Metadata::default();
        state.store.write_metadata(id, &meta).await?;
        tracing::info!("Password cleared for note {}", id);
    }

    if let Some(text) = &update.text {
        state.store.write_content(id, text).await?;
    }

    Ok(())
}
