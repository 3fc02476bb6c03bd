//! Filesystem storage for note content and metadata
//!
//! Each note is two independent files in the data directory: `{id}` holds the
//! raw text and `{id}.meta` holds a small JSON record describing the password
//! state. Nothing is cached; every call goes to disk and writes are plain
//! overwrites, so concurrent writers to one note race and the last one wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::note_id::NoteId;

const META_EXTENSION: &str = "meta";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode metadata: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Password state persisted alongside a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub has_password: bool,

    /// `salt$hash` record, see [`crate::credentials::PasswordHash`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Outcome of reading a metadata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataLoad {
    Missing,
    Loaded(Metadata),
    Corrupt { reason: String },
}

impl MetadataLoad {
    /// Collapse to a usable record, treating missing or corrupt files as an
    /// unprotected note.
    pub fn or_default(self) -> Metadata {
        match self {
            MetadataLoad::Loaded(meta) => meta,
            MetadataLoad::Missing | MetadataLoad::Corrupt { .. } => Metadata::default(),
        }
    }
}

/// Note storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    /// Open (and create if needed) the storage directory.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn content_path(&self, id: &NoteId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn meta_path(&self, id: &NoteId) -> PathBuf {
        self.root.join(format!("{}.{}", id, META_EXTENSION))
    }

    /// Read the metadata file, distinguishing "absent" from "unparseable".
    pub async fn load_metadata(&self, id: &NoteId) -> Result<MetadataLoad, StoreError> {
        let raw = match fs::read_to_string(self.meta_path(id)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MetadataLoad::Missing),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Ok(MetadataLoad::Corrupt {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        Ok(match serde_json::from_str(&raw) {
            Ok(meta) => MetadataLoad::Loaded(meta),
            Err(e) => MetadataLoad::Corrupt {
                reason: e.to_string(),
            },
        })
    }

    /// Read metadata, defaulting to an unprotected note when the file is
    /// missing or corrupt.
    pub async fn read_metadata(&self, id: &NoteId) -> Result<Metadata, StoreError> {
        let load = self.load_metadata(id).await?;
        if let MetadataLoad::Corrupt { reason } = &load {
            tracing::warn!("Ignoring corrupt metadata for note {}: {}", id, reason);
        }
        Ok(load.or_default())
    }

    pub async fn write_metadata(&self, id: &NoteId, meta: &Metadata) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(meta)?;
        fs::write(self.meta_path(id), encoded).await?;
        Ok(())
    }

    /// Read note text. `None` means the note has no content.
    pub async fn read_content(&self, id: &NoteId) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.content_path(id)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store note text. Empty text removes the content file.
    pub async fn write_content(&self, id: &NoteId, text: &str) -> Result<(), StoreError> {
        let path = self.content_path(id);
        if !text.is_empty() {
            fs::write(&path, text).await?;
            return Ok(());
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Deleted content for note {}", id);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
