//! The game mode's configuration document.
//!
//! The document is an arbitrary JSON object owned by the game server. Only the
//! `settings` subtree is ever touched, and every other key is carried through
//! a rewrite in its original order.

pub mod merge;
mod sanitize;

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

pub use merge::{MergeRules, merge};
pub use sanitize::sanitize_json_text;

/// Key of the subtree that scaled settings are merged into
pub const SETTINGS_KEY: &str = "settings";

/// Parsed configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    /// Every top-level key in authored order; the `settings` slot is a
    /// placeholder while the subtree lives in `settings`.
    root: Map<String, Value>,
    settings: Map<String, Value>,
}

impl ConfigDocument {
    /// Parse sanitized document text. A missing or non-object `settings`
    /// entry is replaced with an empty object.
    pub fn parse(path: &Path, raw: &str) -> ServiceResult<Self> {
        let text = sanitize_json_text(raw);
        if !text.starts_with('{') {
            return Err(ServiceError::MalformedJson {
                path: path.to_path_buf(),
                reason: "document does not start with '{'".to_string(),
            });
        }

        let mut root = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(root)) => root,
            Ok(_) => {
                return Err(ServiceError::MalformedJson {
                    path: path.to_path_buf(),
                    reason: "document is not a JSON object".to_string(),
                });
            }
            Err(e) => {
                return Err(ServiceError::MalformedJson {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let slot = root.entry(SETTINGS_KEY).or_insert(Value::Null);
        let settings = match slot.take() {
            Value::Object(settings) => settings,
            _ => Map::new(),
        };

        Ok(Self { root, settings })
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.settings
    }

    /// The whole document as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut root = self.root.clone();
        root.insert(SETTINGS_KEY.to_string(), Value::Object(self.settings.clone()));
        Value::Object(root)
    }

    /// Tab-indented JSON with a single trailing newline.
    pub fn to_pretty_bytes(&self) -> ServiceResult<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.to_value()
            .serialize(&mut serializer)
            .map_err(|e| ServiceError::Internal {
                message: format!("Failed to serialize config document: {}", e),
            })?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Reads and atomically rewrites the document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> ServiceResult<ConfigDocument> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ServiceError::ConfigNotFound {
                    path: self.path.clone(),
                }
            } else {
                ServiceError::ConfigUnreadable {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;

        let raw = String::from_utf8(bytes).map_err(|e| ServiceError::ConfigUnreadable {
            path: self.path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;

        ConfigDocument::parse(&self.path, &raw)
    }

    /// Replace the document. The new content is written to a temporary file
    /// next to the target and renamed over it, so readers only ever observe
    /// the old or the new document.
    pub async fn write(&self, document: &ConfigDocument) -> ServiceResult<()> {
        let bytes = document.to_pretty_bytes()?;
        let path = self.path.clone();

        let result = tokio::task::spawn_blocking(move || persist_atomically(&path, &bytes))
            .await
            .map_err(|e| ServiceError::Internal {
                message: format!("Config write task failed: {}", e),
            })?;

        result.map_err(|source| ServiceError::ConfigUnwritable {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Config document written");
        Ok(())
    }
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
