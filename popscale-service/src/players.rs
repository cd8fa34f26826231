//! Player count sources.
//!
//! Two strategies exist: a live count pushed in by whoever talks to the game
//! server, and a side-channel JSON file the game server writes its player
//! list into.

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::document::sanitize_json_text;
use crate::error::{ServiceError, ServiceResult};

/// Source of the current player count
pub trait PlayerCountProvider: Send + Sync {
    /// Current player count, or `SignalUnavailable` when it cannot be known.
    fn count(&self) -> impl Future<Output = ServiceResult<u32>> + Send;
}

// ==================== Live count ====================

/// Player count maintained by an external collaborator.
///
/// Starts out unknown. Unknown is reported as unavailable, never as zero.
#[derive(Debug, Clone, Default)]
pub struct LivePlayerCount {
    current: Arc<ArcSwapOption<u32>>,
}

impl LivePlayerCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, count: u32) {
        self.current.store(Some(Arc::new(count)));
    }

    /// Forget the count, e.g. when the server connection drops.
    pub fn clear(&self) {
        self.current.store(None);
    }

    pub fn get(&self) -> Option<u32> {
        self.current.load().as_deref().copied()
    }
}

impl PlayerCountProvider for LivePlayerCount {
    async fn count(&self) -> ServiceResult<u32> {
        self.get().ok_or_else(|| ServiceError::SignalUnavailable {
            reason: "no live player count has been reported".to_string(),
        })
    }
}

// ==================== Side-channel file ====================

/// What to report when the player list file cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadablePolicy {
    /// Report zero players
    #[default]
    Empty,
    /// Report the count as unavailable
    Unavailable,
}

/// Player list file written by the game server.
#[derive(Debug, Clone)]
pub struct PlayerFile {
    path: PathBuf,
    on_unreadable: UnreadablePolicy,
}

impl PlayerFile {
    pub fn new(path: impl Into<PathBuf>, on_unreadable: UnreadablePolicy) -> Self {
        Self {
            path: path.into(),
            on_unreadable,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_count(&self) -> ServiceResult<u32> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ServiceError::SignalUnavailable {
                reason: format!("cannot read {}: {}", self.path.display(), e),
            })?;
        let raw = String::from_utf8_lossy(&bytes);
        count_players(&raw).map_err(|reason| ServiceError::SignalUnavailable {
            reason: format!("{}: {}", self.path.display(), reason),
        })
    }
}

impl PlayerCountProvider for PlayerFile {
    async fn count(&self) -> ServiceResult<u32> {
        match self.read_count().await {
            Ok(count) => Ok(count),
            Err(e) => match self.on_unreadable {
                UnreadablePolicy::Empty => {
                    warn!(error = %e, "Player list unusable, counting 0 players");
                    Ok(0)
                }
                UnreadablePolicy::Unavailable => Err(e),
            },
        }
    }
}

/// Count players in player list text: a bare array, or an object holding a
/// `players` array.
pub fn count_players(raw: &str) -> Result<u32, String> {
    let text = sanitize_json_text(raw);
    if !(text.starts_with('{') || text.starts_with('[')) {
        return Err("content does not start with '{' or '['".to_string());
    }

    let value: Value = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    let players = match &value {
        Value::Array(players) => players,
        Value::Object(root) => match root.get("players") {
            Some(Value::Array(players)) => players,
            _ => return Err("object has no 'players' array".to_string()),
        },
        _ => return Err("unexpected JSON shape".to_string()),
    };

    debug!(count = players.len(), "Parsed player list");
    u32::try_from(players.len()).map_err(|_| "player list too long".to_string())
}

// ==================== Configured source ====================

/// The provider selected by configuration
#[derive(Debug, Clone)]
pub enum PlayerSource {
    Live(LivePlayerCount),
    File(PlayerFile),
}

impl PlayerSource {
    /// Handle for pushing live counts, when the live strategy is in use.
    pub fn live(&self) -> Option<&LivePlayerCount> {
        match self {
            PlayerSource::Live(live) => Some(live),
            PlayerSource::File(_) => None,
        }
    }
}

impl PlayerCountProvider for PlayerSource {
    async fn count(&self) -> ServiceResult<u32> {
        match self {
            PlayerSource::Live(live) => live.count().await,
            PlayerSource::File(file) => file.count().await,
        }
    }
}
