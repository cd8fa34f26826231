//! Default value functions for ServiceConfig.

use std::num::NonZeroU32;
use std::path::PathBuf;

// ==================== Server ====================

pub(crate) fn default_server_enabled() -> bool {
    true
}

pub(crate) fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub(crate) fn default_port() -> u16 {
    8090
}

// ==================== Document & players ====================

pub(crate) fn default_document_path() -> PathBuf {
    PathBuf::from("./data/gamemode.json")
}

pub(crate) fn default_player_file() -> PathBuf {
    PathBuf::from("./data/players.json")
}

// ==================== Scaling ====================

pub(crate) fn default_threshold() -> u32 {
    50
}

pub(crate) fn default_divisor() -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(9) // 10 players per level
}

pub(crate) fn default_poll_interval_secs() -> u64 {
    90
}

// ==================== Notifications ====================

pub(crate) fn default_tag() -> String {
    "KOTH settings".to_string()
}

pub(crate) fn default_notify_capacity() -> usize {
    16
}
