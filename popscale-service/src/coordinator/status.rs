//! Snapshot of the scaling worker for the status API.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::ServiceResult;

use super::CycleOutcome;

/// Shared, lock-free view of the latest [`ScalingStatus`]
pub type StatusHandle = Arc<ArcSwap<ScalingStatus>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingState {
    /// Population at or above the threshold, or unknown
    #[default]
    Idle,
    /// Scaled settings are in effect
    Scaled,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScalingStatus {
    pub state: ScalingState,
    /// Player count seen by the last cycle, if known
    pub players: Option<u32>,
    /// Level of the settings currently applied
    pub level: Option<u8>,
    pub last_applied_at: Option<DateTime<Utc>>,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub cycles: u64,
    pub writes: u64,
    pub failures: u64,
}

impl ScalingStatus {
    /// Fold a cycle result into the snapshot.
    pub(super) fn record(&mut self, result: &ServiceResult<CycleOutcome>) {
        let now = Utc::now();
        self.cycles += 1;
        self.last_cycle_at = Some(now);

        match result {
            Ok(CycleOutcome::Suspended { players }) => {
                self.state = ScalingState::Idle;
                self.players = *players;
                self.level = None;
                self.last_error = None;
            }
            Ok(CycleOutcome::Unchanged { players, .. }) => {
                self.players = Some(*players);
                self.last_error = None;
            }
            Ok(CycleOutcome::Applied { players, level }) => {
                self.state = ScalingState::Scaled;
                self.players = Some(*players);
                self.level = Some(*level);
                self.last_applied_at = Some(now);
                self.last_error = None;
                self.writes += 1;
            }
            Err(e) => {
                self.failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}
