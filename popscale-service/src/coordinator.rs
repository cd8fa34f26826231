//! Periodic scaling worker.
//!
//! Every tick the coordinator reads the player count and, while the server is
//! below the scaling threshold, rewrites the game mode settings for the
//! matching level. It remembers the last applied key so an unchanged
//! population causes no I/O. Reaching the threshold (or losing the count)
//! forgets that key, so the next scaled cycle always rewrites.

mod status;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ScalingConfig;
use crate::document::{ConfigStore, MergeRules, merge};
use crate::error::ServiceResult;
use crate::notify::{Notifier, update_message};
use crate::players::PlayerCountProvider;
use crate::scaling::{LevelResolver, SettingsInterpolator};

pub use status::{ScalingState, ScalingStatus, StatusHandle};

/// Value compared between cycles to decide whether a rewrite is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKey {
    /// Rewrite when the level changes
    #[default]
    Level,
    /// Rewrite when the raw player count changes
    Count,
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// At or above the threshold, or the count is unknown
    Suspended { players: Option<u32> },
    /// Same key as the last applied update, nothing written
    Unchanged { players: u32, level: u8 },
    /// Settings rewritten for a new level
    Applied { players: u32, level: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateState {
    Idle,
    Scaled { key: u32 },
}

pub struct UpdateCoordinator<P, N> {
    provider: P,
    notifier: N,
    store: ConfigStore,
    resolver: LevelResolver,
    interpolator: SettingsInterpolator,
    merge_rules: MergeRules,
    threshold: u32,
    change_key: ChangeKey,
    tag: String,
    state: UpdateState,
    status: StatusHandle,
}

impl<P, N> UpdateCoordinator<P, N>
where
    P: PlayerCountProvider + 'static,
    N: Notifier + 'static,
{
    pub fn new(
        scaling: &ScalingConfig,
        tag: impl Into<String>,
        store: ConfigStore,
        provider: P,
        notifier: N,
    ) -> ServiceResult<Self> {
        let interpolator = SettingsInterpolator::new(scaling.schema.clone())?;
        let merge_rules = MergeRules::new([interpolator.schema().rewards_key()]);

        Ok(Self {
            provider,
            notifier,
            store,
            resolver: LevelResolver::new(scaling.divisor),
            interpolator,
            merge_rules,
            threshold: scaling.threshold,
            change_key: scaling.change_key,
            tag: tag.into(),
            state: UpdateState::Idle,
            status: Arc::new(ArcSwap::from_pointee(ScalingStatus::default())),
        })
    }

    pub fn status_handle(&self) -> StatusHandle {
        self.status.clone()
    }

    /// Run one cycle and record its result in the status snapshot.
    pub async fn run_cycle(&mut self) -> ServiceResult<CycleOutcome> {
        let result = self.evaluate().await;

        let mut status = ScalingStatus::clone(&self.status.load());
        status.record(&result);
        self.status.store(Arc::new(status));

        result
    }

    async fn evaluate(&mut self) -> ServiceResult<CycleOutcome> {
        let players = match self.provider.count().await {
            Ok(players) if players < self.threshold => players,
            Ok(players) => {
                if self.state != UpdateState::Idle {
                    info!(
                        players,
                        threshold = self.threshold,
                        "Population reached threshold, scaling suspended"
                    );
                }
                self.state = UpdateState::Idle;
                return Ok(CycleOutcome::Suspended {
                    players: Some(players),
                });
            }
            Err(e) => {
                debug!(error = %e, "Player count unavailable, scaling suspended");
                self.state = UpdateState::Idle;
                return Ok(CycleOutcome::Suspended { players: None });
            }
        };

        let level = self.resolver.level(players);
        let key = match self.change_key {
            ChangeKey::Level => u32::from(level),
            ChangeKey::Count => players,
        };

        if self.state == (UpdateState::Scaled { key }) {
            debug!(players, level, "Settings already applied");
            return Ok(CycleOutcome::Unchanged { players, level });
        }

        self.apply(level).await?;
        self.state = UpdateState::Scaled { key };
        info!(
            players,
            level,
            path = %self.store.path().display(),
            "Scaled settings applied"
        );

        let message = update_message(&self.tag, players, level);
        if let Err(e) = self.notifier.notify(&message).await {
            warn!(error = %e, "Update notification failed");
        }

        Ok(CycleOutcome::Applied { players, level })
    }

    /// Read the document, merge the profile for `level` into its settings,
    /// write it back. Nothing is written if any step fails.
    async fn apply(&self, level: u8) -> ServiceResult<()> {
        let mut document = self.store.read().await?;
        let profile = self.interpolator.profile(level);
        merge(document.settings_mut(), &profile, &self.merge_rules);
        self.store.write(&document).await
    }

    /// Spawn the worker. Ticks that fall due while a cycle is still running
    /// are skipped, so cycles never overlap.
    pub fn start(mut self, period: Duration) -> ScalingTask {
        let token = CancellationToken::new();
        let cancel = token.clone();

        let handle = tokio::spawn(async move {
            info!(period_secs = period.as_secs_f64(), "Scaling worker started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }

                // Not raced against cancellation: a started write runs to completion.
                if let Err(e) = self.run_cycle().await {
                    warn!(error = %e, "Scaling cycle failed, retrying next tick");
                }
            }

            info!("Scaling worker stopped");
        });

        ScalingTask { token, handle }
    }
}

/// Handle to the running scaling worker
pub struct ScalingTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ScalingTask {
    /// Stop the timer and wait for any in-flight cycle to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            error!(error = %e, "Scaling worker ended abnormally");
        }
    }
}
