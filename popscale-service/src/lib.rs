//! Population-driven settings scaling for capture-zone game modes.
//!
//! A background worker watches the player count and, while the server is
//! below the scaling threshold, rewrites the game mode's settings document
//! with values interpolated for the current population.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod notify;
pub mod players;
pub mod scaling;

pub use coordinator::{CycleOutcome, ScalingTask, UpdateCoordinator};
pub use error::{ServiceError, ServiceResult};
