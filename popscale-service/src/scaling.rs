//! Population scaling: player count to intensity level, level to settings profile.
//!
//! The level is a discrete 1-10 scale. Level 1 maps to the low anchor of every
//! scaled field and level 10 to the high anchor; everything in between is a
//! linear blend described by a [`ScalingSchema`].

mod defaults;
mod interpolate;
mod schema;

use std::num::NonZeroU32;

pub use interpolate::SettingsInterpolator;
pub use schema::{Anchor, FieldRule, Precision, RewardRule, ScalingSchema};

pub(crate) use defaults::default_schema;

/// Lowest intensity level
pub const MIN_LEVEL: u8 = 1;

/// Highest intensity level
pub const MAX_LEVEL: u8 = 10;

/// Maps a player count to an intensity level.
#[derive(Debug, Clone, Copy)]
pub struct LevelResolver {
    divisor: NonZeroU32,
}

impl LevelResolver {
    pub fn new(divisor: NonZeroU32) -> Self {
        Self { divisor }
    }

    /// `clamp(ceil(count / divisor), 1, 10)`
    pub fn level(&self, count: u32) -> u8 {
        let raw = count.div_ceil(self.divisor.get());
        raw.clamp(MIN_LEVEL as u32, MAX_LEVEL as u32) as u8
    }
}

/// Interpolation position of a level in `[0.0, 1.0]`.
pub(crate) fn level_fraction(level: u8) -> f64 {
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    f64::from(level - MIN_LEVEL) / f64::from(MAX_LEVEL - MIN_LEVEL)
}

pub(crate) fn lerp(low: f64, high: f64, t: f64) -> f64 {
    low + (high - low) * t
}
