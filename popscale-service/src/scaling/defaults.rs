//! Built-in scaling schema for the capture-zone game mode.
//!
//! Low anchors apply to nearly empty servers (level 1), high anchors to a
//! server just below the scaling threshold (level 10).

use serde_json::Value;

use super::schema::{Anchor, FieldRule, Precision, RewardRule, ScalingSchema, default_rewards_path};

pub(crate) fn default_schema() -> ScalingSchema {
    ScalingSchema {
        fields: default_fields(),
        rewards_path: default_rewards_path(),
        rewards: default_rewards(),
    }
}

fn default_fields() -> Vec<FieldRule> {
    vec![
        // Zone behavior
        scaled("zone.movementInterval", 1200.0, 600.0, Precision::Integer),
        scaled("zone.movementFraction", 0.25, 0.5, Precision::Hundredths),
        scaled("zone.radiusMultiplier", 0.5, 1.0, Precision::Hundredths),
        scaled("zone.captureRadiusMultiplier", 0.6, 1.0, Precision::Hundredths),
        scaled("zone.minimumCapturePlayers", 1.0, 3.0, Precision::Integer),
        constant("zone.vehiclesCanCapture", Value::Bool(false)),
        constant("zone.armedVehiclesCanCapture", Value::Bool(false)),
        // Economy
        scaled("economy.currencyMultiplier", 2.0, 1.0, Precision::Hundredths),
        scaled("economy.xpMultiplier", 2.0, 1.0, Precision::Hundredths),
        scaled("economy.passiveIncome", 50.0, 20.0, Precision::Integer),
    ]
}

fn default_rewards() -> Vec<RewardRule> {
    vec![
        reward("Kill", (100.0, 50.0), (50.0, 25.0)),
        reward("Assist", (50.0, 25.0), (25.0, 10.0)),
        reward("ZoneCapture", (250.0, 500.0), (150.0, 300.0)),
        reward("ZoneHoldTick", (10.0, 20.0), (5.0, 10.0)),
        reward("VehicleDestroyed", (150.0, 100.0), (100.0, 75.0)),
        reward("Revive", (75.0, 40.0), (30.0, 15.0)),
    ]
}

fn scaled(path: &str, low: f64, high: f64, precision: Precision) -> FieldRule {
    FieldRule::Interpolated {
        path: path.to_string(),
        low,
        high,
        precision,
    }
}

fn constant(path: &str, value: Value) -> FieldRule {
    FieldRule::Constant {
        path: path.to_string(),
        value,
    }
}

fn reward(name: &str, xp: (f64, f64), currency: (f64, f64)) -> RewardRule {
    RewardRule {
        name: name.to_string(),
        xp: Anchor::new(xp.0, xp.1, Precision::Integer),
        currency: Anchor::new(currency.0, currency.1, Precision::Integer),
    }
}
