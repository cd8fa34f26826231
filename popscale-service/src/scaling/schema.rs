//! Declarative scaling schema: which settings scale, between which anchors,
//! and how each result is rounded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ServiceError, ServiceResult};

use super::{MAX_LEVEL, MIN_LEVEL, lerp, level_fraction};

/// Rounding applied to an interpolated value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Whole number, written as a JSON integer
    #[default]
    Integer,
    /// Two decimal places, written as a JSON float
    Hundredths,
}

impl Precision {
    pub fn round(self, value: f64) -> f64 {
        match self {
            Precision::Integer => value.round(),
            Precision::Hundredths => (value * 100.0).round() / 100.0,
        }
    }

    /// Whether `value` is already representable at this precision.
    fn holds(self, value: f64) -> bool {
        (self.round(value) - value).abs() < 1e-9
    }

    fn to_json(self, value: f64) -> Value {
        match self {
            Precision::Integer => Value::from(value.round() as i64),
            Precision::Hundredths => serde_json::Number::from_f64(self.round(value))
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

/// Low (level 1) and high (level 10) values of a scaled setting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub precision: Precision,
}

impl Anchor {
    pub fn new(low: f64, high: f64, precision: Precision) -> Self {
        Self {
            low,
            high,
            precision,
        }
    }

    /// Numeric value at `level`. The anchors themselves are returned untouched
    /// at the ends of the scale.
    pub fn value_at(&self, level: u8) -> f64 {
        if level <= MIN_LEVEL {
            self.low
        } else if level >= MAX_LEVEL {
            self.high
        } else {
            self.precision
                .round(lerp(self.low, self.high, level_fraction(level)))
        }
    }

    pub fn json_at(&self, level: u8) -> Value {
        self.precision.to_json(self.value_at(level))
    }

    fn validate(&self, what: &str) -> ServiceResult<()> {
        for (label, value) in [("low", self.low), ("high", self.high)] {
            if !value.is_finite() {
                return Err(invalid(format!("{what}: {label} anchor is not a finite number")));
            }
            if !self.precision.holds(value) {
                return Err(invalid(format!(
                    "{what}: {label} anchor {value} does not fit {:?} precision",
                    self.precision
                )));
            }
        }
        Ok(())
    }
}

/// One scaled setting, addressed by a dotted path below `settings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldRule {
    /// Linearly interpolated between `low` and `high`
    Interpolated {
        path: String,
        low: f64,
        high: f64,
        #[serde(default)]
        precision: Precision,
    },
    /// Same literal value at every level
    Constant { path: String, value: Value },
}

impl FieldRule {
    pub fn path(&self) -> &str {
        match self {
            FieldRule::Interpolated { path, .. } | FieldRule::Constant { path, .. } => path,
        }
    }

    pub fn value_at(&self, level: u8) -> Value {
        match self {
            FieldRule::Interpolated {
                low,
                high,
                precision,
                ..
            } => Anchor::new(*low, *high, *precision).json_at(level),
            FieldRule::Constant { value, .. } => value.clone(),
        }
    }
}

/// Payouts of a single named reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRule {
    pub name: String,
    pub xp: Anchor,
    pub currency: Anchor,
}

impl RewardRule {
    /// Reward list entry for `level`
    pub fn entry_at(&self, level: u8) -> Value {
        let mut entry = serde_json::Map::new();
        entry.insert("name".to_string(), Value::String(self.name.clone()));
        entry.insert("xp".to_string(), self.xp.json_at(level));
        entry.insert("currency".to_string(), self.currency.json_at(level));
        Value::Object(entry)
    }
}

/// The full set of scaled settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingSchema {
    #[serde(default)]
    pub fields: Vec<FieldRule>,

    /// Dotted path of the reward list below `settings`
    #[serde(default = "default_rewards_path")]
    pub rewards_path: String,

    #[serde(default)]
    pub rewards: Vec<RewardRule>,
}

impl Default for ScalingSchema {
    fn default() -> Self {
        super::default_schema()
    }
}

impl ScalingSchema {
    /// Last path segment of the reward list; lists under this key merge by name.
    pub fn rewards_key(&self) -> &str {
        self.rewards_path
            .rsplit('.')
            .next()
            .unwrap_or(&self.rewards_path)
    }

    pub fn validate(&self) -> ServiceResult<()> {
        let mut paths: Vec<&str> = Vec::with_capacity(self.fields.len() + 1);

        for rule in &self.fields {
            let path = rule.path();
            validate_path(path)?;
            if let FieldRule::Interpolated {
                low,
                high,
                precision,
                ..
            } = rule
            {
                Anchor::new(*low, *high, *precision).validate(path)?;
            }
            paths.push(path);
        }

        if !self.rewards.is_empty() {
            validate_path(&self.rewards_path)?;
            paths.push(&self.rewards_path);
        }

        for (i, a) in paths.iter().enumerate() {
            for b in &paths[i + 1..] {
                if overlaps(a, b) {
                    return Err(invalid(format!("paths '{a}' and '{b}' overlap")));
                }
            }
        }

        let mut names = HashSet::new();
        for reward in &self.rewards {
            if reward.name.trim().is_empty() {
                return Err(invalid("reward with empty name".to_string()));
            }
            if !names.insert(reward.name.as_str()) {
                return Err(invalid(format!("duplicate reward '{}'", reward.name)));
            }
            reward.xp.validate(&format!("reward '{}' xp", reward.name))?;
            reward
                .currency
                .validate(&format!("reward '{}' currency", reward.name))?;
        }

        Ok(())
    }
}

pub(super) fn default_rewards_path() -> String {
    "rewards".to_string()
}

fn validate_path(path: &str) -> ServiceResult<()> {
    if path.is_empty() || path.split('.').any(|segment| segment.is_empty()) {
        return Err(invalid(format!("invalid setting path '{path}'")));
    }
    Ok(())
}

/// True when one path equals or nests inside the other.
fn overlaps(a: &str, b: &str) -> bool {
    let nested = |outer: &str, inner: &str| {
        inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('.'))
    };
    a == b || nested(a, b) || nested(b, a)
}

fn invalid(message: String) -> ServiceError {
    ServiceError::InvalidSchema { message }
}
