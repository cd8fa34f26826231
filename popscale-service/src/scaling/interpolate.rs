//! Builds the settings profile for a level from the scaling schema.

use serde_json::{Map, Value};

use crate::error::ServiceResult;

use super::ScalingSchema;

/// Produces settings profiles from a validated [`ScalingSchema`].
#[derive(Debug, Clone)]
pub struct SettingsInterpolator {
    schema: ScalingSchema,
}

impl SettingsInterpolator {
    pub fn new(schema: ScalingSchema) -> ServiceResult<Self> {
        schema.validate()?;
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &ScalingSchema {
        &self.schema
    }

    /// Profile for `level`, shaped like the document's `settings` object.
    pub fn profile(&self, level: u8) -> Map<String, Value> {
        let mut profile = Map::new();

        for rule in &self.schema.fields {
            insert_path(&mut profile, rule.path(), rule.value_at(level));
        }

        if !self.schema.rewards.is_empty() {
            let entries = self
                .schema
                .rewards
                .iter()
                .map(|reward| reward.entry_at(level))
                .collect();
            insert_path(&mut profile, &self.schema.rewards_path, Value::Array(entries));
        }

        profile
    }
}

/// Insert `value` at a dotted path, creating intermediate objects.
fn insert_path(root: &mut Map<String, Value>, path: &str, value: Value) {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = root;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
    current.insert(leaf.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::{Anchor, FieldRule, Precision, RewardRule};
    use serde_json::json;

    fn schema() -> ScalingSchema {
        ScalingSchema {
            fields: vec![
                FieldRule::Interpolated {
                    path: "zone.movementInterval".to_string(),
                    low: 1200.0,
                    high: 600.0,
                    precision: Precision::Integer,
                },
                FieldRule::Interpolated {
                    path: "zone.radiusMultiplier".to_string(),
                    low: 0.5,
                    high: 1.0,
                    precision: Precision::Hundredths,
                },
                FieldRule::Constant {
                    path: "zone.vehiclesCanCapture".to_string(),
                    value: json!(false),
                },
                FieldRule::Interpolated {
                    path: "economy.xpMultiplier".to_string(),
                    low: 2.0,
                    high: 1.0,
                    precision: Precision::Hundredths,
                },
            ],
            rewards_path: "rewards".to_string(),
            rewards: vec![
                RewardRule {
                    name: "Kill".to_string(),
                    xp: Anchor::new(100.0, 50.0, Precision::Integer),
                    currency: Anchor::new(50.0, 25.0, Precision::Integer),
                },
                RewardRule {
                    name: "ZoneCapture".to_string(),
                    xp: Anchor::new(250.0, 500.0, Precision::Integer),
                    currency: Anchor::new(150.0, 300.0, Precision::Integer),
                },
            ],
        }
    }

    #[test]
    fn test_profile_level_one_is_low_anchor() {
        let interpolator = SettingsInterpolator::new(schema()).unwrap();
        let profile = Value::Object(interpolator.profile(1));
        assert_eq!(
            profile,
            json!({
                "zone": {
                    "movementInterval": 1200,
                    "radiusMultiplier": 0.5,
                    "vehiclesCanCapture": false
                },
                "economy": {"xpMultiplier": 2.0},
                "rewards": [
                    {"name": "Kill", "xp": 100, "currency": 50},
                    {"name": "ZoneCapture", "xp": 250, "currency": 150}
                ]
            })
        );
    }

    #[test]
    fn test_profile_level_ten_is_high_anchor() {
        let interpolator = SettingsInterpolator::new(schema()).unwrap();
        let profile = Value::Object(interpolator.profile(10));
        assert_eq!(
            profile,
            json!({
                "zone": {
                    "movementInterval": 600,
                    "radiusMultiplier": 1.0,
                    "vehiclesCanCapture": false
                },
                "economy": {"xpMultiplier": 1.0},
                "rewards": [
                    {"name": "Kill", "xp": 50, "currency": 25},
                    {"name": "ZoneCapture", "xp": 500, "currency": 300}
                ]
            })
        );
    }

    #[test]
    fn test_profile_intermediate_level() {
        let interpolator = SettingsInterpolator::new(schema()).unwrap();
        let profile = interpolator.profile(4);
        // t = 1/3
        assert_eq!(profile["zone"]["movementInterval"], json!(1000));
        assert_eq!(profile["zone"]["radiusMultiplier"], json!(0.67));
        assert_eq!(profile["economy"]["xpMultiplier"], json!(1.67));
        assert_eq!(profile["rewards"][0]["xp"], json!(83));
        assert_eq!(profile["rewards"][1]["xp"], json!(333));
    }

    #[test]
    fn test_profile_keeps_schema_order() {
        let interpolator = SettingsInterpolator::new(schema()).unwrap();
        let profile = interpolator.profile(5);
        let keys: Vec<&str> = profile.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zone", "economy", "rewards"]);
        let names: Vec<&str> = profile["rewards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Kill", "ZoneCapture"]);
    }

    #[test]
    fn test_default_schema_endpoints() {
        let interpolator = SettingsInterpolator::new(ScalingSchema::default()).unwrap();
        let schema = interpolator.schema().clone();
        let low = interpolator.profile(1);
        let high = interpolator.profile(10);

        for rule in &schema.fields {
            let lookup = |profile: &Map<String, Value>| {
                rule.path()
                    .split('.')
                    .fold(Value::Object(profile.clone()), |node, key| node[key].clone())
            };
            if let FieldRule::Interpolated {
                low: lo,
                high: hi,
                ..
            } = rule
            {
                assert_eq!(lookup(&low).as_f64(), Some(*lo), "{}", rule.path());
                assert_eq!(lookup(&high).as_f64(), Some(*hi), "{}", rule.path());
            }
        }
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let mut bad = schema();
        bad.fields.push(FieldRule::Constant {
            path: "zone..broken".to_string(),
            value: json!(1),
        });
        assert!(SettingsInterpolator::new(bad).is_err());
    }

    #[test]
    fn test_insert_path_nested() {
        let mut root = Map::new();
        insert_path(&mut root, "a.b.c", json!(1));
        insert_path(&mut root, "a.d", json!(2));
        insert_path(&mut root, "e", json!(3));
        assert_eq!(Value::Object(root), json!({"a": {"b": {"c": 1}, "d": 2}, "e": 3}));
    }
}
