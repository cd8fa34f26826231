//! Deep merge of a settings profile into an existing settings object.
//!
//! Rules, applied per key of the source:
//! - object into object: recurse
//! - keyed list into list (e.g. `rewards`): reconcile entries by `name`
//! - any other list: replaced wholesale
//! - anything else: overwritten
//!
//! Keys that exist only in the target are never removed.

use serde_json::{Map, Value};

/// Field that identifies entries of a keyed list
pub const IDENTITY_KEY: &str = "name";

/// Which list-valued keys are reconciled by identity instead of replaced.
#[derive(Debug, Clone)]
pub struct MergeRules {
    keyed_lists: Vec<String>,
}

impl MergeRules {
    pub fn new<I, S>(keyed_lists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keyed_lists: keyed_lists.into_iter().map(Into::into).collect(),
        }
    }

    fn is_keyed(&self, key: &str) -> bool {
        self.keyed_lists.iter().any(|k| k == key)
    }
}

impl Default for MergeRules {
    fn default() -> Self {
        Self::new(["rewards"])
    }
}

/// Merge `source` into `target` in place.
pub fn merge(target: &mut Map<String, Value>, source: &Map<String, Value>, rules: &MergeRules) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge(existing, incoming, rules);
            }
            (Some(Value::Array(existing)), Value::Array(incoming)) if rules.is_keyed(key) => {
                merge_keyed_list(existing, incoming);
            }
            (Some(slot), _) => {
                *slot = incoming.clone();
            }
            (None, _) => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Reconcile list entries by [`IDENTITY_KEY`]. Matched entries are shallow
/// merged in their existing position, unmatched source entries are appended.
fn merge_keyed_list(target: &mut Vec<Value>, source: &[Value]) {
    for incoming in source {
        let position = identity(incoming).and_then(|name| {
            target
                .iter()
                .position(|existing| identity(existing) == Some(name))
        });

        match (position, incoming) {
            (Some(index), Value::Object(fields)) => {
                if let Value::Object(existing) = &mut target[index] {
                    for (field, value) in fields {
                        existing.insert(field.clone(), value.clone());
                    }
                }
            }
            _ => target.push(incoming.clone()),
        }
    }
}

fn identity(entry: &Value) -> Option<&str> {
    entry.get(IDENTITY_KEY).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn merged(target: Value, source: Value) -> Value {
        let mut target = object(target);
        merge(&mut target, &object(source), &MergeRules::default());
        Value::Object(target)
    }

    #[test]
    fn test_preserves_foreign_keys() {
        let result = merged(
            json!({"zone": {"a": 0, "b": 2}, "other": true}),
            json!({"zone": {"a": 1}}),
        );
        assert_eq!(result, json!({"zone": {"a": 1, "b": 2}, "other": true}));
    }

    #[test]
    fn test_rewards_merge_by_name() {
        let result = merged(
            json!({"rewards": [{"name": "X", "xp": 1}]}),
            json!({"rewards": [{"name": "X", "xp": 9}, {"name": "Y", "xp": 5}]}),
        );
        assert_eq!(
            result,
            json!({"rewards": [{"name": "X", "xp": 9}, {"name": "Y", "xp": 5}]})
        );
    }

    #[test]
    fn test_rewards_keep_unmatched_target_entries_in_place() {
        let result = merged(
            json!({"rewards": [
                {"name": "Custom", "xp": 7, "icon": "star"},
                {"name": "Kill", "xp": 1, "currency": 1, "sound": "ding"}
            ]}),
            json!({"rewards": [
                {"name": "Kill", "xp": 100, "currency": 50},
                {"name": "Assist", "xp": 50, "currency": 25}
            ]}),
        );
        assert_eq!(
            result,
            json!({"rewards": [
                {"name": "Custom", "xp": 7, "icon": "star"},
                {"name": "Kill", "xp": 100, "currency": 50, "sound": "ding"},
                {"name": "Assist", "xp": 50, "currency": 25}
            ]})
        );
    }

    #[test]
    fn test_other_lists_are_replaced() {
        let result = merged(
            json!({"zone": {"spawnPoints": [1, 2, 3], "tags": ["a"]}}),
            json!({"zone": {"spawnPoints": [9]}}),
        );
        assert_eq!(result, json!({"zone": {"spawnPoints": [9], "tags": ["a"]}}));
    }

    #[test]
    fn test_list_named_like_rewards_but_nested_still_keyed() {
        let result = merged(
            json!({"economy": {"rewards": [{"name": "A", "xp": 1}]}}),
            json!({"economy": {"rewards": [{"name": "A", "xp": 2}]}}),
        );
        assert_eq!(result, json!({"economy": {"rewards": [{"name": "A", "xp": 2}]}}));
    }

    #[test]
    fn test_type_mismatch_overwrites() {
        let result = merged(
            json!({"zone": 5, "rewards": {"legacy": true}}),
            json!({"zone": {"a": 1}, "rewards": [{"name": "X"}]}),
        );
        assert_eq!(result, json!({"zone": {"a": 1}, "rewards": [{"name": "X"}]}));
    }

    #[test]
    fn test_new_keys_are_added() {
        let result = merged(json!({}), json!({"zone": {"a": 1}}));
        assert_eq!(result, json!({"zone": {"a": 1}}));
    }

    #[test]
    fn test_unnamed_source_entries_are_appended() {
        let result = merged(
            json!({"rewards": [{"name": "X", "xp": 1}]}),
            json!({"rewards": [{"xp": 3}, "loose"]}),
        );
        assert_eq!(
            result,
            json!({"rewards": [{"name": "X", "xp": 1}, {"xp": 3}, "loose"]})
        );
    }

    #[test]
    fn test_source_is_untouched() {
        let source = object(json!({"rewards": [{"name": "X", "xp": 9}], "zone": {"a": 1}}));
        let snapshot = source.clone();
        let mut target = object(json!({"rewards": [{"name": "X", "xp": 1}]}));
        merge(&mut target, &source, &MergeRules::default());
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_custom_keyed_lists() {
        let mut target = object(json!({"bonuses": [{"name": "A", "v": 1}]}));
        let source = object(json!({"bonuses": [{"name": "A", "v": 2}]}));
        merge(&mut target, &source, &MergeRules::new(["bonuses"]));
        assert_eq!(Value::Object(target), json!({"bonuses": [{"name": "A", "v": 2}]}));
    }
}
