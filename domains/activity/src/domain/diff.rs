//! JSON snapshot diffing for audit entries

use serde_json::{Map, Value};

/// Bookkeeping fields that change on every write and never count as a change
const IGNORED_FIELDS: &[&str] = &["updatedAt"];

/// Keys that differ between two snapshots, with only those keys kept
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotDiff {
    pub changed_fields: Vec<String>,
    pub old_values: Map<String, Value>,
    pub new_values: Map<String, Value>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.changed_fields.is_empty()
    }
}

/// Compare two snapshots key by key.
///
/// Added and removed keys count as changes; the missing side is omitted from
/// its map. Non-object snapshots are compared as a single `value` field.
pub fn diff_snapshots(old: &Value, new: &Value) -> SnapshotDiff {
    let (old_map, new_map) = match (old, new) {
        (Value::Object(o), Value::Object(n)) => (o.clone(), n.clone()),
        _ => {
            let mut o = Map::new();
            let mut n = Map::new();
            o.insert("value".to_string(), old.clone());
            n.insert("value".to_string(), new.clone());
            (o, n)
        }
    };

    let mut keys: Vec<&String> = old_map.keys().chain(new_map.keys()).collect();
    keys.sort();
    keys.dedup();

    let mut diff = SnapshotDiff::default();
    for key in keys {
        if IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let before = old_map.get(key);
        let after = new_map.get(key);
        if before == after {
            continue;
        }
        diff.changed_fields.push(key.clone());
        if let Some(v) = before {
            diff.old_values.insert(key.clone(), v.clone());
        }
        if let Some(v) = after {
            diff.new_values.insert(key.clone(), v.clone());
        }
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_changed_keys_are_kept() {
        let old = json!({"status": "Submitted", "phone": "555", "notes": null});
        let new = json!({"status": "Approved", "phone": "555", "notes": null});
        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.changed_fields, vec!["status"]);
        assert_eq!(diff.old_values.get("status"), Some(&json!("Submitted")));
        assert_eq!(diff.new_values.get("status"), Some(&json!("Approved")));
        assert!(!diff.old_values.contains_key("phone"));
    }

    #[test]
    fn test_added_and_removed_keys() {
        let old = json!({"a": 1, "b": 2});
        let new = json!({"b": 2, "c": 3});
        let diff = diff_snapshots(&old, &new);
        assert_eq!(diff.changed_fields, vec!["a", "c"]);
        assert!(!diff.new_values.contains_key("a"));
        assert!(!diff.old_values.contains_key("c"));
    }

    #[test]
    fn test_nested_change_reports_top_level_key() {
        let old = json!({"husband": {"firstName": "Moshe", "email": "m@x.com"}});
        let new = json!({"husband": {"firstName": "Moshe", "email": "moshe@x.com"}});
        assert_eq!(diff_snapshots(&old, &new).changed_fields, vec!["husband"]);
    }

    #[test]
    fn test_updated_at_is_ignored() {
        let old = json!({"name": "A", "updatedAt": "2024-01-01T00:00:00Z"});
        let new = json!({"name": "A", "updatedAt": "2024-02-01T00:00:00Z"});
        assert!(diff_snapshots(&old, &new).is_empty());
    }

    #[test]
    fn test_scalar_snapshots() {
        let diff = diff_snapshots(&json!(1), &json!(2));
        assert_eq!(diff.changed_fields, vec!["value"]);
        assert!(diff_snapshots(&json!("x"), &json!("x")).is_empty());
    }
}
