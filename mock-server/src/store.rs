use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One stored document. Deleted records are only flagged `removed`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub created: u64,
    pub removed: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Field compared as text, the way query parameters arrive.
    pub fn field_text(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(text) => Some(text.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn matches(&self, needle: &str, fields: Option<&[&str]>) -> bool {
        let needle = needle.to_lowercase();
        self.fields
            .iter()
            .filter(|(name, _)| fields.is_none_or(|allowed| allowed.contains(&name.as_str())))
            .any(|(_, value)| match value {
                Value::String(text) => text.to_lowercase().contains(&needle),
                _ => false,
            })
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    records: HashMap<String, Vec<Record>>,
    pub settings: Map<String, Value>,
    seq: u64,
}

impl Store {
    pub fn insert(&mut self, entity: &str, fields: Map<String, Value>) -> Record {
        self.seq += 1;
        let record = Record {
            id: Uuid::new_v4(),
            created: self.seq,
            removed: false,
            fields,
        };
        self.records
            .entry(entity.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    pub fn get(&self, entity: &str, id: Uuid) -> Option<&Record> {
        self.records
            .get(entity)?
            .iter()
            .find(|record| record.id == id && !record.removed)
    }

    pub fn get_mut(&mut self, entity: &str, id: Uuid) -> Option<&mut Record> {
        self.records
            .get_mut(entity)?
            .iter_mut()
            .find(|record| record.id == id && !record.removed)
    }

    /// Live records, newest first.
    pub fn active(&self, entity: &str) -> Vec<&Record> {
        let mut records: Vec<&Record> = self
            .records
            .get(entity)
            .map(|all| all.iter().filter(|record| !record.removed).collect())
            .unwrap_or_default();
        records.sort_by(|a, b| b.created.cmp(&a.created));
        records
    }
}

/// Merges `patch` into `target`, appending uploaded files instead of
/// replacing them.
pub fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        if key == "files" {
            if let (Some(Value::Array(existing)), Value::Array(new)) = (target.get_mut("files"), &value) {
                existing.extend(new.iter().cloned());
                continue;
            }
        }
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn record_serializes_flat() {
        let mut store = Store::default();
        let record = store.insert("client", fields(json!({"name": "Acme"})));
        let json = record.to_json();
        assert_eq!(json["name"], "Acme");
        assert_eq!(json["removed"], false);
        assert_eq!(json["created"], 1);
        assert!(json["id"].is_string());
    }

    #[test]
    fn active_is_newest_first_and_skips_removed() {
        let mut store = Store::default();
        let first = store.insert("client", fields(json!({"name": "A"})));
        store.insert("client", fields(json!({"name": "B"})));
        store.get_mut("client", first.id).unwrap().removed = true;
        let names: Vec<String> = store
            .active("client")
            .iter()
            .filter_map(|r| r.field_text("name"))
            .collect();
        assert_eq!(names, vec!["B".to_string()]);
        assert!(store.get("client", first.id).is_none());
    }

    #[test]
    fn search_is_case_insensitive_and_field_scoped() {
        let mut store = Store::default();
        let record = store.insert("client", fields(json!({"name": "Acme Corp", "city": "Oslo"})));
        assert!(record.matches("acme", None));
        assert!(record.matches("OSLO", None));
        assert!(!record.matches("oslo", Some(&["name"])));
    }

    #[test]
    fn merge_appends_files() {
        let mut target = fields(json!({"files": [{"filename": "a.png"}], "name": "x"}));
        merge(&mut target, fields(json!({"files": [{"filename": "b.png"}], "name": "y"})));
        assert_eq!(target["files"].as_array().unwrap().len(), 2);
        assert_eq!(target["name"], "y");
    }
}
