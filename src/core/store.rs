use super::StepId;
use super::handler::{Aggregate, StepData};
use std::collections::HashMap;

/// Last extracted data per step. Entries survive navigation in both directions.
#[derive(Debug, Default, Clone)]
pub struct StepDataStore {
    values: HashMap<StepId, StepData>,
}

impl StepDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: impl Into<StepId>, value: StepData) {
        self.values.insert(id.into(), value);
    }

    pub fn get(&self, id: &str) -> Option<&StepData> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Collects every cached entry, ordered by `order`.
    pub fn aggregate<'a>(&self, order: impl IntoIterator<Item = &'a StepId>) -> Aggregate {
        order
            .into_iter()
            .filter_map(|id| self.values.get(id).map(|value| (id.clone(), value.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregate_follows_given_order_and_skips_missing() {
        let mut store = StepDataStore::new();
        store.set("start", json!({ "done": true }));
        store.set("about", json!({ "firstName": "Ada" }));

        let order: Vec<StepId> = ["welcome", "about", "start"]
            .into_iter()
            .map(StepId::from)
            .collect();
        let aggregate = store.aggregate(&order);

        let keys: Vec<&str> = aggregate.keys().map(StepId::as_str).collect();
        assert_eq!(keys, vec!["about", "start"]);
        assert_eq!(aggregate["start"], json!({ "done": true }));
    }

    #[test]
    fn set_overwrites() {
        let mut store = StepDataStore::new();
        store.set("about", json!(1));
        store.set("about", json!(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("about"), Some(&json!(2)));
    }
}
