//! Aggregator - turns the raw state store into sorted, display-ready summaries
//!
//! Everything here is a pure function of a store snapshot and the configured
//! area id. Partial state (planes arriving before details, or the reverse)
//! yields partial or empty summaries, never an error.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::constants::WORKER_NAMESPACE;
use crate::models::{AreaDetails, ItemStack, Slot, WorkerRecord};
use crate::store::StateStore;

/// Per-item totals before sorting
pub type Totals = HashMap<String, i64>;

/// Everything the renderer needs for one refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub inventory: Vec<ItemStack>,
    pub exporting: Vec<ItemStack>,
    pub in_flight: Vec<ItemStack>,
    pub workers: Vec<WorkerRecord>,
    pub details: Option<AreaDetails>,
}

/// Aggregation bound to one storage area
#[derive(Debug, Clone)]
pub struct Aggregator {
    area_id: String,
    plane_prefix: String,
}

impl Aggregator {
    pub fn new(area_id: impl Into<String>) -> Self {
        let area_id = area_id.into();
        Aggregator {
            plane_prefix: format!("{}/plane.", area_id),
            area_id,
        }
    }

    /// `<area-id>/plane.<digits>`, nothing more
    pub fn is_plane_key(&self, key: &str) -> bool {
        key.strip_prefix(&self.plane_prefix)
            .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
    }

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn summarize(&self, store: &StateStore) -> Summary {
        let details = self.details(store);
        let (exporting, in_flight) = match &details {
            Some(details) => (export_totals(details), in_flight_totals(details)),
            None => (Totals::new(), Totals::new()),
        };
        Summary {
            inventory: sorted_stacks(self.inventory_totals(store)),
            exporting: sorted_stacks(exporting),
            in_flight: sorted_stacks(in_flight),
            workers: workers(store),
            details,
        }
    }

    /// Sum of every occupied slot across all planes of the area
    pub fn inventory_totals(&self, store: &StateStore) -> Totals {
        let mut totals = Totals::new();
        for (key, plane) in store.scan_prefix(&self.plane_prefix) {
            if !self.is_plane_key(key) {
                continue;
            }
            let Value::Array(slots) = plane else {
                tracing::debug!(key, "plane is not an array, skipping");
                continue;
            };
            for slot in slots {
                let Ok(slot) = Slot::deserialize(slot) else {
                    continue;
                };
                if slot.is_occupied() {
                    *totals.entry(slot.name).or_insert(0) += slot.amount;
                }
            }
        }
        totals
    }

    /// Decoded details of the area, if present and well formed
    pub fn details(&self, store: &StateStore) -> Option<AreaDetails> {
        let key = format!("{}/details", self.area_id);
        let value = store.get(&key)?;
        match serde_json::from_value(value.clone()) {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "undecodable area details, treating as missing");
                None
            }
        }
    }
}

/// Items requested for export but not yet picked up
pub fn export_totals(details: &AreaDetails) -> Totals {
    let mut totals = Totals::new();
    for (item_id, amount) in &details.exporting {
        *totals.entry(item_id.clone()).or_insert(0) += amount;
    }
    totals
}

/// Items allocated to workers, summed across workers
pub fn in_flight_totals(details: &AreaDetails) -> Totals {
    let mut totals = Totals::new();
    for allocs in details.export_allocs.values() {
        for (item_id, amount) in allocs {
            *totals.entry(item_id.clone()).or_insert(0) += amount;
        }
    }
    totals
}

/// Count descending, ties broken by item id ascending
pub fn sorted_stacks(totals: Totals) -> Vec<ItemStack> {
    let mut stacks: Vec<ItemStack> = totals
        .into_iter()
        .map(|(item_id, count)| ItemStack { item_id, count })
        .collect();
    stacks.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item_id.cmp(&b.item_id)));
    stacks
}

/// All worker records, sorted by label
pub fn workers(store: &StateStore) -> Vec<WorkerRecord> {
    let mut workers: Vec<WorkerRecord> = store
        .scan_prefix(WORKER_NAMESPACE)
        .filter_map(|(key, value)| match WorkerRecord::deserialize(value) {
            Ok(mut worker) => {
                if worker.label.is_empty() {
                    worker.label = key[WORKER_NAMESPACE.len()..].to_string();
                }
                Some(worker)
            }
            Err(e) => {
                tracing::debug!(key, error = %e, "undecodable worker record, skipping");
                None
            }
        })
        .collect();
    workers.sort_by(|a, b| a.label.cmp(&b.label));
    workers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::store::Delta;

    fn store_with(value: Value) -> StateStore {
        let mut store = StateStore::new();
        if let Value::Object(map) = value {
            store.apply(map);
        }
        store
    }

    fn ids(stacks: &[ItemStack]) -> Vec<(&str, i64)> {
        stacks.iter().map(|s| (s.item_id.as_str(), s.count)).collect()
    }

    #[test]
    fn test_ties_break_on_item_id() {
        let totals: Totals = [("b", 5), ("a", 5), ("c", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(ids(&sorted_stacks(totals)), vec![("a", 5), ("b", 5), ("c", 3)]);
    }

    #[test]
    fn test_inventory_sums_occupied_slots_of_the_area_only() {
        let store = store_with(json!({
            "storage.0/plane.0": [
                {"Name": "wood/0", "Amount": 10},
                {"Name": "", "Amount": 0},
                {"Name": "", "Amount": -1},
                null,
                {"Name": "stone/0", "Amount": 3}
            ],
            "storage.0/plane.12": [{"Name": "wood/0", "Amount": 5}],
            "storage.0/plane.x": [{"Name": "wood/0", "Amount": 100}],
            "storage.01/plane.0": [{"Name": "wood/0", "Amount": 100}],
            "storage.1/plane.0": [{"Name": "glass/0", "Amount": 7}]
        }));
        let totals = Aggregator::new("storage.0").inventory_totals(&store);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["wood/0"], 15);
        assert_eq!(totals["stone/0"], 3);
    }

    #[test]
    fn test_export_and_in_flight_totals() {
        let store = store_with(json!({
            "storage.0/details": {
                "ID": "storage.0",
                "Exporting": {"wood/0": 20, "stone/0": 2},
                "export_allocs": {
                    "storage.0.t1": {"wood/0": 4, "glass/0": 1},
                    "storage.0.t2": {"wood/0": 6}
                }
            }
        }));
        let summary = Aggregator::new("storage.0").summarize(&store);
        assert_eq!(ids(&summary.exporting), vec![("wood/0", 20), ("stone/0", 2)]);
        assert_eq!(ids(&summary.in_flight), vec![("wood/0", 10), ("glass/0", 1)]);
    }

    #[test]
    fn test_missing_details_yield_empty_exports() {
        let store = store_with(json!({
            "storage.0/plane.0": [{"Name": "wood/0", "Amount": 1}],
            "storage.1/details": {"Exporting": {"wood/0": 5}}
        }));
        let summary = Aggregator::new("storage.0").summarize(&store);
        assert!(summary.details.is_none());
        assert!(summary.exporting.is_empty());
        assert!(summary.in_flight.is_empty());
        assert_eq!(ids(&summary.inventory), vec![("wood/0", 1)]);
    }

    #[test]
    fn test_malformed_details_are_treated_as_missing() {
        let store = store_with(json!({"storage.0/details": "garbage"}));
        let summary = Aggregator::new("storage.0").summarize(&store);
        assert!(summary.details.is_none());
        assert!(summary.exporting.is_empty());
    }

    #[test]
    fn test_workers_sorted_by_label() {
        let mut store = StateStore::new();
        let mut delta = Delta::new();
        delta.insert("turtles/b".into(), json!({"Label": "b", "fuel_lvl": 1}));
        delta.insert("turtles/a".into(), json!({"Label": "a", "fuel_lvl": 2}));
        delta.insert("turtles/c".into(), json!("not a record"));
        store.apply(delta);
        let labels: Vec<String> = workers(&store).into_iter().map(|w| w.label).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_plane_key_shape() {
        let aggregator = Aggregator::new("storage.0");
        assert!(aggregator.is_plane_key("storage.0/plane.0"));
        assert!(aggregator.is_plane_key("storage.0/plane.12"));
        assert!(!aggregator.is_plane_key("storage.0/plane."));
        assert!(!aggregator.is_plane_key("storage.0/plane.1x"));
        assert!(!aggregator.is_plane_key("storage.0/plane.-1"));
        assert!(!aggregator.is_plane_key("storage.01/plane.1"));
    }

    #[test]
    fn test_area_id_with_special_characters() {
        let store = store_with(json!({
            "a+b/plane.0": [{"Name": "wood/0", "Amount": 2}],
            "aab/plane.0": [{"Name": "wood/0", "Amount": 9}]
        }));
        let totals = Aggregator::new("a+b").inventory_totals(&store);
        assert_eq!(totals["wood/0"], 2);
    }
}
