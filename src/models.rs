use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// World coordinate reported by the installation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec3(pub [i64; 3]);

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.0;
        write!(f, "{},{},{}", x, y, z)
    }
}

/// Decode a JSON `null` as the type's default (the server emits `null` for empty maps)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One storage slot inside a plane
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    /// `0` is empty, `-1` marks a hole that cannot hold items
    #[serde(rename = "Amount", alias = "amount", default)]
    pub amount: i64,
}

impl Slot {
    pub fn is_occupied(&self) -> bool {
        self.amount > 0 && !self.name.is_empty()
    }
}

/// Per-area metadata stored under `<area-id>/details`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaDetails {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Pos", alias = "pos")]
    pub pos: Vec3,
    #[serde(rename = "XLen", alias = "x_len")]
    pub x_len: i64,
    #[serde(rename = "ZLen", alias = "z_len")]
    pub z_len: i64,
    #[serde(rename = "Rows", alias = "rows")]
    pub rows: i64,
    /// item id -> amount requested for export
    #[serde(rename = "Exporting", alias = "exporting", deserialize_with = "null_as_default")]
    pub exporting: HashMap<String, i64>,
    /// worker id -> item id -> amount allocated to that worker
    #[serde(deserialize_with = "null_as_default")]
    pub export_allocs: HashMap<String, HashMap<String, i64>>,
}

impl AreaDetails {
    /// Number of boxes around one plane of the area
    pub fn boxes_per_plane(&self) -> i64 {
        self.x_len * 2 + self.z_len * 2
    }

    pub fn total_boxes(&self) -> i64 {
        self.boxes_per_plane() * self.rows
    }
}

/// Work currently assigned to a worker
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentWork {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "Type", alias = "type")]
    pub kind: String,
    #[serde(rename = "Complete", alias = "complete")]
    pub complete: bool,
}

/// Worker inventory counters
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryCount {
    pub free_slots: i64,
}

/// Where a worker is heading: a coordinate, or a scalar target reported by older kernels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    Position(Vec3),
    Scalar(i64),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Position(pos) => pos.fmt(f),
            Destination::Scalar(n) => write!(f, "{}", n),
        }
    }
}

/// Worker status stored under `turtles/<label>`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerRecord {
    #[serde(rename = "Label", alias = "label")]
    pub label: String,
    #[serde(rename = "Version", alias = "version")]
    pub version: i64,
    /// Set while the worker has been handed a newer kernel it has not booted yet
    #[serde(alias = "NewKernel")]
    pub new_kernel: bool,
    pub fuel_lvl: i64,
    pub inv_count: InventoryCount,
    pub cur_action: String,
    pub cur_work: Option<CurrentWork>,
    pub cur_pos: Vec3,
    pub cur_dst: Option<Destination>,
    pub cur_frustration: i64,
    pub fatal_err: String,
}

/// Body of the export side-channel request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub area_id: String,
    pub item_id: String,
    pub count: i64,
}

/// Derived per-item total, recomputed on every refresh
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemStack {
    pub item_id: String,
    pub count: i64,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, count: i64) -> Self {
        ItemStack {
            item_id: item_id.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_details_accepts_null_maps() {
        let details: AreaDetails = serde_json::from_value(json!({
            "ID": "storage.0",
            "XLen": 3,
            "ZLen": 2,
            "Rows": 4,
            "Exporting": null,
            "export_allocs": null,
        }))
        .unwrap();
        assert!(details.exporting.is_empty());
        assert!(details.export_allocs.is_empty());
        assert_eq!(details.total_boxes(), 40);
    }

    #[test]
    fn test_worker_record_from_report() {
        let worker: WorkerRecord = serde_json::from_value(json!({
            "Version": 3,
            "Label": "storage.0.t1",
            "cur_action": "moving",
            "cur_pos": [1, 2, -3],
            "cur_dst": 7,
            "cur_work": {"ID": 12, "Type": "load", "Complete": false},
            "fuel_lvl": 900,
            "inv_count": {"free_slots": 10, "Grouped": {"wood/0": 3}},
        }))
        .unwrap();
        assert_eq!(worker.label, "storage.0.t1");
        assert_eq!(worker.cur_pos.to_string(), "1,2,-3");
        assert_eq!(worker.cur_dst, Some(Destination::Scalar(7)));
        assert_eq!(worker.cur_work.unwrap().kind, "load");
        assert_eq!(worker.inv_count.free_slots, 10);
    }

    #[test]
    fn test_hole_slot_is_not_occupied() {
        let hole: Slot = serde_json::from_value(json!({"Name": "", "Amount": -1})).unwrap();
        assert!(!hole.is_occupied());
        let slot: Slot = serde_json::from_value(json!({"name": "wood/0", "amount": 5})).unwrap();
        assert!(slot.is_occupied());
    }
}
