//! Desired rows built from aggregator output

use crate::catalog::ItemCatalog;
use crate::constants::WORKER_INVENTORY_SLOTS;
use crate::models::{ItemStack, WorkerRecord};

use super::{Content, DesiredRow, ElementAttrs, GridId, WorkerCells};

pub fn stack_rows(grid: GridId, stacks: &[ItemStack], catalog: &ItemCatalog) -> Vec<DesiredRow> {
    stacks
        .iter()
        .map(|stack| {
            let display_name = catalog.display_name(&stack.item_id);
            DesiredRow {
                attrs: ElementAttrs {
                    id: grid.identity(&stack.item_id),
                    class: grid.class(),
                    icon: display_name.map(icon_for),
                    data_id: stack.item_id.clone(),
                    name: display_name.unwrap_or(&stack.item_id).to_string(),
                },
                content: Content::Stack {
                    count: stack.count.to_string(),
                },
            }
        })
        .collect()
}

pub fn worker_rows(workers: &[WorkerRecord]) -> Vec<DesiredRow> {
    workers
        .iter()
        .map(|worker| DesiredRow {
            attrs: ElementAttrs {
                id: GridId::Workers.identity(&worker.label),
                class: GridId::Workers.class(),
                icon: None,
                data_id: worker.label.clone(),
                name: worker.label.clone(),
            },
            content: Content::Worker(WorkerCells {
                fuel: worker.fuel_lvl.to_string(),
                version: version_marker(worker),
                inventory: format!("{}/{}", worker.inv_count.free_slots, WORKER_INVENTORY_SLOTS),
                activity: activity(worker),
                fatal: Some(worker.fatal_err.clone()).filter(|e| !e.is_empty()),
            }),
        })
        .collect()
}

/// `v<version>`, with `*` while a newer kernel is waiting to boot
fn version_marker(worker: &WorkerRecord) -> String {
    if worker.new_kernel {
        format!("v{}*", worker.version)
    } else {
        format!("v{}", worker.version)
    }
}

/// Human readable summary of what a worker is doing
pub fn activity(worker: &WorkerRecord) -> String {
    let mut text = worker.cur_action.clone();
    if let Some(work) = &worker.cur_work {
        text.push_str(&format!(" {}#{}", work.kind, work.id));
        if work.complete {
            text.push_str(" done");
        }
    }
    if worker.cur_frustration > 0 {
        text.push_str(&format!(" frustration {}", worker.cur_frustration));
    }
    text.push_str(&format!(" @ {}", worker.cur_pos));
    if let Some(dst) = &worker.cur_dst {
        text.push_str(&format!(" -> {}", dst));
    }
    text.trim_start().to_string()
}

/// Up to two uppercase initials of a display name
pub fn icon_for(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentWork, Destination, Vec3};

    #[test]
    fn test_activity_with_every_part() {
        let worker = WorkerRecord {
            label: "t1".into(),
            cur_action: "moving".into(),
            cur_work: Some(CurrentWork {
                id: 4,
                kind: "load".into(),
                complete: true,
            }),
            cur_frustration: 3,
            cur_pos: Vec3([1, 64, -2]),
            cur_dst: Some(Destination::Position(Vec3([5, 64, -2]))),
            ..Default::default()
        };
        assert_eq!(activity(&worker), "moving load#4 done frustration 3 @ 1,64,-2 -> 5,64,-2");
    }

    #[test]
    fn test_activity_minimal() {
        let worker = WorkerRecord {
            cur_action: "idle".into(),
            ..Default::default()
        };
        assert_eq!(activity(&worker), "idle @ 0,0,0");
    }

    #[test]
    fn test_icon_initials() {
        assert_eq!(icon_for("Oak Log"), "OL");
        assert_eq!(icon_for("cobblestone"), "C");
        assert_eq!(icon_for("Block of Iron Ore"), "BO");
    }

    #[test]
    fn test_stack_row_falls_back_to_item_id() {
        let catalog = ItemCatalog::from_json(r#"{"wood/0": "Oak Log"}"#).unwrap();
        let rows = stack_rows(
            GridId::Inventory,
            &[ItemStack::new("wood/3", 7), ItemStack::new("mystery/1", 1)],
            &catalog,
        );
        assert_eq!(rows[0].attrs.id, "inv-wood/3");
        assert_eq!(rows[0].attrs.name, "Oak Log");
        assert_eq!(rows[0].attrs.icon.as_deref(), Some("OL"));
        assert_eq!(rows[0].attrs.data_id, "wood/3");
        assert_eq!(rows[1].attrs.name, "mystery/1");
        assert_eq!(rows[1].attrs.icon, None);
    }

    #[test]
    fn test_worker_row_cells() {
        let worker = WorkerRecord {
            label: "storage.0.t2".into(),
            version: 7,
            new_kernel: true,
            fuel_lvl: 1200,
            fatal_err: "out of fuel".into(),
            ..Default::default()
        };
        let rows = worker_rows(&[worker]);
        let Content::Worker(cells) = &rows[0].content else {
            panic!("expected worker content");
        };
        assert_eq!(rows[0].attrs.id, "turtle-storage.0.t2");
        assert_eq!(cells.version, "v7*");
        assert_eq!(cells.fuel, "1200");
        assert_eq!(cells.inventory, "0/16");
        assert_eq!(cells.fatal.as_deref(), Some("out of fuel"));
    }
}
