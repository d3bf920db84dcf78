//! Keyed reconciliation of desired rows against existing elements

use std::collections::{HashMap, HashSet};

use super::surface::Element;
use super::{Content, DesiredRow, GridId};

/// Side effects needed to bring one grid up to date
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub grid: GridId,
    /// Rows with no element yet
    pub creates: Vec<DesiredRow>,
    /// Existing elements whose mutable content changed
    pub updates: Vec<(String, Content)>,
    /// Every identity of the grid in display order
    pub order: Vec<String>,
}

impl RenderPlan {
    pub fn is_noop_besides_order(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty()
    }
}

/// Diff `desired` against the element cache by identity
///
/// Rows repeating an identity already seen in this pass are dropped.
pub fn reconcile(existing: &HashMap<String, Element>, grid: GridId, desired: Vec<DesiredRow>) -> RenderPlan {
    let mut plan = RenderPlan {
        grid,
        creates: Vec::new(),
        updates: Vec::new(),
        order: Vec::with_capacity(desired.len()),
    };
    let mut seen = HashSet::with_capacity(desired.len());

    for row in desired {
        if !seen.insert(row.attrs.id.clone()) {
            continue;
        }
        plan.order.push(row.attrs.id.clone());
        match existing.get(&row.attrs.id) {
            Some(element) => {
                if element.content != row.content {
                    plan.updates.push((row.attrs.id, row.content));
                }
            }
            None => plan.creates.push(row),
        }
    }

    plan
}
