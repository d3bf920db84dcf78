//! Element document - the by-identity element cache and per-grid child lists
//!
//! Lives as long as the terminal surface. It is rebuilt from scratch on
//! startup and survives channel reconnects.

use std::collections::{HashMap, HashSet};

use super::reconcile::RenderPlan;
use super::{Content, DesiredRow, ElementAttrs, GridId, RenderStats};

/// A rendered row: static attributes plus mutable content
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub attrs: ElementAttrs,
    pub content: Content,
}

impl Element {
    pub fn from_row(row: DesiredRow) -> Self {
        Element {
            attrs: row.attrs,
            content: row.content,
        }
    }
}

#[derive(Debug, Default)]
pub struct Surface {
    elements: HashMap<String, Element>,
    children: HashMap<GridId, Vec<String>>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a reconciliation plan to one grid
    pub fn apply(&mut self, plan: RenderPlan) -> RenderStats {
        let mut stats = RenderStats {
            created: plan.creates.len(),
            updated: plan.updates.len(),
            detached: 0,
        };

        for row in plan.creates {
            self.elements.insert(row.attrs.id.clone(), Element::from_row(row));
        }

        // Elements leaving the grid are dropped from the cache like detached nodes
        let keep: HashSet<&str> = plan.order.iter().map(String::as_str).collect();
        let previous = self.children.remove(&plan.grid).unwrap_or_default();
        for id in previous.iter().filter(|id| !keep.contains(id.as_str())) {
            if self.elements.remove(id).is_some() {
                stats.detached += 1;
            }
        }

        for (id, content) in plan.updates {
            if let Some(element) = self.elements.get_mut(&id) {
                element.content = content;
            }
        }

        self.children.insert(plan.grid, plan.order);
        stats
    }

    pub fn elements(&self) -> &HashMap<String, Element> {
        &self.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Elements of a grid in display order
    pub fn children(&self, grid: GridId) -> impl Iterator<Item = &Element> + '_ {
        self.children
            .get(&grid)
            .into_iter()
            .flatten()
            .filter_map(|id| self.elements.get(id))
    }

    pub fn child_at(&self, grid: GridId, index: usize) -> Option<&Element> {
        self.children
            .get(&grid)
            .and_then(|ids| ids.get(index))
            .and_then(|id| self.elements.get(id))
    }

    pub fn grid_len(&self, grid: GridId) -> usize {
        self.children.get(&grid).map_or(0, Vec::len)
    }
}
