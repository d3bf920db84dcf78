//! Renderer - keeps the on-screen element document in step with the summaries
//!
//! Each refresh turns the aggregator output into desired rows, diffs them
//! against the element cache by identity (`reconcile`) and applies the
//! resulting plan to the [`Surface`]. Only missing elements are created and
//! only changed contents are touched; the child order is rebuilt every time.

pub mod reconcile;
pub mod rows;
pub mod surface;

pub use reconcile::{reconcile, RenderPlan};
pub use rows::{activity, icon_for, stack_rows, worker_rows};
pub use surface::{Element, Surface};

use crate::aggregate::Summary;
use crate::catalog::ItemCatalog;

/// The grids of the dashboard, each with its own identity prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridId {
    Inventory,
    Exporting,
    InFlight,
    Workers,
}

impl GridId {
    /// Grids made of item stacks, in display order
    pub const STACKS: [GridId; 3] = [GridId::Inventory, GridId::Exporting, GridId::InFlight];

    pub fn prefix(&self) -> &'static str {
        match self {
            GridId::Inventory => "inv-",
            GridId::Exporting => "exp-",
            GridId::InFlight => "alloc-",
            GridId::Workers => "turtle-",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            GridId::Workers => "turtle-row",
            _ => "item-stack",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GridId::Inventory => "Inventory",
            GridId::Exporting => "Pending exports",
            GridId::InFlight => "In flight",
            GridId::Workers => "Turtles",
        }
    }

    /// Whether pressing a stack in this grid issues an export request
    pub fn accepts_press(&self) -> bool {
        matches!(self, GridId::Inventory | GridId::Exporting)
    }

    pub fn identity(&self, raw_id: &str) -> String {
        format!("{}{}", self.prefix(), raw_id)
    }

    pub fn next_stack(&self) -> GridId {
        match self {
            GridId::Inventory => GridId::Exporting,
            GridId::Exporting => GridId::InFlight,
            _ => GridId::Inventory,
        }
    }

    pub fn prev_stack(&self) -> GridId {
        match self {
            GridId::Inventory => GridId::InFlight,
            GridId::Exporting => GridId::Inventory,
            _ => GridId::Exporting,
        }
    }
}

/// Static attributes set once when an element is created
#[derive(Clone, Debug, PartialEq)]
pub struct ElementAttrs {
    pub id: String,
    pub class: &'static str,
    /// Short glyph derived from the display name
    pub icon: Option<String>,
    /// Raw item id or worker label
    pub data_id: String,
    pub name: String,
}

/// Mutable fields refreshed on every render
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Stack { count: String },
    Worker(WorkerCells),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkerCells {
    pub fuel: String,
    pub version: String,
    pub inventory: String,
    pub activity: String,
    pub fatal: Option<String>,
}

/// One row the surface should show after the refresh
#[derive(Clone, Debug, PartialEq)]
pub struct DesiredRow {
    pub attrs: ElementAttrs,
    pub content: Content,
}

/// Element churn caused by one refresh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub created: usize,
    pub updated: usize,
    pub detached: usize,
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.created += rhs.created;
        self.updated += rhs.updated;
        self.detached += rhs.detached;
    }
}

/// Reconcile every grid of the surface against a fresh summary
pub fn render(surface: &mut Surface, summary: &Summary, catalog: &ItemCatalog) -> RenderStats {
    let mut stats = RenderStats::default();
    let grids = [
        (GridId::Inventory, &summary.inventory),
        (GridId::Exporting, &summary.exporting),
        (GridId::InFlight, &summary.in_flight),
    ];
    for (grid, stacks) in grids {
        let plan = reconcile(surface.elements(), grid, stack_rows(grid, stacks, catalog));
        stats += surface.apply(plan);
    }
    let plan = reconcile(surface.elements(), GridId::Workers, worker_rows(&summary.workers));
    stats += surface.apply(plan);
    stats
}
