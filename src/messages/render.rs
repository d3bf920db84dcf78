//! Render state - snapshot sent from App layer to UI for drawing

use crate::app::state::ActivityEntry;
use crate::messages::ui_events::AppTab;
use crate::network::LinkState;
use crate::render::GridId;

/// One stack element as it should be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct StackCell {
    pub element_id: String,
    pub icon: Option<String>,
    pub name: String,
    pub count: String,
    pub selected: bool,
    /// Text of the quantity prompt attached to this element
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub grid: GridId,
    pub focused: bool,
    pub cells: Vec<StackCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRow {
    pub label: String,
    pub fuel: String,
    pub version: String,
    pub inventory: String,
    pub activity: String,
    pub fatal: Option<String>,
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub active_tab: AppTab,
    pub area_id: String,
    /// `XLen x ZLen x Rows` plus box count, once details arrived
    pub area_shape: Option<String>,
    pub grids: Vec<GridView>,
    pub workers: Vec<WorkerRow>,
    pub worker_scroll: u16,
    pub link_state: LinkState,
    pub attempts: u64,
    pub sync_url: String,
    pub activity: Vec<ActivityEntry>,
    pub show_help: bool,
    pub prompt_open: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            active_tab: AppTab::Storage,
            area_id: String::new(),
            area_shape: None,
            grids: Vec::new(),
            workers: Vec::new(),
            worker_scroll: 0,
            link_state: LinkState::Closed,
            attempts: 0,
            sync_url: String::new(),
            activity: Vec::new(),
            show_help: false,
            prompt_open: false,
        }
    }
}
