//! Session state - the single owner of the store, catalog and render surface
//!
//! Pure data plus transitions; all I/O happens in the actors, which forward
//! the [`NetworkCommand`]s returned here.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crate::aggregate::Aggregator;
use crate::catalog::ItemCatalog;
use crate::constants::{MAX_ACTIVITY_LOG, SYNC_ACK};
use crate::dispatch::{Dispatcher, PressModifiers, PressOutcome};
use crate::messages::render::{GridView, StackCell, WorkerRow};
use crate::messages::ui_events::AppTab;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState};
use crate::models::{AreaDetails, ExportRequest};
use crate::network::SyncLink;
use crate::render::{self, Content, GridId, RenderStats, Surface};
use crate::store::{decode_delta, StateStore};

/// One export response shown in the status area
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub ok: bool,
    pub text: String,
}

/// Keyboard selection of one grid, pinned to an element identity
#[derive(Clone, Debug, PartialEq)]
struct Selection {
    element_id: String,
    /// Last known position, used once the element has been detached
    index: usize,
}

/// What the actor has to do after a network event
#[derive(Debug, Default, PartialEq)]
pub struct Effects {
    pub commands: Vec<NetworkCommand>,
    pub reconnect_after: Option<Duration>,
}

pub struct Session {
    store: StateStore,
    catalog: ItemCatalog,
    aggregator: Aggregator,
    surface: Surface,
    dispatcher: Dispatcher,
    link: SyncLink,
    sync_url: String,
    area_shape: Option<String>,

    // UI state
    pub active_tab: AppTab,
    focus: GridId,
    selection: HashMap<GridId, Selection>,
    worker_scroll: u16,
    pub show_help: bool,
    activity: VecDeque<ActivityEntry>,
}

impl Session {
    pub fn new(area_id: &str, sync_url: impl Into<String>, catalog: ItemCatalog) -> Self {
        Self::with_link(area_id, sync_url, catalog, SyncLink::default())
    }

    pub fn with_link(area_id: &str, sync_url: impl Into<String>, catalog: ItemCatalog, link: SyncLink) -> Self {
        Session {
            store: StateStore::new(),
            catalog,
            aggregator: Aggregator::new(area_id),
            surface: Surface::new(),
            dispatcher: Dispatcher::new(area_id),
            link,
            sync_url: sync_url.into(),
            area_shape: None,
            active_tab: AppTab::Storage,
            focus: GridId::Inventory,
            selection: HashMap::new(),
            worker_scroll: 0,
            show_help: false,
            activity: VecDeque::with_capacity(MAX_ACTIVITY_LOG),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn link(&self) -> &SyncLink {
        &self.link
    }

    pub fn focus(&self) -> GridId {
        self.focus
    }

    pub fn prompt_open(&self) -> bool {
        self.dispatcher.prompt().is_some()
    }

    // ========================================================================
    // Channel lifecycle
    // ========================================================================

    /// Start a connection attempt
    pub fn connect(&mut self) -> Option<NetworkCommand> {
        let id = self.link.connect()?;
        Some(NetworkCommand::ConnectSync {
            id,
            url: self.sync_url.clone(),
        })
    }

    /// Stop reconnecting and tear the channel down
    pub fn shutdown(&mut self) -> Vec<NetworkCommand> {
        let mut commands = Vec::new();
        if let Some(id) = self.link.stop() {
            commands.push(NetworkCommand::CloseSync(id));
        }
        commands.push(NetworkCommand::Shutdown);
        commands
    }

    pub fn handle_response(&mut self, response: NetworkResponse) -> Effects {
        let mut effects = Effects::default();
        match response {
            NetworkResponse::SyncOpened { id } => {
                if self.link.on_open(id) {
                    tracing::info!(id, "sync channel open, starting from an empty store");
                    self.store = StateStore::new();
                    self.refresh();
                }
            }
            NetworkResponse::SyncMessage { id, payload } => {
                if !self.link.accepts(id) {
                    tracing::debug!(id, "dropping message from stale channel");
                    return effects;
                }
                match decode_delta(&payload) {
                    Ok(delta) => {
                        tracing::debug!(id, keys = delta.len(), "applying delta");
                        self.store.apply(delta);
                        self.refresh();
                        effects.commands.push(NetworkCommand::SendSync {
                            id,
                            message: SYNC_ACK.to_string(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!(id, error = %e, "dropping undecodable sync message");
                    }
                }
            }
            NetworkResponse::SyncError { id, error } => {
                if self.link.on_error(id) {
                    tracing::warn!(id, %error, "sync channel error");
                }
            }
            NetworkResponse::SyncClosed { id } => {
                if let Some(delay) = self.link.on_close(id) {
                    tracing::info!(id, delay_ms = delay.as_millis() as u64, "sync channel closed, reconnect scheduled");
                    effects.reconnect_after = Some(delay);
                }
            }
            NetworkResponse::ExportCompleted { request, status, body } => {
                tracing::info!(item_id = %request.item_id, count = request.count, status, %body, "export response");
                self.log_activity(&request, (200..300).contains(&status), format!("{} {}", status, body));
            }
            NetworkResponse::ExportFailed { request, error } => {
                tracing::warn!(item_id = %request.item_id, count = request.count, %error, "export request failed");
                self.log_activity(&request, false, error);
            }
        }
        effects
    }

    fn log_activity(&mut self, request: &ExportRequest, ok: bool, outcome: String) {
        if self.activity.len() >= MAX_ACTIVITY_LOG {
            self.activity.pop_back();
        }
        self.activity.push_front(ActivityEntry {
            timestamp: chrono::Local::now(),
            ok,
            text: format!("{} {:+}: {}", request.item_id, request.count, outcome),
        });
    }

    /// Recompute summaries and reconcile the surface
    pub fn refresh(&mut self) -> RenderStats {
        let summary = self.aggregator.summarize(&self.store);
        self.area_shape = summary.details.as_ref().map(area_shape);
        let stats = render::render(&mut self.surface, &summary, &self.catalog);
        if stats != RenderStats::default() {
            tracing::debug!(created = stats.created, updated = stats.updated, detached = stats.detached, "surface reconciled");
        }
        stats
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn switch_tab(&mut self, tab: AppTab) {
        self.active_tab = tab;
    }

    pub fn next_grid(&mut self) {
        self.focus = self.focus.next_stack();
    }

    pub fn prev_grid(&mut self) {
        self.focus = self.focus.prev_stack();
    }

    /// Position of the selected element, following it across reorders
    fn selected_index(&self, grid: GridId) -> usize {
        let Some(selection) = self.selection.get(&grid) else {
            return 0;
        };
        self.surface
            .children(grid)
            .position(|e| e.attrs.id == selection.element_id)
            .unwrap_or_else(|| selection.index.min(self.surface.grid_len(grid).saturating_sub(1)))
    }

    fn select_index(&mut self, grid: GridId, index: usize) {
        if let Some(element) = self.surface.child_at(grid, index) {
            let element_id = element.attrs.id.clone();
            self.selection.insert(grid, Selection { element_id, index });
        }
    }

    pub fn select_prev(&mut self) {
        let index = self.selected_index(self.focus).saturating_sub(1);
        self.select_index(self.focus, index);
    }

    pub fn select_next(&mut self) {
        let index = self.selected_index(self.focus) + 1;
        let index = index.min(self.surface.grid_len(self.focus).saturating_sub(1));
        self.select_index(self.focus, index);
    }

    pub fn scroll_up(&mut self) {
        self.worker_scroll = self.worker_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.surface.grid_len(GridId::Workers).saturating_sub(1) as u16;
        self.worker_scroll = (self.worker_scroll + 1).min(max);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    /// Press on a rendered element, by identity
    pub fn press(&mut self, grid: GridId, element_id: &str, modifiers: PressModifiers) -> Option<NetworkCommand> {
        let Some(index) = self.surface.children(grid).position(|e| e.attrs.id == element_id) else {
            tracing::debug!(element_id, "press on an element that is no longer rendered");
            return None;
        };
        if GridId::STACKS.contains(&grid) {
            self.focus = grid;
            self.select_index(grid, index);
        }
        let item_id = self.surface.element(element_id)?.attrs.data_id.clone();
        let outcome = self.dispatcher.press(grid, element_id, &item_id, modifiers);
        Self::export_command(outcome)
    }

    /// Keyboard press on the selected stack of the focused grid
    pub fn press_selected(&mut self, modifiers: PressModifiers) -> Option<NetworkCommand> {
        let index = self.selected_index(self.focus);
        let element_id = self.surface.child_at(self.focus, index)?.attrs.id.clone();
        self.press(self.focus, &element_id, modifiers)
    }

    pub fn prompt_char(&mut self, c: char) {
        self.dispatcher.prompt_char(c);
    }

    pub fn prompt_backspace(&mut self) {
        self.dispatcher.prompt_backspace();
    }

    pub fn prompt_confirm(&mut self) -> Option<NetworkCommand> {
        let outcome = self.dispatcher.prompt_confirm();
        Self::export_command(outcome)
    }

    pub fn prompt_cancel(&mut self) -> Option<NetworkCommand> {
        let outcome = self.dispatcher.blur();
        Self::export_command(outcome)
    }

    fn export_command(outcome: PressOutcome) -> Option<NetworkCommand> {
        match outcome {
            PressOutcome::Send(request) => Some(NetworkCommand::PostExport(request)),
            PressOutcome::Ignored | PressOutcome::Prompting | PressOutcome::Dropped => None,
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn to_render_state(&self) -> RenderState {
        let prompt = self.dispatcher.prompt();
        let grids = GridId::STACKS
            .iter()
            .map(|&grid| {
                let selected = self.selected_index(grid);
                let focused = grid == self.focus;
                let cells = self
                    .surface
                    .children(grid)
                    .enumerate()
                    .map(|(i, element)| StackCell {
                        element_id: element.attrs.id.clone(),
                        icon: element.attrs.icon.clone(),
                        name: element.attrs.name.clone(),
                        count: match &element.content {
                            Content::Stack { count } => count.clone(),
                            Content::Worker(_) => String::new(),
                        },
                        selected: focused && i == selected,
                        prompt: prompt
                            .filter(|p| p.element_id == element.attrs.id)
                            .map(|p| p.text.clone()),
                    })
                    .collect();
                GridView { grid, focused, cells }
            })
            .collect();

        let workers = self
            .surface
            .children(GridId::Workers)
            .filter_map(|element| match &element.content {
                Content::Worker(cells) => Some(WorkerRow {
                    label: element.attrs.name.clone(),
                    fuel: cells.fuel.clone(),
                    version: cells.version.clone(),
                    inventory: cells.inventory.clone(),
                    activity: cells.activity.clone(),
                    fatal: cells.fatal.clone(),
                }),
                Content::Stack { .. } => None,
            })
            .collect();

        RenderState {
            active_tab: self.active_tab,
            area_id: self.aggregator.area_id().to_string(),
            area_shape: self.area_shape.clone(),
            grids,
            workers,
            worker_scroll: self.worker_scroll,
            link_state: self.link.state(),
            attempts: self.link.attempts(),
            sync_url: self.sync_url.clone(),
            activity: self.activity.iter().cloned().collect(),
            show_help: self.show_help,
            prompt_open: self.prompt_open(),
        }
    }
}

fn area_shape(details: &AreaDetails) -> String {
    format!(
        "{}x{}x{} ({} boxes)",
        details.x_len,
        details.z_len,
        details.rows,
        details.total_boxes()
    )
}
