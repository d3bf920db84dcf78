//! Messages exchanged between the UI loop, the App actor and the Network actor.

pub mod network;
pub mod render;
pub mod ui_events;

pub use network::{NetworkCommand, NetworkResponse};
pub use render::{GridView, RenderState, StackCell, WorkerRow};
pub use ui_events::{AppTab, UiEvent};
