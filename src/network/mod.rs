//! Network layer - push channel connections and export requests
//!
//! The Network actor receives channel/export commands and sends back events.

pub mod actor;
pub mod client;
pub mod endpoint;
pub mod link;
pub mod websocket;

pub use actor::NetworkActor;
pub use endpoint::Endpoints;
pub use link::{LinkState, SyncLink};
