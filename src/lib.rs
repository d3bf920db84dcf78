//! # ninja-dash
//!
//! A live terminal dashboard that mirrors the state of a ninja logistics
//! installation.
//!
//! ## Features
//! - Push channel with last-write-wins state merge and fixed-delay reconnect
//! - Storage inventory, pending exports and in-flight allocations as stack grids
//! - Turtle status table
//! - Export requests by clicking or selecting stacks
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (Session state machine)
//! - Network Layer (Tokio runtime)

pub mod aggregate;
pub mod app;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod render;
pub mod store;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, Session};
pub use catalog::ItemCatalog;
pub use config::Config;
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use network::NetworkActor;
pub use store::StateStore;
