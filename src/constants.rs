//! Application constants
//!
//! Centralized location for protocol literals and configuration defaults.

use std::time::Duration;

/// Default page location the sync and export endpoints are derived from
pub const DEFAULT_PAGE_URL: &str = "http://localhost:4456/72ceda8b/";

/// Default storage area shown on the dashboard
pub const DEFAULT_AREA_ID: &str = "storage.0";

/// Relative endpoint of the push channel
pub const SYNC_ENDPOINT: &str = "sync";

/// Relative endpoint of the export side channel
pub const EXPORT_ENDPOINT: &str = "export";

/// Relative location of the item display catalog
pub const CATALOG_ENDPOINT: &str = "items.json";

/// Websocket subprotocol token
pub const SYNC_SUBPROTOCOL: &str = "ninja";

/// Acknowledgment sent after every applied delta
pub const SYNC_ACK: &str = "ok";

/// Fixed delay between a channel close and the next connection attempt
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

/// Quantity used when a stack is pressed with shift held
pub const BATCH_QUANTITY: i64 = 64;

/// Largest absolute export quantity accepted
pub const MAX_EXPORT_QUANTITY: i64 = 1_000_000;

/// Longest quantity prompt text; `-1000000` fits
pub const MAX_PROMPT_LEN: usize = 8;

/// Slots in a worker inventory
pub const WORKER_INVENTORY_SLOTS: i64 = 16;

/// Key namespace of worker records
pub const WORKER_NAMESPACE: &str = "turtles/";

/// Number of export responses kept for the status area
pub const MAX_ACTIVITY_LOG: usize = 50;

/// Application name
pub const APP_NAME: &str = "ninja-dash";
