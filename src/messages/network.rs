//! Network messages - communication between App and Network layers

use crate::models::ExportRequest;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Open the push channel; `id` tags every event of this attempt
    ConnectSync {
        id: u64,
        url: String,
    },
    /// Send a text frame on an open channel
    SendSync {
        id: u64,
        message: String,
    },
    /// Close a channel
    CloseSync(u64),
    /// Issue an export request on the side channel
    PostExport(ExportRequest),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResponse {
    SyncOpened {
        id: u64,
    },
    SyncMessage {
        id: u64,
        payload: String,
    },
    SyncError {
        id: u64,
        error: String,
    },
    /// Always follows the end of an attempt, including failed connects
    SyncClosed {
        id: u64,
    },
    ExportCompleted {
        request: ExportRequest,
        status: u16,
        body: String,
    },
    ExportFailed {
        request: ExportRequest,
        error: String,
    },
}

impl NetworkResponse {
    /// Sync connection id, for channel events
    pub fn sync_id(&self) -> Option<u64> {
        match self {
            NetworkResponse::SyncOpened { id }
            | NetworkResponse::SyncMessage { id, .. }
            | NetworkResponse::SyncError { id, .. }
            | NetworkResponse::SyncClosed { id } => Some(*id),
            NetworkResponse::ExportCompleted { .. } | NetworkResponse::ExportFailed { .. } => None,
        }
    }
}
