//! Push channel - websocket connection to the sync endpoint

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::constants::SYNC_SUBPROTOCOL;
use crate::error::ChannelError;
use crate::messages::NetworkResponse;

/// Handshake request carrying the sync subprotocol
pub fn sync_request(url: &str) -> Result<Request, ChannelError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ChannelError::Handshake(e.to_string()))?;
    request
        .headers_mut()
        .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SYNC_SUBPROTOCOL));
    Ok(request)
}

/// Run one connection attempt until it ends
///
/// Every exit path reports `SyncClosed`, preceded by `SyncError` when the
/// attempt ended because of a failure.
pub async fn run_sync_channel(
    id: u64,
    url: String,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    mut message_rx: mpsc::UnboundedReceiver<String>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    if let Err(e) = drive(id, &url, &response_tx, &mut message_rx, &mut cancel_rx).await {
        let _ = response_tx.send(NetworkResponse::SyncError {
            id,
            error: e.to_string(),
        });
    }
    let _ = response_tx.send(NetworkResponse::SyncClosed { id });
}

async fn drive(
    id: u64,
    url: &str,
    response_tx: &mpsc::UnboundedSender<NetworkResponse>,
    message_rx: &mut mpsc::UnboundedReceiver<String>,
    cancel_rx: &mut oneshot::Receiver<()>,
) -> Result<(), ChannelError> {
    let request = sync_request(url)?;
    let (ws_stream, _response) = connect_async(request).await.map_err(ChannelError::Connect)?;
    tracing::info!(id, url, "sync channel open");
    let _ = response_tx.send(NetworkResponse::SyncOpened { id });

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;

            _ = &mut *cancel_rx => {
                let _ = write.close().await;
                return Ok(());
            }

            Some(msg) = message_rx.recv() => {
                write.send(Message::Text(msg)).await.map_err(ChannelError::Send)?;
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(payload))) => {
                        let _ = response_tx.send(NetworkResponse::SyncMessage { id, payload });
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(id, bytes = data.len(), "ignoring binary sync frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => {}
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|f| format!("{}: {}", f.code, f.reason))
                            .unwrap_or_else(|| "no reason".to_string());
                        tracing::info!(id, %reason, "sync channel closed by server");
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(ChannelError::Receive(e)),
                    None => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_request_carries_subprotocol() {
        let request = sync_request("ws://localhost:4456/72ceda8b/sync").unwrap();
        assert_eq!(
            request.headers().get("Sec-WebSocket-Protocol").and_then(|v| v.to_str().ok()),
            Some("ninja")
        );
        assert_eq!(request.uri().path(), "/72ceda8b/sync");
    }

    #[test]
    fn test_sync_request_rejects_garbage() {
        assert!(matches!(sync_request("not a url"), Err(ChannelError::Handshake(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error_then_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (_msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        // port 9 (discard) is closed on test machines
        run_sync_channel(7, "ws://127.0.0.1:9/sync".into(), tx, msg_rx, cancel_rx).await;

        assert!(matches!(rx.recv().await, Some(NetworkResponse::SyncError { id: 7, .. })));
        assert_eq!(rx.recv().await, Some(NetworkResponse::SyncClosed { id: 7 }));
    }
}
