//! Network actor - runs the push channel and export requests in the Tokio runtime

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{create_client, post_export};
use crate::network::websocket::run_sync_channel;

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Tracks an active sync connection
struct ActiveSync {
    message_tx: mpsc::UnboundedSender<String>,
    cancel_tx: oneshot::Sender<()>,
}

/// Network actor that processes channel and export commands
pub struct NetworkActor {
    client: reqwest::Client,
    export_url: String,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    tasks: JoinSet<()>,
    channels: HashMap<u64, ActiveSync>,
}

impl NetworkActor {
    pub fn new(export_url: impl Into<String>, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        Self::with_client(create_client(), export_url, response_tx)
    }

    pub fn with_client(
        client: reqwest::Client,
        export_url: impl Into<String>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            export_url: export_url.into(),
            response_tx,
            tasks: JoinSet::new(),
            channels: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ConnectSync { id, url }) => {
                            let (cancel_tx, cancel_rx) = oneshot::channel();
                            let (message_tx, message_rx) = mpsc::unbounded_channel();
                            self.channels.insert(id, ActiveSync { message_tx, cancel_tx });

                            tracing::info!(id, url = %url, "connecting sync channel");
                            let response_tx = self.response_tx.clone();
                            self.tasks.spawn(async move {
                                run_sync_channel(id, url, response_tx, message_rx, cancel_rx).await;
                            });
                        }

                        Some(NetworkCommand::SendSync { id, message }) => {
                            if let Some(channel) = self.channels.get(&id) {
                                let _ = channel.message_tx.send(message);
                            }
                        }

                        Some(NetworkCommand::CloseSync(id)) => {
                            if let Some(channel) = self.channels.remove(&id) {
                                let _ = channel.cancel_tx.send(());
                            }
                        }

                        Some(NetworkCommand::PostExport(request)) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let url = self.export_url.clone();

                            self.tasks.spawn(async move {
                                tracing::info!(item_id = %request.item_id, count = request.count, "posting export request");
                                let result = post_export(&client, &url, request).await;
                                let _ = response_tx.send(result);
                            });
                        }

                        Some(NetworkCommand::Shutdown) => {
                            for (_, channel) in self.channels.drain() {
                                let _ = channel.cancel_tx.send(());
                            }
                            break;
                        }

                        None => break,
                    }
                }

                Some(_result) = self.tasks.join_next() => {
                    // Tasks report their own outcome; drop channels whose task ended
                    self.channels.retain(|_, channel| !channel.message_tx.is_closed());
                }
            }
        }

        // give cancelled channels a moment to send their close frame
        let drain = async { while self.tasks.join_next().await.is_some() {} };
        if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
            tracing::debug!("network tasks still running at shutdown, aborting");
        }
    }
}
