//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::app::state::{Effects, Session};
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    session: Session,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
    /// Deadline of the pending reconnect, if a close scheduled one
    reconnect_at: Option<Instant>,
}

impl AppActor {
    pub fn new(
        session: Session,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            session,
            network_tx,
            render_tx,
            reconnect_at: None,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        self.connect();
        self.publish();

        loop {
            let deadline = self.reconnect_at;
            let reconnect = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                event = ui_rx.recv() => {
                    let Some(event) = event else { break };
                    if self.handle_ui_event(event) {
                        tracing::info!("quit requested, shutting down");
                        for cmd in self.session.shutdown() {
                            self.send(cmd);
                        }
                        break;
                    }
                    self.publish();
                }
                response = net_rx.recv() => {
                    let Some(response) = response else { break };
                    let effects = self.session.handle_response(response);
                    self.apply(effects);
                    self.publish();
                }
                _ = reconnect => {
                    self.reconnect_at = None;
                    self.connect();
                    self.publish();
                }
            }
        }
    }

    fn connect(&mut self) {
        if let Some(cmd) = self.session.connect() {
            self.send(cmd);
        }
    }

    fn apply(&mut self, effects: Effects) {
        for cmd in effects.commands {
            self.send(cmd);
        }
        if let Some(delay) = effects.reconnect_after {
            self.reconnect_at = Some(Instant::now() + delay);
        }
    }

    fn send(&self, cmd: NetworkCommand) {
        if self.network_tx.send(cmd).is_err() {
            tracing::warn!("network actor is gone, dropping command");
        }
    }

    fn publish(&self) {
        let _ = self.render_tx.send(self.session.to_render_state());
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let cmd = match event {
            UiEvent::SwitchTab(tab) => {
                self.session.switch_tab(tab);
                None
            }

            // Stack selection
            UiEvent::NextGrid => {
                self.session.next_grid();
                None
            }
            UiEvent::PrevGrid => {
                self.session.prev_grid();
                None
            }
            UiEvent::SelectPrev => {
                self.session.select_prev();
                None
            }
            UiEvent::SelectNext => {
                self.session.select_next();
                None
            }
            UiEvent::ScrollUp => {
                self.session.scroll_up();
                None
            }
            UiEvent::ScrollDown => {
                self.session.scroll_down();
                None
            }

            // Export actions
            UiEvent::Press { grid, element_id, modifiers } => self.session.press(grid, &element_id, modifiers),
            UiEvent::PressSelected(modifiers) => self.session.press_selected(modifiers),
            UiEvent::PromptChar(c) => {
                self.session.prompt_char(c);
                None
            }
            UiEvent::PromptBackspace => {
                self.session.prompt_backspace();
                None
            }
            UiEvent::PromptConfirm => self.session.prompt_confirm(),
            UiEvent::PromptCancel => self.session.prompt_cancel(),

            // Popups
            UiEvent::ToggleHelp => {
                self.session.toggle_help();
                None
            }
            UiEvent::CloseHelp => {
                self.session.close_help();
                None
            }

            // System
            UiEvent::Quit => return true,
        };

        if let Some(cmd) = cmd {
            self.send(cmd);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemCatalog;
    use std::time::Duration;
    use tokio::sync::mpsc::error::TryRecvError;

    const URL: &str = "ws://localhost:4456/72ceda8b/sync";

    struct Harness {
        ui_tx: mpsc::UnboundedSender<UiEvent>,
        resp_tx: mpsc::UnboundedSender<NetworkResponse>,
        net_rx: mpsc::UnboundedReceiver<NetworkCommand>,
        _render_rx: mpsc::UnboundedReceiver<RenderState>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_actor() -> Harness {
        let (network_tx, net_rx) = mpsc::unbounded_channel();
        let (render_tx, render_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();
        let session = Session::new("storage.0", URL, ItemCatalog::default());
        let actor = AppActor::new(session, network_tx, render_tx);
        let handle = tokio::spawn(actor.run(ui_rx, resp_rx));
        Harness {
            ui_tx,
            resp_tx,
            net_rx,
            _render_rx: render_rx,
            handle,
        }
    }

    fn connect(id: u64) -> NetworkCommand {
        NetworkCommand::ConnectSync { id, url: URL.into() }
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_after_errors_schedules_one_reconnect() {
        let mut h = spawn_actor();
        assert_eq!(h.net_rx.recv().await, Some(connect(1)));

        h.resp_tx.send(NetworkResponse::SyncOpened { id: 1 }).unwrap();
        for _ in 0..2 {
            h.resp_tx
                .send(NetworkResponse::SyncError { id: 1, error: "reset".into() })
                .unwrap();
        }
        h.resp_tx.send(NetworkResponse::SyncClosed { id: 1 }).unwrap();

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(h.net_rx.try_recv(), Err(TryRecvError::Empty));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(h.net_rx.recv().await, Some(connect(2)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(h.net_rx.try_recv(), Err(TryRecvError::Empty));

        h.ui_tx.send(UiEvent::Quit).unwrap();
        h.handle.await.unwrap();
        assert_eq!(h.net_rx.recv().await, Some(NetworkCommand::CloseSync(2)));
        assert_eq!(h.net_rx.recv().await, Some(NetworkCommand::Shutdown));
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_are_acknowledged_in_order() {
        let mut h = spawn_actor();
        assert_eq!(h.net_rx.recv().await, Some(connect(1)));
        h.resp_tx.send(NetworkResponse::SyncOpened { id: 1 }).unwrap();

        for payload in [r#"{"turtles/a": {"Label": "a"}}"#, "not json", r#"{"turtles/b": {}}"#] {
            h.resp_tx
                .send(NetworkResponse::SyncMessage { id: 1, payload: payload.into() })
                .unwrap();
        }

        let ack = NetworkCommand::SendSync { id: 1, message: "ok".into() };
        assert_eq!(h.net_rx.recv().await, Some(ack.clone()));
        assert_eq!(h.net_rx.recv().await, Some(ack));
        tokio::task::yield_now().await;
        assert_eq!(h.net_rx.try_recv(), Err(TryRecvError::Empty));

        h.ui_tx.send(UiEvent::Quit).unwrap();
        h.handle.await.unwrap();
        assert_eq!(h.net_rx.recv().await, Some(NetworkCommand::CloseSync(1)));
        assert_eq!(h.net_rx.recv().await, Some(NetworkCommand::Shutdown));
    }
}
