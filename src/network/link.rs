//! Sync link - connection lifecycle of the push channel
//!
//! Every connection attempt gets a fresh id. Events carrying an older id are
//! stale and ignored. Errors never schedule anything; only the first close of
//! the current attempt does, which keeps exactly one reconnect pending.

use std::time::Duration;

use crate::constants::RECONNECT_DELAY;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
    /// No further reconnects will ever be scheduled
    Stopped,
}

impl LinkState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkState::Connecting => "connecting",
            LinkState::Open => "open",
            LinkState::Closed => "closed",
            LinkState::Stopped => "stopped",
        }
    }
}

#[derive(Debug)]
pub struct SyncLink {
    state: LinkState,
    current: Option<u64>,
    next_id: u64,
    reconnect_delay: Duration,
    attempts: u64,
}

impl Default for SyncLink {
    fn default() -> Self {
        Self::new(RECONNECT_DELAY)
    }
}

impl SyncLink {
    pub fn new(reconnect_delay: Duration) -> Self {
        SyncLink {
            state: LinkState::Closed,
            current: None,
            next_id: 1,
            reconnect_delay,
            attempts: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn connection_id(&self) -> Option<u64> {
        self.current
    }

    /// Connection attempts started so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Start a new attempt, returning its id
    pub fn connect(&mut self) -> Option<u64> {
        if self.state == LinkState::Stopped {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.attempts += 1;
        self.current = Some(id);
        self.state = LinkState::Connecting;
        Some(id)
    }

    /// Returns true when the open belongs to the current attempt
    pub fn on_open(&mut self, id: u64) -> bool {
        if self.current != Some(id) || self.state != LinkState::Connecting {
            return false;
        }
        self.state = LinkState::Open;
        true
    }

    /// Messages are only accepted from the current, open connection
    pub fn accepts(&self, id: u64) -> bool {
        self.current == Some(id) && self.state == LinkState::Open
    }

    /// Errors are reported but never change the state
    pub fn on_error(&self, id: u64) -> bool {
        self.current == Some(id)
    }

    /// Close of the current attempt: returns the delay before reconnecting
    pub fn on_close(&mut self, id: u64) -> Option<Duration> {
        if self.current != Some(id) {
            return None;
        }
        match self.state {
            LinkState::Connecting | LinkState::Open => {
                self.state = LinkState::Closed;
                Some(self.reconnect_delay)
            }
            LinkState::Closed | LinkState::Stopped => None,
        }
    }

    /// Stop reconnecting; returns the id of a connection still to be closed
    pub fn stop(&mut self) -> Option<u64> {
        let active = match self.state {
            LinkState::Connecting | LinkState::Open => self.current,
            _ => None,
        };
        self.state = LinkState::Stopped;
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_then_close_schedule_one_reconnect() {
        let mut link = SyncLink::default();
        let id = link.connect().unwrap();
        assert!(link.on_open(id));
        assert!(link.on_error(id));
        assert!(link.on_error(id));
        assert_eq!(link.state(), LinkState::Open);

        assert_eq!(link.on_close(id), Some(Duration::from_millis(2000)));
        assert_eq!(link.on_close(id), None);
        assert_eq!(link.state(), LinkState::Closed);
    }

    #[test]
    fn test_failed_connect_still_reconnects() {
        let mut link = SyncLink::default();
        let id = link.connect().unwrap();
        link.on_error(id);
        assert_eq!(link.on_close(id), Some(RECONNECT_DELAY));
        let next = link.connect().unwrap();
        assert_ne!(id, next);
        assert_eq!(link.attempts(), 2);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let mut link = SyncLink::default();
        let old = link.connect().unwrap();
        link.on_close(old);
        let new = link.connect().unwrap();

        assert!(!link.on_open(old));
        assert!(!link.accepts(old));
        assert_eq!(link.on_close(old), None);
        assert_eq!(link.state(), LinkState::Connecting);

        assert!(link.on_open(new));
        assert!(link.accepts(new));
    }

    #[test]
    fn test_stop_prevents_further_attempts() {
        let mut link = SyncLink::default();
        let id = link.connect().unwrap();
        link.on_open(id);
        assert_eq!(link.stop(), Some(id));
        assert_eq!(link.on_close(id), None);
        assert_eq!(link.connect(), None);
        assert_eq!(link.state(), LinkState::Stopped);
    }
}
