// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observable connection status.
//!
//! A single engine-wide value held in a `tokio::sync::watch` channel.
//! Transport outcomes move it between `Connected` and `Error`; teardown
//! parks it in `Disconnected` until the next subscribe or reconnect.

use parley_core::types::ConnectionStatus;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug)]
pub struct ConnectionState {
    sender: watch::Sender<ConnectionStatus>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    /// Starts in `Connecting`.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ConnectionStatus::Connecting);
        Self { sender }
    }

    pub fn current(&self) -> ConnectionStatus {
        *self.sender.borrow()
    }

    /// Returns a receiver that observes every subsequent transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.sender.subscribe()
    }

    /// Forces a status. Returns whether it changed.
    pub fn set(&self, next: ConnectionStatus) -> bool {
        self.transition(|_| Some(next))
    }

    /// A transport call succeeded.
    pub fn mark_success(&self) -> bool {
        self.transition(|current| {
            (current != ConnectionStatus::Disconnected).then_some(ConnectionStatus::Connected)
        })
    }

    /// A transport call failed.
    pub fn mark_failure(&self) -> bool {
        self.transition(|current| {
            (current != ConnectionStatus::Disconnected).then_some(ConnectionStatus::Error)
        })
    }

    /// Leaves `Disconnected` for `Connecting`; no-op in any other state.
    pub fn wake(&self) -> bool {
        self.transition(|current| {
            (current == ConnectionStatus::Disconnected).then_some(ConnectionStatus::Connecting)
        })
    }

    fn transition(&self, next: impl FnOnce(ConnectionStatus) -> Option<ConnectionStatus>) -> bool {
        let mut from = None;
        let changed = self.sender.send_if_modified(|status| match next(*status) {
            Some(target) if target != *status => {
                from = Some(*status);
                *status = target;
                true
            }
            _ => false,
        });
        if let Some(from) = from {
            info!(from = %from, to = %self.current(), "connection status changed");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        assert_eq!(ConnectionState::new().current(), ConnectionStatus::Connecting);
    }

    #[test]
    fn success_and_failure_alternate() {
        let state = ConnectionState::new();
        assert!(state.mark_success());
        assert_eq!(state.current(), ConnectionStatus::Connected);
        assert!(!state.mark_success());

        assert!(state.mark_failure());
        assert_eq!(state.current(), ConnectionStatus::Error);

        assert!(state.mark_success());
        assert_eq!(state.current(), ConnectionStatus::Connected);
    }

    #[test]
    fn disconnected_ignores_transport_outcomes() {
        let state = ConnectionState::new();
        state.set(ConnectionStatus::Disconnected);

        assert!(!state.mark_success());
        assert!(!state.mark_failure());
        assert_eq!(state.current(), ConnectionStatus::Disconnected);

        assert!(state.wake());
        assert_eq!(state.current(), ConnectionStatus::Connecting);
    }

    #[test]
    fn wake_only_leaves_disconnected() {
        let state = ConnectionState::new();
        state.mark_failure();
        assert!(!state.wake());
        assert_eq!(state.current(), ConnectionStatus::Error);
    }

    #[tokio::test]
    async fn receivers_observe_transitions() {
        let state = ConnectionState::new();
        let mut rx = state.subscribe();

        state.mark_failure();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), ConnectionStatus::Error);
    }
}
