//! Suggestion event bus.
//!
//! Two views of the same stream: a broadcast channel carrying every
//! [`SuggestionEvent`], and one watch channel per session holding its latest
//! [`PendingState`]. Surfaces that only care about "what is pending now" use
//! the watch; anything that needs the full history of transitions uses the
//! broadcast.

use redraft_core::session::{PendingState, SuggestionEvent};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

pub struct SuggestionBus {
    events: broadcast::Sender<SuggestionEvent>,
    states: Mutex<HashMap<String, watch::Sender<PendingState>>>,
}

impl SuggestionBus {
    /// Creates a bus buffering up to `capacity` events per lagging receiver.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            events,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Publishes an event to both views.
    ///
    /// `Cleared` is final: the session's watch channel is dropped after the
    /// state is set, so watchers see `Cleared` and then a closed channel.
    pub fn publish(&self, event: SuggestionEvent) {
        let session_id = event.session_id().to_string();
        let state = PendingState::from(&event);
        tracing::debug!("[SuggestionBus] {} -> {:?}", session_id, state);

        if let Ok(mut states) = self.states.lock() {
            let sender = states
                .entry(session_id.clone())
                .or_insert_with(|| watch::channel(PendingState::Idle).0);
            sender.send_replace(state);
            if matches!(event, SuggestionEvent::Cleared { .. }) {
                states.remove(&session_id);
            }
        }

        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Sets a session's state without emitting an event.
    ///
    /// Used when a session is loaded so late subscribers start from the
    /// stored state instead of `Idle`.
    pub fn seed(&self, session_id: &str, state: PendingState) {
        if let Ok(mut states) = self.states.lock() {
            match states.get(session_id) {
                Some(sender) => {
                    sender.send_replace(state);
                }
                None => {
                    states.insert(session_id.to_string(), watch::channel(state).0);
                }
            }
        }
    }

    /// Watches the pending state of one session.
    pub fn subscribe(&self, session_id: &str) -> watch::Receiver<PendingState> {
        match self.states.lock() {
            Ok(mut states) => states
                .entry(session_id.to_string())
                .or_insert_with(|| watch::channel(PendingState::Idle).0)
                .subscribe(),
            // The sender is dropped immediately, so the receiver reads a
            // closed channel holding `Idle`.
            Err(_) => watch::channel(PendingState::Idle).1,
        }
    }

    /// Receives every event published from now on, across all sessions.
    pub fn events(&self) -> broadcast::Receiver<SuggestionEvent> {
        self.events.subscribe()
    }
}
