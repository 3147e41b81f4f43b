//! Named-event publish/subscribe
//!
//! The dispatcher emits one event per dispatched action, named after the
//! action type, carrying the action payload.

use std::collections::HashMap;

use crate::action::Payload;

/// Callback invoked with the payload of an emitted event
pub type Listener = Box<dyn FnMut(&Payload) + Send>;

/// Handle returned by `on`/`once`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Subscription {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

/// Event bus keyed by event name
#[derive(Default)]
pub struct EventBus {
    subscriptions: HashMap<String, Vec<Subscription>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(&mut self, event: &str, once: bool, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.subscriptions
            .entry(event.to_string())
            .or_default()
            .push(Subscription { id, once, listener });
        id
    }

    /// Call `listener` every time `event` is emitted
    pub fn on<F>(&mut self, event: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Payload) + Send + 'static,
    {
        self.subscribe(event, false, Box::new(listener))
    }

    /// Call `listener` the next time `event` is emitted, then drop it
    pub fn once<F>(&mut self, event: &str, listener: F) -> ListenerId
    where
        F: FnMut(&Payload) + Send + 'static,
    {
        self.subscribe(event, true, Box::new(listener))
    }

    /// Unsubscribe; returns whether the listener was found
    pub fn off(&mut self, event: &str, id: ListenerId) -> bool {
        let Some(subscriptions) = self.subscriptions.get_mut(event) else {
            return false;
        };

        let before = subscriptions.len();
        subscriptions.retain(|subscription| subscription.id != id);
        let removed = subscriptions.len() != before;

        if subscriptions.is_empty() {
            self.subscriptions.remove(event);
        }
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.subscriptions.get(event).map_or(0, Vec::len)
    }

    /// Invoke every listener of `event` in subscription order
    ///
    /// Returns the number of listeners called.
    pub fn emit(&mut self, event: &str, payload: &Payload) -> usize {
        let Some(subscriptions) = self.subscriptions.get_mut(event) else {
            return 0;
        };

        for subscription in subscriptions.iter_mut() {
            (subscription.listener)(payload);
        }
        let notified = subscriptions.len();

        subscriptions.retain(|subscription| !subscription.once);
        if subscriptions.is_empty() {
            self.subscriptions.remove(event);
        }
        notified
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.subscriptions
                    .iter()
                    .map(|(event, subscriptions)| (event, subscriptions.len())),
            )
            .finish()
    }
}
