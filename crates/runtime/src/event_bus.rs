use std::collections::{BTreeSet, VecDeque};

use crate::events::EventKind;

/// Number of trace entries kept before the oldest are dropped.
pub const DEFAULT_TRACE_CAPACITY: usize = 256;

/// Dispatch trace entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sequence: u64,
    pub kind: EventKind,
    pub message: String,
}

/// Named-kind subscription registry plus a bounded dispatch trace.
///
/// Ordering contract:
/// - `subscribers(kind)` yields subscribers in subscription order.
#[derive(Debug)]
pub struct EventBus<S> {
    subscriptions: Vec<(EventKind, S)>,
    events: VecDeque<Event>,
    sequence: u64,
    capacity: usize,
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            subscriptions: Vec::new(),
            events: VecDeque::new(),
            sequence: 0,
            capacity: DEFAULT_TRACE_CAPACITY,
        }
    }
}

impl<S: Copy + PartialEq> EventBus<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Subscribes `subscriber` to `kind`. Subscribing twice is a no-op.
    pub fn subscribe(&mut self, kind: EventKind, subscriber: S) {
        if !self.is_subscribed(kind, subscriber) {
            self.subscriptions.push((kind, subscriber));
        }
    }

    pub fn unsubscribe(&mut self, kind: EventKind, subscriber: S) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|(k, s)| !(*k == kind && *s == subscriber));
        self.subscriptions.len() != before
    }

    pub fn is_subscribed(&self, kind: EventKind, subscriber: S) -> bool {
        self.subscriptions
            .iter()
            .any(|(k, s)| *k == kind && *s == subscriber)
    }

    pub fn subscribers(&self, kind: EventKind) -> Vec<S> {
        self.subscriptions
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, s)| *s)
            .collect()
    }

    /// Every kind with at least one subscriber; the substrate only needs to
    /// deliver these.
    pub fn kinds(&self) -> BTreeSet<EventKind> {
        self.subscriptions.iter().map(|(k, _)| *k).collect()
    }

    pub fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            sequence: self.sequence,
            kind,
            message: message.into(),
        });
        self.sequence += 1;
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
