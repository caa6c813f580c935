// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Many-to-many event fan-out (spec §4.5). Each subscriber has an optional
//! workdir filter and a bounded queue; a slow subscriber (full queue) is
//! disconnected rather than allowed to stall delivery to everyone else.

use std::sync::atomic::{AtomicU64, Ordering};

use oj_core::Event;
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Bound on each subscriber's outbound queue (spec §4.5 "bounded buffered
/// queue").
const SUBSCRIBER_QUEUE_DEPTH: usize = 256;

struct Subscriber {
    id: u64,
    workdir: Option<String>,
    tx: mpsc::Sender<Event>,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber, optionally filtered to one workdir (an
    /// empty filter observes every job, per spec §4.5).
    pub fn subscribe(&self, workdir: Option<String>) -> (u64, mpsc::Receiver<Event>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);
        self.subscribers.lock().push(Subscriber { id, workdir, tx });
        (id, rx)
    }

    /// Explicitly drop a subscriber, e.g. when its connection closes.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    /// Fan the event out to every matching subscriber. Matching is judged
    /// against the snapshot captured in the event itself, so delivery is
    /// consistent with the mutation that produced it even if the
    /// subscriber set changes concurrently.
    pub fn publish(&self, event: Event) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|s| {
            if let Some(filter) = &s.workdir {
                if filter != event.workdir() {
                    return true;
                }
            }
            match s.tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(_) => false,
            }
        });
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
