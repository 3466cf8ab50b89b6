// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The access-change event bus.
//!
//! The bus has two delivery paths with different guarantees:
//!
//! - **Listeners**: registered [`AccessEventListener`]s are invoked
//!   synchronously, inside `publish()`, before it returns. Cache
//!   invalidation rides this path, which is what makes the ordering
//!   guarantee hold: any resolution that starts after `publish()` returned
//!   observes the invalidation.
//! - **Subscribers**: a `tokio::sync::broadcast` side-channel for external
//!   consumers (e.g. pushing change notifications to open client
//!   connections). Subscribers are never the invalidation mechanism; a
//!   lagging or absent subscriber has no effect on correctness.
//!
//! Delivery is at-least-once and in-process only; there is no persistence
//! or replay, and listeners registered after an event miss it. The bus is
//! an explicitly constructed, dependency-injected instance: construct it
//! once at startup, share it via `Arc`, and call [`AccessEventBus::shutdown`]
//! to release listeners deterministically.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{BusError, BusResult};
use crate::event::AccessEvent;

// =============================================================================
// AccessEventListener
// =============================================================================

/// A synchronous consumer of access-change events.
///
/// Implementations must be fast and must not block: they run inside
/// `publish()` on the publisher's task. Anything slow belongs on the
/// broadcast side-channel instead.
pub trait AccessEventListener: Send + Sync {
    /// Called for every published event, before `publish()` returns.
    fn on_event(&self, event: &AccessEvent);
}

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// Bus Statistics
// =============================================================================

/// Statistics for the event bus.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BusStats {
    /// Total events published.
    pub events_published: u64,
    /// Total listener invocations.
    pub listeners_notified: u64,
    /// Broadcast events dropped due to subscriber lag.
    pub events_dropped: u64,
    /// Current number of broadcast subscribers.
    pub subscriber_count: u64,
    /// Current number of registered listeners.
    pub listener_count: u64,
}

/// Atomic statistics for lock-free updates.
#[derive(Debug, Default)]
struct AtomicBusStats {
    events_published: AtomicU64,
    listeners_notified: AtomicU64,
    events_dropped: AtomicU64,
}

// =============================================================================
// AccessEventBus
// =============================================================================

/// In-process event bus for access-change events.
pub struct AccessEventBus {
    /// Registered synchronous listeners.
    listeners: RwLock<Vec<(ListenerId, Arc<dyn AccessEventListener>)>>,
    /// Broadcast sender for external subscribers.
    sender: broadcast::Sender<AccessEvent>,
    /// Broadcast channel capacity.
    capacity: usize,
    /// Next listener handle.
    next_listener_id: AtomicU64,
    /// Set once `shutdown()` has run.
    shut_down: AtomicBool,
    /// Statistics.
    stats: Arc<AtomicBusStats>,
}

impl AccessEventBus {
    /// Creates a new bus with the given broadcast capacity.
    ///
    /// The capacity only affects the subscriber side-channel; listener
    /// fan-out is unbuffered by construction.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));

        Self {
            listeners: RwLock::new(Vec::new()),
            sender,
            capacity: capacity.max(1),
            next_listener_id: AtomicU64::new(1),
            shut_down: AtomicBool::new(false),
            stats: Arc::new(AtomicBusStats::default()),
        }
    }

    /// Creates a bus with a default capacity suitable for most deployments.
    pub fn with_defaults() -> Self {
        Self::new(256)
    }

    /// Publishes an event.
    ///
    /// All registered listeners are invoked before this method returns;
    /// the broadcast fan-out happens afterwards and never fails the
    /// publish. Returns the number of listeners notified.
    pub fn publish(&self, event: AccessEvent) -> BusResult<usize> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(BusError::ShutDown);
        }

        // Snapshot under the read lock, invoke outside it, so listeners
        // may register or remove other listeners without deadlocking.
        let listeners: Vec<Arc<dyn AccessEventListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in &listeners {
            listener.on_event(&event);
        }

        self.stats.events_published.fetch_add(1, Ordering::Relaxed);
        self.stats
            .listeners_notified
            .fetch_add(listeners.len() as u64, Ordering::Relaxed);

        // No subscribers is not an error in a pub/sub side-channel.
        let _ = self.sender.send(event);

        Ok(listeners.len())
    }

    /// Registers a listener and returns its handle.
    pub fn add_listener(&self, listener: Arc<dyn AccessEventListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Removes a listener. Returns `true` if it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Creates a new broadcast subscriber.
    pub fn subscribe(&self) -> AccessEventSubscriber {
        AccessEventSubscriber {
            receiver: self.sender.subscribe(),
            stats: self.stats.clone(),
        }
    }

    /// Returns the current number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Returns the current number of broadcast subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the broadcast channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shuts the bus down: clears all listeners and rejects further
    /// publishes with [`BusError::ShutDown`].
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::Release);
        self.listeners.write().clear();
    }

    /// Returns `true` if `shutdown()` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Returns current statistics.
    pub fn stats(&self) -> BusStats {
        BusStats {
            events_published: self.stats.events_published.load(Ordering::Relaxed),
            listeners_notified: self.stats.listeners_notified.load(Ordering::Relaxed),
            events_dropped: self.stats.events_dropped.load(Ordering::Relaxed),
            subscriber_count: self.subscriber_count() as u64,
            listener_count: self.listener_count() as u64,
        }
    }
}

impl std::fmt::Debug for AccessEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEventBus")
            .field("capacity", &self.capacity)
            .field("listener_count", &self.listener_count())
            .field("subscriber_count", &self.subscriber_count())
            .field(
                "events_published",
                &self.stats.events_published.load(Ordering::Relaxed),
            )
            .finish()
    }
}

// =============================================================================
// AccessEventSubscriber
// =============================================================================

/// A broadcast subscriber to the event bus.
pub struct AccessEventSubscriber {
    receiver: broadcast::Receiver<AccessEvent>,
    stats: Arc<AtomicBusStats>,
}

impl AccessEventSubscriber {
    /// Receives the next event.
    ///
    /// Lag is tolerated: dropped events are counted and reception
    /// continues with the next available event.
    pub async fn recv(&mut self) -> BusResult<AccessEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Closed) => return Err(BusError::Closed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    self.stats.events_dropped.fetch_add(count, Ordering::Relaxed);
                    tracing::warn!(count, "event bus subscriber lagged, events dropped");
                }
            }
        }
    }

    /// Tries to receive an event without blocking.
    pub fn try_recv(&mut self) -> BusResult<Option<AccessEvent>> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(BusError::Closed),
            Err(broadcast::error::TryRecvError::Lagged(count)) => {
                self.stats.events_dropped.fetch_add(count, Ordering::Relaxed);
                Ok(None)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AccessEventKind;
    use crate::types::{RoleId, UserId};
    use std::sync::Mutex;

    /// Records every event it sees, in order.
    struct RecordingListener {
        seen: Mutex<Vec<AccessEventKind>>,
    }

    impl RecordingListener {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn kinds(&self) -> Vec<AccessEventKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl AccessEventListener for RecordingListener {
        fn on_event(&self, event: &AccessEvent) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    #[test]
    fn test_publish_invokes_listener_synchronously() {
        let bus = AccessEventBus::with_defaults();
        let listener = RecordingListener::new();
        bus.add_listener(listener.clone());

        let notified = bus
            .publish(AccessEvent::user_role_added(
                UserId::new("u1"),
                RoleId::new("r1"),
            ))
            .unwrap();

        // The listener ran before publish returned; no polling needed.
        assert_eq!(notified, 1);
        assert_eq!(listener.kinds(), vec![AccessEventKind::UserRoleAdded]);
    }

    #[test]
    fn test_remove_listener() {
        let bus = AccessEventBus::with_defaults();
        let listener = RecordingListener::new();
        let id = bus.add_listener(listener.clone());

        assert!(bus.remove_listener(id));
        assert!(!bus.remove_listener(id));

        bus.publish(AccessEvent::role_created(RoleId::new("r1"))).unwrap();
        assert!(listener.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_subscriber_receives_events() {
        let bus = AccessEventBus::with_defaults();
        let mut subscriber = bus.subscribe();

        bus.publish(AccessEvent::role_created(RoleId::new("r1"))).unwrap();

        let event = subscriber.recv().await.unwrap();
        assert_eq!(event.kind, AccessEventKind::RoleCreated);
    }

    #[test]
    fn test_listener_registered_after_event_misses_it() {
        let bus = AccessEventBus::with_defaults();

        bus.publish(AccessEvent::role_created(RoleId::new("r1"))).unwrap();

        let listener = RecordingListener::new();
        bus.add_listener(listener.clone());
        assert!(listener.kinds().is_empty());
    }

    #[test]
    fn test_shutdown_rejects_publish_and_clears_listeners() {
        let bus = AccessEventBus::with_defaults();
        bus.add_listener(RecordingListener::new());

        bus.shutdown();

        assert!(bus.is_shut_down());
        assert_eq!(bus.listener_count(), 0);
        assert!(matches!(
            bus.publish(AccessEvent::role_created(RoleId::new("r1"))),
            Err(BusError::ShutDown)
        ));
    }

    #[test]
    fn test_bus_stats() {
        let bus = AccessEventBus::with_defaults();
        bus.add_listener(RecordingListener::new());
        bus.add_listener(RecordingListener::new());

        bus.publish(AccessEvent::role_created(RoleId::new("r1"))).unwrap();
        bus.publish(AccessEvent::role_created(RoleId::new("r2"))).unwrap();

        let stats = bus.stats();
        assert_eq!(stats.events_published, 2);
        assert_eq!(stats.listeners_notified, 4);
        assert_eq!(stats.listener_count, 2);
    }
}
