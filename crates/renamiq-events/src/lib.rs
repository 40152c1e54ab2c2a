#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Event bus carrying rename progress to UI subscribers.
//!
//! The bus assigns sequential identifiers and keeps a bounded replay ring so a
//! subscriber that attaches late (or reconnects) can catch up from the last id
//! it saw. Live delivery uses `tokio::broadcast`; when a receiver lags, the
//! oldest events are dropped for that receiver.
//!
//! Layout: `payloads.rs` (event types), `error.rs` (publish errors).

pub mod error;
pub mod payloads;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::broadcast::{self, Receiver, Sender, error::TryRecvError};
use tracing::error;

pub use error::{EventBusError, EventBusResult};
pub use payloads::{DEFAULT_REPLAY_CAPACITY, Event, EventEnvelope, EventId, InventorySource};

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus whose broadcast channel and replay ring share `capacity`.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event, assigning it a sequential identifier.
    ///
    /// The event is always retained in the replay ring.
    ///
    /// # Errors
    ///
    /// Returns [`EventBusError::NoSubscribers`] when no live receiver was attached.
    pub fn publish(&self, event: Event) -> EventBusResult<EventId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let event_kind = event.kind();
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.lock_buffer();
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        self.sender
            .send(envelope)
            .map(|_| id)
            .map_err(|_| EventBusError::NoSubscribers {
                event_id: id,
                event_kind,
            })
    }

    /// Subscribe to the bus, replaying any buffered events newer than `since_id`.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let backlog = since_id.map_or_else(VecDeque::new, |since| {
            self.lock_buffer()
                .iter()
                .filter(|item| item.id > since)
                .cloned()
                .collect()
        });

        EventStream {
            backlog,
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the last assigned identifier, if any events have been published.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.lock_buffer().back().map(|event| event.id)
    }

    fn lock_buffer(&self) -> MutexGuard<'_, VecDeque<EventEnvelope>> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("event replay buffer poisoned; continuing with recovered guard");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from the
/// live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    ///
    /// Returns `None` once every publisher has been dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next event that is already available without waiting.
    pub fn try_next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => {}
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::task;
    use tokio::time::timeout;
    use uuid::Uuid;

    const PUBLISH_TIMEOUT: Duration = Duration::from_secs(1);

    fn sample_renamed_event(index: usize) -> Event {
        Event::ItemRenamed {
            batch_id: Uuid::from_u128(1),
            index,
            old_path: format!("/d/{index}.txt"),
            new_path: format!("/d/renamed-{index}.txt"),
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);
        let _live = bus.subscribe(None);

        let mut last_id = 0;
        for i in 0..5 {
            last_id = bus.publish(sample_renamed_event(i)).unwrap_or_default();
        }
        assert_eq!(last_id, 5);
        assert_eq!(bus.last_event_id(), Some(5));

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event);
            }
        }

        let ids: Vec<_> = received.iter().map(|event| event.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn publish_without_subscribers_still_buffers() {
        let bus = EventBus::with_capacity(4);
        let result = bus.publish(sample_renamed_event(0));
        assert!(matches!(
            result,
            Err(EventBusError::NoSubscribers {
                event_id: 1,
                event_kind: "item_renamed"
            })
        ));

        let mut stream = bus.subscribe(Some(0));
        let replayed = stream.try_next().map(|event| event.id);
        assert_eq!(replayed, Some(1));
        assert!(stream.try_next().is_none());
    }

    #[test]
    fn replay_ring_drops_oldest_events() {
        let bus = EventBus::with_capacity(2);
        for i in 0..4 {
            let _ = bus.publish(sample_renamed_event(i));
        }

        let mut stream = bus.subscribe(Some(0));
        let mut ids = Vec::new();
        while let Some(event) = stream.try_next() {
            ids.push(event.id);
        }
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn stream_ends_when_publishers_drop() {
        let bus = EventBus::with_capacity(4);
        let mut stream = bus.subscribe(None);
        let _ = bus.publish(sample_renamed_event(0));
        drop(bus);

        assert!(stream.next().await.is_some());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn load_test_does_not_stall_publishers() -> Result<(), Box<dyn std::error::Error>> {
        let bus = Arc::new(EventBus::with_capacity(512));
        let mut stream = bus.subscribe(None);

        let publisher = {
            let bus = bus.clone();
            task::spawn(async move {
                for i in 0..500 {
                    let publish_bus = bus.clone();
                    let published = timeout(PUBLISH_TIMEOUT, async move {
                        let _ = publish_bus.publish(sample_renamed_event(i));
                    })
                    .await;
                    assert!(published.is_ok(), "publish timed out");
                }
            })
        };

        let consumer = task::spawn(async move {
            let mut ids = HashSet::new();
            while ids.len() < 500 {
                if let Some(event) = stream.next().await {
                    ids.insert(event.id);
                }
            }
            ids
        });

        publisher.await?;
        let ids = consumer.await?;
        assert_eq!(ids.len(), 500);
        Ok(())
    }
}
