//! Append-only event log.
//!
//! Implements the `EventSink` port. Every emitted event is appended to the
//! log, folded into the [`RecordIndex`], and broadcast to live subscribers via
//! `tokio::sync::broadcast`.

use super::index::RecordIndex;
use crate::events::{EstateEvent, EventFilter, EventRecord};
use crate::ports::outbound::EventSink;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Maximum events buffered per subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The log was dropped.
    #[error("Event log closed")]
    Closed,
}

#[derive(Debug, Default)]
struct LogState {
    records: Vec<EventRecord>,
    index: RecordIndex,
}

/// In-memory append-only event log with a derived record index.
pub struct EventLog {
    state: RwLock<LogState>,
    sender: broadcast::Sender<EventRecord>,
    capacity: usize,
}

impl EventLog {
    /// Create a log with default subscriber capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a log with the given subscriber capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            state: RwLock::new(LogState::default()),
            sender,
            capacity,
        }
    }

    /// Subscribe to events appended from now on.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New event log subscription");
        Subscription {
            receiver: self.sender.subscribe(),
            filter,
        }
    }

    /// Number of appended events.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// True if nothing was appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every appended record, in order.
    pub fn records(&self) -> Vec<EventRecord> {
        self.state.read().records.clone()
    }

    /// Most recently appended event.
    pub fn last(&self) -> Option<EstateEvent> {
        self.state.read().records.last().map(|r| r.event.clone())
    }

    /// Snapshot of the record index.
    pub fn index(&self) -> RecordIndex {
        self.state.read().index.clone()
    }

    /// Run `query` against the live index without cloning it.
    pub fn query<T>(&self, query: impl FnOnce(&RecordIndex) -> T) -> T {
        query(&self.state.read().index)
    }

    /// Live subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscriber channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: EstateEvent) -> u64 {
        let record = {
            let mut state = self.state.write();
            let sequence = state.records.len() as u64;
            state.index.apply(&event);
            let record = EventRecord::new(sequence, event);
            state.records.push(record.clone());
            record
        };
        let sequence = record.sequence;
        let name = record.event.name();

        match self.sender.send(record) {
            Ok(receivers) => debug!(sequence, event = name, receivers, "Event appended"),
            Err(_) => trace!(sequence, event = name, "Event appended (no subscribers)"),
        }
        sequence
    }
}

/// Live subscription to the event log.
pub struct Subscription {
    receiver: broadcast::Receiver<EventRecord>,
    filter: EventFilter,
}

impl Subscription {
    /// Receive the next record matching the filter.
    ///
    /// Returns `None` once the log is dropped.
    pub async fn recv(&mut self) -> Option<EventRecord> {
        loop {
            let record = match self.receiver.recv().await {
                Ok(r) => r,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };
            if self.filter.matches(&record.event) {
                return Some(record);
            }
        }
    }

    /// Receive the next matching record without waiting.
    pub fn try_recv(&mut self) -> Result<Option<EventRecord>, SubscriptionError> {
        loop {
            let record = match self.receiver.try_recv() {
                Ok(r) => r,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };
            if self.filter.matches(&record.event) {
                return Ok(Some(record));
            }
        }
    }

    /// Filter of this subscription.
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
