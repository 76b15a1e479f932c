//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports plus the event-derived
//! record index.

mod event_log;
mod index;
mod record_store;

pub use event_log::{EventLog, Subscription, SubscriptionError, DEFAULT_CHANNEL_CAPACITY};
pub use index::RecordIndex;
pub use record_store::InMemoryRecordStore;
