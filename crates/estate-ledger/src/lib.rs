//! # Estate Ledger
//!
//! Custodial property registry with verifier-gated sale escrow and a rental
//! ledger.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Register properties, list and delist them, update their details
//! - Escrow sales: a sale completes only after enough independent verifiers
//!   attest it and the buyer's payment covers the agreed amount
//! - Track rental agreements: rent payments accrue to the property's escrow
//!   balance and push the due date forward one period
//! - Report every successful transition as exactly one event
//!
//! ## Guarantees
//!
//! | Guarantee | Enforced by |
//! |-----------|-------------|
//! | Owner-only mutation | `invariant_owner` |
//! | Parties never verify their own sale | `invariant_verifier_eligible` |
//! | Completion is terminal | `invariant_not_completed` |
//! | All-or-nothing transitions | `EstateLedger` commit-then-emit |
//!
//! ## Module Structure
//!
//! ```text
//! estate-ledger/
//! ├── domain/          # Records, policies, invariants, pure transitions
//! ├── events.rs        # EstateEvent, EventRecord, EventFilter
//! ├── ports/           # RegistryApi, EscrowApi, RentalApi, RecordStore, EventSink
//! ├── adapters/        # InMemoryRecordStore, EventLog, RecordIndex
//! ├── config.rs        # EstateConfig (TOML + environment)
//! └── service.rs       # EstateLedger
//! ```
//!
//! ## Example
//!
//! ```
//! use estate_ledger::prelude::*;
//!
//! let (mut ledger, log) = create_in_memory_ledger(EstateConfig::default()).unwrap();
//! let owner = Address::new([1u8; 20]);
//! let property = ledger
//!     .create_property(
//!         owner,
//!         PropertyDetails {
//!             location: b"12 Harbour Rd".to_vec(),
//!             size: 120,
//!             price: 1_000,
//!             documents: Vec::new(),
//!         },
//!     )
//!     .unwrap();
//! assert!(property.is_for_sale);
//! assert_eq!(log.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    EventLog, InMemoryRecordStore, RecordIndex, Subscription, SubscriptionError,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use config::{ConfigError, EstateConfig};
pub use domain::{
    Address, AgreementId, ErrorKind, EstateError, FeePolicy, Payment, Property, PropertyDetails,
    PropertyId, RentalAgreement, Transaction, TransactionId, TransactionStatus,
    VerificationPolicy, RENT_PERIOD_SECS,
};
pub use events::{EstateEvent, EventFilter, EventRecord, EventTopic};
pub use ports::{
    ChangeSet, EscrowApi, EventSink, RecordStore, RegistryApi, RentalApi, StoreError,
};
pub use service::{create_in_memory_ledger, EstateLedger, InMemoryLedger, LedgerStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything an embedder needs to drive a ledger.
pub mod prelude {
    pub use crate::config::EstateConfig;
    pub use crate::domain::{
        Address, AgreementId, ErrorKind, EstateError, FeePolicy, Payment, Property,
        PropertyDetails, PropertyId, RentalAgreement, Transaction, TransactionId,
        TransactionStatus, VerificationPolicy,
    };
    pub use crate::events::{EstateEvent, EventFilter, EventTopic};
    pub use crate::ports::{EscrowApi, RegistryApi, RentalApi};
    pub use crate::service::{create_in_memory_ledger, EstateLedger, InMemoryLedger};
}
