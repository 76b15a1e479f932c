//! # Outbound Ports (Driven Ports)
//!
//! Collaborators the ledger depends on: record storage owned by the host and
//! the write-only event log.

use crate::domain::entities::{Property, RentalAgreement, Transaction};
use crate::domain::value_objects::{AgreementId, PropertyId, TransactionId};
use crate::events::EstateEvent;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend cannot be reached.
    #[error("store unavailable")]
    Unavailable,

    /// Commit rejected as a whole.
    #[error("commit rejected: {0}")]
    CommitRejected(String),
}

/// Every record write produced by one operation.
///
/// A store applies a change set all at once or not at all.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Properties to insert or replace.
    pub properties: Vec<Property>,
    /// Transactions to insert or replace.
    pub transactions: Vec<Transaction>,
    /// Agreements to insert or replace.
    pub agreements: Vec<RentalAgreement>,
}

impl ChangeSet {
    /// Empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property write.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a transaction write.
    pub fn with_transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    /// Add an agreement write.
    pub fn with_agreement(mut self, agreement: RentalAgreement) -> Self {
        self.agreements.push(agreement);
        self
    }

    /// Number of record writes.
    pub fn len(&self) -> usize {
        self.properties.len() + self.transactions.len() + self.agreements.len()
    }

    /// True if no record is written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Host-owned record storage.
///
/// The host serializes mutations per record; the ledger assumes at most one
/// in-flight mutation on any record it reads.
pub trait RecordStore: Send + Sync {
    /// Load a property.
    fn property(&self, id: PropertyId) -> Result<Option<Property>, StoreError>;

    /// Load a transaction.
    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError>;

    /// Load a rental agreement.
    fn agreement(&self, id: AgreementId) -> Result<Option<RentalAgreement>, StoreError>;

    /// Apply every write in `changes` atomically.
    fn commit(&mut self, changes: ChangeSet) -> Result<(), StoreError>;
}

/// Write-only sink for ledger events.
///
/// Emission cannot fail from the ledger's point of view: once a change set is
/// committed its event is handed over.
pub trait EventSink: Send + Sync {
    /// Append one event. Returns its sequence number.
    fn emit(&self, event: EstateEvent) -> u64;
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: EstateEvent) -> u64 {
        (**self).emit(event)
    }
}
