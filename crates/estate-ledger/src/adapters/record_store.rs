//! In-memory record store.
//!
//! Implements the `RecordStore` port. A production host backs this with its
//! own object store; the in-memory version is used by tests and embedders.

use crate::domain::entities::{Property, RentalAgreement, Transaction};
use crate::domain::value_objects::{AgreementId, PropertyId, TransactionId};
use crate::ports::outbound::{ChangeSet, RecordStore, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    properties: HashMap<PropertyId, Property>,
    transactions: HashMap<TransactionId, Transaction>,
    agreements: HashMap<AgreementId, RentalAgreement>,
}

/// In-memory record store.
///
/// Cloning yields another handle onto the same tables, so a host can keep a
/// read handle while the ledger owns the writer.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored properties.
    pub fn property_count(&self) -> usize {
        self.tables.read().properties.len()
    }

    /// Number of stored transactions.
    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }

    /// Number of stored agreements.
    pub fn agreement_count(&self) -> usize {
        self.tables.read().agreements.len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn property(&self, id: PropertyId) -> Result<Option<Property>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().properties.get(&id).cloned())
    }

    fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().transactions.get(&id).cloned())
    }

    fn agreement(&self, id: AgreementId) -> Result<Option<RentalAgreement>, StoreError> {
        self.check_available()?;
        Ok(self.tables.read().agreements.get(&id).cloned())
    }

    fn commit(&mut self, changes: ChangeSet) -> Result<(), StoreError> {
        self.check_available()?;
        debug!(writes = changes.len(), "Committing change set");

        let mut tables = self.tables.write();
        for property in changes.properties {
            tables.properties.insert(property.id, property);
        }
        for tx in changes.transactions {
            tables.transactions.insert(tx.id, tx);
        }
        for agreement in changes.agreements {
            tables.agreements.insert(agreement.id, agreement);
        }
        Ok(())
    }
}
