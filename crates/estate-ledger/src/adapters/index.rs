//! Record index built from the event stream.
//!
//! The ledger cannot enumerate its own records. This index answers "what does
//! this principal own or take part in" by folding emitted events, and is
//! queried without going through the ledger.

use crate::domain::value_objects::{Address, AgreementId, PropertyId, TransactionId};
use crate::events::EstateEvent;
use std::collections::{BTreeSet, HashMap};

/// Per-principal index of record identities.
#[derive(Clone, Debug, Default)]
pub struct RecordIndex {
    owned_properties: HashMap<Address, BTreeSet<PropertyId>>,
    transactions: HashMap<Address, BTreeSet<TransactionId>>,
    agreements: HashMap<Address, BTreeSet<AgreementId>>,
    property_count: usize,
}

impl RecordIndex {
    /// Empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the index.
    pub fn apply(&mut self, event: &EstateEvent) {
        match event {
            EstateEvent::PropertyCreated {
                property_id, owner, ..
            } => {
                self.owned_properties
                    .entry(*owner)
                    .or_default()
                    .insert(*property_id);
                self.property_count += 1;
            }
            EstateEvent::TransactionCreated {
                transaction_id,
                buyer,
                seller,
                ..
            } => {
                for party in [buyer, seller] {
                    self.transactions
                        .entry(*party)
                        .or_default()
                        .insert(*transaction_id);
                }
            }
            EstateEvent::TransactionCompleted {
                property_id,
                buyer,
                seller,
                ..
            } => {
                if let Some(owned) = self.owned_properties.get_mut(seller) {
                    owned.remove(property_id);
                }
                self.owned_properties
                    .entry(*buyer)
                    .or_default()
                    .insert(*property_id);
            }
            EstateEvent::RentalAgreementCreated {
                agreement_id,
                tenant,
                owner,
                ..
            } => {
                for party in [tenant, owner] {
                    self.agreements
                        .entry(*party)
                        .or_default()
                        .insert(*agreement_id);
                }
            }
            EstateEvent::PropertyListed { .. }
            | EstateEvent::PropertyDelisted { .. }
            | EstateEvent::PropertyUpdated { .. }
            | EstateEvent::TransactionVerified { .. }
            | EstateEvent::RentPaid { .. }
            | EstateEvent::RentalAgreementEnded { .. } => {}
        }
    }

    /// Properties currently owned by `owner`.
    pub fn properties_owned_by(&self, owner: &Address) -> Vec<PropertyId> {
        collect(self.owned_properties.get(owner))
    }

    /// Sales where `party` is buyer or seller.
    pub fn transactions_for(&self, party: &Address) -> Vec<TransactionId> {
        collect(self.transactions.get(party))
    }

    /// Agreements where `party` is tenant or landlord.
    pub fn agreements_for(&self, party: &Address) -> Vec<AgreementId> {
        collect(self.agreements.get(party))
    }

    /// Every property ever registered.
    pub fn property_count(&self) -> usize {
        self.property_count
    }
}

fn collect<T: Copy + Ord>(set: Option<&BTreeSet<T>>) -> Vec<T> {
    set.map(|s| s.iter().copied().collect()).unwrap_or_default()
}
