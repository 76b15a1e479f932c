//! # Event Schema
//!
//! Typed notifications emitted after each successful state transition.
//!
//! Exactly one event is emitted per successful mutating operation and none
//! on abort. Events are append-only; the ledger never reads them back. The
//! external index (see [`crate::adapters::RecordIndex`]) is built entirely
//! from this stream.

use crate::domain::value_objects::{Address, AgreementId, PropertyId, TransactionId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ledger event payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EstateEvent {
    /// A property was registered.
    PropertyCreated {
        /// New property.
        property_id: PropertyId,
        /// Initial owner.
        owner: Address,
        /// Initial asking price.
        price: u64,
    },
    /// A property was (re)listed for sale.
    PropertyListed {
        /// Listed property.
        property_id: PropertyId,
        /// Owner at listing time.
        owner: Address,
        /// New asking price.
        price: u64,
    },
    /// A property was withdrawn from sale.
    PropertyDelisted {
        /// Delisted property.
        property_id: PropertyId,
        /// Owner at delisting time.
        owner: Address,
    },
    /// A property's descriptive fields were replaced.
    PropertyUpdated {
        /// Updated property.
        property_id: PropertyId,
        /// Owner.
        owner: Address,
        /// New size.
        size: u64,
        /// New asking price.
        price: u64,
    },
    /// A sale was opened.
    TransactionCreated {
        /// New transaction.
        transaction_id: TransactionId,
        /// Property for sale.
        property_id: PropertyId,
        /// Buyer.
        buyer: Address,
        /// Seller.
        seller: Address,
        /// Required payment.
        amount: u64,
        /// Fee collected at creation (zero when fees are disabled).
        fee_paid: u64,
    },
    /// A verifier attested a sale.
    TransactionVerified {
        /// Attested transaction.
        transaction_id: TransactionId,
        /// Attesting principal.
        verifier: Address,
        /// Distinct verifiers so far.
        verifier_count: usize,
        /// Accumulated score.
        score: u64,
        /// Verification flag after this attestation.
        is_verified: bool,
    },
    /// Ownership was handed to the buyer.
    TransactionCompleted {
        /// Completed transaction.
        transaction_id: TransactionId,
        /// Transferred property.
        property_id: PropertyId,
        /// New owner.
        buyer: Address,
        /// Previous owner.
        seller: Address,
        /// Amount credited to escrow.
        amount_paid: u64,
    },
    /// A rental agreement was opened.
    RentalAgreementCreated {
        /// New agreement.
        agreement_id: AgreementId,
        /// Rented property.
        property_id: PropertyId,
        /// Tenant.
        tenant: Address,
        /// Landlord.
        owner: Address,
        /// Rent per period.
        rent_amount: u64,
        /// First due date.
        due_date: u64,
    },
    /// Rent was accepted.
    RentPaid {
        /// Agreement paid against.
        agreement_id: AgreementId,
        /// Property credited.
        property_id: PropertyId,
        /// Principal that paid.
        payer: Address,
        /// Amount credited.
        amount: u64,
        /// Due date after payment.
        new_due_date: u64,
    },
    /// A rental agreement was ended.
    RentalAgreementEnded {
        /// Ended agreement.
        agreement_id: AgreementId,
        /// Rented property.
        property_id: PropertyId,
        /// Landlord who ended it.
        owner: Address,
    },
}

impl EstateEvent {
    /// Topic for routing.
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::PropertyCreated { .. }
            | Self::PropertyListed { .. }
            | Self::PropertyDelisted { .. }
            | Self::PropertyUpdated { .. } => EventTopic::Registry,
            Self::TransactionCreated { .. }
            | Self::TransactionVerified { .. }
            | Self::TransactionCompleted { .. } => EventTopic::Escrow,
            Self::RentalAgreementCreated { .. }
            | Self::RentPaid { .. }
            | Self::RentalAgreementEnded { .. } => EventTopic::Rental,
        }
    }

    /// Event type name, as it appears in the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PropertyCreated { .. } => "PropertyCreated",
            Self::PropertyListed { .. } => "PropertyListed",
            Self::PropertyDelisted { .. } => "PropertyDelisted",
            Self::PropertyUpdated { .. } => "PropertyUpdated",
            Self::TransactionCreated { .. } => "TransactionCreated",
            Self::TransactionVerified { .. } => "TransactionVerified",
            Self::TransactionCompleted { .. } => "TransactionCompleted",
            Self::RentalAgreementCreated { .. } => "RentalAgreementCreated",
            Self::RentPaid { .. } => "RentPaid",
            Self::RentalAgreementEnded { .. } => "RentalAgreementEnded",
        }
    }
}

/// Event routing topics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Property registry events.
    Registry,
    /// Sale escrow events.
    Escrow,
    /// Rental ledger events.
    Rental,
}

/// An event as stored in the append-only log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0.
    pub sequence: u64,
    /// Unique id for downstream de-duplication.
    pub event_id: Uuid,
    /// Payload.
    pub event: EstateEvent,
}

impl EventRecord {
    /// Wrap an event at `sequence`.
    pub fn new(sequence: u64, event: EstateEvent) -> Self {
        Self {
            sequence,
            event_id: Uuid::new_v4(),
            event,
        }
    }

    /// JSON encoding for external indexers.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Subscription filter.
#[derive(Clone, Debug, Default)]
pub struct EventFilter {
    /// Topics to receive. Empty means all.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Receive every event.
    pub fn all() -> Self {
        Self::default()
    }

    /// Receive only the given topics.
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Whether `event` passes this filter.
    pub fn matches(&self, event: &EstateEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}
