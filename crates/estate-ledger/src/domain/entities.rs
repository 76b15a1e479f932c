//! # Domain Entities
//!
//! The three records the ledger governs: properties, sale transactions and
//! rental agreements.

use super::value_objects::{Address, AgreementId, PropertyId, TransactionId};
use serde::{Deserialize, Serialize};

/// Descriptive fields of a property that its owner may replace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDetails {
    /// Opaque location blob.
    pub location: Vec<u8>,
    /// Size in the host's unit of area.
    pub size: u64,
    /// Asking price.
    pub price: u64,
    /// Opaque title/documents blob.
    pub documents: Vec<u8>,
}

/// A registered property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Identity.
    pub id: PropertyId,
    /// Current owner.
    pub owner: Address,
    /// Opaque location blob.
    pub location: Vec<u8>,
    /// Size.
    pub size: u64,
    /// Asking price.
    pub price: u64,
    /// Escrow credit accumulated from sales and rent. Never decreases.
    pub balance: u64,
    /// Whether the property is listed.
    pub is_for_sale: bool,
    /// Opaque documents blob.
    pub documents: Vec<u8>,
}

impl Property {
    /// New listed property with an empty escrow balance.
    pub fn new(id: PropertyId, owner: Address, details: PropertyDetails) -> Self {
        Self {
            id,
            owner,
            location: details.location,
            size: details.size,
            price: details.price,
            balance: 0,
            is_for_sale: true,
            documents: details.documents,
        }
    }

    /// Snapshot of the descriptive fields.
    pub fn details(&self) -> PropertyDetails {
        PropertyDetails {
            location: self.location.clone(),
            size: self.size,
            price: self.price,
            documents: self.documents.clone(),
        }
    }

    /// Replace the descriptive fields.
    pub fn apply_details(&mut self, details: PropertyDetails) {
        self.location = details.location;
        self.size = details.size;
        self.price = details.price;
        self.documents = details.documents;
    }
}

/// Derived lifecycle position of a sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// No verifier has attested yet.
    Created,
    /// Some attestations, threshold not yet met.
    Verifying,
    /// Threshold met, awaiting payment.
    Verified,
    /// Ownership handed off. Terminal.
    Completed,
}

impl TransactionStatus {
    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// An escrowed sale of one property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identity.
    pub id: TransactionId,
    /// Property being sold.
    pub property_id: PropertyId,
    /// Prospective owner.
    pub buyer: Address,
    /// Owner at creation time.
    pub seller: Address,
    /// Required payment.
    pub amount: u64,
    /// Distinct verifiers in attestation order.
    pub verifiers: Vec<Address>,
    /// Verifier count or accumulated reputation, per the ledger's policy.
    pub verification_score: u64,
    /// Latched once the verification threshold is met.
    pub is_verified: bool,
    /// Latched once ownership is handed off.
    pub is_completed: bool,
}

impl Transaction {
    /// New unverified sale.
    pub fn new(
        id: TransactionId,
        property_id: PropertyId,
        buyer: Address,
        seller: Address,
        amount: u64,
    ) -> Self {
        Self {
            id,
            property_id,
            buyer,
            seller,
            amount,
            verifiers: Vec::new(),
            verification_score: 0,
            is_verified: false,
            is_completed: false,
        }
    }

    /// Whether `address` is the buyer or the seller.
    pub fn is_party(&self, address: &Address) -> bool {
        self.buyer == *address || self.seller == *address
    }

    /// Whether `address` has already attested.
    pub fn has_verifier(&self, address: &Address) -> bool {
        self.verifiers.contains(address)
    }

    /// Current lifecycle position.
    pub fn status(&self) -> TransactionStatus {
        if self.is_completed {
            TransactionStatus::Completed
        } else if self.is_verified {
            TransactionStatus::Verified
        } else if self.verifiers.is_empty() {
            TransactionStatus::Created
        } else {
            TransactionStatus::Verifying
        }
    }
}

/// A recurring rental of one property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalAgreement {
    /// Identity.
    pub id: AgreementId,
    /// Rented property.
    pub property_id: PropertyId,
    /// Paying party.
    pub tenant: Address,
    /// Landlord; the only principal allowed to end the agreement.
    pub owner: Address,
    /// Minimum payment per period.
    pub rent_amount: u64,
    /// Next due date, epoch seconds.
    pub due_date: u64,
    /// One-way latch, true until ended.
    pub is_active: bool,
}

impl RentalAgreement {
    /// New active agreement.
    pub fn new(
        id: AgreementId,
        property_id: PropertyId,
        tenant: Address,
        owner: Address,
        rent_amount: u64,
        due_date: u64,
    ) -> Self {
        Self {
            id,
            property_id,
            tenant,
            owner,
            rent_amount,
            due_date,
            is_active: true,
        }
    }

    /// Whether rent is past due at `now`. Read-only; the ledger never
    /// penalizes or ends an overdue agreement on its own.
    pub fn is_overdue(&self, now: u64) -> bool {
        self.is_active && now > self.due_date
    }
}
