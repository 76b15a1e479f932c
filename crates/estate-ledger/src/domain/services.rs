//! # Domain Services
//!
//! Pure state transitions for the registry, escrow and rental ledger.
//!
//! Each transition runs every precondition check first and only then mutates
//! the records it was handed. A returned error therefore guarantees the
//! records are untouched.

use super::entities::{Property, PropertyDetails, RentalAgreement, Transaction};
use super::errors::EstateError;
use super::invariants::{
    checked_credit, invariant_agreement_active, invariant_completion_allowed,
    invariant_not_completed, invariant_owner, invariant_sufficient_payment,
    invariant_verifier_eligible,
};
use super::policy::VerificationPolicy;
use super::value_objects::{Address, Payment};
use sha2::{Digest, Sha256};

// =============================================================================
// IDENTITY
// =============================================================================

/// Domain tags separating the identity spaces of the three record kinds.
pub mod id_tags {
    /// Property identities.
    pub const PROPERTY: &[u8] = b"estate.property";
    /// Transaction identities.
    pub const TRANSACTION: &[u8] = b"estate.transaction";
    /// Rental agreement identities.
    pub const AGREEMENT: &[u8] = b"estate.agreement";
}

/// Derive a record identity from a domain tag and an allocation sequence.
pub fn derive_record_id(tag: &[u8], sequence: u64) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(tag);
    hasher.update(sequence.to_be_bytes());
    hasher.finalize().into()
}

// =============================================================================
// PROPERTY REGISTRY
// =============================================================================

/// List a property at `price`.
pub fn list_for_sale(property: &mut Property, caller: Address, price: u64) -> Result<(), EstateError> {
    invariant_owner(caller, property)?;
    property.is_for_sale = true;
    property.price = price;
    Ok(())
}

/// Withdraw a property from sale.
pub fn delist(property: &mut Property, caller: Address) -> Result<(), EstateError> {
    invariant_owner(caller, property)?;
    property.is_for_sale = false;
    Ok(())
}

/// Replace the descriptive fields of a property.
pub fn update_details(
    property: &mut Property,
    caller: Address,
    details: PropertyDetails,
) -> Result<(), EstateError> {
    invariant_owner(caller, property)?;
    property.apply_details(details);
    Ok(())
}

/// Flat-rate placeholder tax: one percent of the asking price, truncated.
pub fn calculate_property_tax(property: &Property) -> u64 {
    property.price / 100
}

// =============================================================================
// TRANSACTION ESCROW
// =============================================================================

/// Result of a successful verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Distinct verifiers after this attestation.
    pub verifier_count: usize,
    /// Score after this attestation.
    pub score: u64,
    /// True only on the attestation that crossed the threshold.
    pub newly_verified: bool,
}

/// Record an attestation from `verifier`.
pub fn record_verification(
    tx: &mut Transaction,
    verifier: Address,
    reputation_weight: u64,
    policy: &VerificationPolicy,
) -> Result<VerificationOutcome, EstateError> {
    invariant_not_completed(tx)?;
    invariant_verifier_eligible(tx, &verifier)?;

    let score = tx
        .verification_score
        .saturating_add(policy.score_for(reputation_weight));
    let newly_verified = !tx.is_verified && policy.is_satisfied(score);

    tx.verifiers.push(verifier);
    tx.verification_score = score;
    if newly_verified {
        tx.is_verified = true;
    }

    Ok(VerificationOutcome {
        verifier_count: tx.verifiers.len(),
        score,
        newly_verified,
    })
}

/// Hand the property to the buyer against `payment`.
///
/// The caller must be the property's recorded owner, and the sale must have
/// been opened by that owner. The whole payment is credited to escrow; no
/// change is returned.
pub fn complete_sale(
    tx: &mut Transaction,
    property: &mut Property,
    caller: Address,
    payment: Payment,
) -> Result<u64, EstateError> {
    if property.id != tx.property_id {
        return Err(EstateError::PropertyNotFound(tx.property_id));
    }
    invariant_owner(caller, property)?;
    invariant_completion_allowed(tx, property, payment)?;
    let balance = checked_credit(property.balance, payment.value)?;

    property.owner = tx.buyer;
    property.is_for_sale = false;
    property.balance = balance;
    tx.is_completed = true;
    Ok(balance)
}

// =============================================================================
// RENTAL LEDGER
// =============================================================================

/// Result of an accepted rent payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RentReceipt {
    /// Due date after the payment.
    pub new_due_date: u64,
    /// Property escrow balance after the payment.
    pub balance: u64,
}

/// Accept a rent payment and push the due date one period forward.
pub fn accept_rent(
    agreement: &mut RentalAgreement,
    property: &mut Property,
    payment: Payment,
    period_secs: u64,
) -> Result<RentReceipt, EstateError> {
    if property.id != agreement.property_id {
        return Err(EstateError::PropertyNotFound(agreement.property_id));
    }
    invariant_agreement_active(agreement)?;
    invariant_sufficient_payment(payment, agreement.rent_amount)?;
    let balance = checked_credit(property.balance, payment.value)?;
    let new_due_date = agreement.due_date.saturating_add(period_secs);

    property.balance = balance;
    agreement.due_date = new_due_date;
    Ok(RentReceipt {
        new_due_date,
        balance,
    })
}

/// End an agreement. A second call aborts with `AgreementNotActive`.
pub fn end_agreement(agreement: &mut RentalAgreement, caller: Address) -> Result<(), EstateError> {
    invariant_owner(caller, agreement)?;
    invariant_agreement_active(agreement)?;
    agreement.is_active = false;
    Ok(())
}
