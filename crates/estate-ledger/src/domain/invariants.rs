//! # Domain Invariants
//!
//! Precondition checks shared by the registry, escrow and rental ledger.
//! Every check is side-effect free so a transition can run all of them before
//! touching any field.

use super::entities::{Property, RentalAgreement, Transaction};
use super::errors::EstateError;
use super::value_objects::{Address, Payment};

// =============================================================================
// OWNERSHIP-GATED MUTATION
// =============================================================================

/// A record with a recorded owner.
pub trait Owned {
    /// The principal allowed to mutate this record.
    fn owner(&self) -> Address;
}

impl Owned for Property {
    fn owner(&self) -> Address {
        self.owner
    }
}

impl Owned for RentalAgreement {
    fn owner(&self) -> Address {
        self.owner
    }
}

/// Outcome of an authorization check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    /// Caller is the recorded owner.
    Allow,
    /// Caller is someone else.
    Deny {
        /// Recorded owner.
        owner: Address,
    },
}

impl Authorization {
    /// Convert a denial into [`EstateError::NotOwner`].
    pub fn into_result(self, caller: Address) -> Result<(), EstateError> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny { owner } => Err(EstateError::NotOwner { caller, owner }),
        }
    }
}

/// Single authorization check applied to every ownership-gated operation.
pub fn authorize<R: Owned + ?Sized>(caller: Address, record: &R) -> Authorization {
    let owner = record.owner();
    if caller == owner {
        Authorization::Allow
    } else {
        Authorization::Deny { owner }
    }
}

/// Invariant: only the recorded owner mutates the record.
pub fn invariant_owner<R: Owned + ?Sized>(caller: Address, record: &R) -> Result<(), EstateError> {
    authorize(caller, record).into_result(caller)
}

// =============================================================================
// ESCROW
// =============================================================================

/// Invariant: a verifier is neither party to the sale nor a repeat attester.
pub fn invariant_verifier_eligible(tx: &Transaction, verifier: &Address) -> Result<(), EstateError> {
    if tx.is_party(verifier) {
        return Err(EstateError::UnauthorizedVerifier(*verifier));
    }
    if tx.has_verifier(verifier) {
        return Err(EstateError::DuplicateVerification(*verifier));
    }
    Ok(())
}

/// Invariant: completed sales are terminal.
pub fn invariant_not_completed(tx: &Transaction) -> Result<(), EstateError> {
    if tx.is_completed {
        return Err(EstateError::TransactionAlreadyCompleted(tx.id));
    }
    Ok(())
}

/// Invariant: payment covers the required amount.
pub fn invariant_sufficient_payment(payment: Payment, required: u64) -> Result<(), EstateError> {
    if !payment.covers(required) {
        return Err(EstateError::InsufficientFunds {
            required,
            provided: payment.value,
        });
    }
    Ok(())
}

/// Invariant: ownership changes only when verified, fully paid and listed,
/// and only by a sale opened by the current owner.
///
/// Checked in the order terminal state, seller, verification, funds,
/// availability.
pub fn invariant_completion_allowed(
    tx: &Transaction,
    property: &Property,
    payment: Payment,
) -> Result<(), EstateError> {
    invariant_not_completed(tx)?;
    if tx.seller != property.owner {
        return Err(EstateError::PropertyNotAvailable(property.id));
    }
    if !tx.is_verified {
        return Err(EstateError::TransactionNotVerified(tx.id));
    }
    invariant_sufficient_payment(payment, tx.amount)?;
    if !property.is_for_sale {
        return Err(EstateError::PropertyNotAvailable(property.id));
    }
    Ok(())
}

/// Escrow credit with overflow detection.
pub fn checked_credit(balance: u64, credit: u64) -> Result<u64, EstateError> {
    balance
        .checked_add(credit)
        .ok_or(EstateError::BalanceOverflow { balance, credit })
}

// =============================================================================
// RENTAL
// =============================================================================

/// Invariant: ended agreements accept no further mutation.
pub fn invariant_agreement_active(agreement: &RentalAgreement) -> Result<(), EstateError> {
    if !agreement.is_active {
        return Err(EstateError::AgreementNotActive(agreement.id));
    }
    Ok(())
}
