//! # Domain Errors
//!
//! Every failure aborts the whole operation: no record field is mutated and no
//! event is emitted. Callers branch on [`EstateError::kind`].

use super::value_objects::{Address, AgreementId, PropertyId, TransactionId};
use crate::ports::outbound::StoreError;
use thiserror::Error;

/// Classified failure kinds exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller is not the recorded owner.
    NotOwner,
    /// Payment does not cover the required amount.
    InsufficientFunds,
    /// Sale has not reached its verification threshold.
    TransactionNotVerified,
    /// Property is not listed for sale.
    PropertyNotAvailable,
    /// Buyer or seller tried to verify their own sale.
    UnauthorizedVerifier,
    /// Verifier already attested this sale.
    DuplicateVerification,
    /// Rental agreement has ended.
    AgreementNotActive,
    /// Sale is already completed.
    TransactionAlreadyCompleted,
    /// Referenced record does not exist.
    NotFound,
    /// Escrow credit would overflow.
    BalanceOverflow,
    /// Record store failure.
    Store,
}

/// Estate ledger error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EstateError {
    /// Caller is not the recorded owner of the record.
    #[error("Not owner: caller {caller} is not owner {owner}")]
    NotOwner {
        /// Principal that made the call.
        caller: Address,
        /// Recorded owner.
        owner: Address,
    },

    /// Payment value below the required amount.
    #[error("Insufficient funds: required {required}, provided {provided}")]
    InsufficientFunds {
        /// Amount the operation requires.
        required: u64,
        /// Amount the payment carries.
        provided: u64,
    },

    /// Sale has not been verified.
    #[error("Transaction not verified: {0:?}")]
    TransactionNotVerified(TransactionId),

    /// Property is not for sale.
    #[error("Property not available for sale: {0:?}")]
    PropertyNotAvailable(PropertyId),

    /// Verifier is a party to the sale.
    #[error("Unauthorized verifier: {0}")]
    UnauthorizedVerifier(Address),

    /// Verifier already attested.
    #[error("Duplicate verification by {0}")]
    DuplicateVerification(Address),

    /// Agreement is no longer active.
    #[error("Rental agreement not active: {0:?}")]
    AgreementNotActive(AgreementId),

    /// Sale already reached its terminal state.
    #[error("Transaction already completed: {0:?}")]
    TransactionAlreadyCompleted(TransactionId),

    /// Property not found.
    #[error("Property not found: {0:?}")]
    PropertyNotFound(PropertyId),

    /// Transaction not found.
    #[error("Transaction not found: {0:?}")]
    TransactionNotFound(TransactionId),

    /// Rental agreement not found.
    #[error("Rental agreement not found: {0:?}")]
    AgreementNotFound(AgreementId),

    /// Crediting the balance would overflow.
    #[error("Balance overflow: {balance} + {credit}")]
    BalanceOverflow {
        /// Current balance.
        balance: u64,
        /// Credit that was attempted.
        credit: u64,
    },

    /// Record store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl EstateError {
    /// Stable classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } => ErrorKind::NotOwner,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::TransactionNotVerified(_) => ErrorKind::TransactionNotVerified,
            Self::PropertyNotAvailable(_) => ErrorKind::PropertyNotAvailable,
            Self::UnauthorizedVerifier(_) => ErrorKind::UnauthorizedVerifier,
            Self::DuplicateVerification(_) => ErrorKind::DuplicateVerification,
            Self::AgreementNotActive(_) => ErrorKind::AgreementNotActive,
            Self::TransactionAlreadyCompleted(_) => ErrorKind::TransactionAlreadyCompleted,
            Self::PropertyNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::AgreementNotFound(_) => ErrorKind::NotFound,
            Self::BalanceOverflow { .. } => ErrorKind::BalanceOverflow,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Returns true if the caller can succeed by correcting its inputs
    /// (more funds, a different verifier, waiting for verification).
    #[must_use]
    pub fn is_correctable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InsufficientFunds
                | ErrorKind::TransactionNotVerified
                | ErrorKind::DuplicateVerification
                | ErrorKind::UnauthorizedVerifier
        )
    }
}
