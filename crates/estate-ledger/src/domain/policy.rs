//! # Ledger Policies
//!
//! Verification and fee policies chosen once, at configuration time.

use serde::{Deserialize, Serialize};

/// Default verifier count a sale must exceed under the count policy.
pub const DEFAULT_COUNT_THRESHOLD: u64 = 2;

/// Default reputation a sale must accumulate under the reputation policy.
pub const DEFAULT_REPUTATION_THRESHOLD: u64 = 100;

/// How a sale becomes verified.
///
/// A ledger runs exactly one policy; the score on every transaction it owns is
/// interpreted under that policy only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationPolicy {
    /// Verified once the number of distinct verifiers is strictly greater
    /// than the threshold.
    CountThreshold(u64),
    /// Verified once accumulated reputation weight is at least the threshold.
    ReputationThreshold(u64),
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::CountThreshold(DEFAULT_COUNT_THRESHOLD)
    }
}

impl VerificationPolicy {
    /// Score contributed by a single verification.
    ///
    /// The count policy ignores the supplied weight.
    #[must_use]
    pub const fn score_for(&self, reputation_weight: u64) -> u64 {
        match self {
            Self::CountThreshold(_) => 1,
            Self::ReputationThreshold(_) => reputation_weight,
        }
    }

    /// Whether an accumulated score satisfies this policy.
    #[must_use]
    pub const fn is_satisfied(&self, score: u64) -> bool {
        match self {
            Self::CountThreshold(threshold) => score > *threshold,
            Self::ReputationThreshold(threshold) => score >= *threshold,
        }
    }

    /// Configured threshold value.
    #[must_use]
    pub const fn threshold(&self) -> u64 {
        match self {
            Self::CountThreshold(t) | Self::ReputationThreshold(t) => *t,
        }
    }

    /// Short policy name used in config files and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CountThreshold(_) => "count",
            Self::ReputationThreshold(_) => "reputation",
        }
    }
}

/// Fee charged when a sale is opened.
///
/// The fee is always funded by a separate payment from the seller; a sale is
/// never charged out of its own escrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Flat fee per transaction. Zero disables collection.
    pub transaction_fee: u64,
}

impl FeePolicy {
    /// No fee collection.
    pub const DISABLED: Self = Self { transaction_fee: 0 };

    /// Flat fee per transaction.
    #[must_use]
    pub const fn flat(transaction_fee: u64) -> Self {
        Self { transaction_fee }
    }

    /// Returns true if sales must carry a fee payment.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.transaction_fee > 0
    }
}
