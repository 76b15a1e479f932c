//! # Ledger Configuration
//!
//! Policy choices fixed when a ledger is constructed.
//!
//! # Config File Format
//!
//! ```toml
//! [verification]
//! policy = "count"        # or "reputation"
//! threshold = 2
//!
//! [rental]
//! period_secs = 2592000
//!
//! [fees]
//! transaction_fee = 0
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::domain::policy::{
    FeePolicy, VerificationPolicy, DEFAULT_COUNT_THRESHOLD, DEFAULT_REPUTATION_THRESHOLD,
};
use crate::domain::value_objects::RENT_PERIOD_SECS;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read {path}: {error}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error.
        error: String,
    },

    /// Config file is not valid TOML or has wrong types.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Unknown verification policy name.
    #[error("unknown verification policy: {0} (expected \"count\" or \"reputation\")")]
    UnknownPolicy(String),

    /// Environment override could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },

    /// Rent period of zero would never advance due dates.
    #[error("rent period must be non-zero")]
    ZeroRentPeriod,

    /// Reputation threshold of zero verifies every sale on first attestation.
    #[error("reputation threshold must be non-zero")]
    ZeroReputationThreshold,
}

/// Complete ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EstateConfig {
    /// Active verification policy.
    pub verification: VerificationPolicy,
    /// Seconds a rent payment pushes the due date forward.
    pub rent_period_secs: u64,
    /// Transaction fee policy.
    pub fees: FeePolicy,
}

impl Default for EstateConfig {
    fn default() -> Self {
        Self {
            verification: VerificationPolicy::default(),
            rent_period_secs: RENT_PERIOD_SECS,
            fees: FeePolicy::DISABLED,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    verification: VerificationSection,
    #[serde(default)]
    rental: RentalSection,
    #[serde(default)]
    fees: FeesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VerificationSection {
    policy: Option<String>,
    threshold: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RentalSection {
    period_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeesSection {
    transaction_fee: Option<u64>,
}

/// Build a policy from its config name and optional threshold.
fn policy_from_parts(name: &str, threshold: Option<u64>) -> Result<VerificationPolicy, ConfigError> {
    match name.to_ascii_lowercase().as_str() {
        "count" => Ok(VerificationPolicy::CountThreshold(
            threshold.unwrap_or(DEFAULT_COUNT_THRESHOLD),
        )),
        "reputation" => Ok(VerificationPolicy::ReputationThreshold(
            threshold.unwrap_or(DEFAULT_REPUTATION_THRESHOLD),
        )),
        other => Err(ConfigError::UnknownPolicy(other.to_string())),
    }
}

impl EstateConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let verification = policy_from_parts(
            file.verification.policy.as_deref().unwrap_or("count"),
            file.verification.threshold,
        )?;

        let config = Self {
            verification,
            rent_period_secs: file.rental.period_secs.unwrap_or(RENT_PERIOD_SECS),
            fees: FeePolicy::flat(file.fees.transaction_fee.unwrap_or(0)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment overrides.
    ///
    /// # Environment Variables
    ///
    /// - `ESTATE_VERIFICATION_POLICY`: `count` or `reputation`
    /// - `ESTATE_VERIFICATION_THRESHOLD`: policy threshold
    /// - `ESTATE_RENT_PERIOD_SECS`: rent period in seconds
    /// - `ESTATE_TRANSACTION_FEE`: flat fee per sale (0 disables)
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let threshold = parse_u64(&lookup, "ESTATE_VERIFICATION_THRESHOLD")?;
        match lookup("ESTATE_VERIFICATION_POLICY") {
            Some(name) => self.verification = policy_from_parts(&name, threshold)?,
            None => {
                if let Some(t) = threshold {
                    self.verification = policy_from_parts(self.verification.name(), Some(t))?;
                }
            }
        }
        if let Some(period) = parse_u64(&lookup, "ESTATE_RENT_PERIOD_SECS")? {
            self.rent_period_secs = period;
        }
        if let Some(fee) = parse_u64(&lookup, "ESTATE_TRANSACTION_FEE")? {
            self.fees = FeePolicy::flat(fee);
        }
        self.validate()
    }

    /// Reject configurations the ledger cannot run under.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rent_period_secs == 0 {
            return Err(ConfigError::ZeroRentPeriod);
        }
        if self.verification == VerificationPolicy::ReputationThreshold(0) {
            return Err(ConfigError::ZeroReputationThreshold);
        }
        Ok(())
    }
}

fn parse_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<u64>, ConfigError> {
    lookup(key)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value,
            })
        })
        .transpose()
}
