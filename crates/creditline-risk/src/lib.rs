use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const STELLAR_ACCOUNT_LENGTH: usize = 56;
const STELLAR_ACCOUNT_PREFIX: char = 'G';
const PLACEHOLDER_MESSAGE: &str = "Risk scoring is not yet implemented; placeholder evaluation returned.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RiskError {
    #[error("walletAddress is required")]
    MissingWalletAddress,

    #[error("invalid wallet address '{address}': {reason}")]
    InvalidWalletAddress { address: String, reason: &'static str },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEvaluation {
    pub wallet_address: String,
    pub score: u8,
    pub risk_level: RiskLevel,
    pub credit_limit: Decimal,
    pub interest_rate_bps: u32,
    pub message: String,
    pub evaluated_at: DateTime<Utc>,
}

/// Returns a placeholder evaluation for a well-formed Stellar account.
/// No scoring is performed.
pub fn evaluate_wallet(address: &str) -> Result<RiskEvaluation, RiskError> {
    let address = address.trim();
    validate_wallet_address(address)?;

    info!(wallet_address = %address, "returning placeholder risk evaluation");

    Ok(RiskEvaluation {
        wallet_address: address.to_string(),
        score: 0,
        risk_level: RiskLevel::Low,
        credit_limit: Decimal::ZERO,
        interest_rate_bps: 0,
        message: PLACEHOLDER_MESSAGE.to_string(),
        evaluated_at: Utc::now(),
    })
}

/// Checks the shape of a Stellar public account key (`G...`, 56 chars,
/// base32 alphabet). The checksum is not verified.
pub fn validate_wallet_address(address: &str) -> Result<(), RiskError> {
    if address.is_empty() {
        return Err(RiskError::MissingWalletAddress);
    }

    let invalid = |reason| RiskError::InvalidWalletAddress {
        address: address.to_string(),
        reason,
    };

    if !address.starts_with(STELLAR_ACCOUNT_PREFIX) {
        return Err(invalid("must start with 'G'"));
    }
    if address.len() != STELLAR_ACCOUNT_LENGTH {
        return Err(invalid("must be 56 characters long"));
    }
    if !address
        .chars()
        .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c))
    {
        return Err(invalid("must use the base32 alphabet (A-Z, 2-7)"));
    }

    Ok(())
}
