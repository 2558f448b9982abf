// Error types for the transfer flow
use std::fmt;

use ethers::types::U256;

use crate::flow::state::TransferPhase;
use crate::units::format_amount;

#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    // Precondition failures - rejected before any submission
    NoAccount,
    InvalidAmount(String),
    InsufficientBalance { available: U256, required: U256 },
    TransferInFlight(TransferPhase),

    // Signer rejection - the user declined the signature prompt
    SignerRejected(String),

    // On-chain revert - included but rejected by the contract.
    // Indistinguishable from any other on-chain rejection at this layer.
    Reverted(Option<String>),

    // Network/provider failure - the request never completed
    Provider(String),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAccount => write!(f, "No wallet connected"),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            Self::InsufficientBalance { available, required } => {
                write!(
                    f,
                    "Insufficient balance: have {}, need {}",
                    format_amount(*available),
                    format_amount(*required)
                )
            }
            Self::TransferInFlight(phase) => {
                write!(f, "Transfer already in flight (phase: {})", phase)
            }
            // Surfaced verbatim, the signer's message is user-facing
            Self::SignerRejected(msg) => write!(f, "{}", msg),
            Self::Reverted(Some(reason)) => write!(f, "Transaction reverted: {}", reason),
            Self::Reverted(None) => write!(f, "Transaction reverted on-chain"),
            Self::Provider(msg) => write!(f, "Provider error: {}", msg),
        }
    }
}

impl std::error::Error for FlowError {}

// Error code mapping for diagnostics and structured display
impl FlowError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoAccount => "NO_ACCOUNT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::TransferInFlight(_) => "TRANSFER_IN_FLIGHT",
            Self::SignerRejected(_) => "SIGNER_REJECTED",
            Self::Reverted(_) => "TX_REVERTED",
            Self::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Errors the user caused and can fix by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NoAccount
                | Self::InvalidAmount(_)
                | Self::InsufficientBalance { .. }
                | Self::TransferInFlight(_)
                | Self::SignerRejected(_)
        )
    }

    /// Errors where re-submitting the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Precondition failures never reach the network and never move
    /// the flow out of its current phase.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoAccount
                | Self::InvalidAmount(_)
                | Self::InsufficientBalance { .. }
                | Self::TransferInFlight(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = FlowError::InsufficientBalance {
            available: U256::from(5u64) * U256::exp10(18),
            required: U256::from(10u64) * U256::exp10(18),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert!(err.is_user_error());
        assert!(err.is_precondition());
        assert!(!err.is_retryable());

        let err2 = FlowError::Provider("connection refused".to_string());
        assert_eq!(err2.error_code(), "PROVIDER_ERROR");
        assert!(err2.is_retryable());
        assert!(!err2.is_user_error());
        assert!(!err2.is_precondition());
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = FlowError::InsufficientBalance {
            available: U256::from(5u64) * U256::exp10(18),
            required: U256::from(10u64) * U256::exp10(18),
        };
        assert_eq!(err.to_string(), "Insufficient balance: have 5, need 10");
    }

    #[test]
    fn test_signer_rejection_is_verbatim() {
        let err = FlowError::SignerRejected("User rejected the request.".to_string());
        assert_eq!(err.to_string(), "User rejected the request.");
        assert!(err.is_user_error());
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_revert_display() {
        assert_eq!(
            FlowError::Reverted(None).to_string(),
            "Transaction reverted on-chain"
        );
        assert_eq!(
            FlowError::Reverted(Some("ERC20: insufficient allowance".to_string())).to_string(),
            "Transaction reverted: ERC20: insufficient allowance"
        );
    }
}
