//! Types shared by the wallet and chain-reader interfaces

use std::fmt;

use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

use crate::units::{format_amount, format_bps};

/// Opaque reference to a submitted blockchain transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(H256);

impl TxHandle {
    pub fn new(hash: H256) -> Self {
        Self(hash)
    }

    pub fn hash(&self) -> H256 {
        self.0
    }

    /// Abbreviated form for inline status text, e.g. "0x12345678..."
    pub fn short(&self) -> String {
        let full = format!("{:#x}", self.0);
        format!("{}...", &full[..10])
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Confirmation result of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    pub success: bool,
    /// Rarely populated; most providers report reverts without a reason
    pub revert_reason: Option<String>,
}

impl TxOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            revert_reason: None,
        }
    }

    pub fn reverted(reason: Option<String>) -> Self {
        Self {
            success: false,
            revert_reason: reason,
        }
    }
}

/// Vault-wide view values, all scaled by 10^18 except the APY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultTotals {
    pub total_assets: U256,
    pub total_yield: U256,
    pub total_donated: U256,
    /// estimatedAPY() returns basis points
    pub apy_bps: U256,
}

impl VaultTotals {
    pub fn apy_percent(&self) -> String {
        format_bps(self.apy_bps)
    }
}

/// Per-account statistics from the vault's getUserStats view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub deposited: U256,
    pub current_value: U256,
    pub yield_contribution: U256,
    pub education_level: u64,
    pub days_active: u64,
    pub shares_owned: U256,
}

impl UserStats {
    pub fn deposited_display(&self) -> String {
        format_amount(self.deposited)
    }

    pub fn current_value_display(&self) -> String {
        format_amount(self.current_value)
    }
}

/// Deployed contract addresses consumed by the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    /// Mock stablecoin (ERC-20 surface: approve, balanceOf, mint)
    pub token: Address,
    /// Vault (deposit, withdraw, view functions)
    pub vault: Address,
}

impl ContractAddresses {
    pub fn parse(token: &str, vault: &str) -> Result<Self, String> {
        let token = token
            .parse::<Address>()
            .map_err(|e| format!("Invalid token address {}: {}", token, e))?;
        let vault = vault
            .parse::<Address>()
            .map_err(|e| format!("Invalid vault address {}: {}", vault, e))?;
        Ok(Self { token, vault })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_handle_short() {
        let handle = TxHandle::new(H256::from_low_u64_be(0x1234));
        let short = handle.short();
        assert!(short.starts_with("0x"));
        assert!(short.ends_with("..."));
        assert_eq!(short.len(), 13);
    }

    #[test]
    fn test_contract_addresses_parse() {
        let addrs = ContractAddresses::parse(
            "0x5C159EC2e979F7e2ddff8b5BDd23e7846133CcA3",
            "0x0000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(addrs.vault, Address::from_low_u64_be(1));

        assert!(ContractAddresses::parse("not-an-address", "also-bad").is_err());
    }

    #[test]
    fn test_apy_percent() {
        let totals = VaultTotals {
            apy_bps: U256::from(850u64),
            ..Default::default()
        };
        assert_eq!(totals.apy_percent(), "8.50");
    }
}
