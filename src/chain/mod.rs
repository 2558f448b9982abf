//! On-chain collaborators: wallet connector, chain reader, balance poller

pub mod balance;
pub mod contracts;
pub mod eth;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use balance::BalancePoller;
pub use eth::{EthReader, EthWallet};
pub use traits::{BalanceRefresh, ChainReader, WalletConnector};
pub use types::{ContractAddresses, TxHandle, TxOutcome, UserStats, VaultTotals};
