//! Collaborator interfaces consumed by the transfer flow
//!
//! The controller never talks to the chain directly; it goes through these
//! traits so the flow can be driven against mocks in tests.

use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::chain::types::{TxHandle, TxOutcome, UserStats, VaultTotals};
use crate::flow::errors::FlowError;

/// Wallet connector - supplies the active account and submits signed
/// transactions.
///
/// Submissions return as soon as the transaction is accepted by the signer
/// and handed to the network; confirmation is a separate wait on
/// `await_receipt`. A submission may fail before any handle exists
/// (signer rejection, provider failure).
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// The connected account, if any
    fn account(&self) -> Option<Address>;

    /// Submit `approve(spender, amount)` on the token contract
    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle, FlowError>;

    /// Submit `deposit(amount, receiver)` on the vault
    async fn deposit(&self, amount: U256, receiver: Address) -> Result<TxHandle, FlowError>;

    /// Submit `withdraw(amount, receiver, owner)` on the vault
    async fn withdraw(
        &self,
        amount: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHandle, FlowError>;

    /// Wait for the receipt of a submitted transaction.
    ///
    /// No timeout is applied here; an unresponsive provider keeps the
    /// caller suspended until it errors or the receipt lands.
    async fn await_receipt(&self, handle: TxHandle) -> Result<TxOutcome, FlowError>;

    /// Connector name for logging
    fn name(&self) -> &str;
}

/// Chain reader - contract view functions, polled by the balance poller
/// and read once per flow for preconditions.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Token `balanceOf(account)`
    async fn token_balance(&self, account: Address) -> Result<U256, FlowError>;

    /// Vault totals: totalAssets, totalYieldGenerated,
    /// totalDonatedToPublicGoods, estimatedAPY
    async fn vault_totals(&self) -> Result<VaultTotals, FlowError>;

    /// Vault `getUserStats(account)`
    async fn user_stats(&self, account: Address) -> Result<UserStats, FlowError>;
}

/// Hook the controller fires exactly once after a settled transfer so the
/// displayed balances catch up without waiting for the next poll tick.
pub trait BalanceRefresh: Send + Sync {
    fn request_refresh(&self);
}
