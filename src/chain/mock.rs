//! Mock collaborators for testing
//!
//! The mock wallet records every submission in order and returns scripted
//! results, so tests can assert the sequencing invariant directly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};

use crate::chain::traits::{BalanceRefresh, ChainReader, WalletConnector};
use crate::chain::types::{TxHandle, TxOutcome, UserStats, VaultTotals};
use crate::flow::errors::FlowError;

/// One recorded wallet submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Approve {
        spender: Address,
        amount: U256,
    },
    Deposit {
        amount: U256,
        receiver: Address,
    },
    Withdraw {
        amount: U256,
        receiver: Address,
        owner: Address,
    },
}

/// Mock wallet connector
pub struct MockWallet {
    account: Mutex<Option<Address>>,
    submissions: Mutex<Vec<Submission>>,
    /// Errors to return from the next matching submission
    approve_error: Mutex<Option<FlowError>>,
    action_error: Mutex<Option<FlowError>>,
    /// Scripted receipt outcomes per handle; default is success
    receipts: Mutex<HashMap<TxHandle, TxOutcome>>,
    /// Artificial receipt latency, for in-flight tests
    receipt_delay: Mutex<Duration>,
    next_hash: AtomicU64,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            account: Mutex::new(None),
            submissions: Mutex::new(Vec::new()),
            approve_error: Mutex::new(None),
            action_error: Mutex::new(None),
            receipts: Mutex::new(HashMap::new()),
            receipt_delay: Mutex::new(Duration::ZERO),
            next_hash: AtomicU64::new(1),
        }
    }

    pub fn with_account(account: Address) -> Self {
        let wallet = Self::new();
        wallet.set_account(Some(account));
        wallet
    }

    pub fn set_account(&self, account: Option<Address>) {
        *self.account.lock().unwrap() = account;
    }

    /// Fail the next approve submission with the given error
    pub fn fail_next_approve(&self, err: FlowError) {
        *self.approve_error.lock().unwrap() = Some(err);
    }

    /// Fail the next deposit/withdraw submission with the given error
    pub fn fail_next_action(&self, err: FlowError) {
        *self.action_error.lock().unwrap() = Some(err);
    }

    /// Script the receipt outcome for a future submission.
    ///
    /// Handles are issued sequentially starting at 1, so the n-th
    /// submission gets `TxHandle::new(H256::from_low_u64_be(n))`.
    pub fn set_receipt(&self, handle: TxHandle, outcome: TxOutcome) {
        self.receipts.lock().unwrap().insert(handle, outcome);
    }

    pub fn set_receipt_delay(&self, delay: Duration) {
        *self.receipt_delay.lock().unwrap() = delay;
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    /// Handle the n-th submission will receive (1-based)
    pub fn handle_for(n: u64) -> TxHandle {
        TxHandle::new(H256::from_low_u64_be(n))
    }

    fn issue_handle(&self) -> TxHandle {
        let n = self.next_hash.fetch_add(1, Ordering::SeqCst);
        TxHandle::new(H256::from_low_u64_be(n))
    }

    fn record(&self, submission: Submission) {
        self.submissions.lock().unwrap().push(submission);
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    fn account(&self) -> Option<Address> {
        *self.account.lock().unwrap()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<TxHandle, FlowError> {
        if let Some(err) = self.approve_error.lock().unwrap().take() {
            return Err(err);
        }
        self.record(Submission::Approve { spender, amount });
        let handle = self.issue_handle();
        log::debug!("[mock-wallet] approve({:?}, {}) -> {}", spender, amount, handle);
        Ok(handle)
    }

    async fn deposit(&self, amount: U256, receiver: Address) -> Result<TxHandle, FlowError> {
        if let Some(err) = self.action_error.lock().unwrap().take() {
            return Err(err);
        }
        self.record(Submission::Deposit { amount, receiver });
        let handle = self.issue_handle();
        log::debug!("[mock-wallet] deposit({}, {:?}) -> {}", amount, receiver, handle);
        Ok(handle)
    }

    async fn withdraw(
        &self,
        amount: U256,
        receiver: Address,
        owner: Address,
    ) -> Result<TxHandle, FlowError> {
        if let Some(err) = self.action_error.lock().unwrap().take() {
            return Err(err);
        }
        self.record(Submission::Withdraw {
            amount,
            receiver,
            owner,
        });
        let handle = self.issue_handle();
        log::debug!("[mock-wallet] withdraw({}) -> {}", amount, handle);
        Ok(handle)
    }

    async fn await_receipt(&self, handle: TxHandle) -> Result<TxOutcome, FlowError> {
        let delay = *self.receipt_delay.lock().unwrap();
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }
        let outcome = self
            .receipts
            .lock()
            .unwrap()
            .get(&handle)
            .cloned()
            .unwrap_or_else(TxOutcome::success);
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "mock-wallet"
    }
}

/// Mock chain reader serving configured values and counting reads
pub struct MockReader {
    token_balance: Mutex<U256>,
    totals: Mutex<VaultTotals>,
    stats: Mutex<UserStats>,
    balance_reads: AtomicUsize,
}

impl MockReader {
    pub fn new() -> Self {
        Self {
            token_balance: Mutex::new(U256::zero()),
            totals: Mutex::new(VaultTotals::default()),
            stats: Mutex::new(UserStats::default()),
            balance_reads: AtomicUsize::new(0),
        }
    }

    pub fn set_token_balance(&self, balance: U256) {
        *self.token_balance.lock().unwrap() = balance;
    }

    pub fn set_totals(&self, totals: VaultTotals) {
        *self.totals.lock().unwrap() = totals;
    }

    pub fn set_user_stats(&self, stats: UserStats) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn balance_reads(&self) -> usize {
        self.balance_reads.load(Ordering::SeqCst)
    }
}

impl Default for MockReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainReader for MockReader {
    async fn token_balance(&self, _account: Address) -> Result<U256, FlowError> {
        self.balance_reads.fetch_add(1, Ordering::SeqCst);
        Ok(*self.token_balance.lock().unwrap())
    }

    async fn vault_totals(&self) -> Result<VaultTotals, FlowError> {
        Ok(*self.totals.lock().unwrap())
    }

    async fn user_stats(&self, _account: Address) -> Result<UserStats, FlowError> {
        Ok(*self.stats.lock().unwrap())
    }
}

/// Counts refresh requests, for exactly-once assertions
pub struct MockRefresh {
    count: AtomicUsize,
}

impl MockRefresh {
    pub fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Default for MockRefresh {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceRefresh for MockRefresh {
    fn request_refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet_records_in_order() {
        let wallet = MockWallet::with_account(Address::from_low_u64_be(7));
        let spender = Address::from_low_u64_be(2);

        wallet.approve(spender, U256::from(10u64)).await.unwrap();
        wallet
            .deposit(U256::from(10u64), Address::from_low_u64_be(7))
            .await
            .unwrap();

        let subs = wallet.submissions();
        assert_eq!(subs.len(), 2);
        assert!(matches!(subs[0], Submission::Approve { .. }));
        assert!(matches!(subs[1], Submission::Deposit { .. }));
    }

    #[tokio::test]
    async fn test_mock_wallet_scripted_receipt() {
        let wallet = MockWallet::new();
        let handle = MockWallet::handle_for(1);
        wallet.set_receipt(handle, TxOutcome::reverted(None));

        let issued = wallet
            .approve(Address::zero(), U256::one())
            .await
            .unwrap();
        assert_eq!(issued, handle);

        let outcome = wallet.await_receipt(issued).await.unwrap();
        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_mock_wallet_fail_next() {
        let wallet = MockWallet::new();
        wallet.fail_next_approve(FlowError::SignerRejected("declined".to_string()));

        let result = wallet.approve(Address::zero(), U256::one()).await;
        assert!(matches!(result, Err(FlowError::SignerRejected(_))));
        assert!(wallet.submissions().is_empty());

        // The scripted error is consumed
        assert!(wallet.approve(Address::zero(), U256::one()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_reader_counts_reads() {
        let reader = MockReader::new();
        reader.set_token_balance(U256::from(42u64));

        let balance = reader.token_balance(Address::zero()).await.unwrap();
        assert_eq!(balance, U256::from(42u64));
        assert_eq!(reader.balance_reads(), 1);
    }
}
