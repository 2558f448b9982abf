//! Transfer Flow Controller
//!
//! Drives a deposit through its two on-chain steps (token approval, then
//! vault deposit) as one logical operation, or a withdrawal through its
//! single step. One controller instance tracks at most one flow at a time;
//! separate instances are fully independent.

use std::sync::{Arc, Mutex};

use ethers::types::{Address, U256};

use crate::chain::traits::{BalanceRefresh, ChainReader, WalletConnector};
use crate::chain::types::TxHandle;
use crate::flow::errors::FlowError;
use crate::flow::state::{button_label, transition, FlowEvent, TransferPhase};
use crate::flow::types::{FlowSnapshot, TransferDirection, TransferRequest};
use crate::units;

struct FlowState {
    phase: TransferPhase,
    direction: Option<TransferDirection>,
    approval_handle: Option<TxHandle>,
    action_handle: Option<TxHandle>,
    amount_input: Option<String>,
    last_error: Option<String>,
}

impl FlowState {
    fn new() -> Self {
        Self {
            phase: TransferPhase::Idle,
            direction: None,
            approval_handle: None,
            action_handle: None,
            amount_input: None,
            last_error: None,
        }
    }
}

pub struct TransferFlowController {
    wallet: Arc<dyn WalletConnector>,
    reader: Arc<dyn ChainReader>,
    refresh: Arc<dyn BalanceRefresh>,
    /// Vault address, the approval spender
    vault: Address,
    state: Mutex<FlowState>,
}

impl TransferFlowController {
    pub fn new(
        wallet: Arc<dyn WalletConnector>,
        reader: Arc<dyn ChainReader>,
        refresh: Arc<dyn BalanceRefresh>,
        vault: Address,
    ) -> Self {
        Self {
            wallet,
            reader,
            refresh,
            vault,
            state: Mutex::new(FlowState::new()),
        }
    }

    /// Current phase, for button state selection
    pub fn phase(&self) -> TransferPhase {
        self.state.lock().unwrap().phase
    }

    /// Button label for the current phase and direction
    pub fn label(&self) -> &'static str {
        let st = self.state.lock().unwrap();
        button_label(st.phase, st.direction.unwrap_or(TransferDirection::Deposit))
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let st = self.state.lock().unwrap();
        FlowSnapshot {
            phase: st.phase,
            direction: st.direction,
            approval_handle: st.approval_handle,
            action_handle: st.action_handle,
            amount_input: st.amount_input.clone(),
            last_error: st.last_error.clone(),
        }
    }

    /// Acknowledge a terminal phase and return to idle
    pub fn reset(&self) {
        let mut st = self.state.lock().unwrap();
        st.phase = transition(st.phase, FlowEvent::Reset);
        if st.phase == TransferPhase::Idle {
            st.direction = None;
            st.approval_handle = None;
            st.action_handle = None;
            st.last_error = None;
        }
    }

    /// Deposit: approve, await the approval receipt, then deposit.
    ///
    /// The deposit transaction is never submitted before the approval
    /// receipt confirms; an insufficient-allowance revert is therefore
    /// impossible by construction.
    ///
    /// Returns the handle of the confirmed deposit transaction.
    pub async fn deposit(&self, amount: &str) -> Result<TxHandle, FlowError> {
        let request = self.validate(TransferDirection::Deposit, amount).await?;
        self.begin(&request, amount)?;

        // Approval leg, entered by begin
        let approval = match self.wallet.approve(self.vault, request.amount).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };
        self.record_approval(approval);
        log::info!(
            "approval submitted: {} (amount {})",
            approval,
            units::format_amount(request.amount)
        );

        match self.wallet.await_receipt(approval).await {
            Ok(outcome) if outcome.success => self.apply(FlowEvent::ConfirmApproval),
            Ok(outcome) => return Err(self.fail(FlowError::Reverted(outcome.revert_reason))),
            Err(e) => return Err(self.fail(e)),
        }
        log::info!("approval confirmed: {}", approval);

        // Action leg, opened only by a confirmed approval
        self.apply(FlowEvent::SubmitAction);
        let action = match self.wallet.deposit(request.amount, request.account).await {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };
        self.record_action(action);
        log::info!("deposit submitted: {}", action);

        match self.wallet.await_receipt(action).await {
            Ok(outcome) if outcome.success => {
                self.settle(action);
                Ok(action)
            }
            Ok(outcome) => Err(self.fail(FlowError::Reverted(outcome.revert_reason))),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Withdraw: a single transaction burning the caller's own vault
    /// shares, so no approval leg.
    pub async fn withdraw(&self, amount: &str) -> Result<TxHandle, FlowError> {
        let request = self.validate(TransferDirection::Withdraw, amount).await?;
        self.begin(&request, amount)?;

        let action = match self
            .wallet
            .withdraw(request.amount, request.account, request.account)
            .await
        {
            Ok(handle) => handle,
            Err(e) => return Err(self.fail(e)),
        };
        self.record_action(action);
        log::info!(
            "withdraw submitted: {} (amount {})",
            action,
            units::format_amount(request.amount)
        );

        match self.wallet.await_receipt(action).await {
            Ok(outcome) if outcome.success => {
                self.settle(action);
                Ok(action)
            }
            Ok(outcome) => Err(self.fail(FlowError::Reverted(outcome.revert_reason))),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Check preconditions. Rejections here never reach the network and
    /// leave the phase untouched.
    async fn validate(
        &self,
        direction: TransferDirection,
        amount: &str,
    ) -> Result<TransferRequest, FlowError> {
        let account = self.wallet.account().ok_or(FlowError::NoAccount)?;
        let amount = units::parse_amount(amount).map_err(FlowError::InvalidAmount)?;

        let available = self.available_balance(direction, account).await?;
        if amount > available {
            return Err(FlowError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        Ok(TransferRequest {
            direction,
            amount,
            account,
        })
    }

    /// Deposits are bounded by the wallet balance, withdrawals by the
    /// account's current value in the vault.
    async fn available_balance(
        &self,
        direction: TransferDirection,
        account: Address,
    ) -> Result<U256, FlowError> {
        match direction {
            TransferDirection::Deposit => self.reader.token_balance(account).await,
            TransferDirection::Withdraw => {
                Ok(self.reader.user_stats(account).await?.current_value)
            }
        }
    }

    /// Claim the controller for a new flow, entering its first awaiting
    /// phase under one lock so two racing callers cannot both claim it.
    /// Rejected while a previous flow is in flight; a terminal phase is
    /// reset implicitly.
    fn begin(&self, request: &TransferRequest, amount_input: &str) -> Result<(), FlowError> {
        let mut st = self.state.lock().unwrap();
        if st.phase.in_flight() {
            return Err(FlowError::TransferInFlight(st.phase));
        }
        let first = match request.direction {
            TransferDirection::Deposit => FlowEvent::SubmitApproval,
            TransferDirection::Withdraw => FlowEvent::SubmitAction,
        };
        st.phase = transition(TransferPhase::Idle, first);
        st.direction = Some(request.direction);
        st.approval_handle = None;
        st.action_handle = None;
        st.amount_input = Some(amount_input.to_string());
        st.last_error = None;

        log::info!(
            "starting {} of {} for {:?}",
            request.direction,
            units::format_amount(request.amount),
            request.account
        );
        Ok(())
    }

    fn apply(&self, event: FlowEvent) {
        let mut st = self.state.lock().unwrap();
        st.phase = transition(st.phase, event);
    }

    fn record_approval(&self, handle: TxHandle) {
        let mut st = self.state.lock().unwrap();
        debug_assert_eq!(st.phase, TransferPhase::AwaitingApproval);
        st.approval_handle = Some(handle);
    }

    fn record_action(&self, handle: TxHandle) {
        let mut st = self.state.lock().unwrap();
        debug_assert_eq!(st.phase, TransferPhase::AwaitingAction);
        // The approval leg is over once the action is submitted
        st.approval_handle = None;
        st.action_handle = Some(handle);
    }

    /// Settle a confirmed flow: clear the input, keep the confirmed
    /// handle, and request exactly one balance refresh.
    fn settle(&self, handle: TxHandle) {
        {
            let mut st = self.state.lock().unwrap();
            st.phase = transition(st.phase, FlowEvent::ConfirmAction);
            st.amount_input = None;
        }
        log::info!("transfer settled: {}", handle);
        self.refresh.request_refresh();
    }

    /// Move to Failed, retaining the input amount for retry. Returns the
    /// error so call sites can `return Err(self.fail(e))`.
    fn fail(&self, err: FlowError) -> FlowError {
        {
            let mut st = self.state.lock().unwrap();
            st.phase = transition(st.phase, FlowEvent::Fail);
            st.approval_handle = None;
            st.action_handle = None;
            st.last_error = Some(err.to_string());
        }
        log::warn!("transfer failed [{}]: {}", err.error_code(), err);
        err
    }
}
