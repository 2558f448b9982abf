//! Core types for the transfer flow

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::chain::types::TxHandle;
use crate::flow::state::TransferPhase;

/// Direction of a vault transfer
///
/// Uses strum for String conversion:
/// - `direction.as_ref()` -> &str "deposit" (zero-alloc)
/// - `direction.to_string()` -> String "deposit"
/// - `"deposit".parse::<TransferDirection>()` -> Result<TransferDirection>
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransferDirection {
    Deposit,
    Withdraw,
}

/// A validated transfer request, created per user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub direction: TransferDirection,
    /// Amount scaled by 10^18
    pub amount: U256,
    /// Connected wallet address, required non-null
    pub account: Address,
}

/// Point-in-time copy of the controller state, for display and assertions
#[derive(Debug, Clone)]
pub struct FlowSnapshot {
    pub phase: TransferPhase,
    pub direction: Option<TransferDirection>,
    pub approval_handle: Option<TxHandle>,
    pub action_handle: Option<TxHandle>,
    /// User input retained across a failure so the flow can be retried
    pub amount_input: Option<String>,
    pub last_error: Option<String>,
}

impl FlowSnapshot {
    /// Handle/phase pairing invariant: the approval handle lives only
    /// through the approval leg, the action handle only through the action
    /// leg, and never both at once.
    pub fn invariant_holds(&self) -> bool {
        let approval_ok = match self.phase {
            TransferPhase::AwaitingApproval | TransferPhase::ApprovalConfirmed => true,
            _ => self.approval_handle.is_none(),
        };
        let action_ok = match self.phase {
            TransferPhase::AwaitingAction | TransferPhase::ActionConfirmed => true,
            _ => self.action_handle.is_none(),
        };
        let at_most_one = !(self.approval_handle.is_some() && self.action_handle.is_some());
        approval_ok && action_ok && at_most_one
    }
}
