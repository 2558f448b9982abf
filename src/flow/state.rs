//! Transfer phase machine
//!
//! Defines the phases, events, and transition function for the
//! approve-then-act transfer flow.

use serde::{Deserialize, Serialize};

use crate::flow::types::TransferDirection;

/// Transfer flow phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPhase {
    /// No flow in progress
    Idle,
    /// Approval transaction submitted, waiting for its receipt
    AwaitingApproval,
    /// Approval receipt confirmed, action not yet submitted
    ApprovalConfirmed,
    /// Deposit or withdraw transaction submitted, waiting for its receipt
    AwaitingAction,
    /// Action receipt confirmed, flow settled
    ActionConfirmed,
    /// Submission rejected or transaction reverted
    Failed,
}

impl TransferPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPhase::Idle => "idle",
            TransferPhase::AwaitingApproval => "awaiting_approval",
            TransferPhase::ApprovalConfirmed => "approval_confirmed",
            TransferPhase::AwaitingAction => "awaiting_action",
            TransferPhase::ActionConfirmed => "action_confirmed",
            TransferPhase::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(TransferPhase::Idle),
            "awaiting_approval" => Some(TransferPhase::AwaitingApproval),
            "approval_confirmed" => Some(TransferPhase::ApprovalConfirmed),
            "awaiting_action" => Some(TransferPhase::AwaitingAction),
            "action_confirmed" => Some(TransferPhase::ActionConfirmed),
            "failed" => Some(TransferPhase::Failed),
            _ => None,
        }
    }

    /// Check if this is a terminal phase (flow finished, may be restarted)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferPhase::ActionConfirmed | TransferPhase::Failed)
    }

    /// Check if a transaction or receipt wait is outstanding.
    /// A new flow must not start while this is true.
    pub fn in_flight(&self) -> bool {
        matches!(
            self,
            TransferPhase::AwaitingApproval
                | TransferPhase::ApprovalConfirmed
                | TransferPhase::AwaitingAction
        )
    }
}

impl std::fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Flow events (inputs that trigger phase transitions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEvent {
    /// Approval transaction handed to the signer
    SubmitApproval,
    /// Approval receipt arrived with success status
    ConfirmApproval,
    /// Deposit/withdraw transaction handed to the signer
    SubmitAction,
    /// Action receipt arrived with success status
    ConfirmAction,
    /// Submission rejected or receipt carried a revert
    Fail,
    /// Acknowledge a terminal phase and return to idle
    Reset,
}

/// Phase transition function
///
/// Given the current phase and an event, returns the next phase.
/// Invalid transitions return the current phase (no change).
pub fn transition(current: TransferPhase, event: FlowEvent) -> TransferPhase {
    use FlowEvent::*;
    use TransferPhase::*;

    match (current, event) {
        // Deposit path: approval leg first
        (Idle, SubmitApproval) => AwaitingApproval,
        (AwaitingApproval, ConfirmApproval) => ApprovalConfirmed,
        (ApprovalConfirmed, SubmitAction) => AwaitingAction,

        // Withdraw path: single transaction, no approval leg
        (Idle, SubmitAction) => AwaitingAction,

        (AwaitingAction, ConfirmAction) => ActionConfirmed,

        // Failure from any non-terminal phase
        (Idle, Fail) => Failed,
        (AwaitingApproval, Fail) => Failed,
        (ApprovalConfirmed, Fail) => Failed,
        (AwaitingAction, Fail) => Failed,

        // Terminal phases only accept Reset
        (ActionConfirmed, Reset) => Idle,
        (Failed, Reset) => Idle,

        // Invalid transitions - stay in current phase
        _ => current,
    }
}

/// Button label for the presentation layer.
///
/// Pure function of phase and direction; the caller substitutes
/// "Connect Wallet" itself when no account is connected.
pub fn button_label(phase: TransferPhase, direction: TransferDirection) -> &'static str {
    match (phase, direction) {
        (TransferPhase::AwaitingApproval, _) | (TransferPhase::ApprovalConfirmed, _) => {
            "Approving..."
        }
        (TransferPhase::AwaitingAction, TransferDirection::Deposit) => "Depositing...",
        (TransferPhase::AwaitingAction, TransferDirection::Withdraw) => "Withdrawing...",
        (TransferPhase::Failed, _) => "Retry",
        (_, TransferDirection::Deposit) => "Deposit",
        (_, TransferDirection::Withdraw) => "Withdraw",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Phase Property Tests =====

    #[test]
    fn test_terminal_phases() {
        assert!(TransferPhase::ActionConfirmed.is_terminal());
        assert!(TransferPhase::Failed.is_terminal());

        assert!(!TransferPhase::Idle.is_terminal());
        assert!(!TransferPhase::AwaitingApproval.is_terminal());
        assert!(!TransferPhase::ApprovalConfirmed.is_terminal());
        assert!(!TransferPhase::AwaitingAction.is_terminal());
    }

    #[test]
    fn test_in_flight() {
        assert!(TransferPhase::AwaitingApproval.in_flight());
        assert!(TransferPhase::ApprovalConfirmed.in_flight());
        assert!(TransferPhase::AwaitingAction.in_flight());

        assert!(!TransferPhase::Idle.in_flight());
        assert!(!TransferPhase::ActionConfirmed.in_flight());
        assert!(!TransferPhase::Failed.in_flight());
    }

    #[test]
    fn test_phase_string_round_trip() {
        let phases = vec![
            TransferPhase::Idle,
            TransferPhase::AwaitingApproval,
            TransferPhase::ApprovalConfirmed,
            TransferPhase::AwaitingAction,
            TransferPhase::ActionConfirmed,
            TransferPhase::Failed,
        ];

        for phase in phases {
            assert_eq!(TransferPhase::from_str(phase.as_str()), Some(phase));
        }
    }

    #[test]
    fn test_invalid_phase_string() {
        assert!(TransferPhase::from_str("invalid").is_none());
        assert!(TransferPhase::from_str("").is_none());
        assert!(TransferPhase::from_str("IDLE").is_none());
    }

    // ===== Deposit Path =====

    #[test]
    fn test_deposit_happy_path() {
        let mut phase = TransferPhase::Idle;

        phase = transition(phase, FlowEvent::SubmitApproval);
        assert_eq!(phase, TransferPhase::AwaitingApproval);

        phase = transition(phase, FlowEvent::ConfirmApproval);
        assert_eq!(phase, TransferPhase::ApprovalConfirmed);

        phase = transition(phase, FlowEvent::SubmitAction);
        assert_eq!(phase, TransferPhase::AwaitingAction);

        phase = transition(phase, FlowEvent::ConfirmAction);
        assert_eq!(phase, TransferPhase::ActionConfirmed);
    }

    #[test]
    fn test_deposit_cannot_skip_approval() {
        // The action leg is unreachable from Idle via the approval path
        // events; only the explicit SubmitAction (withdraw) opens it.
        let phase = transition(TransferPhase::AwaitingApproval, FlowEvent::SubmitAction);
        assert_eq!(phase, TransferPhase::AwaitingApproval);

        let phase = transition(TransferPhase::AwaitingApproval, FlowEvent::ConfirmAction);
        assert_eq!(phase, TransferPhase::AwaitingApproval);
    }

    // ===== Withdraw Path =====

    #[test]
    fn test_withdraw_happy_path() {
        let mut phase = TransferPhase::Idle;

        phase = transition(phase, FlowEvent::SubmitAction);
        assert_eq!(phase, TransferPhase::AwaitingAction);

        phase = transition(phase, FlowEvent::ConfirmAction);
        assert_eq!(phase, TransferPhase::ActionConfirmed);
    }

    // ===== Failure Paths =====

    #[test]
    fn test_failure_from_every_active_phase() {
        for phase in [
            TransferPhase::Idle,
            TransferPhase::AwaitingApproval,
            TransferPhase::ApprovalConfirmed,
            TransferPhase::AwaitingAction,
        ] {
            assert_eq!(transition(phase, FlowEvent::Fail), TransferPhase::Failed);
        }
    }

    #[test]
    fn test_terminal_phase_is_stable() {
        let phase = transition(TransferPhase::ActionConfirmed, FlowEvent::Fail);
        assert_eq!(phase, TransferPhase::ActionConfirmed);

        let phase = transition(TransferPhase::Failed, FlowEvent::ConfirmAction);
        assert_eq!(phase, TransferPhase::Failed);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        assert_eq!(
            transition(TransferPhase::ActionConfirmed, FlowEvent::Reset),
            TransferPhase::Idle
        );
        assert_eq!(
            transition(TransferPhase::Failed, FlowEvent::Reset),
            TransferPhase::Idle
        );
        // Reset is not valid mid-flight
        assert_eq!(
            transition(TransferPhase::AwaitingApproval, FlowEvent::Reset),
            TransferPhase::AwaitingApproval
        );
    }

    // ===== Labels =====

    #[test]
    fn test_button_labels() {
        use TransferDirection::*;

        assert_eq!(button_label(TransferPhase::Idle, Deposit), "Deposit");
        assert_eq!(button_label(TransferPhase::Idle, Withdraw), "Withdraw");
        assert_eq!(
            button_label(TransferPhase::AwaitingApproval, Deposit),
            "Approving..."
        );
        assert_eq!(
            button_label(TransferPhase::ApprovalConfirmed, Deposit),
            "Approving..."
        );
        assert_eq!(
            button_label(TransferPhase::AwaitingAction, Deposit),
            "Depositing..."
        );
        assert_eq!(
            button_label(TransferPhase::AwaitingAction, Withdraw),
            "Withdrawing..."
        );
        assert_eq!(button_label(TransferPhase::Failed, Deposit), "Retry");
        assert_eq!(button_label(TransferPhase::ActionConfirmed, Deposit), "Deposit");
    }
}
