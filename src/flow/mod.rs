//! Transfer flow - approve-then-act sequencing with phase tracking
//!
//! This module provides the transfer flow controller, its phase machine,
//! and the flow error taxonomy.

pub mod controller;
pub mod errors;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use controller::TransferFlowController;
pub use errors::FlowError;
pub use state::{button_label, transition, FlowEvent, TransferPhase};
pub use types::{FlowSnapshot, TransferDirection, TransferRequest};
