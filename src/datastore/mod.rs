//! Hosted datastore access (read-only)

pub mod client;
pub mod models;

pub use client::DatastoreClient;
pub use models::{
    DifficultyLevel, GovernanceProposal, ImpactEntry, ImpactEvent, NftLesson, ProposalStatus,
    PublicGoodsProject, VaultStrategy,
};
