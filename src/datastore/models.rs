//! Record types mirroring the hosted datastore schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

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
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Expert,
}

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
pub enum ProposalStatus {
    Active,
    Passed,
    Rejected,
}

/// A strategy the vault allocates deposits into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultStrategy {
    pub id: String,
    pub name: String,
    pub allocation_percentage: f64,
    pub current_apy: f64,
    pub description: String,
    pub logo_url: String,
    pub updated_at: DateTime<Utc>,
}

/// An educational lesson unlocking an NFT certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NftLesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub difficulty_level: DifficultyLevel,
    pub order_index: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicGoodsProject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo_url: String,
    pub total_received: f64,
    pub website_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEvent {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub amount: f64,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An impact event joined to its project by identifier - the only
/// client-side transformation the datastore reads perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactEntry {
    pub event: ImpactEvent,
    pub project: Option<PublicGoodsProject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceProposal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub votes_for: i64,
    pub votes_against: i64,
    pub status: ProposalStatus,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_json() {
        let json = r#"{
            "id": "s-1",
            "name": "Aave Lending",
            "allocation_percentage": 40.0,
            "current_apy": 5.2,
            "description": "Supply-side lending",
            "logo_url": "https://example.com/aave.png",
            "updated_at": "2024-05-01T12:00:00+00:00"
        }"#;

        let strategy: VaultStrategy = serde_json::from_str(json).unwrap();
        assert_eq!(strategy.name, "Aave Lending");
        assert_eq!(strategy.allocation_percentage, 40.0);
    }

    #[test]
    fn test_lesson_difficulty_parsing() {
        let json = r#"{
            "id": "l-1",
            "title": "What is a vault?",
            "description": "Basics",
            "content": "...",
            "difficulty_level": "beginner",
            "order_index": 1,
            "image_url": "",
            "created_at": "2024-05-01T12:00:00+00:00"
        }"#;

        let lesson: NftLesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.difficulty_level, DifficultyLevel::Beginner);
        assert!(serde_json::from_str::<NftLesson>(&json.replace("beginner", "legendary")).is_err());
    }

    #[test]
    fn test_proposal_status() {
        let json = r#"{
            "id": "p-1",
            "title": "Raise donation share",
            "description": "",
            "votes_for": 120,
            "votes_against": 30,
            "status": "active",
            "ends_at": "2024-06-01T00:00:00+00:00",
            "created_at": "2024-05-01T00:00:00+00:00"
        }"#;

        let proposal: GovernanceProposal = serde_json::from_str(json).unwrap();
        assert_eq!(proposal.status, ProposalStatus::Active);
        assert_eq!(proposal.votes_for, 120);
    }
}
