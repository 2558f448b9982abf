//! Read-only client for the hosted datastore
//!
//! Speaks the datastore's REST conventions: `{base}/rest/v1/{table}` with
//! an `apikey` header plus bearer auth, and `select`/`order`/`eq`/`limit`
//! query parameters. This flow never writes.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::datastore::models::{
    GovernanceProposal, ImpactEntry, ImpactEvent, NftLesson, PublicGoodsProject, VaultStrategy,
};

pub struct DatastoreClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DatastoreClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        let response = self
            .http
            .get(&url)
            .query(&[("select", "*")])
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .with_context(|| format!("request to {} failed", table))?
            .error_for_status()
            .with_context(|| format!("datastore rejected {} read", table))?;

        let records = response
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("invalid {} payload", table))?;
        log::debug!("fetched {} records from {}", records.len(), table);
        Ok(records)
    }

    /// Strategies ordered by allocation, largest first
    pub async fn strategies(&self) -> Result<Vec<VaultStrategy>> {
        self.fetch("vault_strategies", &[("order", "allocation_percentage.desc")])
            .await
    }

    /// Lessons in their curriculum order
    pub async fn lessons(&self) -> Result<Vec<NftLesson>> {
        self.fetch("nft_lessons", &[("order", "order_index.asc")]).await
    }

    /// Public-goods projects, largest recipient first
    pub async fn projects(&self) -> Result<Vec<PublicGoodsProject>> {
        self.fetch("public_goods_projects", &[("order", "total_received.desc")])
            .await
    }

    /// Most recent impact events, each joined to its project by identifier
    pub async fn impact_events(&self, limit: usize) -> Result<Vec<ImpactEntry>> {
        let limit = limit.to_string();
        let events: Vec<ImpactEvent> = self
            .fetch(
                "impact_events",
                &[("order", "created_at.desc"), ("limit", limit.as_str())],
            )
            .await?;
        let projects = self.projects().await?;
        Ok(attach_projects(events, &projects))
    }

    /// Governance proposals still open for voting, newest first
    pub async fn active_proposals(&self) -> Result<Vec<GovernanceProposal>> {
        self.fetch(
            "governance_proposals",
            &[("status", "eq.active"), ("order", "created_at.desc")],
        )
        .await
    }
}

/// Pair each event with its project by identifier, preserving event
/// order. An event whose project is unknown keeps a `None` project
/// rather than being dropped.
fn attach_projects(
    events: Vec<ImpactEvent>,
    projects: &[PublicGoodsProject],
) -> Vec<ImpactEntry> {
    events
        .into_iter()
        .map(|event| {
            let project = projects.iter().find(|p| p.id == event.project_id).cloned();
            ImpactEntry { event, project }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(id: &str, name: &str) -> PublicGoodsProject {
        PublicGoodsProject {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            logo_url: String::new(),
            total_received: 0.0,
            website_url: String::new(),
            created_at: Utc::now(),
        }
    }

    fn event(id: &str, project_id: &str) -> ImpactEvent {
        ImpactEvent {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            project_id: project_id.to_string(),
            amount: 12.5,
            transaction_hash: "0xabc".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_attach_projects_joins_by_id() {
        let projects = vec![project("p-1", "Clean Water"), project("p-2", "Open Maps")];
        let events = vec![event("e-1", "p-2"), event("e-2", "p-1")];

        let entries = attach_projects(events, &projects);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.id, "e-1");
        assert_eq!(entries[0].project.as_ref().unwrap().name, "Open Maps");
        assert_eq!(entries[1].project.as_ref().unwrap().name, "Clean Water");
    }

    #[test]
    fn test_attach_projects_keeps_events_without_a_project() {
        let projects = vec![project("p-1", "Clean Water")];
        let events = vec![event("e-1", "p-gone"), event("e-2", "p-1")];

        let entries = attach_projects(events, &projects);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].project.is_none());
        assert_eq!(entries[0].event.project_id, "p-gone");
        assert!(entries[1].project.is_some());
    }

    #[test]
    fn test_attach_projects_empty_catalog() {
        let entries = attach_projects(vec![event("e-1", "p-1")], &[]);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].project.is_none());
    }
}
