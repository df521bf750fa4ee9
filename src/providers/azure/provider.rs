use log::{info, warn};

use crate::config::AzureConfig;
use crate::error::Result;

use super::client::{AzureClient, BATCH_SIZE};
use super::types::Snapshot;

/// Fetch orchestration for one Azure DevOps project.
pub struct AzureProvider {
    client: AzureClient,
    project: String,
    query: String,
}

impl AzureProvider {
    pub fn new(config: &AzureConfig) -> Result<Self> {
        let client = AzureClient::new(&config.collection_url, &config.personal_access_token)?;

        Ok(Self {
            client,
            project: config.project.clone(),
            query: config.query.clone(),
        })
    }

    /// Runs the configured query and materializes the full flat snapshot.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        info!("Running work item query for project: {}", self.project);

        let ids = self.client.run_query(&self.project, &self.query).await?;
        info!(
            "Query matched {} work items, fetching in batches of {BATCH_SIZE}",
            ids.len()
        );

        let snapshot = self.client.fetch_work_items(&ids).await?;
        if snapshot.len() != ids.len() {
            warn!(
                "Query matched {} items but {} were fetched",
                ids.len(),
                snapshot.len()
            );
        }

        Ok(snapshot)
    }
}
