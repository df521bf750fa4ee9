use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::{Result, WorkLensError};

use super::types::{Relation, Snapshot, WorkItem};

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_SECONDS: u64 = 5;
const API_VERSION: &str = "6.0";

/// Work items are fetched in sequential pages of this size.
pub(super) const BATCH_SIZE: usize = 100;

/// Azure DevOps work item tracking client.
///
/// Executes the configured WIQL query and materializes the matched work
/// items, one page at a time. Pages are requested strictly sequentially;
/// each page is appended to the snapshot before the next request goes out.
pub struct AzureClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl AzureClient {
    /// Creates a client for one collection.
    ///
    /// # Arguments
    ///
    /// * `collection_url` - Collection base URL (e.g., <https://tfs.example.com/tfs/DefaultCollection>)
    /// * `token` - Personal access token
    pub fn new(collection_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("worklens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WorkLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(collection_url)
            .map_err(|e| WorkLensError::Config(format!("Invalid collection URL: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    /// Runs a WIQL query and returns the matched work item identifiers.
    pub async fn run_query(&self, project: &str, query: &str) -> Result<Vec<u64>> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| WorkLensError::Config("Collection URL cannot be a base".into()))?
            .extend([project, "_apis", "wit", "wiql"]);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        let request = self
            .auth_request(self.client.post(url))
            .json(&serde_json::json!({ "query": query }));

        let response: WiqlResponse = self.execute(request).await?;
        Ok(response.work_items.into_iter().map(|r| r.id).collect())
    }

    /// Fetches full work items (fields and relations) for a set of
    /// identifiers, in sequential batches of [`BATCH_SIZE`].
    pub async fn fetch_work_items(&self, ids: &[u64]) -> Result<Snapshot> {
        let mut snapshot = Snapshot::new();

        for batch in ids.chunks(BATCH_SIZE) {
            let id_list = batch
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",");

            let mut url = self.base_url.clone();
            url.path_segments_mut()
                .map_err(|()| WorkLensError::Config("Collection URL cannot be a base".into()))?
                .extend(["_apis", "wit", "workitems"]);
            url.query_pairs_mut()
                .append_pair("ids", &id_list)
                .append_pair("$expand", "relations")
                .append_pair("api-version", API_VERSION);

            let request = self.auth_request(self.client.get(url));
            let batch_response: WorkItemBatch = self.execute(request).await?;

            debug!(
                "Fetched batch of {} work items ({} total)",
                batch_response.value.len(),
                snapshot.len() + batch_response.value.len()
            );

            snapshot.extend(
                batch_response
                    .value
                    .into_iter()
                    .map(RemoteWorkItem::into_work_item),
            );
        }

        Ok(snapshot)
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        // PAT auth is basic auth with an empty user name
        request.basic_auth("", Some(&self.token))
    }

    /// Executes a request with bounded retry on network errors, rate limits,
    /// and server errors.
    async fn execute<T>(&self, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut retry_count = 0;
        loop {
            let attempt = request
                .try_clone()
                .ok_or_else(|| WorkLensError::RemoteFetch("Request is not retryable".into()))?;

            let response = match attempt.send().await {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    if retry_count >= MAX_RETRIES {
                        return Err(e.into());
                    }
                    warn!(
                        "Network error ({}), retrying in {}s ({}/{})...",
                        e,
                        RETRY_DELAY_SECONDS,
                        retry_count + 1,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                    retry_count += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();

            if status == 429 || status.is_server_error() {
                if retry_count >= MAX_RETRIES {
                    return Err(WorkLensError::RemoteFetch(format!(
                        "Giving up after {MAX_RETRIES} retries (status {status})"
                    )));
                }

                warn!(
                    "API error (status {status}). Waiting {RETRY_DELAY_SECONDS} seconds before retry {}/{}...",
                    retry_count + 1,
                    MAX_RETRIES
                );

                tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECONDS)).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read error response".to_string());
                return Err(WorkLensError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json().await?);
        }
    }
}

#[derive(Debug, Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    work_items: Vec<WorkItemRef>,
}

#[derive(Debug, Deserialize)]
struct WorkItemRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct WorkItemBatch {
    #[serde(default)]
    value: Vec<RemoteWorkItem>,
}

/// A work item as returned by the API: an identifier, a loosely-typed field
/// map, and the relation list.
#[derive(Debug, Deserialize)]
struct RemoteWorkItem {
    id: u64,
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    relations: Vec<Relation>,
}

impl RemoteWorkItem {
    /// Projects the loosely-typed field map into a typed [`WorkItem`].
    ///
    /// Missing or unparseable values degrade to empty strings / `None`; the
    /// item itself is always kept.
    fn into_work_item(self) -> WorkItem {
        WorkItem {
            id: self.id,
            item_type: string_field(&self.fields, "System.WorkItemType").unwrap_or_default(),
            title: string_field(&self.fields, "System.Title").unwrap_or_default(),
            assigned_to: string_field(&self.fields, "System.AssignedTo"),
            state: string_field(&self.fields, "System.State").unwrap_or_default(),
            closed_date: date_field(&self.fields, "Microsoft.VSTS.Common.ClosedDate"),
            created_date: date_field(&self.fields, "System.CreatedDate"),
            relations: self.relations,
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        // Newer API versions return identity fields as objects
        Value::Object(identity) => identity
            .get("displayName")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn date_field(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = fields.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
