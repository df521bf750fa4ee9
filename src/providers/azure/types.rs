use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Link kind marking the related item as this item's parent.
pub const HIERARCHY_REVERSE: &str = "System.LinkTypes.Hierarchy-Reverse";

/// Link kind marking the related item as this item's child.
pub const HIERARCHY_FORWARD: &str = "System.LinkTypes.Hierarchy-Forward";

/// Item type replaced by its parents in the assignee report.
pub const TASK_TYPE: &str = "Task";

/// A typed link from one work item to another.
///
/// `rel` is the link kind tag; `url` is the API URL of the target item, whose
/// trailing path segment carries the target identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub rel: String,
    pub url: String,
}

/// A single tracked work item, immutable after fetch.
///
/// Field values are projected out of the loosely-typed remote `fields` map at
/// fetch time; timestamps that fail to parse are carried as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Identifier, unique within a snapshot
    pub id: u64,
    /// Work item type (e.g., "Task", "Bug", "Feature")
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item title
    pub title: String,
    /// Assignee display name, if any
    pub assigned_to: Option<String>,
    /// Workflow state (e.g., "Closed")
    pub state: String,
    /// When the item was closed
    pub closed_date: Option<DateTime<Utc>>,
    /// When the item was created
    pub created_date: Option<DateTime<Utc>>,
    /// Typed links to other items
    #[serde(default)]
    pub relations: Vec<Relation>,
}

/// The full flat set of work items retrieved at one point in time.
pub type Snapshot = Vec<WorkItem>;
