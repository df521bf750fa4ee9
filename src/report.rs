use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Assignee-grouped hierarchy report over one snapshot.
///
/// Pure data: ordering is already applied, rendering is left to the output
/// layer. Groups appear in order of first appearance in the snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssigneeReport {
    pub project: String,
    pub collected_at: DateTime<Utc>,
    pub total_items: usize,
    pub groups: IndexMap<String, Vec<ReportEntry>>,
}

/// A top-level report entry, never of the promoted "Task" type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: u64,
    pub item_type: String,
    pub title: String,
    pub state: String,
    pub closed_date: Option<DateTime<Utc>>,
    pub children: Vec<ChildEntry>,
}

/// One nesting level only: children carry no further structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildEntry {
    pub id: u64,
    pub title: String,
    pub assigned_to: Option<String>,
}
