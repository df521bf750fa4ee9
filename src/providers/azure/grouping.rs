use std::collections::HashSet;

use chrono::Utc;
use indexmap::IndexMap;

use super::hierarchy::Hierarchy;
use super::types::{WorkItem, TASK_TYPE};
use crate::report::{AssigneeReport, ChildEntry, ReportEntry};

/// Groups the hierarchy by assignee into an ordered report.
///
/// Items without an assignee are not grouped, but stay reachable as children
/// of grouped entries. Within a group, Task-type items are promoted: the Task
/// itself is never listed top-level, its parents are, each attributed under
/// this assignee even when the parent's own assignee differs. Top-level
/// entries are deduplicated and ordered by closed date ascending; items
/// without a closed date sort last. Children are the entry's one-hop children
/// in the same order.
pub fn aggregate(project: &str, hierarchy: &Hierarchy) -> AssigneeReport {
    let mut groups: IndexMap<String, Vec<&WorkItem>> = IndexMap::new();

    for item in hierarchy.items() {
        let Some(assignee) = item.assigned_to.as_deref().filter(|a| !a.trim().is_empty())
        else {
            continue;
        };
        groups.entry(assignee.to_string()).or_default().push(item);
    }

    let report_groups = groups
        .into_iter()
        .map(|(assignee, members)| {
            let entries = group_entries(hierarchy, &members);
            (assignee, entries)
        })
        .collect();

    AssigneeReport {
        project: project.to_string(),
        collected_at: Utc::now(),
        total_items: hierarchy.items().len(),
        groups: report_groups,
    }
}

fn group_entries(hierarchy: &Hierarchy, members: &[&WorkItem]) -> Vec<ReportEntry> {
    let mut top_level: Vec<&WorkItem> = Vec::new();

    for &item in members {
        if item.item_type == TASK_TYPE {
            // Promotion is one hop and never surfaces a Task, even when a
            // Task's parent is itself a Task.
            top_level.extend(
                hierarchy
                    .parents_of(item.id)
                    .filter(|parent| parent.item_type != TASK_TYPE),
            );
        } else {
            top_level.push(item);
        }
    }

    let mut seen = HashSet::new();
    top_level.retain(|item| seen.insert(item.id));
    sort_by_closed_date(&mut top_level);

    top_level
        .into_iter()
        .map(|item| {
            let mut children: Vec<&WorkItem> = hierarchy.children_of(item.id).collect();
            sort_by_closed_date(&mut children);

            ReportEntry {
                id: item.id,
                item_type: item.item_type.clone(),
                title: item.title.clone(),
                state: item.state.clone(),
                closed_date: item.closed_date,
                children: children
                    .into_iter()
                    .map(|child| ChildEntry {
                        id: child.id,
                        title: child.title.clone(),
                        assigned_to: child.assigned_to.clone(),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Closed date ascending; items without a closed date sort last.
fn sort_by_closed_date(items: &mut [&WorkItem]) {
    items.sort_by_key(|item| (item.closed_date.is_none(), item.closed_date));
}
