use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use super::links;
use super::types::{Snapshot, WorkItem, HIERARCHY_FORWARD, HIERARCHY_REVERSE};

/// Derived one-hop link sets for a single work item.
///
/// Identifier sets, not owned copies: entries are resolved against the
/// snapshot on access, so the sets stay consistent with the items they
/// annotate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLinks {
    pub parents: BTreeSet<u64>,
    pub children: BTreeSet<u64>,
}

/// A snapshot enriched with the parent/child forest derived from its
/// hierarchy relations.
///
/// Relations are interpreted structurally, exactly one hop: a reverse link on
/// an item names its parent, a forward link names a child, and each resolved
/// link is recorded on both endpoints. There is no transitive traversal, so
/// cyclic or self-referential link sets are harmless.
#[derive(Debug)]
pub struct Hierarchy {
    items: Vec<WorkItem>,
    by_id: HashMap<u64, usize>,
    links: HashMap<u64, ItemLinks>,
}

impl Hierarchy {
    /// Builds the hierarchy for a snapshot.
    ///
    /// Only items present in the snapshot participate: relation targets that
    /// resolve to an identifier outside it are excluded. A malformed relation
    /// URL degrades only that relation; the rest of the item and the snapshot
    /// are processed normally.
    pub fn build(snapshot: Snapshot) -> Self {
        let by_id: HashMap<u64, usize> = snapshot
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id, index))
            .collect();

        let mut links: HashMap<u64, ItemLinks> = snapshot
            .iter()
            .map(|item| (item.id, ItemLinks::default()))
            .collect();

        for item in &snapshot {
            for relation in &item.relations {
                let towards_parent = match relation.rel.as_str() {
                    HIERARCHY_REVERSE => true,
                    HIERARCHY_FORWARD => false,
                    _ => continue,
                };

                let target = match links::work_item_id(&relation.url) {
                    Ok(target) => target,
                    Err(err) => {
                        warn!("Dropping relation on work item {}: {err}", item.id);
                        continue;
                    }
                };

                if !by_id.contains_key(&target) {
                    debug!(
                        "Relation on work item {} points outside the snapshot ({target}), skipping",
                        item.id
                    );
                    continue;
                }

                if towards_parent {
                    insert_link(&mut links, item.id, target);
                } else {
                    insert_link(&mut links, target, item.id);
                }
            }
        }

        Self {
            items: snapshot,
            by_id,
            links,
        }
    }

    /// All items, in snapshot order.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Looks an item up by identifier.
    pub fn get(&self, id: u64) -> Option<&WorkItem> {
        self.by_id.get(&id).map(|&index| &self.items[index])
    }

    /// The derived link sets for an item, empty for unknown identifiers.
    pub fn links(&self, id: u64) -> ItemLinks {
        self.links.get(&id).cloned().unwrap_or_default()
    }

    /// Parents of an item, resolved into the snapshot, in identifier order.
    pub fn parents_of(&self, id: u64) -> impl Iterator<Item = &WorkItem> {
        self.linked_items(id, |links| &links.parents)
    }

    /// Children of an item, resolved into the snapshot, in identifier order.
    pub fn children_of(&self, id: u64) -> impl Iterator<Item = &WorkItem> {
        self.linked_items(id, |links| &links.children)
    }

    /// Items that have at least one child.
    pub fn parents(&self) -> impl Iterator<Item = &WorkItem> {
        self.items
            .iter()
            .filter(move |item| self.links.get(&item.id).is_some_and(|l| !l.children.is_empty()))
    }

    /// Releases the unchanged items, discarding the derived links.
    pub fn into_snapshot(self) -> Snapshot {
        self.items
    }

    fn linked_items<'a>(
        &'a self,
        id: u64,
        select: impl Fn(&ItemLinks) -> &BTreeSet<u64>,
    ) -> impl Iterator<Item = &'a WorkItem> {
        self.links
            .get(&id)
            .map(select)
            .into_iter()
            .flatten()
            .filter_map(move |linked| self.get(*linked))
    }
}

/// Records one resolved link on both endpoints.
fn insert_link(links: &mut HashMap<u64, ItemLinks>, child: u64, parent: u64) {
    if let Some(entry) = links.get_mut(&child) {
        entry.parents.insert(parent);
    }
    if let Some(entry) = links.get_mut(&parent) {
        entry.children.insert(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::azure::types::Relation;

    fn item(id: u64, item_type: &str, relations: Vec<Relation>) -> WorkItem {
        WorkItem {
            id,
            item_type: item_type.to_string(),
            title: format!("Item {id}"),
            assigned_to: None,
            state: "Closed".to_string(),
            closed_date: None,
            created_date: None,
            relations,
        }
    }

    fn child_of(target: u64) -> Relation {
        Relation {
            rel: HIERARCHY_REVERSE.to_string(),
            url: format!("https://tfs.example.com/_apis/wit/workItems/{target}"),
        }
    }

    fn has_child(target: u64) -> Relation {
        Relation {
            rel: HIERARCHY_FORWARD.to_string(),
            url: format!("https://tfs.example.com/_apis/wit/workItems/{target}"),
        }
    }

    #[test]
    fn test_reverse_relation_links_both_endpoints() {
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![]),
            item(2, "Task", vec![child_of(1)]),
        ]);

        assert_eq!(hierarchy.links(2).parents, BTreeSet::from([1]));
        assert_eq!(hierarchy.links(1).children, BTreeSet::from([2]));
        assert!(hierarchy.links(1).parents.is_empty());
        assert!(hierarchy.links(2).children.is_empty());
    }

    #[test]
    fn test_forward_relation_links_both_endpoints() {
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![has_child(2)]),
            item(2, "Task", vec![]),
        ]);

        assert_eq!(hierarchy.links(1).children, BTreeSet::from([2]));
        assert_eq!(hierarchy.links(2).parents, BTreeSet::from([1]));
    }

    #[test]
    fn test_symmetry_when_both_sides_declare_the_link() {
        // Azure DevOps stores both directions; declaring both must not
        // duplicate anything.
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![has_child(2)]),
            item(2, "Task", vec![child_of(1)]),
        ]);

        assert_eq!(hierarchy.links(1).children, BTreeSet::from([2]));
        assert_eq!(hierarchy.links(2).parents, BTreeSet::from([1]));
    }

    #[test]
    fn test_relation_outside_snapshot_is_excluded() {
        let hierarchy = Hierarchy::build(vec![item(1, "Task", vec![child_of(999)])]);

        assert!(hierarchy.links(1).parents.is_empty());
    }

    #[test]
    fn test_malformed_relation_degrades_only_itself() {
        let malformed = Relation {
            rel: HIERARCHY_REVERSE.to_string(),
            url: "https://tfs.example.com/_apis/wit/workItems/abc".to_string(),
        };
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![]),
            item(2, "Task", vec![malformed, child_of(1)]),
        ]);

        // The malformed link is dropped, the valid one still resolves.
        assert_eq!(hierarchy.links(2).parents, BTreeSet::from([1]));
        assert_eq!(hierarchy.links(1).children, BTreeSet::from([2]));
    }

    #[test]
    fn test_non_hierarchy_relations_are_ignored() {
        let related = Relation {
            rel: "System.LinkTypes.Related".to_string(),
            url: "https://tfs.example.com/_apis/wit/workItems/1".to_string(),
        };
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![]),
            item(2, "Bug", vec![related]),
        ]);

        assert!(hierarchy.links(2).parents.is_empty());
        assert!(hierarchy.links(1).children.is_empty());
    }

    #[test]
    fn test_links_are_one_hop_only() {
        let hierarchy = Hierarchy::build(vec![
            item(1, "Epic", vec![]),
            item(2, "Feature", vec![child_of(1)]),
            item(3, "Task", vec![child_of(2)]),
        ]);

        // Grandparent relationships are not derived.
        assert_eq!(hierarchy.links(3).parents, BTreeSet::from([2]));
        assert_eq!(hierarchy.links(1).children, BTreeSet::from([2]));
    }

    #[test]
    fn test_self_reference_terminates() {
        let hierarchy = Hierarchy::build(vec![item(1, "Task", vec![child_of(1)])]);

        assert_eq!(hierarchy.links(1).parents, BTreeSet::from([1]));
        assert_eq!(hierarchy.links(1).children, BTreeSet::from([1]));
    }

    #[test]
    fn test_cycle_terminates() {
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![child_of(2)]),
            item(2, "Feature", vec![child_of(1)]),
        ]);

        assert_eq!(hierarchy.links(1).parents, BTreeSet::from([2]));
        assert_eq!(hierarchy.links(2).parents, BTreeSet::from([1]));
    }

    #[test]
    fn test_build_is_idempotent() {
        let snapshot = vec![
            item(1, "Feature", vec![has_child(2)]),
            item(2, "Task", vec![child_of(1)]),
            item(3, "Bug", vec![child_of(999)]),
        ];

        let first = Hierarchy::build(snapshot);
        let first_links: Vec<ItemLinks> =
            first.items().iter().map(|i| first.links(i.id)).collect();

        let second = Hierarchy::build(first.into_snapshot());
        let second_links: Vec<ItemLinks> =
            second.items().iter().map(|i| second.links(i.id)).collect();

        assert_eq!(first_links, second_links);
    }

    #[test]
    fn test_core_fields_are_not_mutated() {
        let snapshot = vec![
            item(1, "Feature", vec![]),
            item(2, "Task", vec![child_of(1)]),
        ];
        let original = snapshot.clone();

        let hierarchy = Hierarchy::build(snapshot);
        assert_eq!(hierarchy.items(), original.as_slice());
    }

    #[test]
    fn test_parents_iterator_resolves_items() {
        let hierarchy = Hierarchy::build(vec![
            item(1, "Feature", vec![]),
            item(2, "Task", vec![child_of(1)]),
        ]);

        let parents: Vec<u64> = hierarchy.parents_of(2).map(|p| p.id).collect();
        assert_eq!(parents, vec![1]);

        let children: Vec<u64> = hierarchy.children_of(1).map(|c| c.id).collect();
        assert_eq!(children, vec![2]);
    }

    #[test]
    fn test_parents_listing_in_snapshot_order() {
        let hierarchy = Hierarchy::build(vec![
            item(5, "Feature", vec![has_child(6)]),
            item(6, "Task", vec![]),
            item(7, "Bug", vec![]),
            item(8, "Feature", vec![has_child(7)]),
        ]);

        let with_children: Vec<u64> = hierarchy.parents().map(|p| p.id).collect();
        assert_eq!(with_children, vec![5, 8]);
    }
}
