mod cache;
mod client;
mod grouping;
mod hierarchy;
mod links;
mod provider;
mod types;

pub use cache::SnapshotCache;
pub use grouping::aggregate;
pub use hierarchy::{Hierarchy, ItemLinks};
pub use links::edit_url;
pub use provider::AzureProvider;
pub use types::{Relation, Snapshot, WorkItem};
