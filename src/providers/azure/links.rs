use crate::error::{Result, WorkLensError};

/// Parses the work item identifier out of a relation target URL.
///
/// Relation URLs reference the target item by its numeric identifier in the
/// final path segment (e.g.,
/// <https://tfs.example.com/tfs/DefaultCollection/_apis/wit/workItems/70163>).
///
/// # Arguments
///
/// * `url` - Relation target URL
///
/// # Returns
///
/// The numeric identifier from the trailing path segment.
///
/// # Errors
///
/// Returns [`WorkLensError::MalformedReference`] when the trailing segment is
/// not a valid identifier. Callers must not conflate this with any real
/// identifier value.
pub fn work_item_id(url: &str) -> Result<u64> {
    let trailing = url.rsplit('/').next().unwrap_or(url);
    trailing
        .parse::<u64>()
        .map_err(|_| WorkLensError::MalformedReference(url.to_string()))
}

/// Builds the clickable edit URL for a work item.
///
/// Substitutes the item identifier into the configured template (e.g.,
/// `https://tfs.example.com/tfs/DefaultCollection/SomeProject/_workitems/edit/{id}`).
pub fn edit_url(template: &str, id: u64) -> String {
    template.replace("{id}", &id.to_string())
}
