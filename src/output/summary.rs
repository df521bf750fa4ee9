use std::fmt::Write;

use chrono::{DateTime, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::providers::azure::{Hierarchy, WorkItem};
use crate::report::AssigneeReport;

use super::styling::{bright, cyan, dim};

/// Prints a human-readable summary of the assignee report to stdout.
///
/// Shows the overview (project, item and assignee counts) followed by a
/// per-assignee table of top-level entries and nested children.
pub fn print_summary(report: &AssigneeReport) {
    println!("{}", render_summary(report));
}

/// Prints the first `count` parent items (items with children) with their
/// children indented beneath, ordered by closed date.
pub fn print_parent_preview(hierarchy: &Hierarchy, count: usize) {
    println!("{}", render_parent_preview(hierarchy, count));
}

// Helper functions

fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

#[allow(clippy::format_push_string)]
fn render_summary(report: &AssigneeReport) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");

    let _ = writeln!(output, "Project: {}", cyan(&report.project));
    let _ = writeln!(output, "Work items in snapshot: {}", cyan(report.total_items));
    let _ = writeln!(output, "Assignees: {}", cyan(report.groups.len()));
    let _ = writeln!(output);

    add_section_header(&mut output, "👥", "Assignees");

    let mut table = create_table();
    table.set_header(vec![
        Cell::new("Assignee").fg(TableColor::Cyan),
        Cell::new("Top-level entries").fg(TableColor::Cyan),
        Cell::new("Children").fg(TableColor::Cyan),
    ]);

    for (assignee, entries) in &report.groups {
        let children: usize = entries.iter().map(|e| e.children.len()).sum();
        table.add_row(vec![
            Cell::new(assignee),
            Cell::new(entries.len()),
            Cell::new(children),
        ]);
    }

    output.push_str(&table.to_string());
    output.push('\n');

    output
}

#[allow(clippy::format_push_string)]
fn render_parent_preview(hierarchy: &Hierarchy, count: usize) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "🔍", "Recently closed parents");

    let mut parents: Vec<&WorkItem> = hierarchy.parents().collect();
    parents.sort_by_key(|item| (item.closed_date.is_none(), item.closed_date));

    for parent in parents.iter().take(count) {
        let _ = writeln!(
            output,
            "{} - {} - {}",
            bright(&parent.title),
            dim(format_date(parent.created_date)),
            dim(format_date(parent.closed_date))
        );

        for child in hierarchy.children_of(parent.id) {
            let _ = writeln!(
                output,
                "\t{} - {}",
                child.title,
                dim(child.assigned_to.as_deref().unwrap_or("unassigned"))
            );
        }
    }

    if parents.is_empty() {
        let _ = writeln!(output, "{}", dim("No parent items in this snapshot"));
    }

    output
}
