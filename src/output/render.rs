use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::providers::azure::edit_url;
use crate::report::AssigneeReport;

/// Renders the assignee report as a nested-list HTML document.
///
/// One heading per assignee, each followed by the group's top-level entries.
/// Entry titles link to the work item edit page, built by substituting the
/// item identifier into the configured URL template; children are nested one
/// level beneath their entry.
#[allow(clippy::format_push_string)]
pub fn render_html(report: &AssigneeReport, edit_url_template: &str) -> String {
    let mut html = String::new();

    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html><head><meta charset='utf-8'>");
    let _ = writeln!(
        html,
        "<title>{} work items - {}</title>",
        escape(&report.project),
        report.collected_at.format("%Y-%m-%d")
    );
    let _ = writeln!(html, "</head><body>");

    for (assignee, entries) in &report.groups {
        let _ = writeln!(html, "<h1>User {}</h1>", escape(assignee));
        let _ = writeln!(html, "<ul>");

        for entry in entries {
            let _ = writeln!(
                html,
                "\t<li><a href='{}'>{}</a> {}",
                edit_url(edit_url_template, entry.id),
                escape(&entry.title),
                format_date(entry.closed_date)
            );
            let _ = writeln!(html, "<ul>");

            for child in &entry.children {
                let _ = writeln!(
                    html,
                    "\t\t<li>{} {}</li>",
                    escape(&child.title),
                    escape(child.assigned_to.as_deref().unwrap_or(""))
                );
            }

            let _ = writeln!(html, "</ul></li>");
        }

        let _ = writeln!(html, "</ul>");
    }

    let _ = writeln!(html, "</body></html>");

    html
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ChildEntry, ReportEntry};
    use chrono::TimeZone;
    use indexmap::IndexMap;

    const TEMPLATE: &str = "https://tfs.example.com/SomeProject/_workitems/edit/{id}";

    fn report_with(entries: Vec<ReportEntry>) -> AssigneeReport {
        let mut groups = IndexMap::new();
        groups.insert("Alice".to_string(), entries);

        AssigneeReport {
            project: "SomeProject".to_string(),
            collected_at: Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            total_items: 1,
            groups,
        }
    }

    #[test]
    fn test_render_html_links_entries_to_edit_page() {
        let report = report_with(vec![ReportEntry {
            id: 70163,
            item_type: "Feature".to_string(),
            title: "Checkout flow".to_string(),
            state: "Closed".to_string(),
            closed_date: Some(Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()),
            children: vec![ChildEntry {
                id: 2,
                title: "Wire up payment form".to_string(),
                assigned_to: Some("Bob".to_string()),
            }],
        }]);

        let html = render_html(&report, TEMPLATE);

        assert!(html.contains("<h1>User Alice</h1>"));
        assert!(html.contains("href='https://tfs.example.com/SomeProject/_workitems/edit/70163'"));
        assert!(html.contains("Checkout flow"));
        assert!(html.contains("2024-03-04"));
        assert!(html.contains("<li>Wire up payment form Bob</li>"));
    }

    #[test]
    fn test_render_html_escapes_titles() {
        let report = report_with(vec![ReportEntry {
            id: 1,
            item_type: "Bug".to_string(),
            title: "Form breaks when <input> & friends overflow".to_string(),
            state: "Closed".to_string(),
            closed_date: None,
            children: vec![],
        }]);

        let html = render_html(&report, TEMPLATE);

        assert!(html.contains("Form breaks when &lt;input&gt; &amp; friends overflow"));
        assert!(!html.contains("<input>"));
    }

    #[test]
    fn test_render_html_entry_without_closed_date() {
        let report = report_with(vec![ReportEntry {
            id: 1,
            item_type: "Feature".to_string(),
            title: "Open feature".to_string(),
            state: "Active".to_string(),
            closed_date: None,
            children: vec![],
        }]);

        let html = render_html(&report, TEMPLATE);
        assert!(html.contains("Open feature"));
    }
}
