mod progress;
mod render;
mod styling;
mod summary;

pub use progress::PhaseProgress;
pub use render::render_html;
pub use styling::{dim, magenta_bold};
pub use summary::{print_parent_preview, print_summary};

/// Prints the `WorkLens` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🗂  WorkLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Work Item Hierarchy Reports")
    );
}
