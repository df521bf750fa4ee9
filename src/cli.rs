use anyhow::Result;
use clap::Parser;
use chrono::Local;
use log::info;
use std::path::PathBuf;

use crate::config::Config;
use crate::output::{self, PhaseProgress};
use crate::providers::azure::{aggregate, AzureProvider, Hierarchy, SnapshotCache};

#[derive(Parser)]
#[command(name = "worklens")]
#[command(author, version, about = "Work Item Hierarchy Report Tool", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the HTML report to this path instead of the configured one
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bypass the daily snapshot cache for this run
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let Some(config) = Config::load_or_init(self.config.as_deref())? else {
            // Not an error: the operator is expected to fill the template in
            // and run again.
            println!(
                "worklens.toml is required to connect; a template has been created. \
                 Fill in the connection details and run again."
            );
            return Ok(());
        };

        let today = Local::now().date_naive();
        let cache = SnapshotCache::new(&config.azure.project, !self.no_cache)?;

        let progress = PhaseProgress::start_phase_1();

        let snapshot = match cache.load(today)? {
            Some(snapshot) => {
                info!("Using cached snapshot for {today}");
                snapshot
            }
            None => {
                let provider = AzureProvider::new(&config.azure)?;
                let snapshot = provider.fetch_snapshot().await?;
                cache.store(today, &snapshot)?;
                snapshot
            }
        };

        let progress = progress.finish_phase_1_start_phase_2(snapshot.len());

        let hierarchy = Hierarchy::build(snapshot);
        let report = aggregate(&config.azure.project, &hierarchy);

        let progress = progress.finish_phase_2_start_phase_3(report.groups.len());

        let html = output::render_html(&report, &config.azure.edit_item_url);
        let report_path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.report_path));
        std::fs::write(&report_path, html)?;

        progress.finish_phase_3(&report_path);

        output::print_parent_preview(&hierarchy, config.output.preview_count);
        output::print_summary(&report);

        info!("Report written to: {}", report_path.display());

        Ok(())
    }
}
