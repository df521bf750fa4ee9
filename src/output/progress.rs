use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Creates and manages progress indication for the three-phase report run
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    fn spinner(message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Create a new phase progress tracker and start Phase 1
    pub fn start_phase_1() -> Self {
        Self {
            pb: Self::spinner("Phase 1/3: Loading work items...".to_string()),
        }
    }

    /// Finish Phase 1 and start Phase 2
    pub fn finish_phase_1_start_phase_2(self, item_count: usize) -> Self {
        self.pb
            .finish_with_message(format!("✓ Phase 1/3: Loaded {item_count} work items"));

        Self {
            pb: Self::spinner("Phase 2/3: Building hierarchy and grouping by assignee...".to_string()),
        }
    }

    /// Finish Phase 2 and start Phase 3
    pub fn finish_phase_2_start_phase_3(self, group_count: usize) -> Self {
        self.pb.finish_with_message(format!(
            "✓ Phase 2/3: Grouped items under {group_count} assignees"
        ));

        Self {
            pb: Self::spinner("Phase 3/3: Writing report...".to_string()),
        }
    }

    /// Finish Phase 3 and complete all progress
    pub fn finish_phase_3(self, report_path: &std::path::Path) {
        self.pb.finish_with_message(format!(
            "✓ Phase 3/3: Report written to {}",
            report_path.display()
        ));
    }
}
