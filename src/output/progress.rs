use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;

use super::{done, muted, pending};

/// Progress tracking for the fetch / enrich / write phases of an export
pub struct PhaseProgress {
    pb: ProgressBar,
    enriching: bool,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("{}  {}", style("⚙️").bright(), style("Phases").bright().underlined());
        let pb = create_spinner(pending("Phase 1/3: Fetching unresolved issues").to_string());
        Self {
            pb,
            enriching: false,
        }
    }

    pub fn finish_phase_1_start_phase_2(self, issue_count: usize, enrichment_count: usize) -> Self {
        self.pb.finish_with_message(
            done(format!("Phase 1/3: Fetched {issue_count} issues ✓")).to_string(),
        );
        let enriching = enrichment_count > 0;
        let message = if enriching {
            pending(format!(
                "Phase 2/3: Enriching {issue_count} issues with event data"
            ))
            .to_string()
        } else {
            muted("Phase 2/3: No enrichments configured").to_string()
        };
        let pb = create_spinner(message);
        Self { pb, enriching }
    }

    pub fn finish_phase_2_start_phase_3(self) -> Self {
        self.pb
            .finish_with_message(done(phase_2_result(self.enriching)).to_string());
        let pb = create_spinner(pending("Phase 3/3: Writing CSV").to_string());
        Self {
            pb,
            enriching: self.enriching,
        }
    }

    pub fn finish_phase_3(self, path: &Path) {
        self.pb.finish_with_message(
            done(format!("Phase 3/3: Wrote {} ✓", path.display())).to_string(),
        );
        eprintln!();
    }
}

fn phase_2_result(enriching: bool) -> &'static str {
    if enriching {
        "Phase 2/3: Enrichment done ✓"
    } else {
        "Phase 2/3: Enrichment skipped ✓"
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
