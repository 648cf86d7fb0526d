mod exports;
mod progress;

use console::{style, StyledObject};
use std::fmt::Display;
use std::path::Path;

pub use exports::write_csv;
pub use progress::PhaseProgress;

/// Phase still running.
pub fn pending(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

/// Finished step or successful run.
pub fn done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn failed(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

/// Final stdout line of a successful run, without styling.
pub fn export_report(path: &Path, issue_count: usize) -> String {
    let noun = if issue_count == 1 { "issue" } else { "issues" };
    format!("{issue_count} {noun} to {}", path.display())
}

/// Prints the sentry2csv banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        style("📤 sentry2csv").magenta().bold(),
        muted(env!("CARGO_PKG_VERSION")),
        muted("Sentry issue exporter")
    );
}
