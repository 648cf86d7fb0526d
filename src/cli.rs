use anyhow::Result;
use clap::{ArgAction, Parser};
use log::info;
use std::path::PathBuf;

use crate::auth::Token;
use crate::config::{Config, SentryConfig};
use crate::error::ExportError;
use crate::providers::{parse_enrichments, ExportSummary, SentryProvider};

#[derive(Parser, Debug)]
#[command(name = "sentry2csv")]
#[command(author, version, about = "Export a Sentry project's issues to CSV", long_about = None)]
pub struct Cli {
    /// The Sentry organization
    #[arg(value_name = "ORGANIZATION")]
    organization: String,

    /// The Sentry project
    #[arg(value_name = "PROJECT")]
    project: String,

    /// The Sentry API token
    #[arg(long, value_name = "API_TOKEN", env = "SENTRY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Sentry host [default: https://sentry.io]
    #[arg(long)]
    host: Option<String>,

    /// Optional mappings of event metadata, e.g. "contexts.os.name=OS,release.version=Release"
    #[arg(long, value_name = "MAPPINGS")]
    enrich: Option<String>,

    /// Only export issues seen in this environment
    #[arg(short, long)]
    environment: Option<String>,

    /// Output file [default: ORGANIZATION-PROJECT-export.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of latest-event requests in flight [default: 20]
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase the log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Settings for one export after merging flags, environment and config file.
#[derive(Debug)]
struct ExportSettings {
    token: Token,
    host: String,
    environment: Option<String>,
    enrich: Option<String>,
    max_concurrency: usize,
}

impl Cli {
    /// `env_logger` filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "warn,sentry2csv=info",
            _ => "info,sentry2csv=debug",
        }
    }

    fn settings(&self, config: SentryConfig) -> Result<ExportSettings, ExportError> {
        let token = self
            .token
            .clone()
            .or(config.token)
            .filter(|token| !token.trim().is_empty())
            .map(Token::from)
            .ok_or_else(|| {
                ExportError::Config(
                    "no API token given; pass --token or set SENTRY_TOKEN".to_string(),
                )
            })?;

        Ok(ExportSettings {
            token,
            host: self.host.clone().unwrap_or(config.host),
            environment: self.environment.clone().or(config.environment),
            enrich: self.enrich.clone().or(config.enrich),
            max_concurrency: self.max_concurrency.unwrap_or(config.max_concurrency),
        })
    }

    /// Runs the export and reports where the file went and how many issues it holds.
    pub async fn execute(&self) -> Result<ExportSummary> {
        let config = Config::load(self.config.as_deref())?;
        let settings = self.settings(config.sentry)?;

        // Mappings are checked before anything goes over the network.
        let enrichments = parse_enrichments(settings.enrich.as_deref())?;

        info!(
            "Exporting unresolved issues for {}/{} from {}",
            self.organization, self.project, settings.host
        );

        let provider = SentryProvider::new(
            &settings.host,
            &settings.token,
            self.organization.clone(),
            self.project.clone(),
            settings.max_concurrency,
        )?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| provider.default_output_path());

        let summary = provider
            .export(settings.environment.as_deref(), &enrichments, &output)
            .await?;

        info!(
            "Wrote {} issues to {}",
            summary.issue_count,
            summary.path.display()
        );

        Ok(summary)
    }
}
