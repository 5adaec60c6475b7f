//! Command line flags, the optional YAML config file, and the merged settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::error::AuditError;
use crate::poll::RunMode;
use crate::report::OutputFormat;

pub const DEFAULT_LOOKBACK_MINUTES: u32 = 10;
pub const DEFAULT_SLEEP_SECONDS: u64 = 30;

const FOLLOW_HELP: &str = "Follow: keep checking every --sleep seconds until no troublesome \
events are found. Use ctrl + c to force exit.";

#[derive(Debug, Parser)]
#[command(author, version, about = "Report abnormal Kubernetes events", long_about = None)]
pub struct Cli {
    /// Time in minutes to look back for Node events
    #[arg(short = 't', long = "lookback", value_name = "MINUTES")]
    pub lookback: Option<u32>,

    #[arg(short, long, help = FOLLOW_HELP)]
    pub follow: bool,

    /// Time in seconds to sleep before the next check
    #[arg(long, value_name = "SECONDS")]
    pub sleep: Option<u64>,

    /// Stop following after this many checks (including the first)
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Run once, then keep running until interrupted (ignores --follow)
    #[arg(long)]
    pub background: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, env = "KUBE_EVENT_AUDIT_CONTEXT")]
    pub context: Option<String>,

    /// Audit a JSON/YAML event dump instead of a live cluster
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,

    /// YAML config file providing defaults for the flags above
    #[arg(short, long, value_name = "PATH", env = "KUBE_EVENT_AUDIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Keys accepted in the config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub lookback_minutes: Option<u32>,
    pub sleep_seconds: Option<u64>,
    pub follow: Option<bool>,
    pub background: Option<bool>,
    pub max_attempts: Option<u32>,
    pub output: Option<OutputFormat>,
    pub context: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, AuditError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| AuditError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lookback_minutes: u32,
    pub mode: RunMode,
    pub output: OutputFormat,
    pub context: Option<String>,
    pub events_file: Option<PathBuf>,
}

impl Settings {
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, AuditError> {
        let sleep = cli
            .sleep
            .or(file.sleep_seconds)
            .unwrap_or(DEFAULT_SLEEP_SECONDS);
        let follow = cli.follow || file.follow.unwrap_or(false);
        let background = cli.background || file.background.unwrap_or(false);
        let max_attempts = cli.max_attempts.or(file.max_attempts);

        if follow && sleep == 0 {
            return Err(AuditError::InvalidSettings(
                "sleep interval must be greater than 0 in follow mode".into(),
            ));
        }
        if max_attempts == Some(0) {
            return Err(AuditError::InvalidSettings(
                "max attempts must be at least 1".into(),
            ));
        }

        let mode = if background {
            RunMode::Background
        } else if follow {
            RunMode::Follow {
                interval: Duration::from_secs(sleep),
                max_attempts,
            }
        } else {
            RunMode::Once
        };

        Ok(Self {
            lookback_minutes: cli
                .lookback
                .or(file.lookback_minutes)
                .unwrap_or(DEFAULT_LOOKBACK_MINUTES),
            mode,
            output: cli.output.or(file.output).unwrap_or_default(),
            context: cli.context.clone().or(file.context),
            events_file: cli.events_file.clone(),
        })
    }

    pub fn load(cli: &Cli) -> Result<Self, AuditError> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }
}
