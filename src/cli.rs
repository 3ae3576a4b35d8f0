//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::overrides::Overrides;
use crate::lifecycle::startup::RunContext;
use crate::task::resolver::TaskType;

#[derive(Debug, Parser)]
#[command(name = "dts")]
#[command(version, about = "Data transfer between heterogeneous databases", long_about = None)]
pub struct Cli {
    /// Task configuration file
    #[arg(short, long, global = true, default_value = "config.ini")]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Validate and resolve the task without executing it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override [sinker] batch_size
    #[arg(long, global = true)]
    pub batch_size: Option<usize>,

    /// Override [parallelizer] parallel_size
    #[arg(long, global = true)]
    pub max_parallel: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ConnectionArgs {
    /// Override the source connection url
    #[arg(long)]
    pub source: Option<String>,

    /// Override the target connection url
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Toml,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Copy existing data from source to target
    Snapshot(ConnectionArgs),
    /// Replicate ongoing changes from source to target
    Cdc(ConnectionArgs),
    /// Migrate schema structure
    Struct(ConnectionArgs),
    /// Compare source and target data
    Check(ConnectionArgs),
    /// Re-check rows reported by a previous check
    Review(ConnectionArgs),
    /// Repair rows reported by a previous check
    Revise(ConnectionArgs),
    /// Validate the configuration file
    Validate {
        /// Print the full validated configuration
        #[arg(long)]
        detailed: bool,
    },
    /// Show the resolved task
    Info {
        /// Include connection urls (passwords masked)
        #[arg(long)]
        connections: bool,

        /// Include flow-control settings
        #[arg(long)]
        metrics: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Commands {
    /// Task type a mode command requires.
    pub fn expected_task_type(&self) -> Option<TaskType> {
        match self {
            Commands::Snapshot(_) => Some(TaskType::SnapshotMigration),
            Commands::Cdc(_) => Some(TaskType::CdcReplication),
            Commands::Struct(_) => Some(TaskType::StructureMigration),
            Commands::Check(_) => Some(TaskType::ConsistencyCheck),
            Commands::Review(_) => Some(TaskType::QualityReview),
            Commands::Revise(_) => Some(TaskType::DataRevision),
            Commands::Validate { .. } | Commands::Info { .. } => None,
        }
    }

    fn connections(&self) -> Option<&ConnectionArgs> {
        match self {
            Commands::Snapshot(args)
            | Commands::Cdc(args)
            | Commands::Struct(args)
            | Commands::Check(args)
            | Commands::Review(args)
            | Commands::Revise(args) => Some(args),
            Commands::Validate { .. } | Commands::Info { .. } => None,
        }
    }
}

impl Cli {
    pub fn expected_task_type(&self) -> Option<TaskType> {
        self.command.as_ref().and_then(Commands::expected_task_type)
    }

    /// Build the run context shared by every command.
    pub fn run_context(&self) -> RunContext {
        let connections = self
            .command
            .as_ref()
            .and_then(Commands::connections)
            .cloned()
            .unwrap_or_default();
        let detailed = matches!(self.command, Some(Commands::Validate { detailed: true }));

        RunContext {
            config_path: self.config.clone(),
            dry_run: self.dry_run,
            detailed,
            overrides: Overrides {
                source_url: connections.source,
                target_url: connections.target,
                batch_size: self.batch_size,
                parallel_size: self.max_parallel,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["dts"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.ini"));
        assert!(cli.command.is_none());
        assert!(cli.expected_task_type().is_none());
        assert!(cli.run_context().overrides.is_empty());
    }

    #[test]
    fn test_mode_command_with_overrides() {
        let cli = Cli::try_parse_from([
            "dts", "--config", "task.ini", "--batch-size", "500", "cdc", "--source", "mysql://a",
            "--max-parallel", "4",
        ])
        .unwrap();
        assert_eq!(cli.expected_task_type(), Some(TaskType::CdcReplication));

        let ctx = cli.run_context();
        assert_eq!(ctx.config_path, PathBuf::from("task.ini"));
        assert_eq!(ctx.overrides.source_url.as_deref(), Some("mysql://a"));
        assert_eq!(ctx.overrides.target_url, None);
        assert_eq!(ctx.overrides.batch_size, Some(500));
        assert_eq!(ctx.overrides.parallel_size, Some(4));
    }

    #[test]
    fn test_validate_detailed() {
        let cli = Cli::try_parse_from(["dts", "validate", "--detailed"]).unwrap();
        assert!(cli.run_context().detailed);
    }

    #[test]
    fn test_info_format() {
        let cli = Cli::try_parse_from(["dts", "info", "--format", "json", "--connections"]).unwrap();
        match cli.command {
            Some(Commands::Info { connections, metrics, format }) => {
                assert!(connections);
                assert!(!metrics);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["dts", "info", "--format", "yaml"]).is_err());
    }
}
