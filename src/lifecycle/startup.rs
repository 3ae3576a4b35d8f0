//! Startup sequence.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Apply command-line overrides
//! - Resolve the task type
//! - Hand the task to the dispatcher
//!
//! # Design Decisions
//! - Ordered startup: config first, then resolution, then dispatch
//! - Fail fast: any error before dispatch aborts with nothing started
//! - All inputs arrive through an explicit `RunContext`

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::config::loader::load_validated;
use crate::config::overrides::Overrides;
use crate::config::schema::ValidatedConfig;
use crate::error::{Error, Result};
use crate::task::dispatcher::{DispatchError, Dispatcher, TaskExecutor};
use crate::task::resolver::TaskType;

/// Everything a run needs from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    pub config_path: PathBuf,
    /// Stop after resolution.
    pub dry_run: bool,
    /// Print the full validated configuration where applicable.
    pub detailed: bool,
    pub overrides: Overrides,
}

/// A validated configuration together with its task type.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTask {
    pub task_type: TaskType,
    pub config: ValidatedConfig,
}

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    DryRun(TaskType),
    Completed(TaskType),
    /// Shutdown was requested while the task ran.
    Cancelled(TaskType),
}

/// Load, validate, override and resolve.
pub fn prepare(ctx: &RunContext) -> Result<PreparedTask> {
    let config = load_validated(&ctx.config_path)?;
    tracing::info!(path = %ctx.config_path.display(), "Configuration loaded");

    let config = ctx.overrides.apply(config);
    let task_type = TaskType::from_config(&config)?;

    tracing::info!(
        task_type = %task_type,
        extract_type = %config.extractor.extract_type,
        sink_type = %config.sinker.sink_type,
        "Task type resolved"
    );
    Ok(PreparedTask { task_type, config })
}

/// Run the configured task to completion.
///
/// When `expected` is given the resolved task type must match it.
pub async fn run<E: TaskExecutor>(
    ctx: &RunContext,
    expected: Option<TaskType>,
    dispatcher: &Dispatcher<E>,
    cancel: CancellationToken,
) -> Result<RunOutcome> {
    let PreparedTask { task_type, config } = prepare(ctx)?;

    if let Some(expected) = expected {
        if expected != task_type {
            return Err(Error::CommandMismatch {
                expected,
                resolved: task_type,
            });
        }
    }

    if ctx.dry_run {
        tracing::info!(task_type = %task_type, "Dry run, skipping execution");
        return Ok(RunOutcome::DryRun(task_type));
    }

    match dispatcher.dispatch(task_type, &config, cancel).await {
        Ok(()) => Ok(RunOutcome::Completed(task_type)),
        Err(DispatchError::Cancelled(task_type)) => {
            tracing::warn!(task_type = %task_type, "Task cancelled by shutdown");
            Ok(RunOutcome::Cancelled(task_type))
        }
        Err(e) => Err(e.into()),
    }
}
