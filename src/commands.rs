//! Command implementations.

use std::io::Write;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::schema::{ParallelizerConfig, PipelineConfig};
use crate::error::Result;
use crate::lifecycle::startup::{self, PreparedTask, RunContext, RunOutcome};
use crate::registry::DbType;
use crate::task::dispatcher::{Dispatcher, TaskExecutor};
use crate::task::resolver::TaskType;

const MASK: &str = "****";

/// Run whatever `cli` asks for, writing user-facing output to `out`.
pub async fn execute<E, W>(
    cli: &Cli,
    dispatcher: &Dispatcher<E>,
    cancel: CancellationToken,
    out: &mut W,
) -> Result<()>
where
    E: TaskExecutor,
    W: Write,
{
    let ctx = cli.run_context();
    match &cli.command {
        Some(Commands::Validate { .. }) => validate(&ctx, out),
        Some(Commands::Info {
            connections,
            metrics,
            format,
        }) => info(&ctx, *connections, *metrics, *format, out),
        _ => {
            let outcome = startup::run(&ctx, cli.expected_task_type(), dispatcher, cancel).await?;
            match outcome {
                RunOutcome::DryRun(task_type) => {
                    writeln!(out, "Dry run: configuration resolves to {task_type}")?
                }
                RunOutcome::Completed(task_type) => writeln!(out, "Task {task_type} completed")?,
                RunOutcome::Cancelled(task_type) => {
                    writeln!(out, "Task {task_type} cancelled by shutdown")?
                }
            }
            Ok(())
        }
    }
}

fn validate(ctx: &RunContext, out: &mut impl Write) -> Result<()> {
    let PreparedTask { task_type, config } = startup::prepare(ctx)?;
    writeln!(out, "Configuration is valid")?;
    writeln!(out, "Task type: {task_type}")?;
    if ctx.detailed {
        writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
    }
    Ok(())
}

/// Replace the password of a connection url, if it has one.
pub fn mask_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => match url.set_password(Some(MASK)) {
            Ok(()) => url.to_string(),
            Err(()) => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct Endpoint {
    db_type: DbType,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct FlowControl<'a> {
    parallelizer: &'a ParallelizerConfig,
    pipeline: &'a PipelineConfig,
}

#[derive(Debug, Serialize)]
struct InfoReport<'a> {
    task_type: TaskType,
    batch_size: usize,
    source: Endpoint,
    target: Endpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    flow_control: Option<FlowControl<'a>>,
}

fn info(
    ctx: &RunContext,
    connections: bool,
    metrics: bool,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let PreparedTask { task_type, config } = startup::prepare(ctx)?;

    let report = InfoReport {
        task_type,
        batch_size: config.sinker.batch_size,
        source: Endpoint {
            db_type: config.extractor.db_type,
            url: connections.then(|| mask_password(&config.extractor.url)),
        },
        target: Endpoint {
            db_type: config.sinker.db_type,
            url: connections.then(|| mask_password(&config.sinker.url)),
        },
        flow_control: metrics.then_some(FlowControl {
            parallelizer: &config.parallelizer,
            pipeline: &config.pipeline,
        }),
    };

    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
        OutputFormat::Toml => write!(out, "{}", toml::to_string(&report)?)?,
        OutputFormat::Text => render_text(&report, out)?,
    }
    Ok(())
}

fn render_text(report: &InfoReport<'_>, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Task type:   {}", report.task_type)?;
    writeln!(out, "Source:      {}", report.source.db_type)?;
    writeln!(out, "Target:      {}", report.target.db_type)?;
    writeln!(out, "Batch size:  {}", report.batch_size)?;

    for (label, endpoint) in [("Source url:", &report.source), ("Target url:", &report.target)] {
        if let Some(url) = &endpoint.url {
            let url = if url.is_empty() { "(not set)" } else { url.as_str() };
            writeln!(out, "{label:<12} {url}")?;
        }
    }

    if let Some(flow) = &report.flow_control {
        let pipeline = flow.pipeline;
        writeln!(
            out,
            "Parallel:    {} x {}",
            flow.parallelizer.parallel_type, flow.parallelizer.parallel_size
        )?;
        writeln!(out, "Pipeline:    {}", pipeline.pipeline_type)?;
        writeln!(out, "Buffer:      {} items, {} MB", pipeline.buffer_size, pipeline.buffer_memory_mb)?;
        writeln!(out, "Max rps:     {}", pipeline.max_rps)?;
        writeln!(out, "Checkpoint:  every {}s", pipeline.checkpoint_interval_secs)?;
    }
    Ok(())
}
