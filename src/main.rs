#![forbid(unsafe_code)]

//! `planpatch` — plan, execute, accept, and reconstruct code changes.
//!
//! Session-bound commands load a JSON session file, apply one or more
//! state transitions, and save it back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use planpatch::config::GlobalConfig;
use planpatch::context::split_context;
use planpatch::diff::applier::apply_patch_with_report;
use planpatch::diff::writer::{persist_atomic, OutputDir};
use planpatch::export::{export_patches, ExportFormat, ExportRequest};
use planpatch::models::{PatchPayload, PlanRequest, StepRequest, StepSpec};
use planpatch::reconstruct::{reconstruct, ready_export, write_ready_files};
use planpatch::service::{HttpGenerationClient, Planner, RetryPolicy};
use planpatch::session::{load_session, save_session, SessionAction, SessionState};
use planpatch::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "planpatch", about = "Plan-driven patch application", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SessionArg {
    /// Session file; created on first use.
    #[arg(long, default_value = "planpatch-session.json")]
    session: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split a code-context file into source files.
    Split {
        /// File holding the code context.
        input: PathBuf,
    },
    /// Apply one patch file to one source file.
    Apply {
        /// Original source file.
        original: PathBuf,
        /// Patch in unified-diff dialect.
        patch: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate a plan for a change request.
    Plan {
        #[command(flatten)]
        session: SessionArg,
        /// Natural-language change request.
        #[arg(long)]
        intent: String,
        /// File holding the code context.
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Execute plan steps.
    Execute {
        #[command(flatten)]
        session: SessionArg,
        /// Step ids to execute; all steps when omitted.
        #[arg(long = "step")]
        steps: Vec<String>,
    },
    /// Accept executed steps.
    Accept {
        #[command(flatten)]
        session: SessionArg,
        /// Step ids, accepted in the order given.
        #[arg(required = true)]
        steps: Vec<String>,
    },
    /// Withdraw acceptance of steps.
    Reject {
        #[command(flatten)]
        session: SessionArg,
        /// Step ids.
        #[arg(required = true)]
        steps: Vec<String>,
    },
    /// Rebuild corrected files from accepted steps.
    Reconstruct {
        #[command(flatten)]
        session: SessionArg,
        /// Write corrected files under this directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print a unified diff per modified file.
        #[arg(long)]
        diff: bool,
    },
    /// Export accepted steps as one patch file.
    Export {
        #[command(flatten)]
        session: SessionArg,
        /// Patch layout; defaults to the configured one.
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        /// Omit the metadata comment block.
        #[arg(long)]
        no_metadata: bool,
        /// Write the patch file into this directory instead of stdout.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };

    match args.command {
        Command::Split { input } => split(&input),
        Command::Apply {
            original,
            patch,
            output,
        } => apply(&original, &patch, output.as_deref()),
        Command::Plan {
            session,
            intent,
            context,
        } => plan(config, &session.session, intent, context.as_deref()).await,
        Command::Execute { session, steps } => execute(config, &session.session, steps).await,
        Command::Accept { session, steps } => {
            update_session(&session.session, steps.into_iter().map(SessionAction::Accept))
        }
        Command::Reject { session, steps } => {
            update_session(&session.session, steps.into_iter().map(SessionAction::Reject))
        }
        Command::Reconstruct { session, out, diff } => {
            reconstruct_session(&session.session, out.as_deref(), diff)
        }
        Command::Export {
            session,
            format,
            no_metadata,
            output_dir,
        } => export_session(
            &config,
            &session.session,
            format,
            no_metadata,
            output_dir.as_deref(),
        ),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|err| AppError::Io(format!("failed to read {}: {err}", path.display())))
}

fn split(input: &Path) -> Result<()> {
    let result = split_context(&read_text(input)?);
    for file in &result.files {
        println!(
            "{}\t{}\t{} lines",
            file.filename,
            file.language,
            file.content.lines().count()
        );
    }
    Ok(())
}

fn apply(original: &Path, patch: &Path, output: Option<&Path>) -> Result<()> {
    let report = apply_patch_with_report(&read_text(original)?, &read_text(patch)?);
    if report.skipped_deletions > 0 || report.malformed_headers > 0 {
        warn!(
            skipped_deletions = report.skipped_deletions,
            malformed_headers = report.malformed_headers,
            "patch applied with skipped operations"
        );
    }
    match output {
        Some(path) => persist_atomic(path, report.content.as_bytes()),
        None => {
            println!("{}", report.content);
            Ok(())
        }
    }
}

async fn planner_from(mut config: GlobalConfig) -> Result<Planner> {
    config.load_credentials().await?;
    let client = HttpGenerationClient::new(&config.service)?;
    Ok(Planner::new(
        Arc::new(client),
        RetryPolicy::from(&config.retry),
    ))
}

async fn plan(
    config: GlobalConfig,
    session_path: &Path,
    intent: String,
    context: Option<&Path>,
) -> Result<()> {
    let mut state = load_session(session_path)?;
    if let Some(path) = context {
        state = state.reduce(SessionAction::SetContext(read_text(path)?));
    }
    state = state.reduce(SessionAction::SetIntent(intent));

    let planner = planner_from(config).await?;
    let request = PlanRequest {
        code_context: Some(state.code_context.clone()).filter(|text| !text.trim().is_empty()),
        intent: state.intent.clone(),
    };
    let plan = planner.generate_plan(&request).await?;

    println!("{}", plan.task);
    for step in &plan.steps {
        println!("  {}\t{}", step.id, step.title);
    }
    let state = state.reduce(SessionAction::SetPlan(plan));
    save_session(session_path, &state)
}

async fn execute(config: GlobalConfig, session_path: &Path, requested: Vec<String>) -> Result<()> {
    let mut state = load_session(session_path)?;
    let plan = state
        .plan
        .clone()
        .ok_or_else(|| AppError::Validation("session has no plan; run `plan` first".into()))?;

    let steps: Vec<StepSpec> = if requested.is_empty() {
        plan.steps.iter().map(StepSpec::from).collect()
    } else {
        requested
            .iter()
            .map(|id| {
                plan.step(id)
                    .map(StepSpec::from)
                    .ok_or_else(|| AppError::NotFound(format!("no step {id} in plan")))
            })
            .collect::<Result<_>>()?
    };

    let limit = config.max_concurrent_steps;
    let planner = planner_from(config).await?;
    let permits = Arc::new(Semaphore::new(limit));
    let mut tasks: JoinSet<(String, Result<PatchPayload>)> = JoinSet::new();

    for step in steps {
        let planner = planner.clone();
        let permits = Arc::clone(&permits);
        let request = StepRequest {
            step,
            code_context: state.code_context.clone(),
        };
        tasks.spawn(async move {
            let step_id = request.step.id.clone();
            let Ok(_permit) = permits.acquire_owned().await else {
                return (
                    step_id,
                    Err(AppError::Cancelled("step scheduler closed".into())),
                );
            };
            let result = planner.execute_step_tracked(&request).await;
            (step_id, result)
        });
    }

    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((step_id, Ok(payload))) => {
                info!(%step_id, format = payload.format.as_str(), "step executed");
                state = state.reduce(SessionAction::RecordExecution(payload));
            }
            Ok((step_id, Err(err))) => {
                error!(%step_id, %err, "step execution failed");
                failures += 1;
            }
            Err(err) => {
                error!(%err, "step task panicked");
                failures += 1;
            }
        }
    }

    save_session(session_path, &state)?;
    if failures > 0 {
        return Err(AppError::Service(format!("{failures} step(s) failed")));
    }
    Ok(())
}

fn update_session(
    session_path: &Path,
    actions: impl IntoIterator<Item = SessionAction>,
) -> Result<()> {
    let state = actions
        .into_iter()
        .fold(load_session(session_path)?, SessionState::reduce);
    println!("accepted: {}", state.accepted.join(", "));
    save_session(session_path, &state)
}

fn reconstruct_session(session_path: &Path, out: Option<&Path>, show_diff: bool) -> Result<()> {
    let state = load_session(session_path)?;
    let files = reconstruct(&state.code_context, &state.accepted_executions());

    for file in &files {
        println!("{}\t{}", file.filename, file.changes_summary);
        if file.failed_patches > 0 || file.skipped_deletions > 0 {
            println!(
                "  failed patches: {}, skipped deletions: {}",
                file.failed_patches, file.skipped_deletions
            );
        }
        if show_diff && file.is_modified() {
            print!("{}", file.unified_diff());
        }
    }

    match out {
        Some(dir) => {
            write_ready_files(&files, dir)?;
        }
        None if !show_diff => {
            if let Some(ready) = ready_export(&files) {
                println!("--- {} ---", ready.filename);
                println!("{}", ready.content);
            }
        }
        None => {}
    }
    Ok(())
}

fn export_session(
    config: &GlobalConfig,
    session_path: &Path,
    format: Option<ExportFormat>,
    no_metadata: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let state = load_session(session_path)?;
    let steps = state.accepted_steps();
    let task = state.plan.as_ref().map_or("", |plan| plan.task.as_str());

    let export = export_patches(&ExportRequest {
        task,
        steps: &steps,
        code_context: &state.code_context,
        format: format.unwrap_or(config.export.format),
        include_metadata: config.export.include_metadata && !no_metadata,
        generated_at: Utc::now(),
    });

    if export.steps_applied == 0 {
        warn!("no accepted steps to export");
    }

    match output_dir {
        Some(dir) => {
            let summary = OutputDir::create(dir)?.write(&export.filename, &export.content)?;
            info!(path = %summary.path.display(), steps = export.steps_applied, "patch exported");
        }
        None => print!("{}", export.content),
    }
    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter).with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
