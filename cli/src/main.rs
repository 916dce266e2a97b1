//! CLI entrypoint for the Muse Engine agent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use muse_application::{
    AgentController, AgentEventLogger, AgentProgressNotifier, ExecutionOutcome,
    NoAgentEventLogger, NoAgentProgress,
};
use muse_domain::{AgentResult, AgentStatus, Focus, ResultId, StepId};
use muse_infrastructure::{
    ConfigLoader, FileConfig, FileLoggingConfig, GeminiConfig, GeminiGateway, GeminiPlanGenerator,
    JsonArchive, JsonlAgentEventLogger,
};
use muse_presentation::{
    AgentProgressReporter, Cli, ConsoleFormatter, OutputConfig, OutputFormat, SimpleAgentProgress,
    StdinInputPrompt,
};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Exit status after the user interrupted at a prompt.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// How the session ended.
enum Ending {
    Finished,
    /// The user left with Ctrl-C (or end of input) at a prompt
    Interrupted,
}

/// What to do after a run of the step loop returns.
enum Next {
    Input(StepId, String),
    Restart,
    Done,
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, &config.logging);
    info!("Starting Muse Engine");
    check_config(&config)?;

    let output = OutputConfig {
        color: config.output.color,
        show_progress: config.output.show_progress && !cli.quiet,
        stream_text: config.output.stream_text && !cli.quiet,
    };
    output.apply_color();

    // === Dependency Injection ===
    let controller = build_controller(&cli, &config, &output)?;

    let focuses = if cli.focus.is_empty() {
        config.agent.parse_focuses().0
    } else {
        cli.focus.clone()
    };
    let id = select_task(&cli, focuses, &controller)?;

    let ending = run(&cli, &controller, &id).await;

    if let Some(path) = cli.save_path() {
        JsonArchive::new(path).save(&controller.results())?;
        if !cli.quiet {
            println!("Saved session to {}", path.display());
        }
    }

    match ending? {
        Ending::Finished => {}
        // A prompt thread may still be blocked on stdin; don't wait for it.
        Ending::Interrupted => std::process::exit(INTERRUPTED_EXIT_CODE),
    }

    if let Some(result) = controller.snapshot(&id) {
        let text = match cli.output {
            OutputFormat::Summary => ConsoleFormatter::format_summary(&result),
            OutputFormat::Full => ConsoleFormatter::format(&result),
            OutputFormat::Json => ConsoleFormatter::format_json(&result),
        };
        println!("{}", text);
    }

    Ok(())
}

/// Console logging from `-v` / `RUST_LOG` / `logging.level`, plus a daily
/// rolling file when `logging.log_dir` is set.
fn init_logging(verbose: u8, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(logging.level.as_deref().unwrap_or("warn"))),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.resolved_log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "muse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .init();
            None
        }
    }
}

fn check_config(config: &FileConfig) -> Result<()> {
    let mut fatal = Vec::new();
    for issue in config.validate() {
        if issue.is_error() {
            fatal.push(issue.message);
        } else {
            warn!("{}", issue.message);
        }
    }
    if !fatal.is_empty() {
        bail!("Invalid configuration:\n  {}", fatal.join("\n  "));
    }
    Ok(())
}

fn build_controller(cli: &Cli, config: &FileConfig, output: &OutputConfig) -> Result<AgentController> {
    let (mut params, _) = config.agent.to_execution_params();
    if let Some(mode) = cli.mode {
        params = params.with_step_mode(mode);
    }
    if cli.no_grounding {
        params = params.with_grounding(false);
    }

    let gemini = GeminiConfig::from_file(&config.gemini);
    if gemini.api_key().is_none() {
        warn!("No Gemini API key configured (gemini.api_key, $GEMINI_API_KEY or $API_KEY)");
    }
    let gateway = Arc::new(
        GeminiGateway::new(gemini.clone())?.with_channel_capacity(params.channel_capacity),
    );
    let planner = Arc::new(GeminiPlanGenerator::new(gemini)?);

    let progress: Arc<dyn AgentProgressNotifier> = if cli.quiet {
        Arc::new(NoAgentProgress)
    } else if std::io::stdout().is_terminal() {
        Arc::new(AgentProgressReporter::new(output.clone()))
    } else {
        Arc::new(SimpleAgentProgress)
    };

    let event_log = cli
        .event_log
        .clone()
        .or_else(|| config.logging.event_log.clone());
    let logger: Arc<dyn AgentEventLogger> =
        match event_log.and_then(JsonlAgentEventLogger::open) {
            Some(logger) => {
                info!("Agent events: {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoAgentEventLogger),
        };

    Ok(AgentController::new(gateway, planner, params)
        .with_progress(progress)
        .with_event_logger(logger))
}

/// Import the `--resume` archive, then pick the task to work on: a new goal
/// if one was given, else the latest unfinished archived task.
fn select_task(cli: &Cli, focuses: Vec<Focus>, controller: &AgentController) -> Result<ResultId> {
    if let Some(path) = &cli.resume {
        let results = JsonArchive::new(path).load()?;
        info!("Resuming {} results from {}", results.len(), path.display());
        for result in results {
            controller.import(result)?;
        }
    }

    match (&cli.goal, &cli.resume) {
        (Some(goal), _) => Ok(controller.submit_goal(goal, focuses)?),
        (None, Some(path)) => resume_target(&controller.results()).ok_or_else(|| {
            anyhow!(
                "Nothing to resume: every task in {} is completed",
                path.display()
            )
        }),
        (None, None) => bail!("A goal is required. Example: muse \"Write a haiku about the sea\""),
    }
}

/// Most recent task that has not completed.
fn resume_target(results: &[AgentResult]) -> Option<ResultId> {
    results
        .iter()
        .rev()
        .find(|r| r.agent_state.status != AgentStatus::Completed)
        .map(|r| r.id.clone())
}

async fn run(cli: &Cli, controller: &AgentController, id: &ResultId) -> Result<Ending> {
    let has_plan = controller.snapshot(id).is_some_and(|r| r.has_plan());
    if !has_plan {
        controller
            .generate_plan(id)
            .await
            .map_err(|e| anyhow!(e.user_message()))?;
    }

    let result = controller
        .snapshot(id)
        .ok_or_else(|| anyhow!("Task {} disappeared", id))?;
    if !cli.quiet {
        println!("{}", ConsoleFormatter::format_plan(&result));
    }
    if cli.plan_only {
        return Ok(Ending::Finished);
    }

    drive(controller, id, std::io::stdin().is_terminal()).await
}

/// Run the task until it settles, answering input prompts and offering a
/// restart after a pause, stop or error.
async fn drive(controller: &AgentController, id: &ResultId, interactive: bool) -> Result<Ending> {
    let mut handle = controller.start(id)?;
    loop {
        let outcome = wait_for_run(controller, id, handle).await?;
        debug!("Run of {} ended: {:?}", id, outcome.halt);

        handle = match next_action(controller, id, interactive).await? {
            Next::Input(step_id, answer) => controller.submit_step_input(id, &step_id, &answer)?,
            Next::Restart => controller.start(id)?,
            Next::Done => return Ok(Ending::Finished),
            Next::Interrupted => return Ok(Ending::Interrupted),
        };
    }
}

/// Await one run; the first Ctrl-C pauses the task, the next one stops it.
async fn wait_for_run(
    controller: &AgentController,
    id: &ResultId,
    mut handle: JoinHandle<ExecutionOutcome>,
) -> Result<ExecutionOutcome> {
    let mut interrupts = 0u32;
    loop {
        tokio::select! {
            outcome = &mut handle => return Ok(outcome?),
            signal = tokio::signal::ctrl_c() => {
                signal?;
                interrupts += 1;
                let command = if interrupts == 1 {
                    controller.pause(id)
                } else {
                    controller.stop(id)
                };
                if let Err(e) = command {
                    debug!("Ignoring Ctrl-C: {}", e);
                }
            }
        }
    }
}

async fn next_action(controller: &AgentController, id: &ResultId, interactive: bool) -> Result<Next> {
    if let Some((_, step)) = controller.pending_input(id) {
        let step_id = step.id.clone();
        let answer = prompt(move || StdinInputPrompt::new().ask(&step)).await?;
        return Ok(match answer {
            Some(Some(answer)) => Next::Input(step_id, answer),
            _ => Next::Interrupted,
        });
    }

    let Some(result) = controller.snapshot(id) else {
        return Ok(Next::Done);
    };
    let state = result.agent_state;
    let restartable = matches!(
        state.status,
        AgentStatus::Paused | AgentStatus::Stopped | AgentStatus::Error
    );
    if !interactive || !restartable {
        return Ok(Next::Done);
    }

    let label = state.start_label();
    match prompt(move || StdinInputPrompt::new().confirm_restart(label)).await? {
        Some(true) => Ok(Next::Restart),
        Some(false) => Ok(Next::Done),
        None => {
            if state.status == AgentStatus::Paused
                && let Err(e) = controller.stop(id)
            {
                debug!("Could not stop {}: {}", id, e);
            }
            Ok(Next::Interrupted)
        }
    }
}

/// Run a blocking terminal prompt; `None` if Ctrl-C arrives first.
async fn prompt<T, F>(ask: F) -> Result<Option<T>>
where
    T: Send + 'static,
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(ask);
    tokio::select! {
        answer = task => Ok(Some(answer??)),
        _ = tokio::signal::ctrl_c() => Ok(None),
    }
}
