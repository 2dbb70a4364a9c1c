use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use todo_gate::admission::{Action, AdmissionError, Gate, TracingCollaborator};
use todo_gate::config::{GateConfig, LoggingConfig};
use todo_gate::ratelimit::RateLimiter;
use todo_gate::sanitize::sanitize;
use todo_gate::validation::{RawInput, ValidatedInput};

#[derive(Parser)]
#[command(name = "todo-gate", version, about = "Request admission for the todo service")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an action through the admission pipeline (dry run handoff)
    Check {
        #[arg(value_enum)]
        action: ActionArg,

        /// Scope the rate limit key to this subject
        #[arg(long)]
        subject: Option<String>,

        /// JSON object of field values, or `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,

        /// Submit the same input this many times
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Print the sanitized form of a text
    Sanitize { text: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Signup,
    Signin,
    AddTodo,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Signup => Action::SignUp,
            ActionArg::Signin => Action::SignIn,
            ActionArg::AddTodo => Action::AddTodo,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GateConfig::from_file(path)?,
        None => GateConfig::default(),
    };
    init_tracing(&config.logging, cli.json_logs);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Todo Gate");

    match cli.command {
        Command::Sanitize { text } => {
            println!("{}", sanitize(&text));
        }
        Command::Check {
            action,
            subject,
            input,
            repeat,
        } => {
            let raw = RawInput::from_json(&read_input(&input)?)?;

            let limiter = Arc::new(
                RateLimiter::new().with_max_tracked_keys(config.rate_limiting.max_tracked_keys),
            );
            let gate = Gate::new(
                limiter,
                config.rate_limiting.limits.clone(),
                Arc::new(TracingCollaborator),
            );
            info!(actions = config.rate_limiting.limits.len(), "Gate initialized");

            let action = Action::from(action);
            for attempt in 1..=repeat {
                let outcome = gate.submit(action, subject.as_deref(), &raw).await;
                println!("{}", render_outcome(attempt, outcome));
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig, json_logs: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json_logs || logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source)
    }
}

fn render_outcome(
    attempt: u32,
    outcome: Result<todo_gate::admission::Admitted, AdmissionError>,
) -> serde_json::Value {
    match outcome {
        Ok(admitted) => {
            let item = match &admitted.input {
                ValidatedInput::TodoItem(item) => serde_json::to_value(item).ok(),
                _ => None,
            };
            json!({
                "attempt": attempt,
                "outcome": "admitted",
                "key": admitted.key,
                "remaining": admitted.decision.remaining,
                "item": item,
            })
        }
        Err(AdmissionError::RateLimited { key, retry_after_ms }) => json!({
            "attempt": attempt,
            "outcome": "rate_limited",
            "key": key,
            "retry_after_ms": retry_after_ms,
        }),
        Err(AdmissionError::Invalid(e)) => json!({
            "attempt": attempt,
            "outcome": "invalid",
            "field": e.field,
            "reason": e.reason.code(),
            "message": e.message(),
        }),
        Err(e @ AdmissionError::Collaborator(_)) => json!({
            "attempt": attempt,
            "outcome": "failed",
            "message": e.to_string(),
        }),
    }
}
