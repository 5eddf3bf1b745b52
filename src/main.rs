//! salesreq CLI entry point.
//!
//! `chat` runs the interactive elicitation loop; `check` validates the
//! configuration, credentials and checklist without calling the model.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;

use salesreq::config::{Config, DEFAULT_LOG_LEVEL};
use salesreq::credentials::{load_credentials, Credentials};
use salesreq::elicit::ChecklistTemplate;
use salesreq::logging;
use salesreq::providers::factory::build_provider;
use salesreq::repl::Repl;

/// Collect a sales request through a guided conversation.
#[derive(Parser)]
#[command(name = "salesreq", version, about)]
struct Cli {
    /// Config file (default: `$SALESREQ_CONFIG_PATH` or `./salesreq.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// `.env` file with API keys (default: `./.env` when present).
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Start an interactive sales request conversation.
    Chat {
        /// Write the conversation as JSON to this file when it ends.
        #[arg(long)]
        transcript: Option<PathBuf>,

        /// Override the model spec, e.g. `ollama/llama3`.
        #[arg(long)]
        model: Option<String>,
    },
    /// Validate configuration and the checklist document, then exit.
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let credentials = load_credentials(cli.env_file.as_deref()).context("failed to load env file")?;
    let bootstrap_level = credentials
        .lookup("SALESREQ_LOG_LEVEL")
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());
    let mut config = logging::with_bootstrap(&bootstrap_level, || {
        Config::load(cli.config.as_deref(), |key| credentials.lookup(key))
    })
    .context("failed to load configuration")?;

    match cli.command {
        Command::Chat { transcript, model } => {
            if let Some(model) = model {
                config.model.default = model;
            }
            handle_chat(config, &credentials, transcript).await
        }
        Command::Check => handle_check(&config, &credentials),
    }
}

/// Run the interactive conversation on stdin/stdout.
async fn handle_chat(
    config: Config,
    credentials: &Credentials,
    transcript: Option<PathBuf>,
) -> anyhow::Result<()> {
    let _logging_guard = match &config.logging.dir {
        Some(dir) => Some(logging::init_with_file(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level);
            None
        }
    };

    let template = Arc::new(
        ChecklistTemplate::load(&config.checklist.path).context("cannot start session")?,
    );
    let provider = build_provider(&config.model, credentials)
        .context("failed to create completion provider")?;
    info!(
        model = %provider.model_id(),
        strategy = %config.session.strategy,
        "salesreq chat starting"
    );

    let mut repl = Repl::new(
        provider,
        template,
        config.session.clone(),
        config.model.max_tokens,
        std::io::stdout(),
    )
    .with_transcript_path(transcript);

    let session = repl.run(BufReader::new(tokio::io::stdin())).await?;
    info!(
        session_id = %session.id(),
        turns = session.turns(),
        state = %session.state(),
        "salesreq chat finished"
    );
    Ok(())
}

/// Validate everything `chat` needs without contacting the model.
fn handle_check(config: &Config, credentials: &Credentials) -> anyhow::Result<()> {
    logging::init_cli(&config.logging.level);

    let template = ChecklistTemplate::load(&config.checklist.path)
        .context("checklist validation failed")?;
    let provider =
        build_provider(&config.model, credentials).context("provider validation failed")?;

    println!("checklist: {}", config.checklist.path.display());
    println!("slot:      {}", template.slot());
    println!("model:     {}", provider.model_id());
    println!("strategy:  {}", config.session.strategy);
    println!("ok");
    Ok(())
}
