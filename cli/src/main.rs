//! CLI entrypoint for confab
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod repl;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use confab_application::{ChatStore, ExchangeCoordinator};
use confab_domain::Session;
use confab_infrastructure::{
    ConfigLoader, Database, FileSettings, OpenAiGateway, SqliteChatStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::repl::ChatRepl;

/// Streaming chat client for OpenAI-compatible endpoints
#[derive(Parser, Debug)]
#[command(name = "confab", version, about)]
struct Cli {
    /// Question to ask (omit with --chat for interactive mode)
    question: Option<String>,

    /// Start an interactive chat session
    #[arg(short, long)]
    chat: bool,

    /// Session name to use (created if it does not exist)
    #[arg(short, long)]
    session: Option<String>,

    /// Path to a config file (merged over the global/project ones)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to load configuration")?;

    let db_path = config
        .storage
        .path
        .clone()
        .or_else(|| dirs::data_dir().map(|d| d.join("confab").join("chat.db")))
        .context("no storage path configured and no platform data directory")?;

    // === Dependency Injection ===
    let settings = Arc::new(FileSettings::from_config(config, cli.config.clone()));
    let store: Arc<dyn ChatStore> = Arc::new(SqliteChatStore::new(Arc::new(
        Database::open(&db_path).context("failed to open chat storage")?,
    )));
    let gateway = Arc::new(OpenAiGateway::new(settings.clone()));
    let coordinator = Arc::new(ExchangeCoordinator::new(
        gateway,
        store.clone(),
        settings.clone(),
    ));

    let session = select_session(store.as_ref(), cli.session.as_deref())?;
    info!(session = %session.id(), "session selected");

    if cli.chat {
        let repl = ChatRepl::new(coordinator, store, settings, session);
        repl.run().await?;
        return Ok(());
    }

    let question = match cli.question {
        Some(q) if !q.trim().is_empty() => q,
        _ => bail!("A question is required. Use --chat for interactive mode."),
    };

    ask_once(&coordinator, session.id(), &question).await
}

/// Ask a single question, streaming the answer to stdout.
async fn ask_once(
    coordinator: &Arc<ExchangeCoordinator>,
    session_id: uuid::Uuid,
    question: &str,
) -> Result<()> {
    // Ctrl-C cancels the in-flight cycle instead of killing the process,
    // so partial output ends cleanly.
    let canceller = coordinator.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let mut printed = 0;
    let result = coordinator
        .send(session_id, question.trim(), |answer| {
            print!("{}", &answer[printed..]);
            let _ = io::stdout().flush();
            printed = answer.len();
        })
        .await;
    ctrl_c.abort();

    match result {
        Ok(_) => {
            println!();
            Ok(())
        }
        Err(e) if e.is_canceled() => {
            println!();
            Ok(())
        }
        Err(e) if e.is_timeout() => {
            println!();
            bail!("response timed out")
        }
        Err(e) => {
            println!();
            Err(e.into())
        }
    }
}

/// Pick the session to use, creating one when necessary.
///
/// With a name, an existing session of that name wins; otherwise a new named
/// session is created. Without a name, the oldest stored session is used, or
/// a fresh unnamed one if the store is empty.
fn select_session(store: &dyn ChatStore, name: Option<&str>) -> Result<Session> {
    let sessions = store.all_sessions()?;

    if let Some(name) = name {
        if let Some(existing) = sessions.into_iter().find(|s| s.name() == Some(name)) {
            return Ok(existing);
        }
        let session = Session::named(name);
        store.save_session(&session)?;
        return Ok(session);
    }

    if let Some(first) = sessions.into_iter().next() {
        return Ok(first);
    }
    let session = Session::new();
    store.save_session(&session)?;
    Ok(session)
}
