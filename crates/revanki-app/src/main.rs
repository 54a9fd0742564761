use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use revanki_anki::{AnkiBridge, AnkiConnectClient};
use revanki_config::Config;
use revanki_page::{Document, current_headword, extract_card, inject};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::controller::AppController;
use crate::events::add_card::handle_add_card;
use crate::events::mark_again::handle_mark_again;
use crate::guard::InstanceGuard;
use crate::io::PageSource;
use crate::state::PageSession;

mod controller;
mod events;
mod guard;
mod io;
mod startup;
mod state;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "revanki", about = "Reverso dictionary pages to Anki cards")]
struct Cli {
    /// Address of the Reverso definition page
    url: String,

    /// Read the page from a saved file instead of fetching it
    #[arg(long)]
    html: Option<PathBuf>,

    /// Window width the page is rendered at
    #[arg(long)]
    viewport: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the headword and whether it is already in Anki
    Status,
    /// Print every entry as it would be saved
    List,
    /// Add the n-th entry (0-based) to Anki
    Add { index: usize },
    /// Mark the headword's cards as again
    Again,
    /// Keep following the page and read commands from stdin
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "revanki=info,revanki_anki=info,revanki_page=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let _guard = match InstanceGuard::acquire() {
        Ok(guard) => guard,
        Err(e) => {
            tracing::error!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut config = Config::new();
    if let Some(width) = cli.viewport {
        config.page.viewport_width = width;
    }
    let config = Arc::new(config);

    if let Err(e) = startup::check_page(&config.page, &cli.url) {
        tracing::info!("{e}, nothing to do");
        return Ok(ExitCode::SUCCESS);
    }

    let source = match cli.html {
        Some(path) => PageSource::File { path },
        None => PageSource::Remote {
            url: cli.url.clone(),
        },
    };
    let http = reqwest::Client::new();
    let html = source.load(&http).await?;

    let mut doc = Document::parse(cli.url.as_str(), &html);
    doc.set_viewport_width(config.page.viewport_width);

    if matches!(cli.command, Command::List) {
        print_cards(&doc)?;
        return Ok(ExitCode::SUCCESS);
    }

    let client = AnkiConnectClient::new(
        config.anki.url.clone(),
        Duration::from_millis(config.anki.timeout_ms),
    )?;
    let bridge: Arc<dyn AnkiBridge> = Arc::new(client);
    let mut session = PageSession::new(Arc::clone(&config), bridge, doc);

    let pending_repairs = match startup::activate(&mut session).await {
        Ok(pending_repairs) => pending_repairs,
        Err(_) => return Ok(ExitCode::FAILURE),
    };

    match cli.command {
        Command::List => {}
        Command::Status => print_status(&session),
        Command::Add { index } => {
            let outcome = handle_add_card(&mut session, index).await;
            tracing::debug!("Add finished: {outcome:?}");
            print_status(&session);
        }
        Command::Again => {
            let outcome = handle_mark_again(&mut session).await;
            tracing::debug!("Mark as again finished: {outcome:?}");
        }
        Command::Watch => watch(session, source, http, html, pending_repairs).await?,
    }

    Ok(ExitCode::SUCCESS)
}

async fn watch(
    session: PageSession,
    source: PageSource,
    http: reqwest::Client,
    html: String,
    pending_repairs: Vec<String>,
) -> anyhow::Result<()> {
    let controller = AppController::new();
    for word in pending_repairs {
        controller
            .sender()
            .send(revanki_types::AppEvent::RepairDue { word })
            .await
            .context("Event channel closed before start")?;
    }

    let mut tasks = controller.spawn_tasks(session, source, http, html);
    io::spawn_command_reader(controller.sender());
    tracing::info!("Watching page. Commands: add N, again, quit");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for ctrl+c")?;
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::info!("Task finished, shutting down"),
                Ok(Err(e)) => tracing::error!("Task failed: {e:#}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Ok(Err(e)) = result {
            tracing::debug!("Task ended with error during shutdown: {e:#}");
        }
    }

    Ok(())
}

fn print_cards(doc: &Document) -> anyhow::Result<()> {
    for (index, entry) in inject::entries(doc).into_iter().enumerate() {
        let line = match extract_card(doc, entry) {
            Ok(card) => serde_json::to_string(&card).context("Failed to encode card")?,
            Err(reason) => serde_json::json!({ "entry": index, "error": reason.to_string() }).to_string(),
        };
        println!("{line}");
    }
    Ok(())
}

fn print_status(session: &PageSession) {
    let word = current_headword(&session.doc);
    let state = match inject::badge_state(&session.doc) {
        Some(true) => "in Anki",
        Some(false) => "not in Anki",
        None => "unknown",
    };

    match word {
        Some(word) => println!("{word}: {state}"),
        None => println!("No headword on this page"),
    }
}
