use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use kanal::AsyncSender;
use revanki_types::AppEvent;
use tokio_util::sync::CancellationToken;

/// Where the host page comes from
#[derive(Debug, Clone)]
pub enum PageSource {
    Remote { url: String },
    /// Saved copy of the page, re-read on every poll
    File { path: PathBuf },
}

impl PageSource {
    pub async fn load(&self, http: &reqwest::Client) -> anyhow::Result<String> {
        match self {
            PageSource::Remote { url } => {
                let response = http
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch {url}"))?
                    .error_for_status()
                    .with_context(|| format!("Bad status from {url}"))?;
                response.text().await.context("Failed to read page body")
            }
            PageSource::File { path } => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }
}

/// Re-loads the page and hands every changed rendering to the event loop
pub async fn page_watcher(
    source: PageSource,
    http: reqwest::Client,
    interval: Duration,
    initial_html: String,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("Watching page every {}ms", interval.as_millis());

    let mut last = initial_html;
    let mut ticker = tokio::time::interval(interval);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Page watcher stopping");
                break;
            }
            _ = ticker.tick() => {
                let html = match source.load(&http).await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!("Page reload failed: {e:#}");
                        continue;
                    }
                };

                if html == last {
                    continue;
                }

                last = html.clone();
                if let Err(e) = event_tx.send(AppEvent::PageSnapshot(html)).await {
                    tracing::error!("Failed to send page snapshot: {e}");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Sends `Tick` so toasts expire on time
pub async fn ticker(
    period: Duration,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if event_tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Reads user commands from stdin on a plain thread; the lock on stdin
/// blocks, so it stays off the runtime.
pub fn spawn_command_reader(event_tx: &AsyncSender<AppEvent>) {
    let tx = event_tx.clone_sync();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };

            match parse_command(&line) {
                Some(event) => {
                    let quit = matches!(event, AppEvent::Shutdown);
                    if tx.send(event).is_err() || quit {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => tracing::warn!("Unknown command: {line:?} (try: add N, again, quit)"),
            }
        }
        tracing::debug!("Command reader stopping");
    });
}

pub fn parse_command(line: &str) -> Option<AppEvent> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?.to_lowercase();

    let event = match command.as_str() {
        "add" => AppEvent::AddCard {
            entry: parts.next()?.parse().ok()?,
        },
        "again" => AppEvent::MarkAgain,
        "quit" | "exit" => AppEvent::Shutdown,
        _ => return None,
    };

    parts.next().is_none().then_some(event)
}
