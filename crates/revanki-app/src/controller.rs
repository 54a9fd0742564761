use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use revanki_types::AppEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::{PageSource, page_watcher, ticker};
use crate::state::PageSession;

const TICK_PERIOD: Duration = Duration::from_millis(250);

/// Centralized channel management
pub struct ChannelSet {
    pub events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            events: kanal::bounded_async(64),
        }
    }
}

/// Task spawning and lifecycle for watch mode
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new() -> Self {
        Self {
            channels: ChannelSet::new(),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn sender(&self) -> &AsyncSender<AppEvent> {
        &self.channels.events.0
    }

    pub fn spawn_tasks(
        &self,
        session: PageSession,
        source: PageSource,
        http: reqwest::Client,
        initial_html: String,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();
        let poll_interval = Duration::from_millis(session.config.page.poll_interval_ms);

        tasks.spawn(event_loop(
            session,
            self.channels.events.1.clone(),
            self.channels.events.0.clone(),
        ));

        tasks.spawn(page_watcher(
            source,
            http,
            poll_interval,
            initial_html,
            self.cancel_token.child_token(),
            self.channels.events.0.clone(),
        ));

        tasks.spawn(ticker(
            TICK_PERIOD,
            self.cancel_token.child_token(),
            self.channels.events.0.clone(),
        ));

        tasks
    }

    /// Stop the producers and the event loop. A full queue is closed
    /// instead, which ends the loop without running what is still queued.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();

        let sender = &self.channels.events.0;
        match sender.try_send(AppEvent::Shutdown) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Event queue full, dropping pending events");
                if sender.close().is_err() {
                    tracing::debug!("Event channel already closed");
                }
            }
            Err(_) => tracing::debug!("Event loop already gone"),
        }
    }
}
