use std::sync::Arc;
use std::time::Duration;

use revanki_anki::AnkiBridge;
use revanki_config::Config;
use revanki_page::{Document, PageObserver, Toaster};

/// Everything bound to the one page this process decorates
pub struct PageSession {
    pub config: Arc<Config>,
    pub bridge: Arc<dyn AnkiBridge>,
    pub doc: Document,
    pub observer: PageObserver,
    pub toaster: Toaster,
}

impl PageSession {
    pub fn new(config: Arc<Config>, bridge: Arc<dyn AnkiBridge>, doc: Document) -> Self {
        let observer = PageObserver::new(config.ui.max_repair_attempts);
        let toaster = Toaster::new(Duration::from_millis(config.ui.toast_duration_ms));

        Self {
            config,
            bridge,
            doc,
            observer,
            toaster,
        }
    }

    pub fn repair_delay(&self) -> Duration {
        Duration::from_millis(self.config.ui.repair_delay_ms)
    }
}
