use std::env;

use serde::{Deserialize, Serialize};

use self::anki::AnkiConfig;
use self::page::PageConfig;
use self::ui::UiConfig;

pub mod anki;
pub mod page;
pub mod ui;

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub anki: AnkiConfig,
    pub ui: UiConfig,
    pub page: PageConfig,
}

impl Config {
    /// Defaults overridden by environment variables
    pub fn new() -> Self {
        Config {
            anki: AnkiConfig::new(),
            ui: UiConfig::new(),
            page: PageConfig::new(),
        }
    }
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
