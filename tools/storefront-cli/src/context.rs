//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use storefront_core::{Storefront, StorefrontConfig};
use storefront_events::AppEvent;
use tokio::sync::broadcast;

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Storefront configuration.
    pub config: StorefrontConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let (config, config_path) = StorefrontConfig::discover(config_path.map(Path::new), &cwd)?;
        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build the storefront client with a listener for its toasts.
    pub fn storefront(&self) -> Result<(Storefront, broadcast::Receiver<AppEvent>)> {
        let shop = Storefront::builder(self.config.clone())
            .build()
            .context("Failed to start storefront client")?;
        let events = shop.events().subscribe();
        Ok((shop, events))
    }

    /// Print toasts published since `events` was created.
    pub fn flush_toasts(&self, events: &mut broadcast::Receiver<AppEvent>) {
        while let Ok(event) = events.try_recv() {
            if let AppEvent::ShowToast(toast) = event {
                self.output.toast(toast.kind, &toast.message);
            }
        }
    }
}
