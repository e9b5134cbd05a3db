//! Platform services: microphone permission and the settings app.

use futures::future::{self, BoxFuture, FutureExt};

pub trait RecordPermission: Send + Sync {
    /// Ask for microphone access. Resolves to whether access was granted.
    fn request(&self) -> BoxFuture<'static, bool>;
}

pub trait SettingsOpener: Send + Sync {
    fn open(&self);
}

/// Answers every permission request the same way.
#[derive(Debug, Clone, Copy)]
pub struct FixedPermission {
    granted: bool,
}

impl FixedPermission {
    pub fn new(granted: bool) -> Self {
        Self { granted }
    }
}

impl RecordPermission for FixedPermission {
    fn request(&self) -> BoxFuture<'static, bool> {
        tracing::info!(granted = self.granted, "microphone permission requested");
        future::ready(self.granted).boxed()
    }
}

/// Settings opener for hosts without a settings app.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSettings;

impl SettingsOpener for LoggingSettings {
    fn open(&self) {
        tracing::info!("open settings requested; no settings app on this host");
    }
}
