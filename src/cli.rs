use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, PermissionMode};

/// Runs a scripted voice memo session (record, stop, play) against a
/// simulated audio stack and prints every state change.
#[derive(Debug, Parser)]
#[command(name = "voice-memos", version, about)]
pub struct Args {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer the microphone permission prompt with "deny"
    #[arg(long)]
    pub deny_permission: bool,

    /// Seconds to record before stopping
    #[arg(long, value_name = "SECONDS")]
    pub record_seconds: Option<f64>,

    /// Print states as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if self.deny_permission {
            config.simulation.permission = PermissionMode::Deny;
        }
        if let Some(seconds) = self.record_seconds {
            config.simulation.recording_seconds = seconds;
        }
    }
}
