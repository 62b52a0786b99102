//! Runtime snapshot passed to tool handlers.
//!
//! Handlers receive process state as an explicit immutable value instead of
//! reading `std::env` themselves, which keeps them independently testable.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};

/// Immutable view of the server process captured at startup.
#[derive(Debug, Clone)]
pub struct RuntimeSnapshot {
    pub platform: &'static str,
    pub arch: &'static str,
    /// Deployment environment name, from `NODE_ENV` when set.
    pub environment: String,
    /// Prefix the `env_vars` map was filtered with.
    pub env_prefix: String,
    /// Environment variables whose names start with `env_prefix`.
    pub env_vars: BTreeMap<String, String>,
    pub cwd: PathBuf,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    started: Instant,
}

impl RuntimeSnapshot {
    /// Capture the current process state, filtering environment variables to
    /// the given prefix.
    pub fn capture(env_prefix: &str) -> Self {
        Self::capture_from(std::env::vars(), env_prefix)
    }

    fn capture_from(vars: impl Iterator<Item = (String, String)>, env_prefix: &str) -> Self {
        let env_vars = vars.filter(|(key, _)| key.starts_with(env_prefix)).collect();
        let environment =
            std::env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string());

        Self {
            platform: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            environment,
            env_prefix: env_prefix.to_string(),
            env_vars,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            pid: std::process::id(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Seconds since the snapshot was taken.
    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
