use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What one synchronisation run operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Repository full name, `owner/name`. Feeds slug derivation.
    pub repo: String,
    /// Root path to scan for markdown files. Empty means the repository root.
    pub path: String,
}

impl SyncConfig {
    pub fn trace_loaded(&self) {
        info!(
            repo = %self.repo,
            path = %self.path,
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}
