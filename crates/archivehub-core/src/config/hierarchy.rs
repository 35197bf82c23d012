//! Hierarchy service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the directory tree cache and the remote metadata probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Expiry of each cached tree variant, in seconds.
    #[serde(default = "default_tree_cache_ttl")]
    pub tree_cache_ttl_seconds: u64,
    /// Timeout for each HEAD/GET metadata probe, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// Redirects followed before a probe is rejected.
    #[serde(default = "default_probe_max_redirects")]
    pub probe_max_redirects: usize,
}

impl HierarchyConfig {
    /// Tree cache TTL as a [`Duration`].
    pub fn tree_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.tree_cache_ttl_seconds)
    }

    /// Probe timeout as a [`Duration`].
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            tree_cache_ttl_seconds: default_tree_cache_ttl(),
            probe_timeout_seconds: default_probe_timeout(),
            probe_max_redirects: default_probe_max_redirects(),
        }
    }
}

fn default_tree_cache_ttl() -> u64 {
    30 * 60
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_probe_max_redirects() -> usize {
    10
}
