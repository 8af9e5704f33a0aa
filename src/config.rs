//! Configuration
//!
//! Centralized configuration for the authorization engine: the filesystem
//! locations the [`crate::trust::TrustStore`] reads and writes, per the
//! `repos.*` option names the host service recognizes.
//!
//! Paths are always supplied by the caller (via [`Config::default_under`]),
//! never read from a process-wide constant, so tests can point the whole
//! engine at a temp directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Authorization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem path to the persisted list of repo_ids with per-repo auth
    /// configured (`repos.protected_repo_listing_file`)
    pub protected_repo_listing_file: PathBuf,

    /// Filesystem path for the global CA/cert/key trio
    /// (`repos.global_cert_location`)
    pub global_cert_location: PathBuf,

    /// Directory under which per-repo bundles live, named by repo_id
    /// (`repos.repo_cert_location`)
    pub repo_cert_location: PathBuf,

    /// Reserved for future CRL support; read but never consulted
    /// (`crl_location`)
    pub crl_location: Option<PathBuf>,
}

impl Config {
    /// Build a configuration rooted under `root` (for example a temp dir in
    /// tests, or the service's configured data directory in production).
    pub fn default_under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            protected_repo_listing_file: root.join("repos").join("repos.json"),
            global_cert_location: root.join("repos").join("global"),
            repo_cert_location: root.join("repos").join("per-repo"),
            crl_location: None,
        }
    }

    /// Filesystem path for the global CA bundle's `.ca` file
    pub fn global_ca_path(&self) -> PathBuf {
        self.global_cert_location.join("pulp-global-repo.ca")
    }

    /// Filesystem path for the global CA bundle's `.cert` file
    pub fn global_cert_path(&self) -> PathBuf {
        self.global_cert_location.join("pulp-global-repo.cert")
    }

    /// Filesystem path for the global CA bundle's `.key` file
    pub fn global_key_path(&self) -> PathBuf {
        self.global_cert_location.join("pulp-global-repo.key")
    }

    /// Filesystem path for a given repo's CA bundle's `.ca` file
    pub fn repo_ca_path(&self, repo_id: &str) -> PathBuf {
        self.repo_cert_location
            .join(repo_id)
            .join(format!("pulp-{repo_id}.ca"))
    }

    /// Filesystem path for a given repo's CA bundle's `.cert` file
    pub fn repo_cert_path(&self, repo_id: &str) -> PathBuf {
        self.repo_cert_location
            .join(repo_id)
            .join(format!("pulp-{repo_id}.cert"))
    }

    /// Filesystem path for a given repo's CA bundle's `.key` file
    pub fn repo_key_path(&self, repo_id: &str) -> PathBuf {
        self.repo_cert_location
            .join(repo_id)
            .join(format!("pulp-{repo_id}.key"))
    }

    /// Serialize this configuration to JSON, e.g. for a persisted
    /// deployment manifest.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a configuration previously produced by [`Config::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
