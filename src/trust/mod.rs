//! Trust Store
//!
//! Owns the authoritative CA material for both the global tier and every
//! per-repository tier, persisted as PEM files on disk (§4.1). Writers use
//! the write-to-temp-then-rename discipline so a reader never observes a
//! partially written bundle; the absence of a bundle file is itself
//! authoritative ("no CA configured at this tier").

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};

/// A CA bundle configured at one tier.
///
/// Only `ca_cert` is consulted by the authorization path; `server_cert` and
/// `server_key` are carried through for completeness of the on-disk layout
/// (§6) but never read by [`crate::cert`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaBundle {
    /// PEM-encoded CA certificate — the trust anchor
    pub ca_cert: Option<String>,
    /// PEM-encoded server certificate (not consulted)
    pub server_cert: Option<String>,
    /// PEM-encoded server private key (not consulted)
    pub server_key: Option<String>,
}

impl CaBundle {
    /// Build a bundle carrying only a CA certificate.
    pub fn ca_only(ca_cert: impl Into<String>) -> Self {
        Self {
            ca_cert: Some(ca_cert.into()),
            server_cert: None,
            server_key: None,
        }
    }
}

/// Filesystem-backed trust store for the global and per-repository tiers.
pub struct TrustStore {
    config: Config,
    global_enabled: AtomicBool,
    write_lock: Mutex<()>,
}

impl TrustStore {
    /// Open a trust store rooted at the paths in `config`. Does not touch
    /// the filesystem; `global_enabled` starts `false` until `set_global`
    /// or an explicit `enable` call flips it.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            global_enabled: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    /// Whether the global tier is currently switched on.
    pub fn global_enabled(&self) -> bool {
        self.global_enabled.load(Ordering::Acquire)
    }

    /// Install the global CA bundle and flip the switch on.
    pub fn set_global(&self, bundle: &CaBundle) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        write_bundle(
            bundle,
            &self.config.global_ca_path(),
            &self.config.global_cert_path(),
            &self.config.global_key_path(),
        )?;
        self.global_enabled.store(true, Ordering::Release);
        Ok(())
    }

    /// Flip the global switch off. The bundle file, if any, is left on disk
    /// but is no longer consulted.
    pub fn clear_global(&self) {
        self.global_enabled.store(false, Ordering::Release);
    }

    /// Read the global CA bundle. Returns `None` if no bundle is configured
    /// or if the bundle on disk cannot be read (logged at WARN, never
    /// surfaced as an error — a corrupt tier behaves as "no CA configured").
    pub fn get_global(&self) -> Option<CaBundle> {
        read_bundle(
            "global",
            &self.config.global_ca_path(),
            &self.config.global_cert_path(),
            &self.config.global_key_path(),
        )
    }

    /// Install a per-repository CA bundle.
    pub fn set_repo(&self, repo_id: &str, bundle: &CaBundle) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        write_bundle(
            bundle,
            &self.config.repo_ca_path(repo_id),
            &self.config.repo_cert_path(repo_id),
            &self.config.repo_key_path(repo_id),
        )
    }

    /// Remove a per-repository CA bundle from disk.
    pub fn clear_repo(&self, repo_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        for path in [
            self.config.repo_ca_path(repo_id),
            self.config.repo_cert_path(repo_id),
            self.config.repo_key_path(repo_id),
        ] {
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Read a per-repository CA bundle. Returns `None` if not configured or
    /// unreadable (see [`TrustStore::get_global`] for the same rule).
    pub fn get_repo(&self, repo_id: &str) -> Option<CaBundle> {
        read_bundle(
            repo_id,
            &self.config.repo_ca_path(repo_id),
            &self.config.repo_cert_path(repo_id),
            &self.config.repo_key_path(repo_id),
        )
    }
}

fn write_bundle(bundle: &CaBundle, ca_path: &Path, cert_path: &Path, key_path: &Path) -> Result<()> {
    if let Some(ca) = &bundle.ca_cert {
        atomic_write(ca_path, ca.as_bytes())?;
    }
    if let Some(cert) = &bundle.server_cert {
        atomic_write(cert_path, cert.as_bytes())?;
    }
    if let Some(key) = &bundle.server_key {
        atomic_write(key_path, key.as_bytes())?;
    }
    Ok(())
}

/// Write `contents` to `path` by writing a sibling temp file and renaming it
/// over the target, so readers never observe a torn write.
fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::Internal(format!("bundle path {} has no parent directory", path.display()))
    })?;
    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("bundle")
    ));
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_bundle(tier: &str, ca_path: &Path, cert_path: &Path, key_path: &Path) -> Option<CaBundle> {
    if !ca_path.exists() {
        return None;
    }
    let ca_cert = match fs::read_to_string(ca_path) {
        Ok(contents) => contents,
        Err(io_err) => {
            let err = Error::Configuration {
                tier: tier.to_string(),
                reason: io_err.to_string(),
            };
            warn!(error = %err, path = %ca_path.display(), "trust store: unreadable CA bundle, treating tier as unconfigured");
            return None;
        }
    };
    let server_cert = fs::read_to_string(cert_path).ok();
    let server_key = fs::read_to_string(key_path).ok();
    Some(CaBundle {
        ca_cert: Some(ca_cert),
        server_cert,
        server_key,
    })
}
