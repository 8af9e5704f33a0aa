//! Error types for the authorization engine
//!
//! Every public entry point in this crate returns [`Result`]. The
//! authorization engine ([`crate::engine::Engine::authenticate`]) is the one
//! place that collapses all of these variants down to a boolean decision;
//! elsewhere they stay as values callers (and tests) can inspect.

use thiserror::Error;

/// Result type alias for authorization operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the authorization engine
#[derive(Error, Debug)]
pub enum Error {
    /// A CA bundle for an active tier is missing or malformed
    #[error("configuration error for tier {tier}: {reason}")]
    Configuration {
        /// Which tier was affected ("global" or a repo id)
        tier: String,
        /// Human-readable reason
        reason: String,
    },

    /// The client-presented PEM could not be parsed into a certificate
    #[error("certificate parse error: {0}")]
    CertParse(String),

    /// Signature chain verification failed
    #[error("chain verification failed: {0}")]
    ChainVerify(String),

    /// The entitlement extension was present but could not be decoded
    #[error("entitlement decode error: {0}")]
    EntitlementDecode(String),

    /// The repository resolver index is unavailable
    #[error("repository resolver error: {0}")]
    Resolver(String),

    /// PEM parsing errors
    #[error("PEM error: {0}")]
    Pem(#[from] pem::PemError),

    /// IO errors reading or writing trust-store material
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (config round trips)
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything unanticipated; always treated as deny by the engine
    #[error("internal error: {0}")]
    Internal(String),
}
