//! OID-entitlement authorization engine for a content repository service.
//!
//! A front-end web server intercepts every request for a repository
//! artifact and must decide, before serving bytes, whether the requesting
//! client is entitled to the target URL. The decision is driven by X.509
//! certificate authorities configured globally and/or per repository, and
//! by machine-readable entitlement extensions carried in the client's own
//! certificate that enumerate the URL path patterns it may access.
//!
//! Module map:
//! - [`trust`] — the two-tier (global + per-repository) CA trust store
//! - [`cert`] — PEM parsing, chain verification, entitlement extraction
//! - [`entitlement`] — the parsed entitlement data model
//! - [`matcher`] — `$variable` URL template matching
//! - [`repository`] — repository descriptors and longest-prefix resolution
//! - [`engine`] — ties the above together into one `authenticate` decision
//!
//! This crate does not issue, revoke, or renew certificates, maintain a
//! revocation list, terminate TLS, or cache decisions across requests.

#![warn(missing_docs)]

pub mod cert;
pub mod config;
pub mod engine;
pub mod entitlement;
pub mod error;
pub mod matcher;
pub mod repository;
pub mod trust;

/// Commonly used types, re-exported for convenient `use
/// repo_oid_auth::prelude::*;` imports.
pub mod prelude {
    pub use crate::cert::Certificate;
    pub use crate::config::Config;
    pub use crate::engine::{Engine, Request};
    pub use crate::entitlement::Entitlement;
    pub use crate::error::{Error, Result};
    pub use crate::repository::{RepositoryDescriptor, RepositoryResolver};
    pub use crate::trust::{CaBundle, TrustStore};
}
