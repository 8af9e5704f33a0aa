//! Authorization engine
//!
//! Composes the trust store, certificate parser/verifier, entitlement
//! model, URL matcher, and repository resolver into the single
//! `authenticate` decision. The engine itself is stateless per request —
//! the only state is the trust store and the repository resolver, both of
//! which are safe to read concurrently from many request-handling workers.

use std::sync::{Arc, RwLock};

use tracing::{error, info, info_span, warn};

use crate::cert::{self, Certificate};
use crate::entitlement::Templates;
use crate::error::Error;
use crate::matcher;
use crate::repository::{self, RepositoryResolver};
use crate::trust::TrustStore;

/// The inbound request as the engine needs to see it: the client
/// certificate (possibly empty, meaning no cert was presented) and the
/// request URI (only its path component is used).
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// PEM bytes of the presented client certificate, or empty if none was
    /// presented
    pub client_cert_pem: String,
    /// The absolute request URI; only the path component matters
    pub request_uri: String,
}

/// Composes the trust store, repository resolver, and verification/matching
/// pipeline into one per-request permit/deny decision.
pub struct Engine {
    trust: TrustStore,
    resolver: RwLock<Arc<RepositoryResolver>>,
}

impl Engine {
    /// Build an engine over a trust store and an initial repository
    /// resolver snapshot.
    pub fn new(trust: TrustStore, resolver: RepositoryResolver) -> Self {
        Self {
            trust,
            resolver: RwLock::new(Arc::new(resolver)),
        }
    }

    /// Access the trust store, e.g. for administrative operations.
    pub fn trust(&self) -> &TrustStore {
        &self.trust
    }

    /// Atomically publish a new repository resolver snapshot. In-flight
    /// calls to `authenticate` that already loaded the previous snapshot
    /// complete against it; only subsequent calls see the new one.
    pub fn publish_resolver(&self, resolver: RepositoryResolver) {
        let mut guard = self.resolver.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(resolver);
    }

    /// Decide whether `request` is authorized. Never panics and never
    /// returns an error to the caller: any internal failure collapses to
    /// `false` (deny), per the fail-closed design.
    pub fn authenticate(&self, request: &Request) -> bool {
        let path = decoded_path(&request.request_uri);
        let normalized_path = matcher::normalize(&path);
        let span = info_span!("authenticate", path = %normalized_path);
        let _enter = span.enter();

        // relative_path and entitlement templates are both expressed under
        // the mount point, not the full request path. A request outside the
        // mount point can never match a `relative_path` or a template (none
        // of them carry the mount prefix), so falling back to the full path
        // here just makes that fail naturally rather than specially.
        let mount_relative_path =
            repository::strip_mount_point(&normalized_path).unwrap_or(&normalized_path);

        let resolver = match self.resolver.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(_) => {
                let err = Error::Resolver(
                    "repository resolver lock was poisoned by a prior panic".into(),
                );
                error!(error = %err, "denying");
                return false;
            }
        };
        let repo = resolver.resolve(mount_relative_path);

        let mut tiers: Vec<(&'static str, Option<crate::trust::CaBundle>)> = Vec::new();
        if self.trust.global_enabled() {
            tiers.push(("global", self.trust.get_global()));
        }
        if let Some(repo) = repo {
            if repo.has_consumer_cert_data() {
                tiers.push(("repo", self.trust.get_repo(&repo.id)));
            }
        }

        if tiers.is_empty() {
            info!("no auth tier active for this request, allowing");
            return true;
        }

        if request.client_cert_pem.is_empty() {
            info!("tier active but no client certificate presented, denying");
            return false;
        }

        let cert = match Certificate::parse(request.client_cert_pem.as_bytes()) {
            Ok(cert) => cert,
            Err(err) => {
                warn!(error = %err, "client certificate failed to parse, denying");
                return false;
            }
        };

        for (tier_name, ca) in &tiers {
            let Some(ca) = ca else {
                warn!(tier = tier_name, "active tier has no readable CA, denying");
                return false;
            };
            let Some(ca_cert) = &ca.ca_cert else {
                warn!(tier = tier_name, "active tier bundle has no CA certificate, denying");
                return false;
            };
            if !cert::verify_signed_by(&cert, ca_cert.as_bytes()) {
                warn!(tier = tier_name, "chain verification failed, denying");
                return false;
            }
        }

        let entitlements = cert::extract_entitlements(&cert);
        let templates = entitlements.templates();
        if matcher::matches_any(templates.iter().copied(), mount_relative_path) {
            info!("entitlement matched request path, allowing");
            true
        } else {
            info!("no entitlement matched request path, denying");
            false
        }
    }
}

/// Extract and percent-decode the path component of an absolute URI.
/// Hand-rolled rather than pulled in through a URL crate, same reasoning as
/// the template substitution in [`crate::matcher`]: the transformation
/// needed here is narrow (strip scheme/host/query, decode `%XX` escapes)
/// and auditability matters more than generality.
fn decoded_path(request_uri: &str) -> String {
    let after_scheme = match request_uri.find("://") {
        Some(idx) => &request_uri[idx + 3..],
        None => request_uri,
    };
    let path = match after_scheme.find('/') {
        Some(idx) => &after_scheme[idx..],
        None => "",
    };
    let path = path.split(['?', '#']).next().unwrap_or("");
    percent_decode(path)
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
