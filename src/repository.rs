//! Repository descriptors and resolution
//!
//! A read-mostly index from request path to the repository it addresses.
//! Rebuilt and swapped wholesale on repository create/delete; lookups never
//! touch the filesystem.

use crate::trust::CaBundle;

/// Fixed URL path prefix under which every repository's content is served.
/// Entitlement path templates and [`RepositoryDescriptor::relative_path`]
/// are both expressed relative to this prefix, never including it.
pub const MOUNT_POINT: &str = "pulp/repos/";

/// Strip the service's fixed mount-point prefix from a normalized request
/// path, returning the mount-relative fragment. Returns `None` if the path
/// does not fall under the mount point at all.
pub fn strip_mount_point(normalized_path: &str) -> Option<&str> {
    normalized_path.strip_prefix(MOUNT_POINT)
}

/// A repository known to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Opaque repository id
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// URL path segment under the mount point that roots this repo's
    /// content, with no leading slash
    pub relative_path: String,
    /// Per-repo CA bundle, if per-repo auth is configured for this repo.
    /// Presence alone (independent of what's on disk in the trust store)
    /// is what gates whether the repo tier applies to a request.
    pub consumer_cert_data: Option<CaBundle>,
}

impl RepositoryDescriptor {
    /// Whether this repository has per-repo authorization configured.
    pub fn has_consumer_cert_data(&self) -> bool {
        self.consumer_cert_data.is_some()
    }
}

/// Read-mostly index of repositories, resolved by longest matching
/// `relative_path` prefix.
#[derive(Debug, Clone, Default)]
pub struct RepositoryResolver {
    repos: Vec<RepositoryDescriptor>,
}

impl RepositoryResolver {
    /// Build a resolver over a fixed set of repositories.
    pub fn new(repos: Vec<RepositoryDescriptor>) -> Self {
        Self { repos }
    }

    /// Resolve `path` (already normalized — no leading slash, no doubled
    /// `/`) to the repository whose `relative_path` is the longest matching
    /// prefix. Ties are broken by longest match; returns `None` if no repo
    /// matches.
    pub fn resolve(&self, path: &str) -> Option<&RepositoryDescriptor> {
        self.repos
            .iter()
            .filter(|repo| is_prefix_at_boundary(&repo.relative_path, path))
            .max_by_key(|repo| repo.relative_path.len())
    }
}

fn is_prefix_at_boundary(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: &str, relative_path: &str, with_auth: bool) -> RepositoryDescriptor {
        RepositoryDescriptor {
            id: id.to_string(),
            name: id.to_string(),
            relative_path: relative_path.to_string(),
            consumer_cert_data: with_auth.then(|| CaBundle::ca_only("ca pem")),
        }
    }

    #[test]
    fn resolves_the_longest_matching_prefix() {
        let resolver = RepositoryResolver::new(vec![
            repo("pulp", "repos/pulp", false),
            repo("pulp-fedora", "repos/pulp/fedora-14", true),
        ]);
        let found = resolver.resolve("repos/pulp/fedora-14/x86_64/os").unwrap();
        assert_eq!(found.id, "pulp-fedora");
    }

    #[test]
    fn no_match_returns_none() {
        let resolver = RepositoryResolver::new(vec![repo("pulp", "repos/pulp", false)]);
        assert!(resolver.resolve("other/path").is_none());
    }

    #[test]
    fn prefix_must_land_on_a_segment_boundary() {
        let resolver = RepositoryResolver::new(vec![repo("fedora", "repos/fedora", false)]);
        // "repos/fedora-14" is not under "repos/fedora" even though it
        // shares the literal prefix
        assert!(resolver.resolve("repos/fedora-14/x86_64").is_none());
        assert!(resolver.resolve("repos/fedora/x86_64").is_some());
    }

    #[test]
    fn strip_mount_point_removes_the_fixed_prefix() {
        assert_eq!(
            strip_mount_point("pulp/repos/repos/pulp/fedora-14"),
            Some("repos/pulp/fedora-14")
        );
        assert_eq!(strip_mount_point("some/other/path"), None);
    }
}
