//! Entitlement data model
//!
//! Plain data, immutable after construction. Extracted once per request
//! from a [`crate::cert::Certificate`] and never cached across requests.

use serde::{Deserialize, Serialize};

/// A single entitlement block pulled out of a certificate's custom
/// extensions: a product id, its display name, and the URL path template it
/// authorizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    /// Numeric product id the entitlement block was registered under
    pub product_id: String,
    /// Human-readable product name (or label, if name is absent)
    pub product_name: String,
    /// URL path template this entitlement authorizes, e.g.
    /// `repos/pulp/pulp/$releasever/$basearch/os`
    pub path_template: String,
}

/// Helper over a collection of entitlements.
pub trait Templates {
    /// The path templates carried by this set of entitlements, in order.
    fn templates(&self) -> Vec<&str>;
}

impl Templates for [Entitlement] {
    fn templates(&self) -> Vec<&str> {
        self.iter().map(|e| e.path_template.as_str()).collect()
    }
}
