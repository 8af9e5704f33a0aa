//! Entitlement extension decoding
//!
//! Entitlements are carried as a family of custom X.509 extensions under a
//! fixed OID root. Each numbered block groups three sub-OIDs:
//!
//! ```text
//! 1.3.6.1.4.1.2312.9.2.<product_id>.1   name
//! 1.3.6.1.4.1.2312.9.2.<product_id>.2   label
//! 1.3.6.1.4.1.2312.9.2.<product_id>.6   download_url
//! ```
//!
//! This mirrors the real Red Hat / RHSM entitlement certificate layout: one
//! extension per field per product, not a single nested ASN.1 structure.

use std::collections::BTreeMap;

use tracing::warn;
use x509_parser::der_parser::ber::BerObjectContent;
use x509_parser::der_parser::parse_der;
use x509_parser::prelude::*;

use crate::entitlement::Entitlement;
use crate::error::{Error, Result};

/// OID arc under which every entitlement sub-field lives.
pub const ENTITLEMENT_OID_ROOT: &str = "1.3.6.1.4.1.2312.9.2";

const FIELD_NAME: &str = "1";
const FIELD_LABEL: &str = "2";
const FIELD_DOWNLOAD_URL: &str = "6";

#[derive(Default)]
struct Block {
    name: Option<String>,
    label: Option<String>,
    download_url: Option<String>,
}

/// Pull every entitlement block out of `cert`'s extensions, in the order
/// their product ids sort (the order they're numbered, not the order they
/// happen to appear in the certificate).
///
/// An absent extension family yields an empty list; a block missing its
/// `download_url` field is skipped since that's the only field the
/// authorization path consults (§4.2 — unknown/partial sub-fields are
/// ignored, not fatal).
pub fn extract_entitlements(cert: &X509Certificate) -> Vec<Entitlement> {
    let mut blocks: BTreeMap<String, Block> = BTreeMap::new();

    for ext in cert.extensions() {
        let oid_str = ext.oid.to_id_string();
        let Some(rest) = oid_str.strip_prefix(ENTITLEMENT_OID_ROOT) else {
            continue;
        };
        let rest = rest.trim_start_matches('.');
        let mut parts = rest.rsplitn(2, '.');
        let field = match parts.next() {
            Some(f) => f,
            None => continue,
        };
        let product_id = match parts.next() {
            Some(p) => p,
            None => continue,
        };
        if product_id.is_empty() {
            continue;
        }

        let value = match decode_string_value(ext.value) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, oid = %oid_str, "entitlement extension value failed to decode, skipping field");
                continue;
            }
        };

        let block = blocks.entry(product_id.to_string()).or_default();
        match field {
            FIELD_NAME => block.name = Some(value),
            FIELD_LABEL => block.label = Some(value),
            FIELD_DOWNLOAD_URL => block.download_url = Some(value),
            _ => {}
        }
    }

    blocks
        .into_iter()
        .filter_map(|(product_id, block)| {
            let download_url = block.download_url?;
            Some(Entitlement {
                product_id,
                product_name: block.name.or(block.label).unwrap_or_default(),
                path_template: download_url,
            })
        })
        .collect()
}

/// Entitlement extension values are DER-encoded character strings
/// (UTF8String in practice, but real-world certs have used IA5String and
/// PrintableString too). Fall back to treating the raw bytes as UTF-8 if
/// the DER wrapper doesn't parse — some issuers store the value unwrapped.
fn decode_string_value(raw: &[u8]) -> Result<String> {
    if let Ok((_, obj)) = parse_der(raw) {
        let text = match obj.content {
            BerObjectContent::UTF8String(s) => Some(s.to_string()),
            BerObjectContent::PrintableString(s) => Some(s.to_string()),
            BerObjectContent::IA5String(s) => Some(s.to_string()),
            BerObjectContent::GeneralString(s) => Some(s.to_string()),
            _ => None,
        };
        if let Some(text) = text {
            return Ok(text);
        }
    }
    std::str::from_utf8(raw)
        .map(|s| s.to_string())
        .map_err(|err| Error::EntitlementDecode(format!("non-utf8 extension value: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oid_without_matching_root_is_skipped() {
        // sanity check on the prefix-stripping logic in isolation, without
        // needing a full certificate fixture
        let oid_str = "2.5.29.17";
        assert!(!oid_str.starts_with(ENTITLEMENT_OID_ROOT));
    }

    #[test]
    fn field_and_product_id_split_from_the_tail() {
        let rest = "1000.6";
        let mut parts = rest.rsplitn(2, '.');
        let field = parts.next().unwrap();
        let product_id = parts.next().unwrap();
        assert_eq!(field, "6");
        assert_eq!(product_id, "1000");
    }
}
