//! Shared fixtures for integration tests: throwaway CAs, leaf certs signed
//! by them, and entitlement extensions embedded in those leaves.

use rcgen::{BasicConstraints, Certificate, CertificateParams, CustomExtension, DistinguishedName, DnType, IsCa};

use repo_oid_auth::cert::extension::ENTITLEMENT_OID_ROOT;

/// A throwaway CA, kept alive for the duration of a test.
pub struct TestCa {
    cert: Certificate,
    pub pem: String,
}

/// Mint a self-signed CA certificate with the given common name.
pub fn make_ca(common_name: &str) -> TestCa {
    let mut params = CertificateParams::new(Vec::new());
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);

    let cert = Certificate::from_params(params).expect("CA cert params are valid");
    let pem = cert.serialize_pem().expect("self-signed CA serializes");
    TestCa { cert, pem }
}

/// One entitlement block to embed in a leaf certificate's extensions.
pub struct EntitlementFixture {
    pub product_id: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub download_url: &'static str,
}

/// Mint a leaf certificate signed by `ca`, carrying `entitlements` as
/// custom extensions under the entitlement OID root.
pub fn make_leaf(ca: &TestCa, common_name: &str, entitlements: &[EntitlementFixture]) -> String {
    let mut params = CertificateParams::new(Vec::new());
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;

    for ent in entitlements {
        let root: Vec<u64> = ENTITLEMENT_OID_ROOT
            .split('.')
            .map(|n| n.parse().unwrap())
            .collect();
        let product_id: u64 = ent.product_id.parse().unwrap();

        let mut name_oid = root.clone();
        name_oid.extend([product_id, 1]);
        let mut label_oid = root.clone();
        label_oid.extend([product_id, 2]);
        let mut url_oid = root.clone();
        url_oid.extend([product_id, 6]);

        params
            .custom_extensions
            .push(CustomExtension::from_oid_content(&name_oid, der_utf8_string(ent.name)));
        params
            .custom_extensions
            .push(CustomExtension::from_oid_content(&label_oid, der_utf8_string(ent.label)));
        params.custom_extensions.push(CustomExtension::from_oid_content(
            &url_oid,
            der_utf8_string(ent.download_url),
        ));
    }

    let leaf = Certificate::from_params(params).expect("leaf cert params are valid");
    leaf.serialize_pem_with_signer(&ca.cert)
        .expect("leaf signs under the throwaway CA")
}

/// Minimal DER encoding of a short UTF8String (tag 0x0C), good enough for
/// the short entitlement field values exercised in tests.
fn der_utf8_string(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    assert!(bytes.len() < 128, "fixture string too long for short-form DER length");
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(0x0c);
    out.push(bytes.len() as u8);
    out.extend_from_slice(bytes);
    out
}
