use crate::signing::canonical::{canonical_headers, canonical_query, canonical_request};
use crate::signing::{EMPTY_SHA256, SignContext, hmac_sha256_hex, sha256_hex};
use crate::transport::HttpRequestSpec;

pub const ACS3_ALGORITHM: &str = "ACS3-HMAC-SHA256";

#[derive(Debug, Clone, Copy)]
/// Aliyun ACS v3 request signer (HMAC-SHA256 over a canonical request).
pub struct Acs3Signer<'a> {
    access_key_id: &'a str,
    access_key_secret: &'a str,
}

impl<'a> Acs3Signer<'a> {
    pub fn new(access_key_id: &'a str, access_key_secret: &'a str) -> Self {
        Self {
            access_key_id,
            access_key_secret,
        }
    }

    /// Add the `x-acs-*`, `host` and `Authorization` headers to `spec`.
    ///
    /// Query and body must be final before signing.
    pub fn sign(
        &self,
        spec: &mut HttpRequestSpec,
        host: &str,
        action: &str,
        version: &str,
        ctx: &SignContext,
    ) {
        let content_hash = if spec.body.is_empty() {
            EMPTY_SHA256.to_owned()
        } else {
            sha256_hex(&spec.body)
        };
        let date = ctx.now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        spec.headers.extend([
            ("host".to_owned(), host.to_owned()),
            ("x-acs-action".to_owned(), action.to_owned()),
            ("x-acs-version".to_owned(), version.to_owned()),
            ("x-acs-date".to_owned(), date),
            ("x-acs-signature-nonce".to_owned(), ctx.nonce_hex()),
            ("x-acs-content-sha256".to_owned(), content_hash.clone()),
        ]);

        let headers = canonical_headers(&spec.headers, |name| {
            name == "host" || name == "content-type" || name.starts_with("x-acs-")
        });
        let canonical = canonical_request(
            spec.method.as_str(),
            &url_path(&spec.url),
            &canonical_query(&spec.query),
            &headers,
            &content_hash,
        );
        let string_to_sign = format!("{ACS3_ALGORITHM}\n{}", sha256_hex(canonical.as_bytes()));
        let signature =
            hmac_sha256_hex(self.access_key_secret.as_bytes(), string_to_sign.as_bytes());

        spec.headers.push((
            "Authorization".to_owned(),
            format!(
                "{ACS3_ALGORITHM} Credential={},SignedHeaders={},Signature={signature}",
                self.access_key_id, headers.signed
            ),
        ));
    }
}

pub(crate) fn url_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|parsed| parsed.path().to_owned())
        .unwrap_or_else(|_| "/".to_owned())
}
