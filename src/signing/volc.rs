use crate::signing::canonical::{canonical_headers, canonical_query, canonical_request};
use crate::signing::{SignContext, hmac_sha256, hmac_sha256_hex, sha256_hex};
use crate::transport::HttpRequestSpec;

pub const VOLC_ALGORITHM: &str = "HMAC-SHA256";

const SERVICE: &str = "volcSMS";

#[derive(Debug, Clone, Copy)]
/// Volcengine HMAC-SHA256 signer (`X-Date` + `X-Content-Sha256` headers).
pub struct VolcSigner<'a> {
    access_key: &'a str,
    secret_key: &'a str,
    region: &'a str,
}

impl<'a> VolcSigner<'a> {
    pub fn new(access_key: &'a str, secret_key: &'a str, region: &'a str) -> Self {
        Self {
            access_key,
            secret_key,
            region,
        }
    }

    pub fn scope(&self, date: &str) -> String {
        format!("{date}/{}/{SERVICE}/request", self.region)
    }

    pub fn signing_key(&self, date: &str) -> Vec<u8> {
        let k_date = hmac_sha256(self.secret_key.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
        hmac_sha256(&k_service, b"request")
    }

    /// Sign `spec` in place. `Action`/`Version` must already be in the query.
    pub fn sign(&self, spec: &mut HttpRequestSpec, host: &str, ctx: &SignContext) {
        let now = ctx.now();
        let x_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let content_hash = sha256_hex(&spec.body);

        spec.headers.extend([
            ("Content-Type".to_owned(), "application/json".to_owned()),
            ("Host".to_owned(), host.to_owned()),
            ("X-Date".to_owned(), x_date.clone()),
            ("X-Content-Sha256".to_owned(), content_hash.clone()),
        ]);

        let headers = canonical_headers(&spec.headers, |name| {
            matches!(name, "content-type" | "host" | "x-date" | "x-content-sha256")
        });
        let canonical = canonical_request(
            spec.method.as_str(),
            "/",
            &canonical_query(&spec.query),
            &headers,
            &content_hash,
        );
        let scope = self.scope(&date);
        let string_to_sign = format!(
            "{VOLC_ALGORITHM}\n{x_date}\n{scope}\n{}",
            sha256_hex(canonical.as_bytes())
        );
        let signature = hmac_sha256_hex(&self.signing_key(&date), string_to_sign.as_bytes());

        spec.headers.push((
            "Authorization".to_owned(),
            format!(
                "{VOLC_ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
                self.access_key, headers.signed
            ),
        ));
    }
}
