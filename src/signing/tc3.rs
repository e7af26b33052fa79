use crate::signing::canonical::{canonical_headers, canonical_request};
use crate::signing::{SignContext, hmac_sha256, hmac_sha256_hex, sha256_hex};
use crate::transport::HttpRequestSpec;

pub const TC3_ALGORITHM: &str = "TC3-HMAC-SHA256";

const CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy)]
/// Tencent Cloud TC3-HMAC-SHA256 signer with the layered derived key.
pub struct Tc3Signer<'a> {
    secret_id: &'a str,
    secret_key: &'a str,
    /// Service name used in the credential scope, e.g. `sms` or `vms`.
    service: &'a str,
}

impl<'a> Tc3Signer<'a> {
    pub fn new(secret_id: &'a str, secret_key: &'a str, service: &'a str) -> Self {
        Self {
            secret_id,
            secret_key,
            service,
        }
    }

    /// Credential scope: `YYYY-MM-DD/<service>/tc3_request`.
    pub fn scope(&self, date: &str) -> String {
        format!("{date}/{}/tc3_request", self.service)
    }

    /// `k_signing = HMAC(HMAC(HMAC("TC3" + secret, date), service), "tc3_request")`.
    pub fn signing_key(&self, date: &str) -> Vec<u8> {
        let k_date = hmac_sha256(
            format!("TC3{}", self.secret_key).as_bytes(),
            date.as_bytes(),
        );
        let k_service = hmac_sha256(&k_date, self.service.as_bytes());
        hmac_sha256(&k_service, b"tc3_request")
    }

    /// Add `Content-Type`, `Host`, `X-TC-*` and `Authorization` headers.
    ///
    /// The JSON body must be final before signing.
    pub fn sign(
        &self,
        spec: &mut HttpRequestSpec,
        host: &str,
        action: &str,
        version: &str,
        region: Option<&str>,
        ctx: &SignContext,
    ) {
        let now = ctx.now();
        let timestamp = now.timestamp().to_string();
        let date = now.format("%Y-%m-%d").to_string();

        spec.headers.extend([
            ("Content-Type".to_owned(), CONTENT_TYPE.to_owned()),
            ("Host".to_owned(), host.to_owned()),
            ("X-TC-Action".to_owned(), action.to_owned()),
            ("X-TC-Version".to_owned(), version.to_owned()),
            ("X-TC-Timestamp".to_owned(), timestamp.clone()),
        ]);
        if let Some(region) = region {
            spec.headers.push(("X-TC-Region".to_owned(), region.to_owned()));
        }

        let headers =
            canonical_headers(&spec.headers, |name| name == "content-type" || name == "host");
        let canonical = canonical_request(
            spec.method.as_str(),
            "/",
            "",
            &headers,
            &sha256_hex(&spec.body),
        );
        let scope = self.scope(&date);
        let string_to_sign = format!(
            "{TC3_ALGORITHM}\n{timestamp}\n{scope}\n{}",
            sha256_hex(canonical.as_bytes())
        );
        let signature = hmac_sha256_hex(&self.signing_key(&date), string_to_sign.as_bytes());

        spec.headers.push((
            "Authorization".to_owned(),
            format!(
                "{TC3_ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
                self.secret_id, headers.signed
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn signed() -> HttpRequestSpec {
        let ctx = SignContext::fixed(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(), 0);
        let mut spec = HttpRequestSpec::post("https://sms.tencentcloudapi.com/")
            .with_json_body(&json!({"PhoneNumberSet": ["+8613800138000"]}));
        Tc3Signer::new("AKID", "SECRET", "sms").sign(
            &mut spec,
            "sms.tencentcloudapi.com",
            "SendSms",
            "2021-01-11",
            Some("ap-guangzhou"),
            &ctx,
        );
        spec
    }

    #[test]
    fn adds_tc_headers() {
        let spec = signed();
        assert_eq!(spec.header("X-TC-Action"), Some("SendSms"));
        assert_eq!(spec.header("X-TC-Version"), Some("2021-01-11"));
        assert_eq!(spec.header("X-TC-Timestamp"), Some("1714552200"));
        assert_eq!(spec.header("X-TC-Region"), Some("ap-guangzhou"));
        assert_eq!(spec.header("Host"), Some("sms.tencentcloudapi.com"));
    }

    #[test]
    fn authorization_matches_reference_vector() {
        assert_eq!(
            signed().header("Authorization"),
            Some(
                "TC3-HMAC-SHA256 Credential=AKID/2024-05-01/sms/tc3_request, SignedHeaders=content-type;host, Signature=2e9150148203dcae11f987704bd8cf3947ee5e765199613e812b8eab04e03535"
            )
        );
    }

    #[test]
    fn tencent_documented_example() {
        let ctx = SignContext::fixed(Utc.timestamp_opt(1_551_113_065, 0).unwrap(), 0);
        let mut spec = HttpRequestSpec::post("https://cvm.tencentcloudapi.com/");
        spec.body = br#"{"Limit": 1, "Filters": [{"Values": ["\u672a\u547d\u540d"], "Name": "instance-name"}]}"#
            .to_vec();
        assert_eq!(
            sha256_hex(&spec.body),
            "35e9c5b0e3ae67532d3c9f17ead6c90222632e5b1ff7f6e89887f1398934f064"
        );
        Tc3Signer::new(
            "AKIDz8krbsJ5yKBZQpn74WFkmLPx3EXAMPLE",
            "Gu5t9xGARNpq86cd98joQYCN3EXAMPLE",
            "cvm",
        )
        .sign(
            &mut spec,
            "cvm.tencentcloudapi.com",
            "DescribeInstances",
            "2017-03-12",
            Some("ap-guangzhou"),
            &ctx,
        );
        assert_eq!(
            spec.header("Authorization"),
            Some(
                "TC3-HMAC-SHA256 Credential=AKIDz8krbsJ5yKBZQpn74WFkmLPx3EXAMPLE/2019-02-25/cvm/tc3_request, SignedHeaders=content-type;host, Signature=72e494ea809ad7a8c8f7a4507b9bddcbaa8e581f516e8da2f66e2c5a96525168"
            )
        );
    }

    #[test]
    fn scope_uses_service() {
        let signer = Tc3Signer::new("id", "key", "vms");
        assert_eq!(signer.scope("2024-05-01"), "2024-05-01/vms/tc3_request");
        assert_eq!(signer.signing_key("2024-05-01").len(), 32);
    }
}
