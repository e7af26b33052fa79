use crate::signing::{SignContext, base64_encode, sha256};

pub const WSSE_AUTHORIZATION: &str = r#"WSSE realm="SDP",profile="UsernameToken",type="Appkey""#;

/// Huawei WSSE `UsernameToken` credentials for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsseToken {
    pub username: String,
    pub nonce: String,
    pub created: String,
    pub password_digest: String,
}

impl WsseToken {
    /// Nonce is the base36 clock time in nanoseconds; the digest is
    /// `base64(sha256(nonce + created + secret))`.
    pub fn generate(app_key: &str, app_secret: &str, ctx: &SignContext) -> Self {
        let now = ctx.now();
        let nanos = now
            .timestamp_nanos_opt()
            .map_or_else(|| now.timestamp().unsigned_abs(), i64::unsigned_abs);
        let nonce = base36(nanos);
        let created = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let password_digest = base64_encode(&sha256(
            format!("{nonce}{created}{app_secret}").as_bytes(),
        ));

        Self {
            username: app_key.to_owned(),
            nonce,
            created,
            password_digest,
        }
    }

    /// Value of the `X-WSSE` header.
    pub fn header_value(&self) -> String {
        format!(
            r#"UsernameToken Username="{}",PasswordDigest="{}",Nonce="{}",Created="{}""#,
            self.username, self.password_digest, self.nonce, self.created
        )
    }

    pub fn authorization() -> &'static str {
        WSSE_AUTHORIZATION
    }
}

/// Lowercase base-36 rendering of `value`.
pub fn base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn base36_digits() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(1_714_552_200_000_000_000), "d0y612zi1og0");
    }

    #[test]
    fn token_matches_reference_vector() {
        let ctx = SignContext::fixed(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(), 0);
        let token = WsseToken::generate("app-key", "app-secret", &ctx);
        assert_eq!(token.nonce, "d0y612zi1og0");
        assert_eq!(token.created, "2024-05-01T08:30:00Z");
        assert_eq!(token.password_digest, "ca5qw/roTIQzTYjgHAKWYi0iCKukqgRFkQ9rJAFQIzk=");
        assert_eq!(
            token.header_value(),
            r#"UsernameToken Username="app-key",PasswordDigest="ca5qw/roTIQzTYjgHAKWYi0iCKukqgRFkQ9rJAFQIzk=",Nonce="d0y612zi1og0",Created="2024-05-01T08:30:00Z""#
        );
    }

    #[test]
    fn authorization_header_is_constant() {
        assert_eq!(
            WsseToken::authorization(),
            r#"WSSE realm="SDP",profile="UsernameToken",type="Appkey""#
        );
    }
}
