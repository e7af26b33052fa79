//! Config-driven reduction of vendor response bodies to a success/error verdict.

use std::ops::RangeInclusive;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::SmsError;
use crate::transport::request::ResponseHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Equals,
    NotEquals,
    Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-recipient result array that must be walked after the outer verdict.
pub struct StatusSetRule {
    /// Dotted path to the array; empty when the body itself is the array.
    pub path: String,
    pub code_field: String,
    pub success_value: String,
    pub message_field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Declarative description of how to read a vendor response.
pub struct ResponseValidatorConfig {
    pub response_type: ResponseType,
    pub success_field: String,
    pub success_value: String,
    pub error_code_field: String,
    pub error_message_field: String,
    pub mode: MatchMode,
    pub accept_status: RangeInclusive<u16>,
    pub status_set: Option<StatusSetRule>,
    /// Text mode: `(code, message)` pairs describing failure bodies. Codes not
    /// listed report the body itself as the message.
    pub descriptions: &'static [(&'static str, &'static str)],
}

impl Default for ResponseValidatorConfig {
    fn default() -> Self {
        Self {
            response_type: ResponseType::Json,
            success_field: String::new(),
            success_value: String::new(),
            error_code_field: String::new(),
            error_message_field: String::new(),
            mode: MatchMode::Equals,
            accept_status: 200..=299,
            status_set: None,
            descriptions: &[],
        }
    }
}

impl ResponseValidatorConfig {
    /// JSON body where `success_field == success_value` means success.
    pub fn json(
        success_field: impl Into<String>,
        success_value: impl Into<String>,
        error_code_field: impl Into<String>,
        error_message_field: impl Into<String>,
    ) -> Self {
        Self {
            success_field: success_field.into(),
            success_value: success_value.into(),
            error_code_field: error_code_field.into(),
            error_message_field: error_message_field.into(),
            ..Self::default()
        }
    }

    /// Plain-text body compared (trimmed) against `success_value`.
    pub fn text(success_value: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success_value: success_value.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_descriptions(mut self, table: &'static [(&'static str, &'static str)]) -> Self {
        self.descriptions = table;
        self
    }

    pub fn with_status_set(mut self, rule: StatusSetRule) -> Self {
        self.status_set = Some(rule);
        self
    }

    /// Wrap this config into a [`ResponseHandler`] reporting errors for `provider`.
    pub fn into_handler(self, provider: &str) -> ResponseHandler {
        let provider = provider.to_owned();
        Arc::new(move |status: u16, body: &[u8]| validate_response(&provider, &self, status, body))
    }
}

/// Apply `config` to `(status, body)`.
pub fn validate_response(
    provider: &str,
    config: &ResponseValidatorConfig,
    status: u16,
    body: &[u8],
) -> Result<(), SmsError> {
    if !config.accept_status.contains(&status) {
        return Err(SmsError::http_status(status, body));
    }

    match config.response_type {
        ResponseType::Text => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if matches_value(config.mode, text, &config.success_value)? {
                return Ok(());
            }
            let message = config
                .descriptions
                .iter()
                .find(|(code, _)| *code == text)
                .map_or(text, |(_, message)| *message);
            tracing::warn!(provider, code = %text, "provider rejected request");
            Err(SmsError::provider(provider, text, message))
        }
        ResponseType::Json => {
            let parsed: Value =
                serde_json::from_slice(body).map_err(|err| SmsError::Parse(Box::new(err)))?;

            let actual = field_string(&parsed, &config.success_field);
            if !matches_value(config.mode, &actual, &config.success_value)? {
                let code = field_string(&parsed, &config.error_code_field);
                let message = field_string(&parsed, &config.error_message_field);
                tracing::warn!(provider, code = %code, "provider rejected request");
                return Err(SmsError::provider(provider, code, message));
            }

            if let Some(rule) = config.status_set.as_ref() {
                check_status_set(provider, rule, &parsed)?;
            }
            Ok(())
        }
    }
}

fn check_status_set(provider: &str, rule: &StatusSetRule, parsed: &Value) -> Result<(), SmsError> {
    let Some(Value::Array(items)) = lookup_path(parsed, &rule.path) else {
        return Ok(());
    };
    for item in items {
        let code = field_string(item, &rule.code_field);
        if code != rule.success_value {
            let message = field_string(item, &rule.message_field);
            tracing::warn!(provider, code = %code, "provider rejected recipient");
            return Err(SmsError::provider(provider, code, message));
        }
    }
    Ok(())
}

fn matches_value(mode: MatchMode, actual: &str, expected: &str) -> Result<bool, SmsError> {
    Ok(match mode {
        MatchMode::Equals => actual == expected,
        MatchMode::NotEquals => actual != expected,
        MatchMode::Regex => Regex::new(expected)
            .map_err(|err| SmsError::Parse(Box::new(err)))?
            .is_match(actual),
    })
}

/// Resolve a dotted path (`a.b.c`). The empty path is the root; numeric
/// segments index into arrays.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// String form of the value at `path`; missing values and `null` are `""`.
pub fn field_string(value: &Value, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    match lookup_path(value, path) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliyun_config() -> ResponseValidatorConfig {
        ResponseValidatorConfig::json("Code", "OK", "Code", "Message")
    }

    #[test]
    fn non_2xx_is_http_status_error() {
        let err = validate_response("aliyun", &aliyun_config(), 500, b"oops").unwrap_err();
        assert!(matches!(
            err,
            SmsError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
    }

    #[test]
    fn json_success_and_error() {
        let config = aliyun_config();
        assert!(validate_response("aliyun", &config, 200, br#"{"Code":"OK"}"#).is_ok());

        let body = br#"{"Code":"isv.BUSINESS_LIMIT_CONTROL","Message":"rate exceeded","RequestId":"x"}"#;
        match validate_response("aliyun", &config, 200, body).unwrap_err() {
            SmsError::Provider {
                provider,
                code,
                message,
            } => {
                assert_eq!(provider, "aliyun");
                assert_eq!(code, "isv.BUSINESS_LIMIT_CONTROL");
                assert_eq!(message, "rate exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = validate_response("aliyun", &aliyun_config(), 200, b"{ nope").unwrap_err();
        assert!(matches!(err, SmsError::Parse(_)));
    }

    #[test]
    fn numeric_fields_compare_as_strings() {
        let config = ResponseValidatorConfig::json("code", "0", "code", "msg");
        assert!(validate_response("yunpian", &config, 200, br#"{"code":0,"msg":"ok"}"#).is_ok());
        let err =
            validate_response("yunpian", &config, 200, br#"{"code":2,"msg":"bad"}"#).unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref code, .. } if code == "2"));
    }

    #[test]
    fn nested_paths_and_missing_fields() {
        let config =
            ResponseValidatorConfig::json("Response.Error.Code", "", "Response.Error.Code", "Response.Error.Message");
        assert!(validate_response("tencent", &config, 200, br#"{"Response":{"RequestId":"r"}}"#).is_ok());
        let body = br#"{"Response":{"Error":{"Code":"AuthFailure.SignatureFailure","Message":"bad sig"}}}"#;
        let err = validate_response("tencent", &config, 200, body).unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref code, ref message, .. }
            if code == "AuthFailure.SignatureFailure" && message == "bad sig"));
    }

    #[test]
    fn status_set_walk_fails_on_any_element() {
        let config = ResponseValidatorConfig::json("Response.Error.Code", "", "Response.Error.Code", "Response.Error.Message")
            .with_status_set(StatusSetRule {
                path: "Response.SendStatusSet".to_owned(),
                code_field: "Code".to_owned(),
                success_value: "Ok".to_owned(),
                message_field: "Message".to_owned(),
            });
        let ok = br#"{"Response":{"SendStatusSet":[{"Code":"Ok"},{"Code":"Ok"}]}}"#;
        assert!(validate_response("tencent", &config, 200, ok).is_ok());

        let bad = br#"{"Response":{"SendStatusSet":[{"Code":"Ok"},{"Code":"LimitExceeded.PhoneNumberDailyLimit","Message":"daily limit"}]}}"#;
        let err = validate_response("tencent", &config, 200, bad).unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref code, .. } if code == "LimitExceeded.PhoneNumberDailyLimit"));
    }

    #[test]
    fn root_array_status_set() {
        let config = ResponseValidatorConfig::json("", "", "", "").with_status_set(StatusSetRule {
            path: String::new(),
            code_field: "status".to_owned(),
            success_value: "success".to_owned(),
            message_field: "msg".to_owned(),
        });
        assert!(validate_response("submail", &config, 200, br#"[{"status":"success"}]"#).is_ok());
        assert!(
            validate_response("submail", &config, 200, br#"[{"status":"error","code":101,"msg":"bad"}]"#)
                .is_err()
        );
    }

    #[test]
    fn text_modes() {
        let config = ResponseValidatorConfig::text("0");
        assert!(validate_response("smsbao", &config, 200, b" 0\n").is_ok());
        let err = validate_response("smsbao", &config, 200, b"30").unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref code, ref message, .. } if code == "30" && message == "30"));

        let config = ResponseValidatorConfig::text("0").with_descriptions(&[("30", "wrong password")]);
        let err = validate_response("smsbao", &config, 200, b"30\n").unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref code, ref message, .. } if code == "30" && message == "wrong password"));
        let err = validate_response("smsbao", &config, 200, b"99").unwrap_err();
        assert!(matches!(err, SmsError::Provider { ref message, .. } if message == "99"));

        let config = ResponseValidatorConfig::text(r"^\d{10,}$").with_mode(MatchMode::Regex);
        assert!(validate_response("x", &config, 200, b"1234567890123").is_ok());
        assert!(validate_response("x", &config, 200, b"-1").is_err());

        let config = ResponseValidatorConfig::text("ERROR").with_mode(MatchMode::NotEquals);
        assert!(validate_response("x", &config, 200, b"OK").is_ok());
    }

    #[test]
    fn handler_wraps_config() {
        let handler = aliyun_config().into_handler("aliyun");
        assert!(handler(200, br#"{"Code":"OK"}"#).is_ok());
        assert!(handler(200, br#"{"Code":"isv.X","Message":"m"}"#).is_err());
    }

    #[test]
    fn lookup_path_indexes_arrays() {
        let value: Value = serde_json::from_str(r#"{"data":[{"code":0},{"code":5}]}"#).unwrap();
        assert_eq!(field_string(&value, "data.1.code"), "5");
        assert_eq!(field_string(&value, "data.9.code"), "");
    }
}
