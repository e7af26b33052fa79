//! Luosimao: content SMS (single, batch and scheduled) and voice codes behind
//! HTTP Basic auth.

use crate::domain::{Account, LuosimaoOptions, Message, MessageType, PhoneFormat, VendorOptions};
use crate::error::SmsError;
use crate::providers::{
    Params, SignPlacement, china_time, delegate_transformer, first_mobile, signed_content,
    voice_code,
};
use crate::signing::base64_encode;
use crate::transform::{BaseTransformer, HandlerOutput, ensure_domestic, ensure_max_recipients};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const SMS_BASE: &str = "https://sms-api.luosimao.com/v1";
const VOICE_URL: &str = "https://voice-api.luosimao.com/v1/verify.json";
const MAX_BATCH: usize = 100_000;

pub struct LuosimaoTransformer {
    base: BaseTransformer<Self>,
}

impl Default for LuosimaoTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl LuosimaoTransformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(
            LuosimaoOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("error", "0", "error", "msg"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice)
        .with_scheduling();
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_domestic(LuosimaoOptions::SUB_PROVIDER, message, "sms")?;
        ensure_max_recipients(message, MAX_BATCH)?;
        let text = signed_content(message, SignPlacement::Suffix)?;

        let mut form = Params::new();
        let endpoint = if message.is_batch() || message.scheduled_at().is_some() {
            form.push(
                "mobile_list",
                PhoneFormat::Plain.join(message.mobiles(), message.region_code()),
            )
            .push("message", text);
            if let Some(at) = message.scheduled_at() {
                form.push("time", china_time(at).format("%Y-%m-%d %H:%M:%S").to_string());
            }
            "send_batch.json"
        } else {
            form.push("mobile", first_mobile(message)?).push("message", text);
            "send.json"
        };

        let spec = HttpRequestSpec::post(format!("{SMS_BASE}/{endpoint}"))
            .with_form_body(&form.into_vec())
            .with_header("Authorization", basic_auth(&account.api_key));
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if message.scheduled_at().is_some() {
            return Err(SmsError::unsupported(
                LuosimaoOptions::SUB_PROVIDER,
                "scheduled voice",
            ));
        }
        let mut form = Params::new();
        form.push("mobile", first_mobile(message)?)
            .push("code", voice_code(message)?);
        let spec = HttpRequestSpec::post(VOICE_URL)
            .with_form_body(&form.into_vec())
            .with_header("Authorization", basic_auth(&account.api_key));
        Ok((spec, None))
    }
}

delegate_transformer!(LuosimaoTransformer);

/// `Basic base64("api:key-<key>")`; keys already carrying `key-` are kept as is.
fn basic_auth(api_key: &str) -> String {
    let key = if api_key.starts_with("key-") {
        api_key.to_owned()
    } else {
        format!("key-{api_key}")
    };
    format!("Basic {}", base64_encode(format!("api:{key}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::luosimao;
    use crate::error::ErrorKind;
    use crate::transform::Transformer;

    fn account() -> Account {
        Account::new("lsm", "luosimao", "abc123", "")
    }

    #[test]
    fn single_send_with_suffix_sign() {
        let message = luosimao()
            .to("13800138000")
            .content("code 1234")
            .sign_name("Brand")
            .build();
        let (spec, _) = LuosimaoTransformer::new().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, "https://sms-api.luosimao.com/v1/send.json");
        assert_eq!(spec.form_param("mobile").as_deref(), Some("13800138000"));
        assert_eq!(spec.form_param("message").as_deref(), Some("code 1234【Brand】"));
        assert_eq!(
            spec.header("Authorization"),
            Some("Basic YXBpOmtleS1hYmMxMjM=")
        );
    }

    #[test]
    fn key_prefix_is_not_doubled() {
        assert_eq!(basic_auth("key-abc123"), basic_auth("abc123"));
    }

    #[test]
    fn batch_and_scheduled_use_send_batch() {
        let batch = luosimao()
            .to_many(["13800000001", "13800000002"])
            .content("hi【Brand】")
            .build();
        let (spec, _) = LuosimaoTransformer::new().transform(&batch, &account()).unwrap();
        assert_eq!(spec.url, "https://sms-api.luosimao.com/v1/send_batch.json");
        assert_eq!(
            spec.form_param("mobile_list").as_deref(),
            Some("13800000001,13800000002")
        );
        assert_eq!(spec.form_param("time"), None);

        let scheduled = luosimao()
            .to("13800000001")
            .content("hi【Brand】")
            .scheduled_at(Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap())
            .build();
        let (spec, _) = LuosimaoTransformer::new().transform(&scheduled, &account()).unwrap();
        assert_eq!(spec.url, "https://sms-api.luosimao.com/v1/send_batch.json");
        assert_eq!(spec.form_param("time").as_deref(), Some("2024-05-01 10:00:00"));
    }

    #[test]
    fn batch_limit() {
        let mobiles = (0..=MAX_BATCH).map(|i| format!("138{i:08}"));
        let message = luosimao().to_many(mobiles).content("hi").sign_name("S").build();
        assert_eq!(
            LuosimaoTransformer::new().transform(&message, &account()).err().unwrap().kind(),
            ErrorKind::Param
        );
    }

    #[test]
    fn international_is_rejected() {
        let message = luosimao().to("5551234").region_code(1).content("hi").build();
        let err = LuosimaoTransformer::new().transform(&message, &account()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
        assert_eq!(err.to_string(), "luosimao does not support international sms");
    }

    #[test]
    fn voice_verify() {
        let message = luosimao()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .param("code", "1234")
            .build();
        let (spec, handler) = LuosimaoTransformer::new().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, VOICE_URL);
        assert_eq!(spec.form_param("code").as_deref(), Some("1234"));
        assert!(handler(200, br#"{"error":0,"msg":"ok"}"#).is_ok());
        let err = handler(200, br#"{"error":-20,"msg":"insufficient balance"}"#).unwrap_err();
        assert_eq!(err.to_string(), "luosimao error -20: insufficient balance");
    }
}
