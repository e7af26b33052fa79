//! Juhe data: template SMS (domestic and international) and voice codes.
//! Single-recipient only.

use crate::domain::{
    Account, Category, JuheOptions, Message, MessageType, PhoneFormat, VendorOptions,
};
use crate::error::SmsError;
use crate::providers::{Params, delegate_transformer, first_mobile, voice_code};
use crate::transform::{BaseTransformer, HandlerOutput, ensure_single, require};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const SMS_URL: &str = "https://v.juhe.cn/sms/send";
const INTERNATIONAL_URL: &str = "https://v.juhe.cn/smsInternational/send";
const VOICE_URL: &str = "https://op.juhe.cn/yuntongxun/voice";

pub struct JuheTransformer {
    base: BaseTransformer<Self>,
}

impl Default for JuheTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl JuheTransformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(
            JuheOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("error_code", "0", "error_code", "reason"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice);
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_single(JuheOptions::SUB_PROVIDER, message, "sms")?;
        let template_id = require(message.template_id(), "template_id")?;
        let mobile = first_mobile(message)?;

        let mut form = Params::new();
        let url = if message.is_domestic() {
            form.push(
                "mobile",
                PhoneFormat::BarePrefixed.format(mobile, message.region_code()),
            )
            .push("tpl_id", template_id);
            SMS_URL
        } else {
            form.push("areaNum", message.region_code().value().to_string())
                .push("mobile", PhoneFormat::national(mobile, message.region_code()))
                .push("tplId", template_id);
            INTERNATIONAL_URL
        };
        if !message.template_params().is_empty() {
            form.push("vars", message.params_json_object());
        }
        form.push("key", &account.api_key);

        let spec = HttpRequestSpec::post(url).with_form_body(&form.into_vec());
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if message.category() != Category::Verification {
            return Err(SmsError::unsupported(
                JuheOptions::SUB_PROVIDER,
                "voice notification",
            ));
        }
        let options = JuheOptions::of(message.options());

        let mut form = Params::new();
        form.push("valicode", voice_code(message)?)
            .push(
                "to",
                PhoneFormat::BarePrefixed.format(first_mobile(message)?, message.region_code()),
            )
            .push("playtimes", options.play_times.unwrap_or(2).to_string())
            .push("key", &account.api_key);

        let spec = HttpRequestSpec::post(VOICE_URL).with_form_body(&form.into_vec());
        Ok((spec, None))
    }
}

delegate_transformer!(JuheTransformer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::juhe;
    use crate::error::ErrorKind;
    use crate::transform::Transformer;

    fn account() -> Account {
        Account::new("jh", "juhe", "juhe-key", "")
    }

    #[test]
    fn domestic_template_sms() {
        let message = juhe()
            .to("13800138000")
            .template_id("123")
            .param("code", "1234")
            .build();
        let (spec, _) = JuheTransformer::new().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, SMS_URL);
        assert_eq!(spec.form_param("mobile").as_deref(), Some("13800138000"));
        assert_eq!(spec.form_param("tpl_id").as_deref(), Some("123"));
        assert_eq!(spec.form_param("vars").as_deref(), Some(r#"{"code":"1234"}"#));
        assert_eq!(spec.form_param("key").as_deref(), Some("juhe-key"));
    }

    #[test]
    fn international_template_sms() {
        let message = juhe()
            .to("5551234")
            .region_code(1)
            .template_id("9")
            .build();
        let (spec, _) = JuheTransformer::new().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, INTERNATIONAL_URL);
        assert_eq!(spec.form_param("areaNum").as_deref(), Some("1"));
        assert_eq!(spec.form_param("mobile").as_deref(), Some("5551234"));
        assert_eq!(spec.form_param("tplId").as_deref(), Some("9"));
    }

    #[test]
    fn international_number_drops_calling_code() {
        let message = juhe().to("+15551234").region_code(1).template_id("9").build();
        let (spec, _) = JuheTransformer::new().transform(&message, &account()).unwrap();
        assert_eq!(spec.form_param("areaNum").as_deref(), Some("1"));
        assert_eq!(spec.form_param("mobile").as_deref(), Some("5551234"));
    }

    #[test]
    fn batch_is_rejected() {
        let message = juhe()
            .to_many(["13800000001", "13800000002"])
            .template_id("1")
            .build();
        let err = JuheTransformer::new().transform(&message, &account()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
    }

    #[test]
    fn verification_voice_only() {
        let verify = juhe()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .category(Category::Verification)
            .param("code", "4321")
            .play_times(3)
            .build();
        let (spec, _) = JuheTransformer::new().transform(&verify, &account()).unwrap();
        assert_eq!(spec.url, VOICE_URL);
        assert_eq!(spec.form_param("valicode").as_deref(), Some("4321"));
        assert_eq!(spec.form_param("playtimes").as_deref(), Some("3"));

        let notify = juhe()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .content("hello")
            .build();
        let err = JuheTransformer::new().transform(&notify, &account()).err().unwrap();
        assert_eq!(err.to_string(), "juhe does not support voice notification");
    }

    #[test]
    fn response_validation() {
        let message = juhe().to("13800138000").template_id("1").build();
        let (_, handler) = JuheTransformer::new().transform(&message, &account()).unwrap();
        let ok = r#"{"reason":"操作成功","result":{"sid":"1","fee":1,"count":1},"error_code":0}"#;
        assert!(handler(200, ok.as_bytes()).is_ok());
        let bad = r#"{"reason":"错误的请求KEY","result":null,"error_code":10001}"#;
        let err = handler(200, bad.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "juhe error 10001: 错误的请求KEY");
    }
}
