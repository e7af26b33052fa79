//! Yunpian v2 SMS and voice. Form posts authenticated by `apikey`.

use crate::domain::{
    Account, Category, Message, MessageType, PhoneFormat, VendorOptions, YunpianOptions,
};
use crate::error::SmsError;
use crate::providers::{Params, delegate_transformer, first_mobile, voice_code};
use crate::signing::percent_encode;
use crate::transform::{
    BaseTransformer, HandlerOutput, ensure_max_recipients, ensure_single, require,
};
use crate::transport::{HttpRequestSpec, MatchMode, ResponseValidatorConfig, StatusSetRule};

const DOMESTIC_BASE: &str = "https://sms.yunpian.com/v2/sms";
const INTERNATIONAL_BASE: &str = "https://us.yunpian.com/v2/sms";
const VOICE_BASE: &str = "https://voice.yunpian.com/v2/voice";
const MAX_BATCH: usize = 1000;

/// Single sends answer `{"code":0,...}`, batch sends a `data` array without a
/// top-level code. Errors come back with HTTP 400 and a JSON body.
fn validator() -> ResponseValidatorConfig {
    ResponseValidatorConfig {
        accept_status: 200..=499,
        ..ResponseValidatorConfig::json("code", "^0?$", "code", "msg")
            .with_mode(MatchMode::Regex)
            .with_status_set(StatusSetRule {
                path: "data".to_owned(),
                code_field: "code".to_owned(),
                success_value: "0".to_owned(),
                message_field: "msg".to_owned(),
            })
    }
}

/// `tpl_value`: url-encoded `#key#=value` pairs sorted by encoded key.
pub(crate) fn encode_tpl_value(message: &Message) -> String {
    let mut pairs = message
        .template_params()
        .iter()
        .map(|(key, value)| (percent_encode(&format!("#{key}#")), percent_encode(value)))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub struct YunpianTransformer {
    base: BaseTransformer<Self>,
}

impl Default for YunpianTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl YunpianTransformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(YunpianOptions::SUB_PROVIDER, validator())
            .with_handler(MessageType::TextSms, Self::sms)
            .with_handler(MessageType::Voice, Self::voice);
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = YunpianOptions::of(message.options());
        let base = if message.is_domestic() {
            DOMESTIC_BASE
        } else {
            ensure_single(YunpianOptions::SUB_PROVIDER, message, "international sms")?;
            INTERNATIONAL_BASE
        };
        let batch = message.is_batch();

        let mut form = Params::new();
        form.push("apikey", &account.api_key).push(
            "mobile",
            PhoneFormat::BarePlusPrefixed.join(message.mobiles(), message.region_code()),
        );
        let endpoint = match message.template_id() {
            Some(template_id) => {
                form.push("tpl_id", template_id)
                    .push("tpl_value", encode_tpl_value(message));
                if batch { "tpl_batch_send.json" } else { "tpl_single_send.json" }
            }
            None => {
                form.push("text", require(message.content(), "content")?);
                if batch { "batch_send.json" } else { "single_send.json" }
            }
        };
        form.push_opt("extend", message.extend())
            .push_opt("uid", message.uid())
            .push_opt("callback_url", message.callback_url());
        if options.register {
            form.push("register", "true");
        }
        if options.mobile_stat {
            form.push("mobile_stat", "true");
        }

        let spec =
            HttpRequestSpec::post(format!("{base}/{endpoint}")).with_form_body(&form.into_vec());
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let mut form = Params::new();
        form.push("apikey", &account.api_key)
            .push(
                "mobile",
                PhoneFormat::BarePrefixed.format(first_mobile(message)?, message.region_code()),
            );
        let endpoint = if message.category() == Category::Verification {
            form.push("code", voice_code(message)?);
            "send.json"
        } else {
            form.push("tpl_id", require(message.template_id(), "template_id")?)
                .push("tpl_value", encode_tpl_value(message));
            "tpl_notify.json"
        };
        form.push_opt("callback_url", message.callback_url())
            .push_opt("uid", message.uid());

        let spec = HttpRequestSpec::post(format!("{VOICE_BASE}/{endpoint}"))
            .with_form_body(&form.into_vec());
        Ok((spec, None))
    }
}

delegate_transformer!(YunpianTransformer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::yunpian;
    use crate::error::ErrorKind;
    use crate::transform::Transformer;

    fn account() -> Account {
        Account::new("yp", "yunpian", "apikey-1", "")
    }

    #[test]
    fn template_single_send() {
        let message = yunpian()
            .to("13800138000")
            .template_id("1234")
            .param("name", "Bob")
            .param("code", "9876")
            .build();
        let (spec, _) = YunpianTransformer::new().transform(&message, &account()).unwrap();

        assert_eq!(spec.url, "https://sms.yunpian.com/v2/sms/tpl_single_send.json");
        assert_eq!(
            spec.form_param("tpl_value").as_deref(),
            Some("%23code%23=9876&%23name%23=Bob")
        );
        assert_eq!(spec.form_param("apikey").as_deref(), Some("apikey-1"));
        assert_eq!(spec.form_param("mobile").as_deref(), Some("13800138000"));
    }

    #[test]
    fn endpoint_matrix() {
        let cases = [
            (vec!["13800000001"], true, "tpl_single_send.json"),
            (vec!["13800000001", "13800000002"], true, "tpl_batch_send.json"),
            (vec!["13800000001"], false, "single_send.json"),
            (vec!["13800000001", "13800000002"], false, "batch_send.json"),
        ];
        for (mobiles, template, endpoint) in cases {
            let builder = yunpian().to_many(mobiles).content("【Brand】hi");
            let message = if template {
                builder.template_id("1").build()
            } else {
                builder.build()
            };
            let (spec, _) = YunpianTransformer::new().transform(&message, &account()).unwrap();
            assert!(spec.url.ends_with(endpoint), "{} should end with {endpoint}", spec.url);
        }
    }

    #[test]
    fn international_single_only() {
        let single = yunpian().to("5551234").region_code(1).content("hi").build();
        let (spec, _) = YunpianTransformer::new().transform(&single, &account()).unwrap();
        assert_eq!(spec.url, "https://us.yunpian.com/v2/sms/single_send.json");
        assert_eq!(spec.form_param("mobile").as_deref(), Some("+15551234"));

        let batch = yunpian()
            .to_many(["5551234", "5551235"])
            .region_code(1)
            .content("hi")
            .build();
        let err = YunpianTransformer::new().transform(&batch, &account()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
    }

    #[test]
    fn voice_endpoints() {
        let verify = yunpian()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .category(Category::Verification)
            .param("code", "1234")
            .build();
        let (spec, _) = YunpianTransformer::new().transform(&verify, &account()).unwrap();
        assert_eq!(spec.url, "https://voice.yunpian.com/v2/voice/send.json");
        assert_eq!(spec.form_param("code").as_deref(), Some("1234"));

        let notify = yunpian()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .template_id("77")
            .param("name", "Bob")
            .build();
        let (spec, _) = YunpianTransformer::new().transform(&notify, &account()).unwrap();
        assert_eq!(spec.url, "https://voice.yunpian.com/v2/voice/tpl_notify.json");
        assert_eq!(spec.form_param("tpl_value").as_deref(), Some("%23name%23=Bob"));
    }

    #[test]
    fn response_validation() {
        let handler = validator().into_handler("yunpian");
        assert!(handler(200, br#"{"code":0,"msg":"OK","count":1,"fee":0.05,"sid":1}"#).is_ok());
        assert!(
            handler(
                200,
                br#"{"total_count":2,"data":[{"code":0,"msg":"OK"},{"code":0,"msg":"OK"}]}"#
            )
            .is_ok()
        );
        let err = handler(400, br#"{"code":2,"msg":"bad parameter","detail":"mobile"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "yunpian error 2: bad parameter");
        let err = handler(
            200,
            br#"{"total_count":2,"data":[{"code":0,"msg":"OK"},{"code":22,"msg":"limit"}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(matches!(
            handler(500, b"").unwrap_err(),
            SmsError::HttpStatus { status: 500, body: None }
        ));
    }
}
