//! Huawei Cloud message service (`batchSendSms`) and voice verification /
//! notification calls, both authenticated with a WSSE `UsernameToken`.

use serde_json::json;

use crate::domain::{
    Account, Category, HuaweiOptions, Message, MessageType, PhoneFormat, ValidationError,
    VendorOptions,
};
use crate::error::SmsError;
use crate::providers::{JsonBody, Params, delegate_transformer, first_mobile, voice_code};
use crate::signing::{SignContext, WsseToken};
use crate::transform::{BaseTransformer, HandlerOutput, ensure_max_recipients, require};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig, StatusSetRule};

const SMS_ENDPOINT: &str = "https://smsapi.cn-north-4.myhuaweicloud.com:443";
const VOICE_ENDPOINT: &str = "https://rtccall.cn-north-1.myhuaweicloud.cn:443";
const MAX_BATCH: usize = 500;

/// `result[]` entries carry a status code but no description.
fn sms_validator() -> ResponseValidatorConfig {
    ResponseValidatorConfig::json("code", "000000", "code", "description").with_status_set(
        StatusSetRule {
            path: "result".to_owned(),
            code_field: "status".to_owned(),
            success_value: "000000".to_owned(),
            message_field: String::new(),
        },
    )
}

fn voice_validator() -> ResponseValidatorConfig {
    ResponseValidatorConfig::json("resultcode", "0", "resultcode", "resultdesc")
}

pub struct HuaweiTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for HuaweiTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl HuaweiTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(HuaweiOptions::SUB_PROVIDER, sms_validator())
            .with_handler(MessageType::TextSms, Self::sms)
            .with_handler(MessageType::Voice, Self::voice);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = HuaweiOptions::of(message.options());
        let sender = options
            .sender
            .as_deref()
            .or(account.app_id.as_deref())
            .ok_or(ValidationError::MissingCredential { field: "sender" })?;

        let mut form = Params::new();
        form.push("from", sender)
            .push(
                "to",
                PhoneFormat::E164.join(message.mobiles(), message.region_code()),
            )
            .push("templateId", require(message.template_id(), "template_id")?);
        let params = message.ordered_params();
        if !params.is_empty() {
            form.push("templateParas", message.params_json_array());
        }
        form.push_opt("statusCallback", message.callback_url())
            .push_opt("signature", message.sign_name())
            .push_opt("extend", message.extend());

        let endpoint = sms_endpoint(&options, account);
        let spec = HttpRequestSpec::post(format!("{endpoint}/sms/batchSendSms/v1"))
            .with_form_body(&form.into_vec());
        Ok((self.authorized(spec, account)?, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = HuaweiOptions::of(message.options());
        let display = require(options.display_number.as_deref(), "display_number")?;
        let callee = PhoneFormat::E164.format(first_mobile(message)?, message.region_code());

        let mut body = JsonBody::new();
        body.set("displayNbr", display).set("calleeNbr", callee);
        let path = if message.category() == Category::Verification {
            body.set("languageType", options.language_type.as_deref().unwrap_or("2"))
                .set("verifyCode", voice_code(message)?);
            if let Some(times) = options.play_times {
                body.set("playTimes", times);
            }
            "callverify/v1.0"
        } else {
            body.set(
                "playInfoList",
                json!([{
                    "templateId": require(message.template_id(), "template_id")?,
                    "templateParas": message.ordered_params(),
                }]),
            );
            if let Some(times) = options.play_times {
                body.set("times", times);
            }
            "callnotify/v2.0"
        };
        body.set_opt("statusUrl", message.callback_url())
            .set_opt("userData", message.uid());

        let endpoint = options.endpoint.as_deref().unwrap_or(VOICE_ENDPOINT);
        let spec = HttpRequestSpec::post(format!("{endpoint}/rest/httpsessions/{path}"))
            .with_json_body(&body.into_value());
        let handler = voice_validator().into_handler(HuaweiOptions::SUB_PROVIDER);
        Ok((self.authorized(spec, account)?, Some(handler)))
    }

    fn authorized(
        &self,
        spec: HttpRequestSpec,
        account: &Account,
    ) -> Result<HttpRequestSpec, SmsError> {
        let token = WsseToken::generate(&account.api_key, account.require_secret()?, &self.ctx);
        Ok(spec
            .with_header("Authorization", WsseToken::authorization())
            .with_header("X-WSSE", token.header_value()))
    }
}

delegate_transformer!(HuaweiTransformer);

fn sms_endpoint(options: &HuaweiOptions, account: &Account) -> String {
    if let Some(endpoint) = options.endpoint.as_deref() {
        return endpoint.trim_end_matches('/').to_owned();
    }
    match account.region.as_deref() {
        Some(region) if !region.is_empty() => {
            format!("https://smsapi.{region}.myhuaweicloud.com:443")
        }
        _ => SMS_ENDPOINT.to_owned(),
    }
}
