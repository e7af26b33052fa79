//! Tencent Cloud SMS and VMS (voice). TC3-signed JSON API calls.

use serde_json::Value;

use crate::domain::{
    Account, Category, Message, MessageType, PhoneFormat, TencentOptions, ValidationError,
    VendorOptions,
};
use crate::error::SmsError;
use crate::providers::{JsonBody, delegate_transformer, first_mobile, pick};
use crate::signing::{SignContext, Tc3Signer};
use crate::transform::{BaseTransformer, HandlerOutput, ensure_max_recipients, require};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig, StatusSetRule};

const SMS_HOST: &str = "sms.tencentcloudapi.com";
const SMS_VERSION: &str = "2021-01-11";
const VOICE_HOST: &str = "vms.tencentcloudapi.com";
const VOICE_VERSION: &str = "2020-09-02";
const DEFAULT_REGION: &str = "ap-guangzhou";
const MAX_BATCH: usize = 200;

/// Success is the absence of `Response.Error`; SMS additionally reports a
/// per-number `SendStatusSet`.
fn validator() -> ResponseValidatorConfig {
    ResponseValidatorConfig::json(
        "Response.Error.Code",
        "",
        "Response.Error.Code",
        "Response.Error.Message",
    )
    .with_status_set(StatusSetRule {
        path: "Response.SendStatusSet".to_owned(),
        code_field: "Code".to_owned(),
        success_value: "Ok".to_owned(),
        message_field: "Message".to_owned(),
    })
}

pub struct TencentTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for TencentTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl TencentTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(TencentOptions::SUB_PROVIDER, validator())
            .with_handler(MessageType::TextSms, Self::sms)
            .with_handler(MessageType::Voice, Self::voice);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = TencentOptions::of(message.options());
        let numbers = message
            .mobiles()
            .iter()
            .map(|mobile| Value::String(PhoneFormat::E164.format(mobile, message.region_code())))
            .collect::<Vec<_>>();

        let mut body = JsonBody::new();
        body.set("PhoneNumberSet", numbers)
            .set("SmsSdkAppId", account.require_app_id()?)
            .set("TemplateId", require(message.template_id(), "template_id")?)
            .set_opt("SignName", message.sign_name());
        let params = message.ordered_params();
        if !params.is_empty() {
            body.set("TemplateParamSet", params);
        }
        body.set_opt("ExtendCode", options.extend_code.as_deref())
            .set_opt("SenderId", options.sender_id.as_deref())
            .set_opt(
                "SessionContext",
                options.session_context.as_deref().or(message.uid()),
            );

        let region = pick(options.region.as_deref(), account, DEFAULT_REGION);
        let spec = self.signed(
            body.into_value(),
            SMS_HOST,
            "sms",
            "SendSms",
            SMS_VERSION,
            region,
            account,
        )?;
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = TencentOptions::of(message.options());
        let called = PhoneFormat::E164.format(first_mobile(message)?, message.region_code());

        let mut body = JsonBody::new();
        body.set("CalledNumber", called)
            .set("VoiceSdkAppid", account.require_app_id()?);
        let action = if message.category() == Category::Verification {
            let code = message
                .ordered_params()
                .into_iter()
                .next()
                .ok_or(ValidationError::Empty {
                    field: "template_params",
                })?;
            body.set("CodeMessage", code);
            "SendCodeVoice"
        } else {
            body.set("TemplateId", require(message.template_id(), "template_id")?)
                .set("TemplateParamSet", message.ordered_params());
            "SendTtsVoice"
        };
        if let Some(times) = options.play_times {
            body.set("PlayTimes", times);
        }
        body.set_opt(
            "SessionContext",
            options.session_context.as_deref().or(message.uid()),
        );

        let region = pick(options.region.as_deref(), account, DEFAULT_REGION);
        let spec = self.signed(
            body.into_value(),
            VOICE_HOST,
            "vms",
            action,
            VOICE_VERSION,
            region,
            account,
        )?;
        Ok((spec, None))
    }

    #[allow(clippy::too_many_arguments)]
    fn signed(
        &self,
        body: Value,
        host: &str,
        service: &str,
        action: &str,
        version: &str,
        region: &str,
        account: &Account,
    ) -> Result<HttpRequestSpec, SmsError> {
        let secret = account.require_secret()?;
        let mut spec = HttpRequestSpec::post(format!("https://{host}/")).with_json_body(&body);
        Tc3Signer::new(&account.api_key, secret, service).sign(
            &mut spec,
            host,
            action,
            version,
            Some(region),
            &self.ctx,
        );
        Ok(spec)
    }
}

delegate_transformer!(TencentTransformer);
