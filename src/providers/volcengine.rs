//! Volcengine SMS (`SendSms`, mainland China only).

use crate::domain::{Account, Message, MessageType, PhoneFormat, VendorOptions, VolcengineOptions};
use crate::error::SmsError;
use crate::providers::{JsonBody, delegate_transformer, pick};
use crate::signing::{SignContext, VolcSigner};
use crate::transform::{
    BaseTransformer, HandlerOutput, ensure_domestic, ensure_max_recipients, require,
};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const HOST: &str = "sms.volcengineapi.com";
const VERSION: &str = "2020-01-01";
const DEFAULT_REGION: &str = "cn-north-1";
const MAX_BATCH: usize = 200;

pub struct VolcengineTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for VolcengineTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl VolcengineTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(
            VolcengineOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json(
                "ResponseMetadata.Error.Code",
                "",
                "ResponseMetadata.Error.Code",
                "ResponseMetadata.Error.Message",
            ),
        )
        .with_handler(MessageType::TextSms, Self::sms);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_domestic(VolcengineOptions::SUB_PROVIDER, message, "sms")?;
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = VolcengineOptions::of(message.options());
        let sms_account = match options.sms_account.as_deref() {
            Some(sms_account) => sms_account,
            None => account.require_app_id()?,
        };

        let mut body = JsonBody::new();
        body.set("SmsAccount", sms_account)
            .set("Sign", require(message.sign_name(), "sign_name")?)
            .set("TemplateID", require(message.template_id(), "template_id")?)
            .set("TemplateParam", message.params_json_object())
            .set(
                "PhoneNumbers",
                PhoneFormat::BarePrefixed.join(message.mobiles(), message.region_code()),
            )
            .set_opt("Tag", options.tag.as_deref());

        let region = pick(options.region.as_deref(), account, DEFAULT_REGION);
        let mut spec = HttpRequestSpec::post(format!("https://{HOST}/"))
            .with_query(vec![
                ("Action".to_owned(), "SendSms".to_owned()),
                ("Version".to_owned(), VERSION.to_owned()),
            ])
            .with_json_body(&body.into_value());
        VolcSigner::new(&account.api_key, account.require_secret()?, region)
            .sign(&mut spec, HOST, &self.ctx);
        Ok((spec, None))
    }
}

delegate_transformer!(VolcengineTransformer);
