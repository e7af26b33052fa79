//! UCPaaS (Yunzhixun): template SMS and voice codes. Credentials travel in the
//! JSON body as `sid`/`token`.

use crate::domain::{Account, Category, Message, MessageType, PhoneFormat, UcpOptions, VendorOptions};
use crate::error::SmsError;
use crate::providers::{JsonBody, delegate_transformer, first_mobile, voice_code};
use crate::transform::{BaseTransformer, HandlerOutput, ensure_max_recipients, ensure_single, require};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const API_BASE: &str = "https://open.ucpaas.com/ol";
const MAX_BATCH: usize = 100;

pub struct UcpTransformer {
    base: BaseTransformer<Self>,
}

impl Default for UcpTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl UcpTransformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(
            UcpOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("code", "000000", "code", "msg"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice);
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let format = if message.is_domestic() {
            PhoneFormat::Plain
        } else {
            ensure_single(UcpOptions::SUB_PROVIDER, message, "international sms")?;
            PhoneFormat::DoubleZeroPrefixed
        };

        let mut body = credentials(account)?;
        body.set("templateid", require(message.template_id(), "template_id")?)
            .set("mobile", format.join(message.mobiles(), message.region_code()))
            .set_opt("uid", message.uid());
        let params = message.ordered_params();
        if !params.is_empty() {
            body.set("param", params.join(";"));
        }

        let path = if message.is_batch() { "sms/sendsms_batch" } else { "sms/sendsms" };
        let spec = HttpRequestSpec::post(format!("{API_BASE}/{path}"))
            .with_json_body(&body.into_value());
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if message.category() != Category::Verification {
            return Err(SmsError::unsupported(
                UcpOptions::SUB_PROVIDER,
                "voice notification",
            ));
        }
        let mut body = credentials(account)?;
        body.set("mobile", first_mobile(message)?)
            .set("verifyCode", voice_code(message)?)
            .set_opt("uid", message.uid());
        let spec = HttpRequestSpec::post(format!("{API_BASE}/voice/voicecode"))
            .with_json_body(&body.into_value());
        Ok((spec, None))
    }
}

delegate_transformer!(UcpTransformer);

fn credentials(account: &Account) -> Result<JsonBody, SmsError> {
    let mut body = JsonBody::new();
    body.set("sid", account.api_key.as_str())
        .set("token", account.require_secret()?)
        .set("appid", account.require_app_id()?);
    Ok(body)
}
