//! Yuntongxun (Cloopen) REST API: template SMS, voice codes and voice
//! notifications. Each request carries `sig = MD5(sid + token + ts)` in the
//! query and `base64(sid:ts)` as `Authorization`.

use crate::domain::{
    Account, Category, Message, MessageType, PhoneFormat, VendorOptions, YuntongxunOptions,
};
use crate::error::SmsError;
use crate::providers::{
    JsonBody, china_time, delegate_transformer, first_mobile, voice_code,
};
use crate::signing::{SignContext, base64_encode, md5_hex};
use crate::transform::{BaseTransformer, HandlerOutput, ensure_max_recipients, require};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const API_BASE: &str = "https://app.cloopen.com:8883/2013-12-26";
const CONTENT_TYPE: &str = "application/json;charset=utf-8";
const MAX_BATCH: usize = 200;

pub struct YuntongxunTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for YuntongxunTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl YuntongxunTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(
            YuntongxunOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("statusCode", "000000", "statusCode", "statusMsg"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let format = if message.is_domestic() {
            PhoneFormat::BarePrefixed
        } else {
            PhoneFormat::DoubleZeroPrefixed
        };

        let mut body = JsonBody::new();
        body.set("to", format.join(message.mobiles(), message.region_code()))
            .set("appId", account.require_app_id()?)
            .set("templateId", require(message.template_id(), "template_id")?)
            .set("datas", message.ordered_params());
        Ok((self.request("SMS/TemplateSMS", body, account)?, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = YuntongxunOptions::of(message.options());
        let to = PhoneFormat::BarePrefixed.format(first_mobile(message)?, message.region_code());

        let mut body = JsonBody::new();
        body.set("appId", account.require_app_id()?).set("to", to);
        let path = if message.category() == Category::Verification {
            body.set("verifyCode", voice_code(message)?)
                .set_opt("lang", options.lang.as_deref());
            "Calls/VoiceVerify"
        } else {
            body.set("mediaTxt", require(message.content(), "content")?);
            "Calls/LandingCalls"
        };
        body.set("playTimes", options.play_times.unwrap_or(2).to_string())
            .set_opt("displayNum", options.display_number.as_deref())
            .set_opt("respUrl", message.callback_url())
            .set_opt("userData", message.uid());
        Ok((self.request(path, body, account)?, None))
    }

    fn request(
        &self,
        path: &str,
        body: JsonBody,
        account: &Account,
    ) -> Result<HttpRequestSpec, SmsError> {
        let sid = account.api_key.as_str();
        let token = account.require_secret()?;
        let timestamp = china_time(self.ctx.now()).format("%Y%m%d%H%M%S").to_string();
        let sig = md5_hex(format!("{sid}{token}{timestamp}").as_bytes()).to_uppercase();

        let spec = HttpRequestSpec::post(format!("{API_BASE}/Accounts/{sid}/{path}"))
            .with_query(vec![("sig".to_owned(), sig)])
            .with_json_body(&body.into_value())
            .with_header("Accept", "application/json")
            .with_header("Content-Type", CONTENT_TYPE)
            .with_header(
                "Authorization",
                base64_encode(format!("{sid}:{timestamp}").as_bytes()),
            );
        Ok(spec)
    }
}

delegate_transformer!(YuntongxunTransformer);
