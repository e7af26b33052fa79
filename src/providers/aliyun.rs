//! Aliyun (Alibaba Cloud): Dysms for text, Dyvms for voice. ACS3-signed RPC
//! calls with parameters in the query string.

use crate::domain::{
    Account, AliyunOptions, Category, Message, MessageType, PhoneFormat, VendorOptions,
};
use crate::error::SmsError;
use crate::providers::{Params, delegate_transformer, first_mobile, pick};
use crate::signing::{Acs3Signer, SignContext};
use crate::transform::{
    BaseTransformer, HandlerOutput, ensure_max_recipients, ensure_single, require,
};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const SMS_HOST: &str = "dysmsapi.aliyuncs.com";
const SMS_VERSION: &str = "2017-05-25";
const GLOBE_HOST: &str = "dysmsapi.ap-southeast-1.aliyuncs.com";
const GLOBE_VERSION: &str = "2018-05-01";
const VOICE_HOST: &str = "dyvmsapi.aliyuncs.com";
const VOICE_VERSION: &str = "2017-05-25";
const DEFAULT_REGION: &str = "cn-hangzhou";
const MAX_BATCH: usize = 1000;

pub struct AliyunTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for AliyunTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl AliyunTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(
            AliyunOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("Code", "OK", "Code", "Message"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if message.is_domestic() {
            self.domestic_sms(message, account)
        } else {
            self.globe_sms(message, account)
        }
    }

    fn domestic_sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = AliyunOptions::of(message.options());

        let mut query = Params::new();
        query
            .push(
                "PhoneNumbers",
                PhoneFormat::BarePrefixed.join(message.mobiles(), message.region_code()),
            )
            .push("SignName", require(message.sign_name(), "sign_name")?)
            .push("TemplateCode", require(message.template_id(), "template_id")?);
        if !message.template_params().is_empty() {
            query.push("TemplateParam", message.params_json_object());
        }
        query
            .push_opt("SmsUpExtendCode", options.sms_up_extend_code.as_deref())
            .push_opt("OutId", options.out_id.as_deref().or(message.uid()));

        let host = sms_host(pick(options.region.as_deref(), account, DEFAULT_REGION));
        let spec = self.signed(query, &host, "SendSms", SMS_VERSION, account)?;
        Ok((spec, None))
    }

    fn globe_sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_single(AliyunOptions::SUB_PROVIDER, message, "international sms")?;
        let options = AliyunOptions::of(message.options());

        let mut query = Params::new();
        query
            .push(
                "To",
                PhoneFormat::BarePrefixed.join(message.mobiles(), message.region_code()),
            )
            .push("Message", require(message.content(), "content")?)
            .push_opt("From", options.from.as_deref());

        let spec = self.signed(query, GLOBE_HOST, "SendMessageToGlobe", GLOBE_VERSION, account)?;
        let handler = ResponseValidatorConfig::json(
            "ResponseCode",
            "OK",
            "ResponseCode",
            "ResponseDescription",
        )
        .into_handler(AliyunOptions::SUB_PROVIDER);
        Ok((spec, Some(handler)))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = AliyunOptions::of(message.options());
        let called = PhoneFormat::BarePrefixed.format(first_mobile(message)?, message.region_code());
        let template = require(message.template_id(), "template_id")?;

        let mut query = Params::new();
        query
            .push("CalledNumber", called)
            .push_opt("CalledShowNumber", options.called_show_number.as_deref());

        let action = if message.category() == Category::Verification {
            query.push("TtsCode", template);
            if !message.template_params().is_empty() {
                query.push("TtsParam", message.params_json_object());
            }
            "SingleCallByTts"
        } else {
            query.push("VoiceCode", template);
            "SingleCallByVoice"
        };
        if let Some(times) = options.play_times {
            query.push("PlayTimes", times.to_string());
        }
        query.push_opt("OutId", options.out_id.as_deref().or(message.uid()));

        let spec = self.signed(query, VOICE_HOST, action, VOICE_VERSION, account)?;
        Ok((spec, None))
    }

    fn signed(
        &self,
        query: Params,
        host: &str,
        action: &str,
        version: &str,
        account: &Account,
    ) -> Result<HttpRequestSpec, SmsError> {
        let secret = account.require_secret()?;
        let mut spec = HttpRequestSpec::post(format!("https://{host}/")).with_query(query.into_vec());
        Acs3Signer::new(&account.api_key, secret).sign(&mut spec, host, action, version, &self.ctx);
        Ok(spec)
    }
}

delegate_transformer!(AliyunTransformer);

fn sms_host(region: &str) -> String {
    if region == DEFAULT_REGION {
        SMS_HOST.to_owned()
    } else {
        format!("dysmsapi.{region}.aliyuncs.com")
    }
}
