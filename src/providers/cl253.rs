//! CL253 (Chuanglan): JSON content SMS with account/password credentials.
//! Domestic sends may be batched, scheduled or personalized per recipient;
//! international sends are single-recipient.

use crate::domain::{Account, Cl253Options, Message, MessageType, PhoneFormat, VendorOptions};
use crate::error::SmsError;
use crate::providers::{
    JsonBody, SignPlacement, china_time, delegate_transformer, first_mobile, signed_content,
};
use crate::transform::{
    BaseTransformer, HandlerOutput, ensure_known_recipients, ensure_max_recipients, ensure_single,
};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const SEND_URL: &str = "https://smssh1.253.com/msg/v1/send/json";
const VARIABLE_URL: &str = "https://smssh1.253.com/msg/variable/json";
const INTERNATIONAL_URL: &str = "https://intapi.253.com/send/json";
const MAX_BATCH: usize = 1000;

pub struct Cl253Transformer {
    base: BaseTransformer<Self>,
}

impl Default for Cl253Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Cl253Transformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(
            Cl253Options::SUB_PROVIDER,
            ResponseValidatorConfig::json("code", "0", "code", "errorMsg"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_scheduling();
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if !message.is_domestic() {
            return self.international(message, account);
        }
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = Cl253Options::of(message.options());
        ensure_known_recipients(message, options.per_recipient_params.keys())?;

        let mut body = credentials(account)?;
        body.set("msg", signed_content(message, SignPlacement::Prefix)?);
        let url = if options.per_recipient_params.is_empty() {
            body.set(
                "phone",
                PhoneFormat::Plain.join(message.mobiles(), message.region_code()),
            );
            SEND_URL
        } else {
            body.set("params", variable_rows(message, &options));
            VARIABLE_URL
        };
        if let Some(at) = message.scheduled_at() {
            body.set("sendtime", china_time(at).format("%Y%m%d%H%M").to_string());
        }
        if options.report {
            body.set("report", "true");
        }
        body.set_opt("extend", message.extend())
            .set_opt("uid", message.uid())
            .set_opt("callbackUrl", message.callback_url());

        let spec = HttpRequestSpec::post(url).with_json_body(&body.into_value());
        Ok((spec, None))
    }

    fn international(
        &self,
        message: &Message,
        account: &Account,
    ) -> Result<HandlerOutput, SmsError> {
        ensure_single(Cl253Options::SUB_PROVIDER, message, "international sms")?;
        if message.scheduled_at().is_some() {
            return Err(SmsError::unsupported(
                Cl253Options::SUB_PROVIDER,
                "international scheduled send",
            ));
        }
        let options = Cl253Options::of(message.options());

        let mut body = credentials(account)?;
        body.set("msg", signed_content(message, SignPlacement::Prefix)?)
            .set(
                "mobile",
                PhoneFormat::BarePrefixed.format(first_mobile(message)?, message.region_code()),
            )
            .set_opt("senderId", options.sender_id.as_deref())
            .set_opt("uid", message.uid());

        let spec = HttpRequestSpec::post(INTERNATIONAL_URL).with_json_body(&body.into_value());
        let handler = ResponseValidatorConfig::json("code", "0", "code", "error")
            .into_handler(Cl253Options::SUB_PROVIDER);
        Ok((spec, Some(handler)))
    }
}

delegate_transformer!(Cl253Transformer);

fn credentials(account: &Account) -> Result<JsonBody, SmsError> {
    let mut body = JsonBody::new();
    body.set("account", account.api_key.as_str())
        .set("password", account.require_secret()?);
    Ok(body)
}

/// `phone,v1,v2;phone,v1,v2`. Recipients without their own values use the
/// message-level positional params.
fn variable_rows(message: &Message, options: &Cl253Options) -> String {
    let shared = message.ordered_params();
    message
        .mobiles()
        .iter()
        .map(|mobile| {
            let values = options.per_recipient_params.get(mobile).unwrap_or(&shared);
            std::iter::once(mobile.as_str())
                .chain(values.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join(";")
}
