//! SMSBao: content SMS over plain GET requests answered with a numeric text
//! status.

use crate::domain::{Account, Message, MessageType, PhoneFormat, SmsbaoOptions, VendorOptions};
use crate::error::SmsError;
use crate::providers::{
    Params, SignPlacement, delegate_transformer, first_mobile, signed_content, voice_code,
};
use crate::signing::md5_hex;
use crate::transform::{BaseTransformer, HandlerOutput, ensure_max_recipients, ensure_single};
use crate::transport::{HttpRequestSpec, ResponseValidatorConfig};

const API_BASE: &str = "https://api.smsbao.com";
const MAX_BATCH: usize = 99;

/// Failure codes answered in place of `0`.
const STATUS_CODES: &[(&str, &str)] = &[
    ("30", "wrong password"),
    ("40", "account not found"),
    ("41", "insufficient balance"),
    ("43", "IP address restricted"),
    ("50", "content contains sensitive words"),
    ("51", "invalid mobile number"),
];

pub struct SmsbaoTransformer {
    base: BaseTransformer<Self>,
}

impl Default for SmsbaoTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SmsbaoTransformer {
    pub fn new() -> Self {
        let base = BaseTransformer::new(
            SmsbaoOptions::SUB_PROVIDER,
            ResponseValidatorConfig::text("0").with_descriptions(STATUS_CODES),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice);
        Self { base }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = SmsbaoOptions::of(message.options());
        let (path, mobiles) = if message.is_domestic() {
            ensure_max_recipients(message, MAX_BATCH)?;
            ("sms", PhoneFormat::Plain.join(message.mobiles(), message.region_code()))
        } else {
            ensure_single(SmsbaoOptions::SUB_PROVIDER, message, "international sms")?;
            (
                "wsms",
                PhoneFormat::BarePlusPrefixed.format(first_mobile(message)?, message.region_code()),
            )
        };

        let mut query = credentials(account)?;
        query
            .push("m", mobiles)
            .push("c", signed_content(message, SignPlacement::Prefix)?)
            .push_opt("g", options.product_id.as_deref());
        let spec = HttpRequestSpec::get(format!("{API_BASE}/{path}")).with_query(query.into_vec());
        Ok((spec, None))
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let mut query = credentials(account)?;
        query
            .push(
                "m",
                PhoneFormat::Plain.format(first_mobile(message)?, message.region_code()),
            )
            .push("c", voice_code(message)?);
        let spec = HttpRequestSpec::get(format!("{API_BASE}/voice")).with_query(query.into_vec());
        Ok((spec, None))
    }
}

delegate_transformer!(SmsbaoTransformer);

/// `u` is the username, `p` the MD5 of the password.
fn credentials(account: &Account) -> Result<Params, SmsError> {
    let mut params = Params::new();
    params
        .push("u", &account.api_key)
        .push("p", md5_hex(account.require_secret()?.as_bytes()));
    Ok(params)
}
