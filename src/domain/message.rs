use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::options::{
    AliyunOptions, Cl253Options, HuaweiOptions, JuheOptions, LuosimaoOptions, ProviderOptions,
    SmsbaoOptions, SubmailOptions, TencentOptions, UcpOptions, VendorOptions, VolcengineOptions,
    YuntongxunOptions, YunpianOptions,
};
use crate::domain::phone::{PhoneNumber, RegionCode};
use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageType {
    #[default]
    TextSms,
    Voice,
    Mms,
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextSms => "sms",
            Self::Voice => "voice",
            Self::Mms => "mms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Vendor-level message category.
///
/// Chiefly drives voice API selection: verification codes go to the TTS/code
/// API, everything else to the voice-notification API.
pub enum Category {
    Verification,
    #[default]
    Notification,
    Promotion,
}

#[derive(Debug, Clone, PartialEq)]
/// Vendor-agnostic outbound message.
///
/// Constructed through one of the vendor builders ([`aliyun`], [`tencent`], ...)
/// and immutable afterwards.
pub struct Message {
    sub_provider: String,
    message_type: MessageType,
    category: Category,
    mobiles: Vec<String>,
    region_code: RegionCode,
    content: Option<String>,
    sign_name: Option<String>,
    template_id: Option<String>,
    template_params: BTreeMap<String, String>,
    params_order: Vec<String>,
    callback_url: Option<String>,
    extend: Option<String>,
    uid: Option<String>,
    scheduled_at: Option<DateTime<Utc>>,
    account: Option<String>,
    options: ProviderOptions,
}

impl Message {
    pub const MOBILES_FIELD: &'static str = "mobiles";

    fn empty(sub_provider: &str) -> Self {
        Self {
            sub_provider: sub_provider.to_owned(),
            message_type: MessageType::default(),
            category: Category::default(),
            mobiles: Vec::new(),
            region_code: RegionCode::UNSET,
            content: None,
            sign_name: None,
            template_id: None,
            template_params: BTreeMap::new(),
            params_order: Vec::new(),
            callback_url: None,
            extend: None,
            uid: None,
            scheduled_at: None,
            account: None,
            options: ProviderOptions::None,
        }
    }

    pub fn sub_provider(&self) -> &str {
        &self.sub_provider
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mobiles(&self) -> &[String] {
        &self.mobiles
    }

    pub fn region_code(&self) -> RegionCode {
        self.region_code
    }

    pub fn is_domestic(&self) -> bool {
        self.region_code.is_domestic()
    }

    pub fn is_batch(&self) -> bool {
        self.mobiles.len() > 1
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn sign_name(&self) -> Option<&str> {
        self.sign_name.as_deref()
    }

    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub fn has_template(&self) -> bool {
        self.template_id.is_some()
    }

    pub fn template_params(&self) -> &BTreeMap<String, String> {
        &self.template_params
    }

    pub fn params_order(&self) -> &[String] {
        &self.params_order
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn extend(&self) -> Option<&str> {
        self.extend.as_deref()
    }

    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        self.scheduled_at
    }

    /// Name of the account this message must be sent through, if pinned.
    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// Positional template values: `params_order` when set, otherwise the
    /// template params in key order.
    pub fn ordered_params(&self) -> Vec<String> {
        if !self.params_order.is_empty() {
            return self.params_order.clone();
        }
        self.template_params.values().cloned().collect()
    }

    /// Template params as a JSON object string, e.g. `{"code":"1234"}`.
    pub fn params_json_object(&self) -> String {
        serde_json::Value::Object(
            self.template_params
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
        .to_string()
    }

    /// Positional template values as a JSON array string, e.g. `["1234","alice"]`.
    pub fn params_json_array(&self) -> String {
        serde_json::Value::Array(
            self.ordered_params()
                .into_iter()
                .map(serde_json::Value::String)
                .collect(),
        )
        .to_string()
    }

    /// Vendor-agnostic checks applied before every transform.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sub_provider.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "sub_provider",
            });
        }
        if self.mobiles.is_empty() {
            return Err(ValidationError::Empty {
                field: Self::MOBILES_FIELD,
            });
        }
        if self.message_type == MessageType::Mms && self.template_id.is_none() {
            return Err(ValidationError::MissingTemplate {
                message_type: MessageType::Mms.as_str(),
            });
        }
        Ok(())
    }

    pub(crate) fn set_callback_url(&mut self, url: impl Into<String>) {
        self.callback_url = Some(url.into());
    }
}

#[derive(Debug, Clone)]
/// Fluent builder for [`Message`], parameterized by the vendor option record.
///
/// Use the vendor factories ([`aliyun`], [`tencent`], ...) rather than
/// constructing this directly.
pub struct SmsBuilder<O> {
    message: Message,
    pub(crate) options: O,
}

pub type AliyunBuilder = SmsBuilder<AliyunOptions>;
pub type TencentBuilder = SmsBuilder<TencentOptions>;
pub type HuaweiBuilder = SmsBuilder<HuaweiOptions>;
pub type VolcengineBuilder = SmsBuilder<VolcengineOptions>;
pub type YunpianBuilder = SmsBuilder<YunpianOptions>;
pub type JuheBuilder = SmsBuilder<JuheOptions>;
pub type SubmailBuilder = SmsBuilder<SubmailOptions>;
pub type SmsbaoBuilder = SmsBuilder<SmsbaoOptions>;
pub type LuosimaoBuilder = SmsBuilder<LuosimaoOptions>;
pub type Cl253Builder = SmsBuilder<Cl253Options>;
pub type UcpBuilder = SmsBuilder<UcpOptions>;
pub type YuntongxunBuilder = SmsBuilder<YuntongxunOptions>;

pub fn aliyun() -> AliyunBuilder {
    SmsBuilder::new()
}

pub fn tencent() -> TencentBuilder {
    SmsBuilder::new()
}

pub fn huawei() -> HuaweiBuilder {
    SmsBuilder::new()
}

pub fn volcengine() -> VolcengineBuilder {
    SmsBuilder::new()
}

pub fn yunpian() -> YunpianBuilder {
    SmsBuilder::new()
}

pub fn juhe() -> JuheBuilder {
    SmsBuilder::new()
}

pub fn submail() -> SubmailBuilder {
    SmsBuilder::new()
}

pub fn smsbao() -> SmsbaoBuilder {
    SmsBuilder::new()
}

pub fn luosimao() -> LuosimaoBuilder {
    SmsBuilder::new()
}

pub fn cl253() -> Cl253Builder {
    SmsBuilder::new()
}

pub fn ucp() -> UcpBuilder {
    SmsBuilder::new()
}

pub fn yuntongxun() -> YuntongxunBuilder {
    SmsBuilder::new()
}

impl<O: VendorOptions> Default for SmsBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: VendorOptions> SmsBuilder<O> {
    pub fn new() -> Self {
        Self {
            message: Message::empty(O::SUB_PROVIDER),
            options: O::default(),
        }
    }

    /// Add one recipient. Surrounding whitespace is trimmed.
    pub fn to(mut self, mobile: impl Into<String>) -> Self {
        self.message.mobiles.push(mobile.into().trim().to_owned());
        self
    }

    /// Add several recipients in order.
    pub fn to_many<I, S>(mut self, mobiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message
            .mobiles
            .extend(mobiles.into_iter().map(|it| it.into().trim().to_owned()));
        self
    }

    /// Add a recipient given in international format (`+15551234567`).
    ///
    /// The country calling code becomes the message region code; all
    /// recipients of one message share a region.
    pub fn to_e164(mut self, input: impl Into<String>) -> Result<Self, ValidationError> {
        let parsed = PhoneNumber::parse(None, input)?;
        self.message.region_code = parsed.region();
        self.message.mobiles.push(parsed.national().to_owned());
        Ok(self)
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.message.content = Some(content.into());
        self
    }

    pub fn sign_name(mut self, sign_name: impl Into<String>) -> Self {
        self.message.sign_name = Some(sign_name.into());
        self
    }

    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.message.template_id = Some(template_id.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message
            .template_params
            .insert(key.into(), value.into());
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.message
            .template_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn params_order<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message.params_order = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn message_type(mut self, message_type: MessageType) -> Self {
        self.message.message_type = message_type;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.message.category = category;
        self
    }

    pub fn region_code(mut self, region_code: u16) -> Self {
        self.message.region_code = RegionCode::new(region_code);
        self
    }

    pub fn callback_url(mut self, url: impl Into<String>) -> Self {
        self.message.callback_url = Some(url.into());
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.message.scheduled_at = Some(at);
        self
    }

    pub fn extend(mut self, extend: impl Into<String>) -> Self {
        self.message.extend = Some(extend.into());
        self
    }

    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.message.uid = Some(uid.into());
        self
    }

    /// Pin the message to the account with this name.
    pub fn account(mut self, name: impl Into<String>) -> Self {
        self.message.account = Some(name.into());
        self
    }

    pub fn build(self) -> Message {
        let mut message = self.message;
        message.options = self.options.into();
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_round_trip_common_fields() {
        let built = [
            aliyun().to("13800138000").content("hi").sign_name("S").build(),
            tencent().to("13800138000").content("hi").sign_name("S").build(),
            huawei().to("13800138000").content("hi").sign_name("S").build(),
            volcengine().to("13800138000").content("hi").sign_name("S").build(),
            yunpian().to("13800138000").content("hi").sign_name("S").build(),
            juhe().to("13800138000").content("hi").sign_name("S").build(),
            submail().to("13800138000").content("hi").sign_name("S").build(),
            smsbao().to("13800138000").content("hi").sign_name("S").build(),
            luosimao().to("13800138000").content("hi").sign_name("S").build(),
            cl253().to("13800138000").content("hi").sign_name("S").build(),
            ucp().to("13800138000").content("hi").sign_name("S").build(),
            yuntongxun().to("13800138000").content("hi").sign_name("S").build(),
        ];
        let tags = [
            "aliyun",
            "tencent",
            "huawei",
            "volc",
            "yunpian",
            "juhe",
            "submail",
            "smsbao",
            "luosimao",
            "cl253",
            "ucp",
            "yuntongxun",
        ];
        for (message, tag) in built.iter().zip(tags) {
            assert_eq!(message.sub_provider(), tag);
            assert_eq!(message.mobiles(), ["13800138000".to_owned()]);
            assert_eq!(message.content(), Some("hi"));
            assert_eq!(message.sign_name(), Some("S"));
        }
    }

    #[test]
    fn build_attaches_vendor_options() {
        let message = aliyun().to("1").region("cn-shanghai").build();
        assert_eq!(
            AliyunOptions::from_options(message.options())
                .and_then(|it| it.region.as_deref()),
            Some("cn-shanghai")
        );
    }

    #[test]
    fn params_encodings() {
        let message = aliyun()
            .to("1")
            .param("name", "alice")
            .param("code", "1234")
            .build();
        assert_eq!(message.params_json_object(), r#"{"code":"1234","name":"alice"}"#);
        assert_eq!(message.params_json_array(), r#"["1234","alice"]"#);

        let ordered = tencent()
            .to("1")
            .params_order(["Alice", "9999"])
            .param("z", "ignored")
            .build();
        assert_eq!(ordered.ordered_params(), vec!["Alice", "9999"]);
        assert_eq!(ordered.params_json_array(), r#"["Alice","9999"]"#);
    }

    #[test]
    fn validate_rejects_empty_mobiles() {
        let message = aliyun().content("hi").build();
        assert_eq!(
            message.validate(),
            Err(ValidationError::Empty { field: "mobiles" })
        );
    }

    #[test]
    fn validate_requires_template_for_mms() {
        let message = submail().to("1").message_type(MessageType::Mms).build();
        assert!(matches!(
            message.validate(),
            Err(ValidationError::MissingTemplate { .. })
        ));
        let message = submail()
            .to("1")
            .message_type(MessageType::Mms)
            .template_id("p1")
            .build();
        assert!(message.validate().is_ok());
    }

    #[test]
    fn to_e164_sets_region_code() {
        let message = tencent().to_e164("+1 202-555-0143").unwrap().build();
        assert_eq!(message.region_code(), RegionCode::new(1));
        assert_eq!(message.mobiles(), ["2025550143".to_owned()]);
        assert!(!message.is_domestic());
    }

    #[test]
    fn to_trims_and_keeps_order() {
        let message = yunpian()
            .to(" 13800000002 ")
            .to_many(["13800000001", "13800000003"])
            .build();
        assert_eq!(
            message.mobiles(),
            ["13800000002", "13800000001", "13800000003"]
        );
        assert!(message.is_batch());
    }
}
