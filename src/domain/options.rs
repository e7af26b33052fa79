//! Vendor-specific option records.
//!
//! Every vendor builder carries one of these records and attaches it to the
//! [`Message`](crate::domain::Message) at build time. Transformers read back
//! only the record that belongs to them.

use std::collections::BTreeMap;

use crate::domain::message::SmsBuilder;

/// Option record owned by one vendor builder.
pub trait VendorOptions: Clone + Default + Into<ProviderOptions> {
    /// Sub-provider tag of the vendor this record belongs to.
    const SUB_PROVIDER: &'static str;

    /// Extract this vendor's record from a message, if it carries one.
    fn from_options(options: &ProviderOptions) -> Option<&Self>;

    /// This vendor's record on a message, or the defaults.
    fn of(options: &ProviderOptions) -> Self {
        Self::from_options(options).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
/// Closed set of vendor option records a message may carry.
pub enum ProviderOptions {
    #[default]
    None,
    Aliyun(AliyunOptions),
    Tencent(TencentOptions),
    Huawei(HuaweiOptions),
    Volcengine(VolcengineOptions),
    Yunpian(YunpianOptions),
    Juhe(JuheOptions),
    Submail(SubmailOptions),
    Smsbao(SmsbaoOptions),
    Luosimao(LuosimaoOptions),
    Cl253(Cl253Options),
    Ucp(UcpOptions),
    Yuntongxun(YuntongxunOptions),
}

macro_rules! vendor_options {
    ($ty:ident, $variant:ident, $tag:literal) => {
        impl From<$ty> for ProviderOptions {
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }

        impl VendorOptions for $ty {
            const SUB_PROVIDER: &'static str = $tag;

            fn from_options(options: &ProviderOptions) -> Option<&Self> {
                match options {
                    ProviderOptions::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

vendor_options!(AliyunOptions, Aliyun, "aliyun");
vendor_options!(TencentOptions, Tencent, "tencent");
vendor_options!(HuaweiOptions, Huawei, "huawei");
vendor_options!(VolcengineOptions, Volcengine, "volc");
vendor_options!(YunpianOptions, Yunpian, "yunpian");
vendor_options!(JuheOptions, Juhe, "juhe");
vendor_options!(SubmailOptions, Submail, "submail");
vendor_options!(SmsbaoOptions, Smsbao, "smsbao");
vendor_options!(LuosimaoOptions, Luosimao, "luosimao");
vendor_options!(Cl253Options, Cl253, "cl253");
vendor_options!(UcpOptions, Ucp, "ucp");
vendor_options!(YuntongxunOptions, Yuntongxun, "yuntongxun");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliyunOptions {
    /// Endpoint region, e.g. `cn-hangzhou` or `ap-southeast-1`.
    pub region: Option<String>,
    pub out_id: Option<String>,
    pub sms_up_extend_code: Option<String>,
    /// Caller id shown on voice calls (`CalledShowNumber`).
    pub called_show_number: Option<String>,
    pub play_times: Option<u8>,
    /// Sender id for international messages (`From`).
    pub from: Option<String>,
}

impl SmsBuilder<AliyunOptions> {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.options.region = Some(region.into());
        self
    }

    pub fn out_id(mut self, out_id: impl Into<String>) -> Self {
        self.options.out_id = Some(out_id.into());
        self
    }

    pub fn sms_up_extend_code(mut self, code: impl Into<String>) -> Self {
        self.options.sms_up_extend_code = Some(code.into());
        self
    }

    pub fn called_show_number(mut self, number: impl Into<String>) -> Self {
        self.options.called_show_number = Some(number.into());
        self
    }

    pub fn play_times(mut self, times: u8) -> Self {
        self.options.play_times = Some(times);
        self
    }

    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.options.from = Some(sender_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TencentOptions {
    /// API region, e.g. `ap-guangzhou`.
    pub region: Option<String>,
    pub extend_code: Option<String>,
    pub sender_id: Option<String>,
    pub session_context: Option<String>,
    pub play_times: Option<u8>,
}

impl SmsBuilder<TencentOptions> {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.options.region = Some(region.into());
        self
    }

    pub fn extend_code(mut self, code: impl Into<String>) -> Self {
        self.options.extend_code = Some(code.into());
        self
    }

    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.options.sender_id = Some(sender_id.into());
        self
    }

    pub fn session_context(mut self, context: impl Into<String>) -> Self {
        self.options.session_context = Some(context.into());
        self
    }

    pub fn play_times(mut self, times: u8) -> Self {
        self.options.play_times = Some(times);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HuaweiOptions {
    /// Host (and optional port) of the application access address.
    pub endpoint: Option<String>,
    /// SMS channel number (`from`); falls back to the account `app_id`.
    pub sender: Option<String>,
    /// Number shown to the callee on voice calls.
    pub display_number: Option<String>,
    pub language_type: Option<String>,
    pub play_times: Option<u8>,
}

impl SmsBuilder<HuaweiOptions> {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.endpoint = Some(endpoint.into());
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.options.sender = Some(sender.into());
        self
    }

    pub fn display_number(mut self, number: impl Into<String>) -> Self {
        self.options.display_number = Some(number.into());
        self
    }

    pub fn language_type(mut self, language: impl Into<String>) -> Self {
        self.options.language_type = Some(language.into());
        self
    }

    pub fn play_times(mut self, times: u8) -> Self {
        self.options.play_times = Some(times);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolcengineOptions {
    /// Signing region, default `cn-north-1`.
    pub region: Option<String>,
    /// Message group (`SmsAccount`); falls back to the account `app_id`.
    pub sms_account: Option<String>,
    pub tag: Option<String>,
}

impl SmsBuilder<VolcengineOptions> {
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.options.region = Some(region.into());
        self
    }

    pub fn sms_account(mut self, account: impl Into<String>) -> Self {
        self.options.sms_account = Some(account.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.options.tag = Some(tag.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YunpianOptions {
    /// Register the recipient for reply handling (`register`).
    pub register: bool,
    /// Convert long links into short links (`mobile_stat`).
    pub mobile_stat: bool,
}

impl SmsBuilder<YunpianOptions> {
    pub fn register(mut self, register: bool) -> Self {
        self.options.register = register;
        self
    }

    pub fn mobile_stat(mut self, mobile_stat: bool) -> Self {
        self.options.mobile_stat = mobile_stat;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JuheOptions {
    /// Voice playback repetitions (`playtimes`, 1..=3).
    pub play_times: Option<u8>,
}

impl SmsBuilder<JuheOptions> {
    pub fn play_times(mut self, times: u8) -> Self {
        self.options.play_times = Some(times);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Submail request signing mode (`sign_type`).
pub enum SubmailSignType {
    /// The app key itself is sent as `signature`.
    #[default]
    Normal,
    Md5,
    Sha1,
}

impl SubmailSignType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmailOptions {
    pub sign_type: SubmailSignType,
    pub tag: Option<String>,
    /// International sender id.
    pub sender: Option<String>,
    /// Template variables per recipient, keyed by mobile number.
    pub per_recipient_params: BTreeMap<String, BTreeMap<String, String>>,
}

impl SmsBuilder<SubmailOptions> {
    pub fn sign_type(mut self, sign_type: SubmailSignType) -> Self {
        self.options.sign_type = sign_type;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.options.tag = Some(tag.into());
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.options.sender = Some(sender.into());
        self
    }

    pub fn recipient_params(
        mut self,
        mobile: impl Into<String>,
        params: BTreeMap<String, String>,
    ) -> Self {
        self.options
            .per_recipient_params
            .insert(mobile.into(), params);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsbaoOptions {
    /// Product id (`g`) for dedicated channels.
    pub product_id: Option<String>,
}

impl SmsBuilder<SmsbaoOptions> {
    pub fn product_id(mut self, product_id: impl Into<String>) -> Self {
        self.options.product_id = Some(product_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LuosimaoOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cl253Options {
    /// Ask for a delivery report (`report`).
    pub report: bool,
    /// International sender id (`senderId`).
    pub sender_id: Option<String>,
    /// Positional template values per recipient, keyed by mobile number.
    pub per_recipient_params: BTreeMap<String, Vec<String>>,
}

impl SmsBuilder<Cl253Options> {
    pub fn report(mut self, report: bool) -> Self {
        self.options.report = report;
        self
    }

    pub fn sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.options.sender_id = Some(sender_id.into());
        self
    }

    pub fn recipient_params(mut self, mobile: impl Into<String>, params: Vec<String>) -> Self {
        self.options
            .per_recipient_params
            .insert(mobile.into(), params);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UcpOptions {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YuntongxunOptions {
    pub play_times: Option<u8>,
    /// Caller id shown on voice calls.
    pub display_number: Option<String>,
    /// Voice prompt language (`lang`), `zh` or `en`.
    pub lang: Option<String>,
}

impl SmsBuilder<YuntongxunOptions> {
    pub fn play_times(mut self, times: u8) -> Self {
        self.options.play_times = Some(times);
        self
    }

    pub fn display_number(mut self, number: impl Into<String>) -> Self {
        self.options.display_number = Some(number.into());
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.options.lang = Some(lang.into());
        self
    }
}
