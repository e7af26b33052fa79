//! The twelve built-in vendor transformers.

mod aliyun;
mod cl253;
mod huawei;
mod juhe;
mod luosimao;
mod smsbao;
mod submail;
mod tencent;
mod ucp;
mod volcengine;
mod yuntongxun;
mod yunpian;

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::domain::{Account, Message, ValidationError};
use crate::error::SmsError;
use crate::signing::SignContext;
use crate::transform::{Transformer, require};

pub use aliyun::AliyunTransformer;
pub use cl253::Cl253Transformer;
pub use huawei::HuaweiTransformer;
pub use juhe::JuheTransformer;
pub use luosimao::LuosimaoTransformer;
pub use smsbao::SmsbaoTransformer;
pub use submail::SubmailTransformer;
pub use tencent::TencentTransformer;
pub use ucp::UcpTransformer;
pub use volcengine::VolcengineTransformer;
pub use yuntongxun::YuntongxunTransformer;
pub use yunpian::YunpianTransformer;

/// One instance of every built-in transformer, sharing `ctx`.
pub fn all(ctx: &SignContext) -> Vec<Arc<dyn Transformer>> {
    let transformers: [Arc<dyn Transformer>; 12] = [
        Arc::new(AliyunTransformer::with_context(ctx.clone())),
        Arc::new(TencentTransformer::with_context(ctx.clone())),
        Arc::new(HuaweiTransformer::with_context(ctx.clone())),
        Arc::new(VolcengineTransformer::with_context(ctx.clone())),
        Arc::new(YunpianTransformer::new()),
        Arc::new(JuheTransformer::new()),
        Arc::new(SubmailTransformer::with_context(ctx.clone())),
        Arc::new(SmsbaoTransformer::new()),
        Arc::new(LuosimaoTransformer::new()),
        Arc::new(Cl253Transformer::new()),
        Arc::new(UcpTransformer::new()),
        Arc::new(YuntongxunTransformer::with_context(ctx.clone())),
    ];
    transformers.into()
}

/// `Transformer` impl delegating to the vendor's `base` field.
macro_rules! delegate_transformer {
    ($ty:ty) => {
        impl crate::transform::Transformer for $ty {
            fn sub_provider(&self) -> &str {
                self.base.sub_provider()
            }

            fn transform(
                &self,
                message: &crate::domain::Message,
                account: &crate::domain::Account,
            ) -> Result<crate::transform::Transformed, crate::error::SmsError> {
                self.base.transform(self, message, account)
            }
        }
    };
}

pub(crate) use delegate_transformer;

/// Endpoint/region choice: message option, then account, then vendor default.
pub(crate) fn pick<'a>(option: Option<&'a str>, account: &'a Account, default: &'a str) -> &'a str {
    option
        .or(account.region.as_deref())
        .filter(|it| !it.trim().is_empty())
        .unwrap_or(default)
}

/// Ordered string pairs for query strings and form bodies.
#[derive(Debug, Default)]
pub(crate) struct Params(Vec<(String, String)>);

impl Params {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.0.push((key.to_owned(), value.into()));
        self
    }

    /// Push only present, non-empty values.
    pub(crate) fn push_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|it| !it.is_empty()) {
            self.push(key, value);
        }
        self
    }

    pub(crate) fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

/// JSON object builder skipping absent optional fields.
#[derive(Debug, Default)]
pub(crate) struct JsonBody(Map<String, Value>);

impl JsonBody {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    pub(crate) fn set_opt(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|it| !it.is_empty()) {
            self.set(key, value);
        }
        self
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignPlacement {
    Prefix,
    Suffix,
}

/// Message content carrying the `【sign】` marker required by content-based
/// vendors. Content that already contains the marker is left alone.
pub(crate) fn signed_content(message: &Message, placement: SignPlacement) -> Result<String, SmsError> {
    let content = require(message.content(), "content")?;
    let Some(sign) = message.sign_name().filter(|it| !it.trim().is_empty()) else {
        return Ok(content.to_owned());
    };
    let marker = format!("【{sign}】");
    if content.contains(&marker) {
        return Ok(content.to_owned());
    }
    Ok(match placement {
        SignPlacement::Prefix => format!("{marker}{content}"),
        SignPlacement::Suffix => format!("{content}{marker}"),
    })
}

/// The only recipient of a single-recipient request.
pub(crate) fn first_mobile(message: &Message) -> Result<&str, SmsError> {
    message
        .mobiles()
        .first()
        .map(String::as_str)
        .ok_or_else(|| ValidationError::Empty { field: Message::MOBILES_FIELD }.into())
}

/// First positional template value, falling back to the content. Used as the
/// spoken code by verification-voice APIs.
pub(crate) fn voice_code(message: &Message) -> Result<String, SmsError> {
    if let Some(code) = message.ordered_params().into_iter().next() {
        return Ok(code);
    }
    require(message.content(), "content").map(str::to_owned)
}

/// Wall-clock time in China Standard Time (UTC+8), the zone vendor
/// timestamps and schedule fields are read in.
pub(crate) fn china_time(at: DateTime<Utc>) -> NaiveDateTime {
    at.naive_utc() + Duration::hours(8)
}
