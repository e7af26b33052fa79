//! SUBMAIL: SMS, international SMS, voice and MMS over form posts signed with
//! the app key (normal, md5 or sha1 mode).

use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::domain::{
    Account, Category, Message, MessageType, PhoneFormat, SubmailOptions, SubmailSignType,
    VendorOptions,
};
use crate::error::SmsError;
use crate::providers::{
    Params, SignPlacement, delegate_transformer, first_mobile, signed_content, voice_code,
};
use crate::signing::{SignContext, md5_hex, sha1_hex};
use crate::transform::{
    BaseTransformer, HandlerOutput, ensure_known_recipients, ensure_max_recipients,
    ensure_single, require,
};
use crate::transport::{
    HttpRequestSpec, MatchMode, ResponseHandler, ResponseValidatorConfig, StatusSetRule,
};

const API_BASE: &str = "https://api-v4.mysubmail.com";
const MAX_BATCH: usize = 200;

/// Parameters that never take part in the signature.
const UNSIGNED_PARAMS: [&str; 4] = ["vars", "tag", "multi", "signature"];

/// `multi*` endpoints answer with one status object per recipient, or a single
/// error object when the whole request is refused.
fn multi_handler() -> ResponseHandler {
    ResponseValidatorConfig::json("status", "error", "code", "msg")
        .with_mode(MatchMode::NotEquals)
        .with_status_set(StatusSetRule {
            path: String::new(),
            code_field: "status".to_owned(),
            success_value: "success".to_owned(),
            message_field: "msg".to_owned(),
        })
        .into_handler(SubmailOptions::SUB_PROVIDER)
}

pub struct SubmailTransformer {
    base: BaseTransformer<Self>,
    ctx: SignContext,
}

impl Default for SubmailTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmailTransformer {
    pub fn new() -> Self {
        Self::with_context(SignContext::default())
    }

    pub fn with_context(ctx: SignContext) -> Self {
        let base = BaseTransformer::new(
            SubmailOptions::SUB_PROVIDER,
            ResponseValidatorConfig::json("status", "success", "code", "msg"),
        )
        .with_handler(MessageType::TextSms, Self::sms)
        .with_handler(MessageType::Voice, Self::voice)
        .with_handler(MessageType::Mms, Self::mms);
        Self { base, ctx }
    }

    fn sms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        if !message.is_domestic() {
            return self.international_sms(message, account);
        }
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = SubmailOptions::of(message.options());
        ensure_known_recipients(message, options.per_recipient_params.keys())?;

        match message.template_id() {
            Some(project) if message.is_batch() => {
                let mut form = Params::new();
                form.push("project", project)
                    .push("multi", multi(message, &options, PhoneFormat::BarePrefixed));
                self.post("sms/multixsend", form, &options, account, Some(multi_handler()))
            }
            Some(project) => {
                let mut form = Params::new();
                form.push("to", single_to(message, PhoneFormat::BarePrefixed)?)
                    .push("project", project)
                    .push("vars", vars_for(message, &options, first_mobile(message)?));
                self.post("sms/xsend", form, &options, account, None)
            }
            None if message.is_batch() => {
                let mut form = Params::new();
                form.push("content", signed_content(message, SignPlacement::Prefix)?)
                    .push("multi", multi(message, &options, PhoneFormat::BarePrefixed));
                self.post("sms/multisend", form, &options, account, Some(multi_handler()))
            }
            None => {
                let mut form = Params::new();
                form.push("to", single_to(message, PhoneFormat::BarePrefixed)?)
                    .push("content", signed_content(message, SignPlacement::Prefix)?);
                self.post("sms/send", form, &options, account, None)
            }
        }
    }

    fn international_sms(
        &self,
        message: &Message,
        account: &Account,
    ) -> Result<HandlerOutput, SmsError> {
        ensure_single(SubmailOptions::SUB_PROVIDER, message, "international sms")?;
        let options = SubmailOptions::of(message.options());
        ensure_known_recipients(message, options.per_recipient_params.keys())?;

        let mut form = Params::new();
        form.push("to", single_to(message, PhoneFormat::E164)?)
            .push_opt("sender", options.sender.as_deref());
        let path = match message.template_id() {
            Some(project) => {
                form.push("project", project)
                    .push("vars", vars_for(message, &options, first_mobile(message)?));
                "internationalsms/xsend"
            }
            None => {
                form.push("content", signed_content(message, SignPlacement::Prefix)?);
                "internationalsms/send"
            }
        };
        self.post(path, form, &options, account, None)
    }

    fn voice(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        let options = SubmailOptions::of(message.options());
        let mut form = Params::new();
        form.push("to", single_to(message, PhoneFormat::BarePrefixed)?);
        let path = if message.category() == Category::Verification {
            form.push("code", voice_code(message)?);
            "voice/verify"
        } else {
            form.push("project", require(message.template_id(), "template_id")?)
                .push("vars", vars_for(message, &options, first_mobile(message)?));
            "voice/xsend"
        };
        self.post(path, form, &options, account, None)
    }

    fn mms(&self, message: &Message, account: &Account) -> Result<HandlerOutput, SmsError> {
        ensure_max_recipients(message, MAX_BATCH)?;
        let options = SubmailOptions::of(message.options());
        ensure_known_recipients(message, options.per_recipient_params.keys())?;
        let project = require(message.template_id(), "template_id")?;

        let mut form = Params::new();
        form.push("project", project);
        if message.is_batch() {
            form.push("multi", multi(message, &options, PhoneFormat::BarePrefixed));
            return self.post("mms/multixsend", form, &options, account, Some(multi_handler()));
        }
        form.push("to", single_to(message, PhoneFormat::BarePrefixed)?)
            .push("vars", vars_for(message, &options, first_mobile(message)?));
        self.post("mms/xsend", form, &options, account, None)
    }

    fn post(
        &self,
        path: &str,
        mut form: Params,
        options: &SubmailOptions,
        account: &Account,
        handler: Option<ResponseHandler>,
    ) -> Result<HandlerOutput, SmsError> {
        let app_key = account.require_secret()?;
        form.push("appid", &account.api_key)
            .push_opt("tag", options.tag.as_deref());
        let mut pairs = form.into_vec();
        let signature = match options.sign_type {
            SubmailSignType::Normal => app_key.to_owned(),
            sign_type => {
                pairs.push(("timestamp".to_owned(), self.ctx.now().timestamp().to_string()));
                pairs.push(("sign_type".to_owned(), sign_type.as_str().to_owned()));
                sign(&account.api_key, app_key, sign_type, &pairs)
            }
        };
        pairs.push(("signature".to_owned(), signature));

        let spec = HttpRequestSpec::post(format!("{API_BASE}/{path}")).with_form_body(&pairs);
        Ok((spec, handler))
    }
}

delegate_transformer!(SubmailTransformer);

/// `hash(appid + appkey + "k=v&..." + appid + appkey)` over the sorted
/// signed parameters.
fn sign(
    app_id: &str,
    app_key: &str,
    sign_type: SubmailSignType,
    pairs: &[(String, String)],
) -> String {
    let mut signed = pairs
        .iter()
        .filter(|(key, _)| !UNSIGNED_PARAMS.contains(&key.as_str()))
        .collect::<Vec<_>>();
    signed.sort();
    let joined = signed
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let input = format!("{app_id}{app_key}{joined}{app_id}{app_key}");
    match sign_type {
        SubmailSignType::Sha1 => sha1_hex(input.as_bytes()),
        _ => md5_hex(input.as_bytes()),
    }
}

fn single_to(message: &Message, format: PhoneFormat) -> Result<String, SmsError> {
    Ok(format.format(first_mobile(message)?, message.region_code()))
}

/// Message-level params overlaid with the recipient's own.
fn merged_vars(message: &Message, options: &SubmailOptions, mobile: &str) -> BTreeMap<String, String> {
    let mut vars = message.template_params().clone();
    if let Some(own) = options.per_recipient_params.get(mobile) {
        vars.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    vars
}

fn vars_for(message: &Message, options: &SubmailOptions, mobile: &str) -> String {
    json!(merged_vars(message, options, mobile)).to_string()
}

fn multi(message: &Message, options: &SubmailOptions, format: PhoneFormat) -> String {
    Value::Array(
        message
            .mobiles()
            .iter()
            .map(|mobile| {
                json!({
                    "to": format.format(mobile, message.region_code()),
                    "vars": merged_vars(message, options, mobile),
                })
            })
            .collect(),
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submail;
    use crate::error::ErrorKind;
    use crate::providers::testing::fixed_context;
    use crate::transform::Transformer;

    fn transformer() -> SubmailTransformer {
        SubmailTransformer::with_context(fixed_context())
    }

    fn account() -> Account {
        Account::new("sm", "submail", "10001", "appkey-secret")
    }

    #[test]
    fn template_single_with_normal_signature() {
        let message = submail()
            .to("13800138000")
            .template_id("proj1")
            .param("code", "1234")
            .tag("t1")
            .build();
        let (spec, _) = transformer().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/sms/xsend");
        assert_eq!(spec.form_param("appid").as_deref(), Some("10001"));
        assert_eq!(spec.form_param("to").as_deref(), Some("13800138000"));
        assert_eq!(spec.form_param("project").as_deref(), Some("proj1"));
        assert_eq!(spec.form_param("vars").as_deref(), Some(r#"{"code":"1234"}"#));
        assert_eq!(spec.form_param("tag").as_deref(), Some("t1"));
        assert_eq!(spec.form_param("signature").as_deref(), Some("appkey-secret"));
        assert_eq!(spec.form_param("timestamp"), None);
    }

    #[test]
    fn md5_signature_excludes_vars_and_tag() {
        let message = submail()
            .to("13800138000")
            .template_id("proj1")
            .param("code", "1234")
            .tag("t1")
            .sign_type(SubmailSignType::Md5)
            .build();
        let (spec, _) = transformer().transform(&message, &account()).unwrap();
        assert_eq!(spec.form_param("sign_type").as_deref(), Some("md5"));
        assert_eq!(spec.form_param("timestamp").as_deref(), Some("1714552200"));
        let expected = md5_hex(
            b"10001appkey-secretappid=10001&project=proj1&sign_type=md5&timestamp=1714552200&to=1380013800010001appkey-secret",
        );
        assert_eq!(spec.form_param("signature"), Some(expected));
    }

    #[test]
    fn sha1_signature_mode() {
        let message = submail()
            .to("13800138000")
            .content("hello")
            .sign_name("Brand")
            .sign_type(SubmailSignType::Sha1)
            .build();
        let (spec, _) = transformer().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/sms/send");
        assert_eq!(spec.form_param("content").as_deref(), Some("【Brand】hello"));
        assert_eq!(spec.form_param("signature").map(|it| it.len()), Some(40));
    }

    #[test]
    fn batch_template_uses_multixsend_with_recipient_overrides() {
        let message = submail()
            .to_many(["13800000001", "13800000002"])
            .template_id("proj1")
            .param("code", "0000")
            .recipient_params(
                "13800000002",
                BTreeMap::from([("code".to_owned(), "2222".to_owned())]),
            )
            .build();
        let (spec, handler) = transformer().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/sms/multixsend");
        let multi: Value = serde_json::from_str(&spec.form_param("multi").unwrap()).unwrap();
        assert_eq!(
            multi,
            json!([
                {"to": "13800000001", "vars": {"code": "0000"}},
                {"to": "13800000002", "vars": {"code": "2222"}},
            ])
        );

        assert!(handler(200, br#"[{"status":"success"},{"status":"success"}]"#).is_ok());
        let err = handler(200, br#"[{"status":"success"},{"status":"error","code":"252","msg":"bad"}]"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        let err = handler(200, br#"{"status":"error","code":"101","msg":"Incorrect app parameter"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "submail error 101: Incorrect app parameter");
    }

    #[test]
    fn unknown_recipient_override_is_param_error() {
        let message = submail()
            .to("13800000001")
            .template_id("proj1")
            .recipient_params("13900000000", BTreeMap::new())
            .build();
        let err = transformer().transform(&message, &account()).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Param);
    }

    #[test]
    fn international_single_uses_e164() {
        let message = submail()
            .to("5551234")
            .region_code(1)
            .template_id("intl1")
            .build();
        let (spec, _) = transformer().transform(&message, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/internationalsms/xsend");
        assert_eq!(spec.form_param("to").as_deref(), Some("+15551234"));
    }

    #[test]
    fn voice_and_mms_paths() {
        let verify = submail()
            .to("13800138000")
            .message_type(MessageType::Voice)
            .category(Category::Verification)
            .param("code", "1234")
            .build();
        let (spec, _) = transformer().transform(&verify, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/voice/verify");
        assert_eq!(spec.form_param("code").as_deref(), Some("1234"));

        let mms = submail()
            .to("13800138000")
            .message_type(MessageType::Mms)
            .template_id("mms1")
            .build();
        let (spec, _) = transformer().transform(&mms, &account()).unwrap();
        assert_eq!(spec.url, "https://api-v4.mysubmail.com/mms/xsend");

        let intl_mms = submail()
            .to("5551234")
            .region_code(1)
            .message_type(MessageType::Mms)
            .template_id("mms1")
            .build();
        assert_eq!(
            transformer().transform(&intl_mms, &account()).err().unwrap().kind(),
            ErrorKind::UnsupportedCapability
        );
    }

    #[test]
    fn response_validation() {
        let message = submail().to("13800138000").content("hi").build();
        let (_, handler) = transformer().transform(&message, &account()).unwrap();
        assert!(handler(200, br#"{"status":"success","send_id":"x","fee":1}"#).is_ok());
        let err = handler(200, br#"{"status":"error","code":"101","msg":"Incorrect app parameter"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "submail error 101: Incorrect app parameter");
    }
}
