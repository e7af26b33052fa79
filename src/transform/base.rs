use std::fmt;
use std::sync::Arc;

use crate::domain::{Account, Message, MessageType, ValidationError};
use crate::error::SmsError;
use crate::transform::Transformed;
use crate::transport::{HttpRequestSpec, ResponseHandler, ResponseValidatorConfig};

/// What a vendor handler returns: the request and, optionally, a response
/// handler overriding the transformer's default.
pub type HandlerOutput = (HttpRequestSpec, Option<ResponseHandler>);

/// Vendor handler for one message type. `V` is the vendor transformer holding
/// signing context and other per-vendor state.
pub type Handler<V> = fn(&V, &Message, &Account) -> Result<HandlerOutput, SmsError>;

/// Runs before the handler on a private copy of the message; may fill defaults.
pub type BeforeHook = Arc<dyn Fn(&mut Message, &Account) -> Result<(), SmsError> + Send + Sync>;

/// Runs after the handler and may rewrite its outcome. Rewritten errors
/// should keep their [`ErrorKind`](crate::ErrorKind).
pub type AfterHook =
    Arc<dyn Fn(&Message, &Account, Result<(), SmsError>) -> Result<(), SmsError> + Send + Sync>;

/// Scaffolding shared by every vendor transformer.
///
/// Owns the per-type handler table, the hook chains, the capability gates
/// common to all vendors and the default response validator.
pub struct BaseTransformer<V> {
    sub_provider: &'static str,
    sms: Option<Handler<V>>,
    voice: Option<Handler<V>>,
    mms: Option<Handler<V>>,
    scheduling: bool,
    before: Vec<BeforeHook>,
    after: Vec<AfterHook>,
    validator: ResponseValidatorConfig,
}

impl<V> fmt::Debug for BaseTransformer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseTransformer")
            .field("sub_provider", &self.sub_provider)
            .field("sms", &self.sms.is_some())
            .field("voice", &self.voice.is_some())
            .field("mms", &self.mms.is_some())
            .field("scheduling", &self.scheduling)
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

impl<V> BaseTransformer<V> {
    /// New scaffolding with only the built-in defaults hook installed.
    pub fn new(sub_provider: &'static str, validator: ResponseValidatorConfig) -> Self {
        let defaults: BeforeHook = Arc::new(apply_defaults);
        Self {
            sub_provider,
            sms: None,
            voice: None,
            mms: None,
            scheduling: false,
            before: vec![defaults],
            after: Vec::new(),
            validator,
        }
    }

    pub fn with_handler(mut self, message_type: MessageType, handler: Handler<V>) -> Self {
        match message_type {
            MessageType::TextSms => self.sms = Some(handler),
            MessageType::Voice => self.voice = Some(handler),
            MessageType::Mms => self.mms = Some(handler),
        }
        self
    }

    /// Let `scheduled_at` through to the handlers instead of rejecting it.
    pub fn with_scheduling(mut self) -> Self {
        self.scheduling = true;
        self
    }

    pub fn with_before_hook(
        mut self,
        hook: impl Fn(&mut Message, &Account) -> Result<(), SmsError> + Send + Sync + 'static,
    ) -> Self {
        self.before.push(Arc::new(hook));
        self
    }

    pub fn with_after_hook(
        mut self,
        hook: impl Fn(&Message, &Account, Result<(), SmsError>) -> Result<(), SmsError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.after.push(Arc::new(hook));
        self
    }

    pub fn sub_provider(&self) -> &'static str {
        self.sub_provider
    }

    pub fn supports(&self, message_type: MessageType) -> bool {
        self.handler(message_type).is_some()
    }

    pub fn validator(&self) -> &ResponseValidatorConfig {
        &self.validator
    }

    /// Response handler built from the registered validator config.
    pub fn default_handler(&self) -> ResponseHandler {
        self.validator.clone().into_handler(self.sub_provider)
    }

    fn handler(&self, message_type: MessageType) -> Option<Handler<V>> {
        match message_type {
            MessageType::TextSms => self.sms,
            MessageType::Voice => self.voice,
            MessageType::Mms => self.mms,
        }
    }

    /// Before-hooks (fail-fast), capability gates, handler dispatch, then
    /// after-hooks over the handler outcome.
    pub fn transform(
        &self,
        vendor: &V,
        message: &Message,
        account: &Account,
    ) -> Result<Transformed, SmsError> {
        let message_type = message.message_type();
        let handler = self
            .handler(message_type)
            .ok_or_else(|| SmsError::unsupported(self.sub_provider, message_type.as_str()))?;

        let mut message = message.clone();
        for hook in &self.before {
            hook(&mut message, account)?;
        }
        self.check_capabilities(&message)?;

        tracing::debug!(
            provider = self.sub_provider,
            message_type = message_type.as_str(),
            recipients = message.mobiles().len(),
            "transforming message"
        );

        let (outcome, prepared) = match handler(vendor, &message, account) {
            Ok((spec, handler)) => (Ok(()), Some((spec, handler))),
            Err(err) => (Err(err), None),
        };
        let outcome = self
            .after
            .iter()
            .fold(outcome, |outcome, hook| hook(&message, account, outcome));

        match (outcome, prepared) {
            (Ok(()), Some((spec, handler))) => {
                Ok((spec, handler.unwrap_or_else(|| self.default_handler())))
            }
            (Err(err), _) => Err(err),
            // An after-hook cleared a handler error, but there is nothing to send.
            (Ok(()), None) => Err(SmsError::unsupported(self.sub_provider, message_type.as_str())),
        }
    }

    fn check_capabilities(&self, message: &Message) -> Result<(), SmsError> {
        let provider = self.sub_provider;
        match message.message_type() {
            MessageType::Voice if message.is_batch() => {
                return Err(SmsError::unsupported(provider, "batch voice"));
            }
            MessageType::Voice if !message.is_domestic() => {
                return Err(SmsError::unsupported(provider, "international voice"));
            }
            MessageType::Mms if !message.is_domestic() => {
                return Err(SmsError::unsupported(provider, "international mms"));
            }
            _ => {}
        }
        if message.scheduled_at().is_some() && !self.scheduling {
            return Err(SmsError::unsupported(provider, "scheduled send"));
        }
        Ok(())
    }
}

/// Built-in first hook: account-level defaults, then vendor-agnostic checks.
fn apply_defaults(message: &mut Message, account: &Account) -> Result<(), SmsError> {
    if message.callback_url().is_none() {
        if let Some(callback) = account.callback.as_deref() {
            message.set_callback_url(callback);
        }
    }
    message.validate()?;
    account.validate()?;
    if !account.sub_provider.eq_ignore_ascii_case(message.sub_provider()) {
        return Err(ValidationError::InvalidField {
            field: "sub_provider",
            reason: format!(
                "account {:?} serves {:?}, message targets {:?}",
                account.name,
                account.sub_provider,
                message.sub_provider()
            ),
        }
        .into());
    }
    Ok(())
}
