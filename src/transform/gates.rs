//! Fail-fast capability and parameter checks shared by the vendor handlers.

use crate::domain::{Message, ValidationError};
use crate::error::SmsError;

/// Reject multi-recipient messages for a single-recipient API.
pub(crate) fn ensure_single(
    provider: &str,
    message: &Message,
    capability: &str,
) -> Result<(), SmsError> {
    if message.is_batch() {
        return Err(SmsError::unsupported(provider, format!("batch {capability}")));
    }
    Ok(())
}

/// Reject messages addressed outside mainland China.
pub(crate) fn ensure_domestic(
    provider: &str,
    message: &Message,
    capability: &str,
) -> Result<(), SmsError> {
    if !message.is_domestic() {
        return Err(SmsError::unsupported(
            provider,
            format!("international {capability}"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_max_recipients(message: &Message, max: usize) -> Result<(), SmsError> {
    let actual = message.mobiles().len();
    if actual > max {
        return Err(ValidationError::TooManyRecipients { max, actual }.into());
    }
    Ok(())
}

/// Every key must be one of the message's recipients.
pub(crate) fn ensure_known_recipients<'a>(
    message: &Message,
    keys: impl IntoIterator<Item = &'a String>,
) -> Result<(), SmsError> {
    for key in keys {
        if !message.mobiles().iter().any(|mobile| mobile == key) {
            return Err(ValidationError::UnknownRecipient {
                mobile: key.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Unwrap a required, non-blank message field.
pub(crate) fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, SmsError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ValidationError::Empty { field }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aliyun;
    use crate::error::ErrorKind;

    #[test]
    fn batch_and_international_gates() {
        let batch = aliyun().to_many(["13800000001", "13800000002"]).build();
        let err = ensure_single("aliyun", &batch, "voice").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCapability);
        assert_eq!(err.to_string(), "aliyun does not support batch voice");

        let intl = aliyun().to("5551234").region_code(1).build();
        assert!(ensure_domestic("aliyun", &intl, "voice").is_err());
        assert!(ensure_domestic("aliyun", &batch, "voice").is_ok());
    }

    #[test]
    fn recipient_limit_is_param_error() {
        let batch = aliyun().to_many(["1", "2", "3"]).build();
        let err = ensure_max_recipients(&batch, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Param);
        assert!(ensure_max_recipients(&batch, 3).is_ok());
    }

    #[test]
    fn unknown_recipient_keys_are_rejected() {
        let message = aliyun().to_many(["13800000001", "13800000002"]).build();
        let known = ["13800000002".to_owned()];
        assert!(ensure_known_recipients(&message, &known).is_ok());
        let unknown = ["13900000000".to_owned()];
        assert!(matches!(
            ensure_known_recipients(&message, &unknown),
            Err(SmsError::Validation(ValidationError::UnknownRecipient { .. }))
        ));
    }

    #[test]
    fn require_rejects_blank() {
        assert_eq!(require(Some("x"), "sign_name").unwrap(), "x");
        assert!(require(Some("  "), "sign_name").is_err());
        assert!(require(None, "sign_name").is_err());
    }
}
