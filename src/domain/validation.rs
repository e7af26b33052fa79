use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    TooManyRecipients { max: usize, actual: usize },
    InvalidPhoneNumber { input: String },
    MissingTemplate { message_type: &'static str },
    MissingCredential { field: &'static str },
    UnknownRecipient { mobile: String },
    InvalidField { field: &'static str, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooManyRecipients { max, actual } => {
                write!(f, "too many recipients: {actual} (max {max})")
            }
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::MissingTemplate { message_type } => {
                write!(f, "{message_type} messages require a template id")
            }
            Self::MissingCredential { field } => {
                write!(f, "account credential {field} is required")
            }
            Self::UnknownRecipient { mobile } => {
                write!(f, "per-recipient params reference unknown mobile: {mobile}")
            }
            Self::InvalidField { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}
