//! Error taxonomy shared by transformers, response handlers and the client.

use std::error::Error as StdError;

use crate::domain::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The four disjoint error categories callers dispatch on.
pub enum ErrorKind {
    /// Caller-supplied data is invalid; nothing was sent.
    Param,
    /// The vendor cannot carry this message (e.g. international voice).
    UnsupportedCapability,
    /// The vendor answered with a non-success verdict.
    Provider,
    /// HTTP-level failure, cancellation or unexpected status.
    Transport,
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by transformers, response handlers and [`SmsClient`](crate::SmsClient).
pub enum SmsError {
    /// One of the domain checks rejected the message or account.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No transformer is registered under the message's sub-provider tag.
    #[error("no transformer registered for sub-provider {sub_provider:?}")]
    UnknownProvider { sub_provider: String },

    /// No configured account can send through the requested sub-provider.
    #[error("no account configured for sub-provider {sub_provider:?}")]
    NoAccount { sub_provider: String },

    /// The vendor does not support this message shape.
    #[error("{provider} does not support {capability}")]
    UnsupportedCapability {
        provider: String,
        capability: String,
    },

    /// Vendor returned a non-success verdict.
    #[error("{provider} error {code}: {message}")]
    Provider {
        provider: String,
        code: String,
        message: String,
    },

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// HTTP client / transport failure (DNS, TLS, timeouts, etc).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),
}

impl SmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::UnknownProvider { .. } | Self::NoAccount { .. } => {
                ErrorKind::Param
            }
            Self::UnsupportedCapability { .. } => ErrorKind::UnsupportedCapability,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::HttpStatus { .. } | Self::Transport(_) | Self::Parse(_) => ErrorKind::Transport,
        }
    }

    pub(crate) fn unsupported(provider: &str, capability: impl Into<String>) -> Self {
        Self::UnsupportedCapability {
            provider: provider.to_owned(),
            capability: capability.into(),
        }
    }

    pub(crate) fn provider(
        provider: &str,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            provider: provider.to_owned(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Build an [`SmsError::HttpStatus`], dropping whitespace-only bodies.
    pub(crate) fn http_status(status: u16, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body);
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(body.into_owned())
        };
        Self::HttpStatus { status, body }
    }
}
