use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Vendor credential record.
///
/// Loaded once at configuration time and never mutated while sending. The
/// meaning of `api_key`/`api_secret` depends on the vendor (access key pair,
/// username/password, app id/app key, ...).
pub struct Account {
    pub name: String,
    pub sub_provider: String,
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Default delivery-receipt URL applied when a message carries none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        sub_provider: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sub_provider: sub_provider.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            app_id: None,
            region: None,
            callback: None,
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Check identity and key presence. Vendors needing a secret or app id
    /// enforce that themselves.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if self.sub_provider.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "sub_provider",
            });
        }
        if self.api_key.trim().is_empty() {
            return Err(ValidationError::MissingCredential { field: "api_key" });
        }
        Ok(())
    }

    pub(crate) fn require_secret(&self) -> Result<&str, ValidationError> {
        if self.api_secret.is_empty() {
            return Err(ValidationError::MissingCredential {
                field: "api_secret",
            });
        }
        Ok(&self.api_secret)
    }

    pub(crate) fn require_app_id(&self) -> Result<&str, ValidationError> {
        match self.app_id.as_deref() {
            Some(app_id) if !app_id.trim().is_empty() => Ok(app_id),
            _ => Err(ValidationError::MissingCredential { field: "app_id" }),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("sub_provider", &self.sub_provider)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("region", &self.region)
            .field("callback", &self.callback)
            .finish()
    }
}
