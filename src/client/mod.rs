//! Client layer: picks an account, runs the vendor transformer and executes
//! the resulting request.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{Account, Message};
use crate::error::SmsError;
use crate::transform::{Transformer, TransformerRegistry};
use crate::transport::{HttpExecutor, ReqwestExecutor};

#[derive(Clone)]
/// Builder for [`SmsClient`].
///
/// Use this when you need a custom registry, executor, timeout or user-agent.
pub struct SmsClientBuilder {
    accounts: Vec<Account>,
    registry: Option<Arc<TransformerRegistry>>,
    executor: Option<Arc<dyn HttpExecutor>>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl fmt::Debug for SmsClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsClientBuilder")
            .field("accounts", &self.accounts)
            .field("registry", &self.registry)
            .field("custom_executor", &self.executor.is_some())
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for SmsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SmsClientBuilder {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            registry: None,
            executor: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Add one account. Order matters: the first account matching a message's
    /// sub-provider is used unless the message names one.
    pub fn account(mut self, account: Account) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn accounts(mut self, accounts: impl IntoIterator<Item = Account>) -> Self {
        self.accounts.extend(accounts);
        self
    }

    /// Use `registry` instead of a fresh registry of the built-in vendors.
    pub fn registry(mut self, registry: Arc<TransformerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use `executor` instead of the `reqwest`-backed default. Timeout and
    /// user-agent settings are ignored in that case.
    pub fn executor(mut self, executor: Arc<dyn HttpExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Validate the accounts and build a [`SmsClient`].
    pub fn build(self) -> Result<SmsClient, SmsError> {
        for account in &self.accounts {
            account.validate()?;
        }

        let http = match self.executor {
            Some(executor) => executor,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let client = builder
                    .build()
                    .map_err(|err| SmsError::Transport(Box::new(err)))?;
                Arc::new(ReqwestExecutor::new(client))
            }
        };

        Ok(SmsClient {
            accounts: self.accounts,
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(TransformerRegistry::with_defaults())),
            http,
        })
    }
}

#[derive(Clone)]
/// Sends [`Message`]s through whichever vendor they are built for.
///
/// One call to [`SmsClient::send`] is one HTTP request; there is no retry,
/// failover or rate limiting.
pub struct SmsClient {
    accounts: Vec<Account>,
    registry: Arc<TransformerRegistry>,
    http: Arc<dyn HttpExecutor>,
}

impl fmt::Debug for SmsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsClient")
            .field("accounts", &self.accounts)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SmsClient {
    /// Client over `accounts` with the built-in vendors and a default HTTP
    /// client. Accounts are not validated here; see [`SmsClient::builder`].
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            registry: Arc::new(TransformerRegistry::with_defaults()),
            http: Arc::new(ReqwestExecutor::default()),
        }
    }

    pub fn builder() -> SmsClientBuilder {
        SmsClientBuilder::new()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// The account named on the message, else the first one registered for
    /// its sub-provider.
    pub fn select_account(&self, message: &Message) -> Result<&Account, SmsError> {
        let found = match message.account() {
            Some(name) => self.accounts.iter().find(|account| account.name == name),
            None => self.accounts.iter().find(|account| {
                account
                    .sub_provider
                    .eq_ignore_ascii_case(message.sub_provider())
            }),
        };
        found.ok_or_else(|| SmsError::NoAccount {
            sub_provider: message.sub_provider().to_owned(),
        })
    }

    /// Send one message.
    ///
    /// Errors:
    /// - [`SmsError::NoAccount`] / [`SmsError::UnknownProvider`] when no
    ///   account or transformer matches,
    /// - validation and capability errors from the transformer (nothing is
    ///   sent),
    /// - [`SmsError::Transport`] for HTTP failures,
    /// - [`SmsError::HttpStatus`] / [`SmsError::Provider`] from the vendor's
    ///   response handler.
    pub async fn send(&self, message: &Message) -> Result<(), SmsError> {
        let account = self.select_account(message)?;
        let transformer = self.registry.get(message.sub_provider()).ok_or_else(|| {
            SmsError::UnknownProvider {
                sub_provider: message.sub_provider().to_owned(),
            }
        })?;
        self.dispatch(transformer.as_ref(), message, account).await
    }

    async fn dispatch(
        &self,
        transformer: &dyn Transformer,
        message: &Message,
        account: &Account,
    ) -> Result<(), SmsError> {
        let (request, handler) = transformer.transform(message, account)?;
        tracing::debug!(
            sub_provider = transformer.sub_provider(),
            account = %account.name,
            request = %request,
            recipients = message.mobiles().len(),
            "dispatching message"
        );

        let response = self
            .http
            .execute(&request)
            .await
            .map_err(SmsError::Transport)?;
        tracing::debug!(
            sub_provider = transformer.sub_provider(),
            status = response.status,
            "vendor responded"
        );
        handler(response.status, &response.body)
    }
}
