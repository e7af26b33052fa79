//! Unified client for sending SMS, voice and MMS messages through twelve
//! Chinese and international messaging vendors.
//!
//! The crate is layered the same way throughout: a domain layer of validated
//! message and account types, per-vendor transformers that turn a message into
//! a signed [`HttpRequestSpec`] plus a response handler, and a small client
//! that picks an account, executes the request and judges the reply.
//!
//! ```rust,no_run
//! use smsdispatch::{Account, SmsClient, aliyun};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), smsdispatch::SmsError> {
//!     let client = SmsClient::builder()
//!         .account(Account::new("primary", "aliyun", "LTAI...", "secret"))
//!         .build()?;
//!     let message = aliyun()
//!         .to("13800138000")
//!         .sign_name("Brand")
//!         .template_id("SMS_123")
//!         .param("code", "1234")
//!         .build();
//!     client.send(&message).await?;
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
pub mod error;
pub mod providers;
pub mod signing;
pub mod transform;
pub mod transport;

pub use client::{SmsClient, SmsClientBuilder};
pub use domain::{
    Account, Category, Message, MessageType, PhoneFormat, PhoneNumber, ProviderOptions,
    RegionCode, SmsBuilder, SubmailSignType, ValidationError, aliyun, cl253, huawei, juhe,
    luosimao, smsbao, submail, tencent, ucp, volcengine, yuntongxun, yunpian,
};
pub use error::{ErrorKind, SmsError};
pub use signing::SignContext;
pub use transform::{
    BaseTransformer, Transformed, Transformer, TransformerRegistry, get_transformer,
    global_registry, register_transformer,
};
pub use transport::{HttpExecutor, HttpRequestSpec, ResponseHandler, ResponseValidatorConfig};
