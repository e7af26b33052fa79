//! Message → vendor request pipeline: the [`Transformer`] contract, the shared
//! [`BaseTransformer`] scaffolding and the sub-provider registry.

mod base;
mod gates;
mod registry;

use crate::domain::{Account, Message};
use crate::error::SmsError;
use crate::transport::{HttpRequestSpec, ResponseHandler};

pub use base::{AfterHook, BaseTransformer, BeforeHook, Handler, HandlerOutput};
pub(crate) use gates::{
    ensure_domestic, ensure_known_recipients, ensure_max_recipients, ensure_single, require,
};
pub use registry::{TransformerRegistry, get_transformer, global_registry, register_transformer};

/// Request ready for the executor plus the handler that judges its response.
pub type Transformed = (HttpRequestSpec, ResponseHandler);

/// Converts a vendor-agnostic [`Message`] into one vendor's HTTP request.
///
/// Implementations are pure: the same message, account, clock and nonce
/// always yield the same request.
pub trait Transformer: Send + Sync {
    /// Lowercase sub-provider tag this transformer serves.
    fn sub_provider(&self) -> &str;

    fn can_handle(&self, message: &Message) -> bool {
        message.sub_provider() == self.sub_provider()
    }

    fn transform(&self, message: &Message, account: &Account) -> Result<Transformed, SmsError>;
}
