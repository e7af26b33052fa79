//! Transport layer: request descriptions, response validation and HTTP execution.

mod executor;
mod request;
mod validator;

pub use executor::{BoxFuture, HttpExecutor, HttpResponse, ReqwestExecutor};
pub use request::{BodyKind, HttpMethod, HttpRequestSpec, ResponseHandler, encode_form};
pub use validator::{
    MatchMode, ResponseType, ResponseValidatorConfig, StatusSetRule, field_string, lookup_path,
    validate_response,
};
