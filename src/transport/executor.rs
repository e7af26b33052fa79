use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;

use crate::transport::request::{HttpMethod, HttpRequestSpec};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs the HTTP call described by an [`HttpRequestSpec`].
///
/// Implementations own timeouts and cancellation; dropping the returned
/// future aborts the request.
pub trait HttpExecutor: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: &'a HttpRequestSpec,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone, Default)]
/// [`HttpExecutor`] backed by a shared `reqwest::Client`.
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute<'a>(
        &'a self,
        request: &'a HttpRequestSpec,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };
            let mut builder = self.client.request(method, request.full_url());

            let has_content_type = request.header("content-type").is_some();
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !has_content_type {
                if let Some(content_type) = request.body_kind.content_type() {
                    builder = builder.header("Content-Type", content_type);
                }
            }
            if !request.body.is_empty() {
                builder = builder.body(request.body.clone());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            Ok(HttpResponse { status, body })
        })
    }
}
