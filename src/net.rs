// Network fetch collaborator.
// Issues live HTTP requests; injected so tests can substitute failing or counting doubles.

use async_trait::async_trait;
use http::header::{HeaderValue, USER_AGENT};
use reqwest::Client;

use crate::error::{Result, StrataError};
use crate::http::{Request, Response, ResponseKind};

/// Live-fetch collaborator for the TTL strategy. A fetch either yields a
/// complete response or fails; partial responses are never surfaced.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Fetcher backed by a reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = http::HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("strata"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(StrataError::Network)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let reply = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(StrataError::Network)?;

        let status = reply.status();
        let headers = reply.headers().clone();
        let body = reply.bytes().await.map_err(StrataError::Network)?;

        Ok(Response {
            status,
            headers,
            body: body.to_vec(),
            kind: ResponseKind::Basic,
        })
    }
}
