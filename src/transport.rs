//! HTTP transport used by the package index client

use crate::error::TransportError;
use crate::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Something that can perform a GET request.
///
/// The index client depends only on this trait, so tests and embedders can
/// swap the network for canned responses.
#[async_trait]
pub trait HttpTransport: Send + Sync + fmt::Debug {
    /// GET `url` with `params` appended as query parameters
    async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError>;
}

/// Response status, final URL and a body that is read chunk by chunk
#[derive(Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub url: String,
    body: ResponseBody,
}

#[derive(Debug)]
enum ResponseBody {
    Network(reqwest::Response),
    Buffered(VecDeque<Vec<u8>>),
}

impl HttpResponse {
    /// Build a response whose body arrives in the given chunks
    pub fn from_chunks<I, C>(status_code: u16, url: impl Into<String>, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            status_code,
            url: url.into(),
            body: ResponseBody::Buffered(chunks.into_iter().map(Into::into).collect()),
        }
    }

    /// Build a response with a single-chunk text body
    pub fn from_text(status_code: u16, url: impl Into<String>, body: &str) -> Self {
        Self::from_chunks(status_code, url, [body.as_bytes().to_vec()])
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Next chunk of the body, `None` once it is exhausted
    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        match &mut self.body {
            ResponseBody::Network(response) => response
                .chunk()
                .await
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .map_err(classify),
            ResponseBody::Buffered(chunks) => Ok(chunks.pop_front()),
        }
    }
}

/// [`HttpTransport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Transport with the default user agent and timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(DEFAULT_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(classify)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await.map_err(classify)?;
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        debug!("GET {} -> {}", final_url, status_code);

        Ok(HttpResponse {
            status_code,
            url: final_url,
            body: ResponseBody::Network(response),
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffered_body_yields_chunks_in_order() {
        let mut response = HttpResponse::from_chunks(200, "http://index.test", ["<ta", "ble>"]);
        assert!(response.is_success());
        assert_eq!(response.chunk().await.unwrap(), Some(b"<ta".to_vec()));
        assert_eq!(response.chunk().await.unwrap(), Some(b"ble>".to_vec()));
        assert_eq!(response.chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_connection_refused_is_classified() {
        let transport = ReqwestTransport::with_settings("pypic-test", Duration::from_secs(5)).unwrap();
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}/", port);
        let err = transport.get(&url, &[]).await.unwrap_err();
        assert!(err.is_connection(), "unexpected error: {:?}", err);
    }
}
