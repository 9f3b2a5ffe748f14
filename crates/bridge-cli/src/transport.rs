//! `reqwest` transport for guarded outbound calls.

use async_trait::async_trait;
use bridge_core::guard::{RequestOptions, Transport};
use reqwest::Method;

/// Status line and body of a completed request.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = HttpResponse;
    type Error = reqwest::Error;

    async fn send(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, reqwest::Error> {
        let method = Method::from_bytes(options.method.as_bytes()).unwrap_or(Method::POST);
        let mut request = self.client.request(method, url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(url, status, "outbound request completed");
        Ok(HttpResponse { status, body })
    }
}
