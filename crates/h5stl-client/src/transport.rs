use crate::config::ClientConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Multipart body of a conversion submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitForm {
    pub file_name: String,
    pub file: Vec<u8>,
    pub file_format: String,
    pub deflection: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a reply (connect, TLS, timeout, body read).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

pub trait Transport {
    fn post_form(
        &self,
        url: &str,
        form: SubmitForm,
    ) -> impl Future<Output = Result<HttpReply, TransportError>> + Send;

    fn get(&self, url: &str) -> impl Future<Output = Result<HttpReply, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn post_form(&self, url: &str, form: SubmitForm) -> Result<HttpReply, TransportError> {
        let part = Part::bytes(form.file)
            .file_name(form.file_name)
            .mime_str("application/octet-stream")?;
        let body = Form::new()
            .part("src", part)
            .text("file_format", form.file_format)
            .text("deflection", form.deflection.to_string());

        let response = self.client.post(url).multipart(body).send().await?;
        into_reply(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpReply, TransportError> {
        let response = self.client.get(url).send().await?;
        into_reply(response).await
    }
}

async fn into_reply(response: reqwest::Response) -> Result<HttpReply, TransportError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?.to_vec();
    debug!(status, content_type = ?content_type, bytes = body.len(), "http reply");
    Ok(HttpReply {
        status,
        content_type,
        body,
    })
}
