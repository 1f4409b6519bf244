//! Round trips against the conversion backend. Nothing is retried.

use crate::config::ClientConfig;
use crate::error::{ClientError, Hop};
use crate::transport::{HttpReply, ReqwestTransport, SubmitForm, Transport};
use h5stl_core::input::LocalFile;
use h5stl_core::stl::STL_MIME;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// Convert and hand back a link to the artifact.
    Download,
    /// Convert and fetch the artifact for display.
    Visualize,
}

impl Workflow {
    pub fn path(self) -> &'static str {
        match self {
            Workflow::Download => "export_stl/",
            Workflow::Visualize => "h5_to_vis/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub file_name: String,
    pub source: Vec<u8>,
    pub declared_format: String,
    pub deflection: f64,
}

impl ConversionRequest {
    pub fn from_file(file: LocalFile, cfg: &ClientConfig) -> Self {
        Self {
            file_name: file.name,
            source: file.bytes,
            declared_format: cfg.file_format.clone(),
            deflection: cfg.deflection,
        }
    }

    fn into_form(self) -> SubmitForm {
        SubmitForm {
            file_name: self.file_name,
            file: self.source,
            file_format: self.declared_format,
            deflection: self.deflection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Download { url: String },
    StlBytes { url: String, bytes: Vec<u8> },
}

#[derive(Debug, Default, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    stl_file_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl SubmitResponse {
    fn failure_reason(&self) -> String {
        match &self.detail {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "response has no stl_file_url".to_string(),
        }
    }
}

pub struct ConversionClient<T = ReqwestTransport> {
    cfg: ClientConfig,
    transport: T,
}

impl ConversionClient<ReqwestTransport> {
    pub fn new(cfg: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&cfg).map_err(|e| ClientError::Network {
            hop: Hop::Submit,
            url: cfg.base_url.clone(),
            message: e.to_string(),
        })?;
        Ok(Self::with_transport(cfg, transport))
    }
}

impl<T: Transport> ConversionClient<T> {
    pub fn with_transport(cfg: ClientConfig, transport: T) -> Self {
        Self { cfg, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn convert(
        &self,
        request: ConversionRequest,
        workflow: Workflow,
    ) -> Result<ConversionResult, ClientError> {
        match workflow {
            Workflow::Download => {
                let url = self.convert_to_downloadable(request).await?;
                Ok(ConversionResult::Download { url })
            }
            Workflow::Visualize => {
                let url = self.submit(request, Workflow::Visualize).await?;
                let bytes = self.fetch_stl(&url).await?;
                Ok(ConversionResult::StlBytes { url, bytes })
            }
        }
    }

    pub async fn convert_to_downloadable(
        &self,
        request: ConversionRequest,
    ) -> Result<String, ClientError> {
        self.submit(request, Workflow::Download).await
    }

    pub async fn convert_and_fetch_bytes(
        &self,
        request: ConversionRequest,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.submit(request, Workflow::Visualize).await?;
        self.fetch_stl(&url).await
    }

    /// Success needs both a 2xx status and a non-empty `stl_file_url`.
    #[instrument(skip_all, fields(file = %request.file_name, workflow = ?workflow))]
    pub async fn submit(
        &self,
        request: ConversionRequest,
        workflow: Workflow,
    ) -> Result<String, ClientError> {
        let endpoint = self.cfg.endpoint(workflow);
        info!(
            %endpoint,
            bytes = request.source.len(),
            deflection = request.deflection,
            "submitting conversion"
        );

        let reply = self
            .transport
            .post_form(&endpoint, request.into_form())
            .await
            .map_err(|e| ClientError::Network {
                hop: Hop::Submit,
                url: endpoint.clone(),
                message: e.0,
            })?;

        let Ok(parsed) = serde_json::from_slice::<SubmitResponse>(&reply.body) else {
            return Err(ClientError::Conversion {
                endpoint,
                status: reply.status,
                reason: "response is not a JSON object".to_string(),
            });
        };

        match parsed.stl_file_url.as_deref() {
            Some(url) if reply.is_success() && !url.is_empty() => {
                info!(url, message = parsed.message.as_deref().unwrap_or(""), "conversion done");
                Ok(url.to_string())
            }
            _ => Err(ClientError::Conversion {
                endpoint,
                status: reply.status,
                reason: parsed.failure_reason(),
            }),
        }
    }

    /// Retrieves an artifact; the reply must declare the STL content type.
    #[instrument(skip(self))]
    pub async fn fetch_stl(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let reply = self.transport.get(url).await.map_err(|e| ClientError::Network {
            hop: Hop::Retrieve,
            url: url.to_string(),
            message: e.0,
        })?;
        check_artifact(url, &reply)?;
        info!(bytes = reply.body.len(), "fetched artifact");
        Ok(reply.body)
    }

    /// Fetches the artifact and writes it unchanged to `dest`.
    pub async fn save_artifact(&self, url: &str, dest: &Path) -> Result<u64, ClientError> {
        let bytes = self.fetch_stl(url).await?;
        tokio::fs::write(dest, &bytes)
            .await
            .map_err(|source| ClientError::Save {
                path: dest.to_path_buf(),
                source,
            })?;
        info!(path = %dest.display(), bytes = bytes.len(), "saved artifact");
        Ok(bytes.len() as u64)
    }
}

fn check_artifact(url: &str, reply: &HttpReply) -> Result<(), ClientError> {
    if !reply.is_success() {
        warn!(status = reply.status, "artifact retrieval rejected");
        return Err(ClientError::Fetch {
            url: url.to_string(),
            expected: "HTTP 2xx".to_string(),
            received: format!("HTTP {}", reply.status),
        });
    }

    let declared = reply.content_type.as_deref().unwrap_or("");
    if !declared.to_ascii_lowercase().contains(STL_MIME) {
        warn!(declared, "artifact has the wrong content type");
        return Err(ClientError::Fetch {
            url: url.to_string(),
            expected: STL_MIME.to_string(),
            received: if declared.is_empty() {
                "no content type".to_string()
            } else {
                declared.to_string()
            },
        });
    }
    Ok(())
}

/// File name to offer in a save dialog: the last URL path segment.
pub fn suggested_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() && path.contains('/') => name.to_string(),
        _ => "model.stl".to_string(),
    }
}
