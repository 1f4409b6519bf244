use crate::client::{ConversionClient, ConversionRequest, Workflow};
use crate::error::WorkflowError;
use crate::transport::{ReqwestTransport, Transport};
use h5stl_core::input::{FileKind, LocalFile};
use h5stl_core::mesh::MeshBuilder;
use h5stl_core::report::ModelReport;
use h5stl_core::scene::{AttachOutcome, PreparedModel, Scene, Ticket, Viewport};
use h5stl_core::stl;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum Action {
    /// Show an STL file the user already has. No network.
    UploadStl(LocalFile),
    /// Convert an h5 file and offer the artifact for download.
    ConvertH5(LocalFile),
    /// Convert an h5 file and show the result.
    VisualizeH5(LocalFile),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::UploadStl(_) => "stl_to_vis",
            Action::ConvertH5(_) => "h5_to_stl",
            Action::VisualizeH5(_) => "h5_to_vis",
        }
    }

    pub fn file(&self) -> &LocalFile {
        match self {
            Action::UploadStl(f) | Action::ConvertH5(f) | Action::VisualizeH5(f) => f,
        }
    }

    /// Picks the workflow from the file type, as a drop target would.
    pub fn for_dropped(file: LocalFile) -> Option<Self> {
        if file.is(FileKind::Stl) {
            Some(Action::UploadStl(file))
        } else if file.is(FileKind::H5) {
            Some(Action::VisualizeH5(file))
        } else {
            None
        }
    }
}

/// The converted STL behind a visualized h5 file, kept as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Displayed {
        outcome: AttachOutcome,
        report: ModelReport,
        /// Set when the model came from the conversion backend.
        artifact: Option<Artifact>,
    },
    DownloadReady {
        url: String,
    },
}

pub async fn read_local_file(path: &Path) -> Result<LocalFile, WorkflowError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| WorkflowError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(LocalFile::with_guessed_mime(name, bytes))
}

pub struct Workflows<T = ReqwestTransport> {
    client: ConversionClient<T>,
    builder: MeshBuilder,
}

impl<T: Transport> Workflows<T> {
    pub fn new(client: ConversionClient<T>, builder: MeshBuilder) -> Self {
        Self { client, builder }
    }

    pub fn client(&self) -> &ConversionClient<T> {
        &self.client
    }

    pub fn stl_to_vis(
        &self,
        file: &LocalFile,
        ticket: Ticket,
    ) -> Result<PreparedModel, WorkflowError> {
        file.require(FileKind::Stl)?;
        self.prepare(&file.bytes, file.name.clone(), ticket)
    }

    pub async fn h5_to_stl(&self, file: LocalFile) -> Result<String, WorkflowError> {
        file.require(FileKind::H5)?;
        let request = ConversionRequest::from_file(file, self.client.config());
        Ok(self.client.convert_to_downloadable(request).await?)
    }

    pub async fn h5_to_vis(
        &self,
        file: LocalFile,
        ticket: Ticket,
    ) -> Result<(PreparedModel, Artifact), WorkflowError> {
        file.require(FileKind::H5)?;
        let label = format!("{}.stl", file.stem());
        let request = ConversionRequest::from_file(file, self.client.config());
        let url = self.client.submit(request, Workflow::Visualize).await?;
        let bytes = self.client.fetch_stl(&url).await?;
        let prepared = self.prepare(&bytes, label, ticket)?;
        Ok((prepared, Artifact { url, bytes }))
    }

    /// Runs one action against `viewport`. Errors leave the viewport as it was.
    pub async fn run<S: Scene>(
        &self,
        viewport: &mut Viewport<S>,
        action: Action,
    ) -> Result<Outcome, WorkflowError> {
        let name = action.name();
        let ticket = viewport.ticket();
        let (prepared, artifact) = match action {
            Action::UploadStl(file) => self.stl_to_vis(&file, ticket).map(|p| (p, None)),
            Action::VisualizeH5(file) => {
                let visualized = self.h5_to_vis(file, ticket).await;
                visualized.map(|(p, artifact)| (p, Some(artifact)))
            }
            Action::ConvertH5(file) => {
                let url = self
                    .h5_to_stl(file)
                    .await
                    .inspect_err(|e| warn!(workflow = name, error = %e, "workflow failed"))?;
                return Ok(Outcome::DownloadReady { url });
            }
        }
        .inspect_err(|e| warn!(workflow = name, error = %e, "workflow failed"))?;

        let report = ModelReport::new(prepared.label.clone(), &prepared.model);
        let outcome = viewport.apply(prepared);
        Ok(Outcome::Displayed {
            outcome,
            report,
            artifact,
        })
    }

    fn prepare(
        &self,
        bytes: &[u8],
        label: String,
        ticket: Ticket,
    ) -> Result<PreparedModel, WorkflowError> {
        let mesh = stl::decode_auto(bytes)?;
        let model = self.builder.build(&mesh)?;
        info!(label = %label, triangles = mesh.len(), "model ready");
        Ok(PreparedModel {
            ticket,
            label,
            model,
        })
    }
}
