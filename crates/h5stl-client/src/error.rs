use h5stl_core::error::{EmptyMeshError, FormatError, InvalidInputError};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Submit,
    Retrieve,
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::Submit => f.write_str("conversion submission"),
            Hop::Retrieve => f.write_str("artifact retrieval"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered but did not produce an artifact.
    #[error("conversion failed at {endpoint} (HTTP {status}): {reason}")]
    Conversion {
        endpoint: String,
        status: u16,
        reason: String,
    },
    #[error("network error during {hop} of {url}: {message}")]
    Network {
        hop: Hop,
        url: String,
        message: String,
    },
    /// The artifact reply is not an STL file.
    #[error("unexpected reply from {url}: expected {expected}, got {received}")]
    Fetch {
        url: String,
        expected: String,
        received: String,
    },
    #[error("could not write {}: {source}", path.display())]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn hop(&self) -> Option<Hop> {
        match self {
            ClientError::Conversion { .. } => Some(Hop::Submit),
            ClientError::Network { hop, .. } => Some(*hop),
            ClientError::Fetch { .. } => Some(Hop::Retrieve),
            ClientError::Save { .. } => None,
        }
    }
}

/// Anything that can stop one user-triggered workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("malformed STL: {0}")]
    Format(#[from] FormatError),
    #[error(transparent)]
    EmptyMesh(#[from] EmptyMeshError),
}
