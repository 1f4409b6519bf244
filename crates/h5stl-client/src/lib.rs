pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod workflow;

pub use client::{
    suggested_file_name, ConversionClient, ConversionRequest, ConversionResult, Workflow,
};
pub use config::ClientConfig;
pub use error::{ClientError, Hop, WorkflowError};
pub use workflow::{read_local_file, Action, Artifact, Outcome, Workflows};
