use crate::client::Workflow;

pub const DEFAULT_BACKEND: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Value of the `file_format` form field.
    pub file_format: String,
    /// Tessellation tolerance sent as `deflection`.
    pub deflection: f64,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND.to_string(),
            file_format: "h5".to_string(),
            deflection: 0.1,
            timeout_secs: 120,
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self, workflow: Workflow) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), workflow.path())
    }
}
