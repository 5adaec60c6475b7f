use std::path::PathBuf;

use crate::selector::SelectorError;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Unable to build fieldSelector: {0}")]
    Selector(#[from] SelectorError),
    #[error("Unable to retrieve events: {0}")]
    Query(#[source] kube::Error),
    #[error("Unable to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
    #[error("Unable to infer cluster config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),
    #[error("Unable to build cluster client: {0}")]
    Client(#[source] kube::Error),
    #[error("Unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl AuditError {
    /// Startup failures abort the process; everything else only fails a check.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AuditError::Selector(_) | AuditError::Query(_))
    }
}
