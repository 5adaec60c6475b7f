//! Where events come from: a live cluster or a dump on disk.

use std::path::{Path, PathBuf};

use k8s_openapi::api::core::v1::Event;
use kube::{
    api::{Api, ListParams},
    config::KubeConfigOptions,
    Client, Config,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AuditError;
use crate::selector::FieldSelector;

/// Lists events across all namespaces that satisfy a field selector.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    async fn list(&self, selector: &FieldSelector) -> Result<Vec<Event>, AuditError>;
}

pub struct KubeEventSource {
    events: Api<Event>,
}

impl KubeEventSource {
    pub fn new(client: Client) -> Self {
        Self {
            events: Api::all(client),
        }
    }
}

impl EventSource for KubeEventSource {
    async fn list(&self, selector: &FieldSelector) -> Result<Vec<Event>, AuditError> {
        let lp = ListParams::default().fields(&selector.to_string());
        let list = self.events.list(&lp).await.map_err(AuditError::Query)?;
        debug!(selector = %selector, count = list.items.len(), "listed events");
        Ok(list.items)
    }
}

/// Builds the cluster client, honouring an explicit kubeconfig context when
/// one is given and falling back to in-cluster / default kubeconfig otherwise.
pub async fn connect(context: Option<&str>) -> Result<Client, AuditError> {
    let config = match context {
        Some(ctx) => {
            let options = KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options).await?
        }
        None => Config::infer().await?,
    };
    info!(cluster_url = %config.cluster_url, "connecting to cluster");
    Client::try_from(config).map_err(AuditError::Client)
}

/// Events loaded once from a JSON or YAML dump, e.g. the output of
/// `kubectl get events -A -o json`. Selectors are evaluated locally.
#[derive(Debug, Clone, Default)]
pub struct FileEventSource {
    events: Vec<Event>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    List { items: Vec<Event> },
    Items(Vec<Event>),
}

impl FileEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| AuditError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dump = parse_dump(path.to_path_buf(), &raw)?;
        let events = match dump {
            Dump::List { items } => items,
            Dump::Items(items) => items,
        };
        info!(path = %path.display(), count = events.len(), "loaded event dump");
        Ok(Self { events })
    }
}

fn parse_dump(path: PathBuf, raw: &str) -> Result<Dump, AuditError> {
    let is_json = path.extension().is_some_and(|ext| ext == "json")
        || raw.trim_start().starts_with(['{', '[']);
    if is_json {
        serde_json::from_str(raw).map_err(|source| AuditError::Json { path, source })
    } else {
        serde_yaml::from_str(raw).map_err(|source| AuditError::Yaml { path, source })
    }
}

impl EventSource for FileEventSource {
    async fn list(&self, selector: &FieldSelector) -> Result<Vec<Event>, AuditError> {
        Ok(self
            .events
            .iter()
            .filter(|ev| selector.matches(ev))
            .cloned()
            .collect())
    }
}
