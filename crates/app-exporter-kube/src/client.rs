use std::path::PathBuf;

use kube::config::{InClusterError, InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use serde_json::json;
use thiserror::Error;

const API_SERVER_CONTEXT: &str = "app-exporter";

/// Explicit API server address with optional TLS material on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiServerSettings {
    pub address: String,
    pub ca_file: Option<PathBuf>,
    pub crt_file: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl ApiServerSettings {
    /// Renders the settings as a single-context kubeconfig.
    fn to_kubeconfig(&self) -> Result<Kubeconfig, serde_json::Error> {
        let path = |file: Option<&PathBuf>| file.map(|path| path.display().to_string());
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Config",
            "current-context": API_SERVER_CONTEXT,
            "clusters": [{
                "name": API_SERVER_CONTEXT,
                "cluster": {
                    "server": self.address,
                    "certificate-authority": path(self.ca_file.as_ref()),
                }
            }],
            "users": [{
                "name": API_SERVER_CONTEXT,
                "user": {
                    "client-certificate": path(self.crt_file.as_ref()),
                    "client-key": path(self.key_file.as_ref()),
                }
            }],
            "contexts": [{
                "name": API_SERVER_CONTEXT,
                "context": {"cluster": API_SERVER_CONTEXT, "user": API_SERVER_CONTEXT}
            }]
        }))
    }
}

/// Where the API client takes its connection settings from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeConfigSource {
    /// Service account mounted into the pod.
    InCluster,
    Kubeconfig(PathBuf),
    ApiServer(ApiServerSettings),
    /// `KUBECONFIG` / `~/.kube/config`, falling back to in-cluster.
    Infer,
}

impl KubeConfigSource {
    /// Precedence: kubeconfig path, then in-cluster, then an explicit address.
    pub fn from_flags(
        kubeconfig: Option<PathBuf>,
        in_cluster: bool,
        api_server: Option<ApiServerSettings>,
    ) -> Self {
        match (kubeconfig, in_cluster, api_server) {
            (Some(path), _, _) => Self::Kubeconfig(path),
            (None, true, _) => Self::InCluster,
            (None, false, Some(settings)) => Self::ApiServer(settings),
            (None, false, None) => Self::Infer,
        }
    }
}

#[derive(Debug, Error)]
pub enum KubeConnectError {
    #[error("failed to load in-cluster configuration: {0}")]
    InCluster(#[from] InClusterError),
    #[error("failed to load kubeconfig '{path}': {source}")]
    Kubeconfig {
        path: PathBuf,
        #[source]
        source: KubeconfigError,
    },
    #[error("invalid api server settings for '{address}': {source}")]
    ApiServerSettings {
        address: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to configure api server '{address}': {source}")]
    ApiServer {
        address: String,
        #[source]
        source: KubeconfigError,
    },
    #[error("failed to infer cluster configuration: {0}")]
    Infer(#[from] InferConfigError),
    #[error("failed to build kubernetes client: {0}")]
    Client(#[from] kube::Error),
}

pub async fn connect(source: &KubeConfigSource) -> Result<Client, KubeConnectError> {
    let config = match source {
        KubeConfigSource::InCluster => Config::incluster()?,
        KubeConfigSource::Kubeconfig(path) => {
            let kubeconfig_error = |source| KubeConnectError::Kubeconfig {
                path: path.clone(),
                source,
            };
            let kubeconfig = Kubeconfig::read_from(path).map_err(kubeconfig_error)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(kubeconfig_error)?
        }
        KubeConfigSource::ApiServer(settings) => {
            let kubeconfig =
                settings
                    .to_kubeconfig()
                    .map_err(|source| KubeConnectError::ApiServerSettings {
                        address: settings.address.clone(),
                        source,
                    })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|source| KubeConnectError::ApiServer {
                    address: settings.address.clone(),
                    source,
                })?
        }
        KubeConfigSource::Infer => Config::infer().await?,
    };
    tracing::debug!(
        source = ?source,
        cluster_url = %config.cluster_url,
        "kubernetes client configured"
    );
    Ok(Client::try_from(config)?)
}
