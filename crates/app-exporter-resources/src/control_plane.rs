use async_trait::async_trait;
use thiserror::Error;

use crate::selector::{LabelSelector, SelectorError};
use crate::types::{Catalog, CatalogEntry, InstalledApp, OperatorDeployment};

/// Result type for control-plane reads.
pub type ControlPlaneResult<T> = Result<T, ControlPlaneError>;

/// Errors returned by control-plane implementations.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("control-plane {operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },
    #[error("failed to decode {kind} '{name}': {message}")]
    Decode {
        kind: &'static str,
        name: String,
        message: String,
    },
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

impl ControlPlaneError {
    pub fn api(operation: &'static str, message: impl ToString) -> Self {
        Self::Api {
            operation,
            message: message.to_string(),
        }
    }
}

/// Read-only contract the collectors need from the cluster API.
///
/// "Not found" on a single-object read is `Ok(None)`, never an error.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Lists App resources across all namespaces.
    async fn list_installed_apps(&self) -> ControlPlaneResult<Vec<InstalledApp>>;

    /// Lists Catalog resources across all namespaces matching `selector`.
    async fn list_catalogs(&self, selector: &LabelSelector) -> ControlPlaneResult<Vec<Catalog>>;

    /// Lists AppCatalogEntry resources in `namespace` matching `selector`.
    async fn list_catalog_entries(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<CatalogEntry>>;

    async fn get_catalog_entry(
        &self,
        namespace: &str,
        name: &str,
    ) -> ControlPlaneResult<Option<CatalogEntry>>;

    /// Lists operator Deployments across all namespaces matching `selector`.
    async fn list_operator_deployments(
        &self,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<OperatorDeployment>>;
}
