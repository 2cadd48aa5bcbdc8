use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::control_plane::{ControlPlane, ControlPlaneError, ControlPlaneResult};
use crate::selector::LabelSelector;
use crate::types::{Catalog, CatalogEntry, InstalledApp, OperatorDeployment};

/// Control-plane operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPlaneOperation {
    ListInstalledApps,
    ListCatalogs,
    ListCatalogEntries,
    GetCatalogEntry,
    ListOperatorDeployments,
}

impl ControlPlaneOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListInstalledApps => "list_installed_apps",
            Self::ListCatalogs => "list_catalogs",
            Self::ListCatalogEntries => "list_catalog_entries",
            Self::GetCatalogEntry => "get_catalog_entry",
            Self::ListOperatorDeployments => "list_operator_deployments",
        }
    }
}

#[derive(Debug, Default)]
struct Snapshot {
    apps: Vec<InstalledApp>,
    catalogs: Vec<Catalog>,
    catalog_entries: Vec<CatalogEntry>,
    deployments: Vec<OperatorDeployment>,
    failing: Vec<ControlPlaneOperation>,
}

/// In-memory implementation for tests and local experimentation.
#[derive(Debug, Default)]
pub struct InMemoryControlPlane {
    snapshot: RwLock<Snapshot>,
    catalog_entry_gets: AtomicUsize,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_apps(mut self, apps: impl IntoIterator<Item = InstalledApp>) -> Self {
        self.snapshot.get_mut().apps.extend(apps);
        self
    }

    pub fn with_catalogs(mut self, catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        self.snapshot.get_mut().catalogs.extend(catalogs);
        self
    }

    pub fn with_catalog_entries(
        mut self,
        entries: impl IntoIterator<Item = CatalogEntry>,
    ) -> Self {
        self.snapshot.get_mut().catalog_entries.extend(entries);
        self
    }

    pub fn with_deployments(
        mut self,
        deployments: impl IntoIterator<Item = OperatorDeployment>,
    ) -> Self {
        self.snapshot.get_mut().deployments.extend(deployments);
        self
    }

    /// Makes every call of `operation` return an API error.
    pub fn fail_on(mut self, operation: ControlPlaneOperation) -> Self {
        self.snapshot.get_mut().failing.push(operation);
        self
    }

    /// Replaces the stored apps, keeping everything else.
    pub async fn replace_apps(&self, apps: Vec<InstalledApp>) {
        self.snapshot.write().await.apps = apps;
    }

    /// Number of `get_catalog_entry` calls served so far.
    pub fn catalog_entry_get_count(&self) -> usize {
        self.catalog_entry_gets.load(Ordering::Relaxed)
    }

    async fn read_snapshot<T>(
        &self,
        operation: ControlPlaneOperation,
        read: impl FnOnce(&Snapshot) -> T,
    ) -> ControlPlaneResult<T> {
        let snapshot = self.snapshot.read().await;
        if snapshot.failing.contains(&operation) {
            return Err(ControlPlaneError::api(
                operation.as_str(),
                "injected failure",
            ));
        }
        Ok(read(&snapshot))
    }
}

#[async_trait]
impl ControlPlane for InMemoryControlPlane {
    async fn list_installed_apps(&self) -> ControlPlaneResult<Vec<InstalledApp>> {
        self.read_snapshot(ControlPlaneOperation::ListInstalledApps, |snapshot| {
            snapshot.apps.clone()
        })
        .await
    }

    async fn list_catalogs(&self, selector: &LabelSelector) -> ControlPlaneResult<Vec<Catalog>> {
        self.read_snapshot(ControlPlaneOperation::ListCatalogs, |snapshot| {
            snapshot
                .catalogs
                .iter()
                .filter(|catalog| selector.matches(&catalog.meta.labels))
                .cloned()
                .collect()
        })
        .await
    }

    async fn list_catalog_entries(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<CatalogEntry>> {
        self.read_snapshot(ControlPlaneOperation::ListCatalogEntries, |snapshot| {
            snapshot
                .catalog_entries
                .iter()
                .filter(|entry| entry.meta.namespace == namespace)
                .filter(|entry| selector.matches(&entry.meta.labels))
                .cloned()
                .collect()
        })
        .await
    }

    async fn get_catalog_entry(
        &self,
        namespace: &str,
        name: &str,
    ) -> ControlPlaneResult<Option<CatalogEntry>> {
        self.catalog_entry_gets.fetch_add(1, Ordering::Relaxed);
        self.read_snapshot(ControlPlaneOperation::GetCatalogEntry, |snapshot| {
            snapshot
                .catalog_entries
                .iter()
                .find(|entry| entry.meta.namespace == namespace && entry.meta.name == name)
                .cloned()
        })
        .await
    }

    async fn list_operator_deployments(
        &self,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<OperatorDeployment>> {
        self.read_snapshot(ControlPlaneOperation::ListOperatorDeployments, |snapshot| {
            snapshot
                .deployments
                .iter()
                .filter(|deployment| selector.matches(&deployment.meta.labels))
                .cloned()
                .collect()
        })
        .await
    }
}
