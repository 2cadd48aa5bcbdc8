//! Read-only snapshots of the resources consumed by one collection pass.

use std::collections::BTreeMap;

use app_exporter_core::normalize_version;
use serde::Deserialize;

use crate::keys::{
    catalog_entry_name, latest_version_key, APP_OPERATOR_VERSION_LABEL, CATALOG_NAME_LABEL,
    CLUSTER_LABEL, CORDON_REASON_ANNOTATION, CORDON_UNTIL_ANNOTATION, KUBERNETES_VERSION_LABEL,
    LATEST_LABEL, ORG_NAMESPACE_PREFIX, OWNERS_ANNOTATION, TEAM_ANNOTATION,
};

/// Identity plus the label/annotation maps every resource carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMeta {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl ResourceMeta {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSpec {
    pub name: String,
    pub namespace: String,
    pub catalog: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStatusRelease {
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStatus {
    pub version: String,
    pub app_version: String,
    pub release: AppStatusRelease,
}

/// Both cordon markers of an App.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CordonMarkers<'a> {
    pub reason: &'a str,
    pub until: &'a str,
}

/// An installed App custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledApp {
    pub meta: ResourceMeta,
    pub spec: AppSpec,
    pub status: AppStatus,
}

impl InstalledApp {
    pub fn app_name(&self) -> &str {
        &self.spec.name
    }

    pub fn catalog_name(&self) -> &str {
        &self.spec.catalog
    }

    /// Desired version with the cosmetic prefix removed.
    pub fn spec_version(&self) -> &str {
        normalize_version(&self.spec.version)
    }

    /// Deployed version with the cosmetic prefix removed.
    pub fn status_version(&self) -> &str {
        normalize_version(&self.status.version)
    }

    /// Packaged upstream application version with the cosmetic prefix removed.
    pub fn status_app_version(&self) -> &str {
        normalize_version(&self.status.app_version)
    }

    /// Name of the AppCatalogEntry this App was installed from.
    pub fn catalog_entry_name(&self) -> String {
        catalog_entry_name(self.catalog_name(), self.app_name(), self.spec_version())
    }

    pub fn latest_version_key(&self) -> String {
        latest_version_key(self.catalog_name(), self.app_name())
    }

    pub fn team_annotation(&self) -> Option<&str> {
        non_empty(self.meta.annotation(TEAM_ANNOTATION))
    }

    pub fn team_label(&self) -> Option<&str> {
        non_empty(self.meta.label(TEAM_ANNOTATION))
    }

    pub fn cluster_label(&self) -> Option<&str> {
        non_empty(self.meta.label(CLUSTER_LABEL))
    }

    pub fn is_in_org_namespace(&self) -> bool {
        self.meta.namespace.starts_with(ORG_NAMESPACE_PREFIX)
    }

    /// Declared operator-compatibility version, possibly empty.
    pub fn operator_version(&self) -> &str {
        self.meta.label(APP_OPERATOR_VERSION_LABEL).unwrap_or_default()
    }

    /// Returns the cordon markers only when both reason and until are set.
    pub fn cordon(&self) -> Option<CordonMarkers<'_>> {
        let reason = self.meta.annotation(CORDON_REASON_ANNOTATION)?;
        let until = self.meta.annotation(CORDON_UNTIL_ANNOTATION)?;
        Some(CordonMarkers { reason, until })
    }
}

/// A Catalog custom resource. Only metadata is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub meta: ResourceMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogReference {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntrySpec {
    pub app_name: String,
    pub catalog: CatalogReference,
    pub version: String,
}

/// An AppCatalogEntry custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub meta: ResourceMeta,
    pub spec: CatalogEntrySpec,
}

impl CatalogEntry {
    /// Builds an entry with the labels and name the catalog controller assigns.
    pub fn new(
        app_name: impl Into<String>,
        catalog: impl Into<String>,
        namespace: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let app_name = app_name.into();
        let catalog = catalog.into();
        let namespace = namespace.into();
        let version = version.into();
        let meta = ResourceMeta::new(
            catalog_entry_name(&catalog, &app_name, &version),
            namespace.clone(),
        )
        .with_label(CATALOG_NAME_LABEL, catalog.clone())
        .with_label(KUBERNETES_VERSION_LABEL, version.clone());
        Self {
            meta,
            spec: CatalogEntrySpec {
                app_name,
                catalog: CatalogReference {
                    name: catalog,
                    namespace,
                },
                version,
            },
        }
    }

    pub fn is_latest(&self) -> bool {
        self.meta.label(LATEST_LABEL) == Some("true")
    }

    pub fn normalized_version(&self) -> &str {
        normalize_version(&self.spec.version)
    }

    pub fn latest_version_key(&self) -> String {
        latest_version_key(&self.spec.catalog.name, &self.spec.app_name)
    }

    /// Raw owners payload (YAML/JSON sequence), if annotated.
    pub fn owners_annotation(&self) -> Option<&str> {
        non_empty(self.meta.annotation(OWNERS_ANNOTATION))
    }

    pub fn team_annotation(&self) -> Option<&str> {
        non_empty(self.meta.annotation(TEAM_ANNOTATION))
    }
}

/// One entry of the owners annotation. Empty catalog or provider is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub team: String,
    pub catalog: String,
    pub provider: String,
}

/// Parses the owners annotation payload.
pub fn parse_owners(payload: &str) -> Result<Vec<Owner>, serde_yaml::Error> {
    let owners: Option<Vec<Owner>> = serde_yaml::from_str(payload)?;
    Ok(owners.unwrap_or_default())
}

/// Ready replica count of one app-operator Deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorDeployment {
    pub meta: ResourceMeta,
    pub ready_replicas: u32,
}

impl OperatorDeployment {
    /// Declared operator version, possibly empty.
    pub fn version(&self) -> &str {
        self.meta.label(KUBERNETES_VERSION_LABEL).unwrap_or_default()
    }
}
