//! Conversion from raw API objects into resource snapshots.

use app_exporter_resources::{
    Catalog, CatalogEntry, ControlPlaneError, ControlPlaneResult, InstalledApp,
    OperatorDeployment, ResourceMeta,
};
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{DynamicObject, ObjectMeta};
use serde::de::DeserializeOwned;

pub(crate) const APP_KIND: &str = "App";
pub(crate) const CATALOG_KIND: &str = "Catalog";
pub(crate) const CATALOG_ENTRY_KIND: &str = "AppCatalogEntry";

pub(crate) fn resource_meta(metadata: &ObjectMeta) -> ResourceMeta {
    ResourceMeta {
        name: metadata.name.clone().unwrap_or_default(),
        namespace: metadata.namespace.clone().unwrap_or_default(),
        labels: metadata.labels.clone().unwrap_or_default(),
        annotations: metadata.annotations.clone().unwrap_or_default(),
    }
}

/// Decodes one top-level section (`spec`, `status`) of a custom resource.
/// An absent or null section decodes to the default.
fn decode_section<T>(
    object: &DynamicObject,
    kind: &'static str,
    section: &str,
) -> ControlPlaneResult<T>
where
    T: DeserializeOwned + Default,
{
    match object.data.get(section) {
        None | Some(serde_json::Value::Null) => Ok(T::default()),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|error| ControlPlaneError::Decode {
                kind,
                name: object.metadata.name.clone().unwrap_or_default(),
                message: format!("{section}: {error}"),
            })
        }
    }
}

pub(crate) fn installed_app(object: &DynamicObject) -> ControlPlaneResult<InstalledApp> {
    Ok(InstalledApp {
        meta: resource_meta(&object.metadata),
        spec: decode_section(object, APP_KIND, "spec")?,
        status: decode_section(object, APP_KIND, "status")?,
    })
}

pub(crate) fn catalog(object: &DynamicObject) -> Catalog {
    Catalog {
        meta: resource_meta(&object.metadata),
    }
}

pub(crate) fn catalog_entry(object: &DynamicObject) -> ControlPlaneResult<CatalogEntry> {
    Ok(CatalogEntry {
        meta: resource_meta(&object.metadata),
        spec: decode_section(object, CATALOG_ENTRY_KIND, "spec")?,
    })
}

/// Decodes a listed object, logging and dropping it when it is malformed.
pub(crate) fn decode_or_skip<T>(
    object: &DynamicObject,
    kind: &'static str,
    decode: fn(&DynamicObject) -> ControlPlaneResult<T>,
) -> Option<T> {
    match decode(object) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            tracing::error!(
                kind,
                name = object.metadata.name.as_deref().unwrap_or_default(),
                namespace = object.metadata.namespace.as_deref().unwrap_or_default(),
                error = %error,
                "skipping malformed resource"
            );
            None
        }
    }
}

/// Negative replica counts reported by the API are treated as zero.
pub(crate) fn operator_deployment(deployment: &Deployment) -> OperatorDeployment {
    let ready_replicas = deployment
        .status
        .as_ref()
        .and_then(|status| status.ready_replicas)
        .unwrap_or_default();
    OperatorDeployment {
        meta: resource_meta(&deployment.metadata),
        ready_replicas: u32::try_from(ready_replicas).unwrap_or_default(),
    }
}
