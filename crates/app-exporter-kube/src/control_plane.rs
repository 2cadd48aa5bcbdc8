use app_exporter_resources::keys::{APPLICATION_GROUP, APPLICATION_VERSION};
use app_exporter_resources::{
    Catalog, CatalogEntry, ControlPlane, ControlPlaneError, ControlPlaneOperation,
    ControlPlaneResult, InstalledApp, LabelSelector, OperatorDeployment,
};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, DynamicObject, ListParams};
use kube::discovery::ApiResource;
use kube::Client;

use crate::decode::{self, APP_KIND, CATALOG_ENTRY_KIND, CATALOG_KIND};

fn application_resource(kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: APPLICATION_GROUP.to_string(),
        version: APPLICATION_VERSION.to_string(),
        api_version: format!("{APPLICATION_GROUP}/{APPLICATION_VERSION}"),
        kind: kind.to_string(),
        plural: plural.to_string(),
    }
}

fn list_params(selector: &LabelSelector) -> ListParams {
    ListParams::default().labels(&selector.to_string())
}

fn api_error(operation: ControlPlaneOperation) -> impl Fn(kube::Error) -> ControlPlaneError {
    move |error| ControlPlaneError::api(operation.as_str(), error)
}

/// Reads App, Catalog and AppCatalogEntry resources and app-operator
/// Deployments from a live cluster.
#[derive(Clone)]
pub struct KubeControlPlane {
    client: Client,
    apps: ApiResource,
    catalogs: ApiResource,
    catalog_entries: ApiResource,
}

impl KubeControlPlane {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            apps: application_resource(APP_KIND, "apps"),
            catalogs: application_resource(CATALOG_KIND, "catalogs"),
            catalog_entries: application_resource(CATALOG_ENTRY_KIND, "appcatalogentries"),
        }
    }
}

#[async_trait]
impl ControlPlane for KubeControlPlane {
    async fn list_installed_apps(&self) -> ControlPlaneResult<Vec<InstalledApp>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &self.apps);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(api_error(ControlPlaneOperation::ListInstalledApps))?;
        Ok(list
            .items
            .iter()
            .filter_map(|object| decode::decode_or_skip(object, APP_KIND, decode::installed_app))
            .collect())
    }

    async fn list_catalogs(&self, selector: &LabelSelector) -> ControlPlaneResult<Vec<Catalog>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &self.catalogs);
        let list = api
            .list(&list_params(selector))
            .await
            .map_err(api_error(ControlPlaneOperation::ListCatalogs))?;
        Ok(list.items.iter().map(decode::catalog).collect())
    }

    async fn list_catalog_entries(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<CatalogEntry>> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.catalog_entries);
        let list = api
            .list(&list_params(selector))
            .await
            .map_err(api_error(ControlPlaneOperation::ListCatalogEntries))?;
        Ok(list
            .items
            .iter()
            .filter_map(|object| {
                decode::decode_or_skip(object, CATALOG_ENTRY_KIND, decode::catalog_entry)
            })
            .collect())
    }

    async fn get_catalog_entry(
        &self,
        namespace: &str,
        name: &str,
    ) -> ControlPlaneResult<Option<CatalogEntry>> {
        let api: Api<DynamicObject> =
            Api::namespaced_with(self.client.clone(), namespace, &self.catalog_entries);
        let object = api
            .get_opt(name)
            .await
            .map_err(api_error(ControlPlaneOperation::GetCatalogEntry))?;
        // A malformed entry is treated as absent.
        Ok(object.as_ref().and_then(|object| {
            decode::decode_or_skip(object, CATALOG_ENTRY_KIND, decode::catalog_entry)
        }))
    }

    async fn list_operator_deployments(
        &self,
        selector: &LabelSelector,
    ) -> ControlPlaneResult<Vec<OperatorDeployment>> {
        let api: Api<Deployment> = Api::all(self.client.clone());
        let list = api
            .list(&list_params(selector))
            .await
            .map_err(api_error(ControlPlaneOperation::ListOperatorDeployments))?;
        Ok(list.items.iter().map(decode::operator_deployment).collect())
    }
}
