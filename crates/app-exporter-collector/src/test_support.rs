use std::collections::BTreeMap;

use app_exporter_resources::keys::{
    APP_OPERATOR_VERSION_LABEL, CATALOG_VISIBILITY_LABEL, KUBERNETES_NAME_LABEL,
    KUBERNETES_VERSION_LABEL, LATEST_LABEL, OPERATOR_NAME, OWNERS_ANNOTATION, TEAM_ANNOTATION,
};
use app_exporter_resources::{
    AppSpec, AppStatus, AppStatusRelease, Catalog, CatalogEntry, InstalledApp,
    OperatorDeployment, ResourceMeta,
};

use crate::team::TeamConfig;

/// App whose status mirrors its spec unless `status_version` is given.
pub fn new_app(
    name: &str,
    catalog: &str,
    namespace: &str,
    version: &str,
    status_version: &str,
) -> InstalledApp {
    let status_version = if status_version.is_empty() {
        version
    } else {
        status_version
    };
    InstalledApp {
        meta: ResourceMeta::new(name, namespace),
        spec: AppSpec {
            name: name.to_string(),
            namespace: namespace.to_string(),
            catalog: catalog.to_string(),
            version: version.to_string(),
        },
        status: AppStatus {
            version: status_version.to_string(),
            app_version: String::new(),
            release: AppStatusRelease {
                status: "deployed".to_string(),
            },
        },
    }
}

pub fn new_catalog(name: &str, namespace: &str) -> Catalog {
    Catalog {
        meta: ResourceMeta::new(name, namespace).with_label(CATALOG_VISIBILITY_LABEL, "public"),
    }
}

/// Entry carrying a default owners list that only matches the giantswarm catalog.
pub fn new_entry(
    app: &str,
    catalog: &str,
    namespace: &str,
    version: &str,
    owners: &str,
    team: &str,
    latest: bool,
) -> CatalogEntry {
    let mut entry = CatalogEntry::new(app, catalog, namespace, version);
    let owners = if owners.is_empty() {
        "[{team: test, catalog: giantswarm}]"
    } else {
        owners
    };
    entry.meta = entry
        .meta
        .with_label(KUBERNETES_NAME_LABEL, app)
        .with_annotation(OWNERS_ANNOTATION, owners);
    if latest {
        entry.meta = entry.meta.with_label(LATEST_LABEL, "true");
    }
    if !team.is_empty() {
        entry.meta = entry.meta.with_annotation(TEAM_ANNOTATION, team);
    }
    entry
}

pub fn new_operator_app(name: &str, namespace: &str, operator_version: &str) -> InstalledApp {
    let mut app = new_app(name, "default", namespace, "1.0.0", "");
    app.meta = app
        .meta
        .with_label(APP_OPERATOR_VERSION_LABEL, operator_version);
    app
}

pub fn new_deployment(namespace: &str, version: &str, ready_replicas: u32) -> OperatorDeployment {
    OperatorDeployment {
        meta: ResourceMeta::new(format!("{OPERATOR_NAME}-{version}"), namespace)
            .with_label(KUBERNETES_NAME_LABEL, OPERATOR_NAME)
            .with_label(KUBERNETES_VERSION_LABEL, version),
        ready_replicas,
    }
}

pub fn team_config() -> TeamConfig {
    TeamConfig {
        app_team_mappings: BTreeMap::new(),
        retired_teams: BTreeMap::new(),
        default_team: "noteam".to_string(),
        provider: "aws".to_string(),
    }
}
