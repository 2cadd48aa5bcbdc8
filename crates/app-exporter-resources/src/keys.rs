//! Label and annotation keys read from App, Catalog, AppCatalogEntry and
//! operator Deployment resources.

pub const APPLICATION_GROUP: &str = "application.giantswarm.io";
pub const APPLICATION_VERSION: &str = "v1alpha1";

pub const CATALOG_VISIBILITY_LABEL: &str = "application.giantswarm.io/catalog-visibility";
pub const CATALOG_TYPE_LABEL: &str = "application.giantswarm.io/catalog-type";
pub const CATALOG_NAME_LABEL: &str = "application.giantswarm.io/catalog";
pub const LATEST_LABEL: &str = "latest";

pub const OWNERS_ANNOTATION: &str = "application.giantswarm.io/owners";
pub const TEAM_ANNOTATION: &str = "application.giantswarm.io/team";

pub const CORDON_REASON_ANNOTATION: &str = "app-operator.giantswarm.io/cordon-reason";
pub const CORDON_UNTIL_ANNOTATION: &str = "app-operator.giantswarm.io/cordon-until";

pub const APP_OPERATOR_VERSION_LABEL: &str = "app-operator.giantswarm.io/version";
pub const CLUSTER_LABEL: &str = "giantswarm.io/cluster";

pub const KUBERNETES_NAME_LABEL: &str = "app.kubernetes.io/name";
pub const KUBERNETES_VERSION_LABEL: &str = "app.kubernetes.io/version";

pub const OPERATOR_NAME: &str = "app-operator";
pub const ORG_NAMESPACE_PREFIX: &str = "org-";

/// Namespaces searched for an AppCatalogEntry, most populated first.
pub const CATALOG_ENTRY_NAMESPACES: [&str; 2] = ["giantswarm", "default"];

/// Builds the AppCatalogEntry resource name for a catalog, app and version.
pub fn catalog_entry_name(catalog: &str, app_name: &str, version: &str) -> String {
    format!("{catalog}-{app_name}-{version}")
}

/// Key of the latest-version index for a catalog and app.
pub fn latest_version_key(catalog: &str, app_name: &str) -> String {
    format!("{catalog}-{app_name}")
}
