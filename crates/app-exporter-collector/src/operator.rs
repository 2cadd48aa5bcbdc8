//! Ready app-operator instances per declared operator version.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use app_exporter_core::parse_semver;
use app_exporter_resources::keys::{KUBERNETES_NAME_LABEL, OPERATOR_NAME};
use app_exporter_resources::{ControlPlane, InstalledApp, LabelSelector, OperatorDeployment};
use async_trait::async_trait;

use crate::collector::Collector;
use crate::error::CollectResult;
use crate::metrics::{MetricDesc, MetricsRecorder, APP_OPERATOR_READY};

/// Operator version declared by apps on Helm 2 tenant clusters.
pub const LEGACY_TENANT_VERSION: &str = "1.0.0";
/// Operators older than this major run in [`LEGACY_OPERATOR_NAMESPACE`].
pub const NAMESPACED_OPERATOR_MAJOR: u64 = 4;
pub const LEGACY_OPERATOR_NAMESPACE: &str = "giantswarm";
const LEGACY_OPERATOR_MAJOR: u64 = 1;

/// Operator version to the namespaces whose apps expect it.
pub type AppOperatorVersions = BTreeMap<String, BTreeSet<String>>;
/// Operator version to ready replicas per namespace.
pub type OperatorInstances = BTreeMap<String, BTreeMap<String, u32>>;

pub fn operator_selector() -> CollectResult<LabelSelector> {
    Ok(LabelSelector::from_pairs([(
        KUBERNETES_NAME_LABEL,
        OPERATOR_NAME,
    )])?)
}

/// Groups apps by the operator version they declare. Apps without a valid
/// version label are skipped.
pub fn group_app_operator_versions(apps: &[InstalledApp]) -> AppOperatorVersions {
    let mut versions = AppOperatorVersions::new();
    for app in apps {
        let version = app.operator_version();
        let parsed = match parse_semver(version) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::error!(
                    app = %app.meta.name,
                    namespace = %app.meta.namespace,
                    version,
                    error = %error,
                    "failed to parse app operator version"
                );
                continue;
            }
        };
        let namespace = if parsed.major < NAMESPACED_OPERATOR_MAJOR {
            LEGACY_OPERATOR_NAMESPACE
        } else {
            app.meta.namespace.as_str()
        };
        versions
            .entry(version.to_string())
            .or_default()
            .insert(namespace.to_string());
    }
    versions
}

pub fn group_operator_deployments(deployments: &[OperatorDeployment]) -> OperatorInstances {
    let mut instances = OperatorInstances::new();
    for deployment in deployments {
        instances
            .entry(deployment.version().to_string())
            .or_default()
            .insert(deployment.meta.namespace.clone(), deployment.ready_replicas);
    }
    instances
}

/// Ready replicas summed over every operator with major version 1.
pub fn legacy_ready_replicas(instances: &OperatorInstances) -> u32 {
    let mut ready = 0u32;
    for (version, by_namespace) in instances {
        match parse_semver(version) {
            Ok(parsed) if parsed.major == LEGACY_OPERATOR_MAJOR => {
                ready = by_namespace
                    .values()
                    .fold(ready, |total, replicas| total.saturating_add(*replicas));
            }
            Ok(_) => {}
            Err(error) => {
                tracing::error!(
                    version = %version,
                    error = %error,
                    "failed to parse operator deployment version"
                );
            }
        }
    }
    ready
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessRecord {
    pub namespace: String,
    pub version: String,
    pub ready: u32,
}

impl ReadinessRecord {
    fn new(namespace: &str, version: &str, ready: u32) -> Self {
        Self {
            namespace: namespace.to_string(),
            version: version.to_string(),
            ready,
        }
    }
}

/// One record per expected (version, namespace). A version with no operator
/// deployment at all yields a single zero record with a blank namespace.
pub fn readiness_records(
    app_versions: &AppOperatorVersions,
    instances: &OperatorInstances,
) -> Vec<ReadinessRecord> {
    let mut records = Vec::new();
    for (version, namespaces) in app_versions {
        let Some(by_namespace) = instances.get(version) else {
            tracing::debug!(version = %version, "no {OPERATOR_NAME} found for version");
            records.push(ReadinessRecord::new("", version, 0));
            continue;
        };
        for namespace in namespaces {
            let ready = if version == LEGACY_TENANT_VERSION {
                legacy_ready_replicas(instances)
            } else {
                by_namespace.get(namespace).copied().unwrap_or_default()
            };
            records.push(ReadinessRecord::new(namespace, version, ready));
        }
    }
    records
}

/// Emits `app_operator_ready_total`.
pub struct AppOperatorCollector {
    control_plane: Arc<dyn ControlPlane>,
}

impl AppOperatorCollector {
    pub fn new(control_plane: Arc<dyn ControlPlane>) -> Self {
        Self { control_plane }
    }
}

#[async_trait]
impl Collector for AppOperatorCollector {
    fn name(&self) -> &'static str {
        "app_operator"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &[&APP_OPERATOR_READY]
    }

    async fn collect(&self, recorder: &mut MetricsRecorder) -> CollectResult<()> {
        let apps = self.control_plane.list_installed_apps().await?;
        let app_versions = group_app_operator_versions(&apps);

        let deployments = self
            .control_plane
            .list_operator_deployments(&operator_selector()?)
            .await?;
        let instances = group_operator_deployments(&deployments);

        for record in readiness_records(&app_versions, &instances) {
            recorder.record(
                &APP_OPERATOR_READY,
                &[&record.namespace, &record.version],
                f64::from(record.ready),
            )?;
        }
        Ok(())
    }
}
