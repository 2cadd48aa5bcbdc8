//! Per-app info and cordon expiry records.

use std::sync::Arc;

use app_exporter_core::parse_cordon_until;
use app_exporter_resources::{ControlPlane, InstalledApp};
use async_trait::async_trait;

use crate::collector::Collector;
use crate::error::{CollectResult, ConfigError};
use crate::latest_index::{build_latest_version_index, LatestVersionIndex};
use crate::metrics::{MetricDesc, MetricsRecorder, APP_CORDON_EXPIRE_TIME, APP_INFO};
use crate::team::{TeamConfig, TeamResolver};

/// Release status reported for apps the operator has not installed yet.
pub const NOT_INSTALLED_STATUS: &str = "not-installed";

const APP_INFO_VALUE: f64 = 1.0;

/// Derived view of one installed app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfoRecord {
    pub app: String,
    pub app_version: String,
    pub catalog: String,
    pub cluster_missing: bool,
    pub deployed_version: String,
    pub latest_version: String,
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub team: String,
    pub upgrade_available: bool,
    pub version: String,
    pub version_mismatch: bool,
}

impl AppInfoRecord {
    pub fn from_app(app: &InstalledApp, latest: &LatestVersionIndex, team: String) -> Self {
        let version = app.spec_version();
        let deployed_version = app.status_version();
        let latest_version = latest
            .get(&app.latest_version_key())
            .cloned()
            .unwrap_or_default();
        let upgrade_available = !latest_version.is_empty() && latest_version != version;
        let status = match app.status.release.status.as_str() {
            "" => NOT_INSTALLED_STATUS.to_string(),
            status => status.to_string(),
        };

        Self {
            app: app.app_name().to_string(),
            app_version: chart_app_version(app).to_string(),
            catalog: app.catalog_name().to_string(),
            cluster_missing: app.is_in_org_namespace() && app.cluster_label().is_none(),
            deployed_version: deployed_version.to_string(),
            latest_version,
            name: app.meta.name.clone(),
            namespace: app.meta.namespace.clone(),
            status,
            team,
            upgrade_available,
            version: version.to_string(),
            version_mismatch: version != deployed_version,
        }
    }

    fn record(&self, recorder: &mut MetricsRecorder) -> CollectResult<()> {
        recorder.record(
            &APP_INFO,
            &[
                &self.app,
                &self.app_version,
                &self.catalog,
                bool_label(self.cluster_missing),
                &self.deployed_version,
                &self.latest_version,
                &self.name,
                &self.namespace,
                &self.status,
                &self.team,
                bool_label(self.upgrade_available),
                &self.version,
                bool_label(self.version_mismatch),
            ],
            APP_INFO_VALUE,
        )
    }
}

/// Expiry of an app's cordon, keyed by the app's spec name and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CordonRecord {
    pub name: String,
    pub namespace: String,
    pub expire_time_seconds: i64,
}

impl CordonRecord {
    /// `None` when the app is not cordoned or its until marker does not parse.
    pub fn from_app(app: &InstalledApp) -> Option<Self> {
        let markers = app.cordon()?;
        match parse_cordon_until(markers.until) {
            Ok(until) => {
                tracing::debug!(
                    app = app.app_name(),
                    reason = markers.reason,
                    until = markers.until,
                    "app is cordoned"
                );
                Some(Self {
                    name: app.spec.name.clone(),
                    namespace: app.spec.namespace.clone(),
                    expire_time_seconds: until.timestamp(),
                })
            }
            Err(error) => {
                tracing::error!(
                    app = app.app_name(),
                    value = markers.until,
                    error = %error,
                    "could not convert cordon-until"
                );
                None
            }
        }
    }

    fn record(&self, recorder: &mut MetricsRecorder) -> CollectResult<()> {
        recorder.record(
            &APP_CORDON_EXPIRE_TIME,
            &[&self.name, &self.namespace],
            self.expire_time_seconds as f64,
        )
    }
}

/// Upstream application version, blank when it equals the deployed chart version.
pub fn chart_app_version(app: &InstalledApp) -> &str {
    let app_version = app.status_app_version();
    if app_version != app.status_version() {
        app_version
    } else {
        ""
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Records produced for all installed apps in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppReport {
    pub info: Vec<AppInfoRecord>,
    pub cordons: Vec<CordonRecord>,
}

/// Reads apps, catalogs and catalog entries and derives the per-app records.
pub async fn reconcile_apps(
    control_plane: &dyn ControlPlane,
    config: &TeamConfig,
) -> CollectResult<AppReport> {
    let apps = control_plane.list_installed_apps().await?;
    let latest = build_latest_version_index(control_plane).await?;
    let mut teams = TeamResolver::new(control_plane, config);

    let mut report = AppReport::default();
    for app in &apps {
        let team = teams.resolve(app).await?;
        report.info.push(AppInfoRecord::from_app(app, &latest, team));
        report.cordons.extend(CordonRecord::from_app(app));
    }
    tracing::debug!(
        apps = apps.len(),
        catalog_entries = teams.cached_entries(),
        cordoned = report.cordons.len(),
        "apps reconciled"
    );
    Ok(report)
}

/// Emits `app_operator_app_info` and `app_operator_app_cordon_expire_time_seconds`.
pub struct AppCollector {
    control_plane: Arc<dyn ControlPlane>,
    config: Arc<TeamConfig>,
}

impl AppCollector {
    pub fn new(
        control_plane: Arc<dyn ControlPlane>,
        config: Arc<TeamConfig>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            control_plane,
            config,
        })
    }
}

#[async_trait]
impl Collector for AppCollector {
    fn name(&self) -> &'static str {
        "app"
    }

    fn describe(&self) -> &'static [&'static MetricDesc] {
        &[&APP_INFO, &APP_CORDON_EXPIRE_TIME]
    }

    async fn collect(&self, recorder: &mut MetricsRecorder) -> CollectResult<()> {
        let report = reconcile_apps(self.control_plane.as_ref(), &self.config).await?;
        for info in &report.info {
            info.record(recorder)?;
        }
        for cordon in &report.cordons {
            cordon.record(recorder)?;
        }
        Ok(())
    }
}
