//! Reconciliation and attribution engine behind the app exporter.
//!
//! Every scrape runs a [`CollectorSet`] pass: the [`AppCollector`] joins
//! installed apps with the latest catalog versions and their owning teams, and
//! the [`AppOperatorCollector`] reports ready operator replicas per declared
//! compatibility version. Nothing is kept between passes.

mod app;
mod collector;
mod error;
mod latest_index;
pub mod metrics;
mod operator;
mod set;
mod team;
#[cfg(test)]
mod test_support;

pub use app::{
    chart_app_version, reconcile_apps, AppCollector, AppInfoRecord, AppReport, CordonRecord,
    NOT_INSTALLED_STATUS,
};
pub use collector::Collector;
pub use error::{CollectError, CollectResult, ConfigError};
pub use latest_index::{build_latest_version_index, public_catalog_selector, LatestVersionIndex};
pub use metrics::{
    render_prometheus, MetricDesc, MetricsRecorder, Sample, APP_CORDON_EXPIRE_TIME, APP_INFO,
    APP_OPERATOR_READY,
};
pub use operator::{
    group_app_operator_versions, group_operator_deployments, legacy_ready_replicas,
    operator_selector, readiness_records, AppOperatorCollector, AppOperatorVersions,
    OperatorInstances, ReadinessRecord, LEGACY_OPERATOR_NAMESPACE, LEGACY_TENANT_VERSION,
    NAMESPACED_OPERATOR_MAJOR,
};
pub use set::{Collection, CollectorSet};
pub use team::{
    find_catalog_entry, format_team_name, matching_owner, resolve_team, EntryTeamFacts,
    TeamConfig, TeamResolver, TeamSources, TeamStrategy, TEAM_PREFIX, TEAM_STRATEGIES,
};
