//! Metric family descriptors, the per-pass sample recorder and the
//! Prometheus text exposition.

use std::collections::HashSet;

use prometheus::{GaugeVec, Opts, Registry, TextEncoder};

use crate::error::{CollectError, CollectResult};

pub const LABEL_APP: &str = "app";
pub const LABEL_APP_VERSION: &str = "app_version";
pub const LABEL_CATALOG: &str = "catalog";
pub const LABEL_CLUSTER_MISSING: &str = "cluster_missing";
pub const LABEL_DEPLOYED_VERSION: &str = "deployed_version";
pub const LABEL_LATEST_VERSION: &str = "latest_version";
pub const LABEL_NAME: &str = "name";
pub const LABEL_NAMESPACE: &str = "namespace";
pub const LABEL_STATUS: &str = "status";
pub const LABEL_TEAM: &str = "team";
pub const LABEL_UPGRADE_AVAILABLE: &str = "upgrade_available";
pub const LABEL_VERSION: &str = "version";
pub const LABEL_VERSION_MISMATCH: &str = "version_mismatch";

/// Name, help text and fixed label names of one gauge family.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

pub const APP_INFO: MetricDesc = MetricDesc {
    name: "app_operator_app_info",
    help: "Managed apps status.",
    labels: &[
        LABEL_APP,
        LABEL_APP_VERSION,
        LABEL_CATALOG,
        LABEL_CLUSTER_MISSING,
        LABEL_DEPLOYED_VERSION,
        LABEL_LATEST_VERSION,
        LABEL_NAME,
        LABEL_NAMESPACE,
        LABEL_STATUS,
        LABEL_TEAM,
        LABEL_UPGRADE_AVAILABLE,
        LABEL_VERSION,
        LABEL_VERSION_MISMATCH,
    ],
};

pub const APP_CORDON_EXPIRE_TIME: MetricDesc = MetricDesc {
    name: "app_operator_app_cordon_expire_time_seconds",
    help: "A metric of the expire time of cordoned apps unix seconds.",
    labels: &[LABEL_NAME, LABEL_NAMESPACE],
};

pub const APP_OPERATOR_READY: MetricDesc = MetricDesc {
    name: "app_operator_ready_total",
    help: "Gauge with ready app-operator instances per app CR version.",
    labels: &[LABEL_NAMESPACE, LABEL_VERSION],
};

/// One emitted gauge value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: f64,
}

impl Sample {
    /// Value of `label`, looked up through the family's label names.
    pub fn label<'a>(&'a self, desc: &MetricDesc, label: &str) -> Option<&'a str> {
        desc.labels
            .iter()
            .position(|name| *name == label)
            .and_then(|index| self.label_values.get(index))
            .map(String::as_str)
    }
}

#[derive(Debug)]
struct FamilySamples {
    desc: &'static MetricDesc,
    samples: Vec<Sample>,
    seen: HashSet<Vec<String>>,
}

/// Collects the samples of the families one collector owns during one pass.
#[derive(Debug)]
pub struct MetricsRecorder {
    families: Vec<FamilySamples>,
}

impl MetricsRecorder {
    pub fn new(descs: &[&'static MetricDesc]) -> Self {
        let families = descs
            .iter()
            .map(|desc| FamilySamples {
                desc: *desc,
                samples: Vec::new(),
                seen: HashSet::new(),
            })
            .collect();
        Self { families }
    }

    /// Records one sample. A repeated label set keeps the first value.
    pub fn record(
        &mut self,
        desc: &'static MetricDesc,
        label_values: &[&str],
        value: f64,
    ) -> CollectResult<()> {
        let family = self
            .families
            .iter_mut()
            .find(|family| family.desc.name == desc.name)
            .ok_or(CollectError::UndescribedFamily(desc.name))?;
        if label_values.len() != desc.labels.len() {
            return Err(CollectError::LabelArity {
                family: desc.name,
                expected: desc.labels.len(),
                actual: label_values.len(),
            });
        }

        let label_values: Vec<String> =
            label_values.iter().map(|value| value.to_string()).collect();
        if !family.seen.insert(label_values.clone()) {
            tracing::warn!(
                family = desc.name,
                labels = ?label_values,
                "duplicate metric label set, keeping first sample"
            );
            return Ok(());
        }
        family.samples.push(Sample {
            label_values,
            value,
        });
        Ok(())
    }

    pub fn samples(&self, desc: &MetricDesc) -> &[Sample] {
        self.families
            .iter()
            .find(|family| family.desc.name == desc.name)
            .map(|family| family.samples.as_slice())
            .unwrap_or_default()
    }

    pub fn sample_count(&self) -> usize {
        self.families.iter().map(|family| family.samples.len()).sum()
    }
}

/// Renders the recorded families in the Prometheus text format (0.0.4).
pub fn render_prometheus<'a>(
    recorders: impl IntoIterator<Item = &'a MetricsRecorder>,
) -> CollectResult<String> {
    let registry = Registry::new();
    for recorder in recorders {
        for family in &recorder.families {
            let gauges = GaugeVec::new(
                Opts::new(family.desc.name, family.desc.help),
                family.desc.labels,
            )?;
            registry.register(Box::new(gauges.clone()))?;
            for sample in &family.samples {
                let label_values: Vec<&str> =
                    sample.label_values.iter().map(String::as_str).collect();
                gauges
                    .get_metric_with_label_values(&label_values)?
                    .set(sample.value);
            }
        }
    }

    let mut output = String::new();
    TextEncoder::new().encode_utf8(&registry.gather(), &mut output)?;
    Ok(output)
}
