use std::sync::Arc;

use app_exporter_resources::ControlPlane;

use crate::app::AppCollector;
use crate::collector::Collector;
use crate::error::{CollectError, CollectResult, ConfigError};
use crate::metrics::{render_prometheus, MetricDesc, MetricsRecorder, Sample};
use crate::operator::AppOperatorCollector;
use crate::team::TeamConfig;

/// Successful families of one collection pass.
#[derive(Debug)]
pub struct Collection {
    recorders: Vec<MetricsRecorder>,
    failed: Vec<&'static str>,
}

impl Collection {
    pub fn samples(&self, desc: &MetricDesc) -> &[Sample] {
        self.recorders
            .iter()
            .map(|recorder| recorder.samples(desc))
            .find(|samples| !samples.is_empty())
            .unwrap_or_default()
    }

    /// Names of the collectors whose families were dropped from this pass.
    pub fn failed_collectors(&self) -> &[&'static str] {
        &self.failed
    }

    pub fn render(&self) -> CollectResult<String> {
        render_prometheus(&self.recorders)
    }
}

/// Runs every registered collector once per scrape.
pub struct CollectorSet {
    collectors: Vec<Box<dyn Collector>>,
}

impl CollectorSet {
    pub fn new(collectors: Vec<Box<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// The app and app-operator collectors over one control plane.
    pub fn for_control_plane(
        control_plane: Arc<dyn ControlPlane>,
        config: Arc<TeamConfig>,
    ) -> Result<Self, ConfigError> {
        let app = AppCollector::new(Arc::clone(&control_plane), config)?;
        let app_operator = AppOperatorCollector::new(control_plane);
        Ok(Self::new(vec![Box::new(app), Box::new(app_operator)]))
    }

    pub fn describe(&self) -> Vec<&'static MetricDesc> {
        self.collectors
            .iter()
            .flat_map(|collector| collector.describe().iter().copied())
            .collect()
    }

    /// Runs the collectors in order. A failed collector only drops its own
    /// families; the pass fails when no collector succeeds.
    pub async fn collect(&self) -> CollectResult<Collection> {
        let mut recorders = Vec::with_capacity(self.collectors.len());
        let mut failed = Vec::new();
        let mut first_error: Option<CollectError> = None;

        for collector in &self.collectors {
            let mut recorder = MetricsRecorder::new(collector.describe());
            match collector.collect(&mut recorder).await {
                Ok(()) => {
                    tracing::debug!(
                        collector = collector.name(),
                        samples = recorder.sample_count(),
                        "collector finished"
                    );
                    recorders.push(recorder);
                }
                Err(error) => {
                    tracing::error!(
                        collector = collector.name(),
                        error = %error,
                        "collector failed"
                    );
                    failed.push(collector.name());
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) if recorders.is_empty() => Err(error),
            _ => Ok(Collection { recorders, failed }),
        }
    }
}
