use async_trait::async_trait;

use crate::error::CollectResult;
use crate::metrics::{MetricDesc, MetricsRecorder};

/// A source of metric families, run once per scrape.
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Families this collector records into. Recording any other family fails.
    fn describe(&self) -> &'static [&'static MetricDesc];

    async fn collect(&self, recorder: &mut MetricsRecorder) -> CollectResult<()>;
}
