use app_exporter_resources::{ControlPlaneError, SelectorError};
use thiserror::Error;

/// Result type for one collector's pass.
pub type CollectResult<T> = Result<T, CollectError>;

/// Startup configuration rejected by a collector constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    MissingValue(&'static str),
}

/// Failure that aborts the affected metric families for the current pass.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error("metric family '{family}' expects {expected} label values, got {actual}")]
    LabelArity {
        family: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("metric family '{0}' was not described by this collector")]
    UndescribedFamily(&'static str),
    #[error(transparent)]
    Exposition(#[from] prometheus::Error),
}
