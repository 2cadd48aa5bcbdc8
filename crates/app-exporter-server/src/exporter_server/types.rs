use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use app_exporter_collector::CollectError;

/// Plain-text error returned to the scraper.
#[derive(Debug)]
pub(super) struct ExporterApiError {
    pub(super) status: StatusCode,
    pub(super) message: String,
}

impl ExporterApiError {
    pub(super) fn collection(error: CollectError) -> Self {
        tracing::error!(error = %error, "metrics collection failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("metrics collection failed: {error}"),
        }
    }
}

impl IntoResponse for ExporterApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
