//! HTTP surface of the app exporter: scrape-triggered `/metrics`, a liveness
//! probe and the version document.

mod exporter_server;

pub use exporter_server::{
    build_exporter_router, run_exporter_server, ExporterServerConfig, ExporterServerState,
    VersionDocument, HEALTHZ_ENDPOINT, METRICS_CONTENT_TYPE, METRICS_ENDPOINT, VERSION_ENDPOINT,
};
