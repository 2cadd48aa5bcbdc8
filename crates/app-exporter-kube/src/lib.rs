//! Kubernetes API binding for the app-exporter control-plane contract.

mod client;
mod control_plane;
mod decode;

pub use client::{connect, ApiServerSettings, KubeConfigSource, KubeConnectError};
pub use control_plane::KubeControlPlane;
