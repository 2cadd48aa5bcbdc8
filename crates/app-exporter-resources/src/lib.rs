//! Resource snapshots and the read-only control-plane contract used by the
//! app exporter collectors.
//!
//! Collectors never talk to the cluster directly. They depend on
//! [`ControlPlane`], which has a Kubernetes-backed implementation in
//! `app-exporter-kube` and an in-memory one here.

pub mod keys;

mod control_plane;
mod memory;
mod selector;
mod types;

pub use control_plane::{ControlPlane, ControlPlaneError, ControlPlaneResult};
pub use memory::{ControlPlaneOperation, InMemoryControlPlane};
pub use selector::{LabelSelector, Requirement, SelectorError};
pub use types::{
    parse_owners, AppSpec, AppStatus, AppStatusRelease, Catalog, CatalogEntry, CatalogEntrySpec,
    CatalogReference, CordonMarkers, InstalledApp, OperatorDeployment, Owner, ResourceMeta,
};
