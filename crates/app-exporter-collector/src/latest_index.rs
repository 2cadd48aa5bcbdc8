//! Latest-available version per (catalog, app) across public catalogs.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use app_exporter_core::{compare_versions, parse_semver};
use app_exporter_resources::keys::{
    CATALOG_NAME_LABEL, CATALOG_TYPE_LABEL, CATALOG_VISIBILITY_LABEL, LATEST_LABEL,
};
use app_exporter_resources::{ControlPlane, LabelSelector, SelectorError};

use crate::error::CollectResult;

/// Maps `<catalog>-<app>` to the normalized latest version.
pub type LatestVersionIndex = BTreeMap<String, String>;

/// Public catalogs, minus the legacy community catalogs.
pub fn public_catalog_selector() -> Result<LabelSelector, SelectorError> {
    LabelSelector::parse(&format!(
        "{CATALOG_VISIBILITY_LABEL}=public,{CATALOG_TYPE_LABEL}!=community"
    ))
}

pub async fn build_latest_version_index(
    control_plane: &dyn ControlPlane,
) -> CollectResult<LatestVersionIndex> {
    let catalog_selector = public_catalog_selector()?;
    let catalogs = control_plane.list_catalogs(&catalog_selector).await?;

    let mut index = LatestVersionIndex::new();
    for catalog in &catalogs {
        let entry_selector = LabelSelector::from_pairs([
            (CATALOG_NAME_LABEL, catalog.meta.name.as_str()),
            (LATEST_LABEL, "true"),
        ])?;
        let entries = control_plane
            .list_catalog_entries(&catalog.meta.namespace, &entry_selector)
            .await?;
        for entry in &entries {
            insert_latest(
                &mut index,
                entry.latest_version_key(),
                entry.normalized_version(),
            );
        }
    }

    tracing::debug!(
        catalogs = catalogs.len(),
        entries = index.len(),
        "latest version index built"
    );
    Ok(index)
}

/// Keeps the greater of two competing "latest" versions for one key.
fn insert_latest(index: &mut LatestVersionIndex, key: String, version: &str) {
    match index.get(&key) {
        Some(current) if !supersedes(version, current) => {
            tracing::warn!(
                key = %key,
                kept = %current,
                ignored = version,
                "multiple latest catalog entries"
            );
        }
        Some(current) => {
            tracing::warn!(
                key = %key,
                kept = version,
                ignored = %current,
                "multiple latest catalog entries"
            );
            index.insert(key, version.to_string());
        }
        None => {
            index.insert(key, version.to_string());
        }
    }
}

/// Semantic ordering first; a parsable version beats an unparsable one;
/// two unparsable versions order lexicographically.
fn supersedes(candidate: &str, current: &str) -> bool {
    if let Some(ordering) = compare_versions(candidate, current) {
        return ordering == Ordering::Greater;
    }
    match (parse_semver(candidate).is_ok(), parse_semver(current).is_ok()) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate > current,
    }
}
