//! Owning-team attribution for installed apps.
//!
//! The team comes from the first source in [`TEAM_STRATEGIES`] that yields a
//! non-empty value. Retired teams are then remapped to their replacement, and
//! the configured default fills whatever is still empty.

use std::collections::{BTreeMap, HashMap};

use app_exporter_resources::keys::CATALOG_ENTRY_NAMESPACES;
use app_exporter_resources::{
    parse_owners, CatalogEntry, ControlPlane, ControlPlaneResult, InstalledApp, Owner,
};

use crate::error::{CollectResult, ConfigError};

pub const TEAM_PREFIX: &str = "team-";

/// Immutable attribution settings shared by every collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamConfig {
    /// App name to team, for apps whose catalog metadata lacks an owner.
    pub app_team_mappings: BTreeMap<String, String>,
    /// Retired team name to the team that took over its apps.
    pub retired_teams: BTreeMap<String, String>,
    pub default_team: String,
    /// Installation provider matched against owner entries.
    pub provider: String,
}

impl TeamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_team.trim().is_empty() {
            return Err(ConfigError::MissingValue("default team"));
        }
        if self.provider.trim().is_empty() {
            return Err(ConfigError::MissingValue("provider"));
        }
        Ok(())
    }
}

/// Strips the `team-` prefix used by the source-control team names.
pub fn format_team_name(input: &str) -> &str {
    input.strip_prefix(TEAM_PREFIX).unwrap_or(input)
}

/// Team metadata carried by the AppCatalogEntry an app was installed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTeamFacts {
    pub owners: Vec<Owner>,
    pub team: Option<String>,
}

static NO_ENTRY_FACTS: EntryTeamFacts = EntryTeamFacts {
    owners: Vec::new(),
    team: None,
};

impl EntryTeamFacts {
    fn from_entry(app: &InstalledApp, entry: &CatalogEntry) -> Self {
        let owners = match entry.owners_annotation() {
            Some(payload) => match parse_owners(payload) {
                Ok(owners) => owners,
                Err(error) => {
                    tracing::error!(
                        app = app.app_name(),
                        entry = %entry.meta.name,
                        error = %error,
                        "could not parse owners annotation"
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self {
            owners,
            team: entry.team_annotation().map(str::to_string),
        }
    }
}

/// Everything a strategy may consult for one app.
#[derive(Debug, Clone, Copy)]
pub struct TeamSources<'a> {
    pub app: &'a InstalledApp,
    pub entry: &'a EntryTeamFacts,
    pub config: &'a TeamConfig,
}

pub type TeamStrategy = fn(&TeamSources<'_>) -> Option<String>;

/// Team sources in priority order.
pub const TEAM_STRATEGIES: [(&str, TeamStrategy); 5] = [
    ("app_team_mapping", from_app_team_mapping),
    ("app_annotation", from_app_annotation),
    ("app_label", from_app_label),
    ("catalog_entry_owners", from_entry_owners),
    ("catalog_entry_annotation", from_entry_annotation),
];

fn formatted(team: &str) -> Option<String> {
    Some(format_team_name(team))
        .filter(|team| !team.is_empty())
        .map(str::to_string)
}

pub fn from_app_team_mapping(sources: &TeamSources<'_>) -> Option<String> {
    sources
        .config
        .app_team_mappings
        .get(sources.app.app_name())
        .filter(|team| !team.is_empty())
        .cloned()
}

pub fn from_app_annotation(sources: &TeamSources<'_>) -> Option<String> {
    sources.app.team_annotation().and_then(formatted)
}

pub fn from_app_label(sources: &TeamSources<'_>) -> Option<String> {
    sources.app.team_label().and_then(formatted)
}

pub fn from_entry_owners(sources: &TeamSources<'_>) -> Option<String> {
    matching_owner(
        &sources.entry.owners,
        sources.app.catalog_name(),
        &sources.config.provider,
    )
    .and_then(|owner| formatted(&owner.team))
}

pub fn from_entry_annotation(sources: &TeamSources<'_>) -> Option<String> {
    sources.entry.team.as_deref().and_then(formatted)
}

/// First owner whose catalog and provider match, an empty field matching any
/// value on that side only.
pub fn matching_owner<'a>(
    owners: &'a [Owner],
    catalog: &str,
    provider: &str,
) -> Option<&'a Owner> {
    owners.iter().find(|owner| {
        (owner.catalog == catalog && owner.provider == provider)
            || (owner.catalog == catalog && owner.provider.is_empty())
            || (owner.catalog.is_empty() && owner.provider == provider)
    })
}

/// Runs the strategy chain, then the retired-team remap and the default.
pub fn resolve_team(sources: &TeamSources<'_>) -> String {
    let team = TEAM_STRATEGIES
        .iter()
        .find_map(|(source, strategy)| {
            strategy(sources).inspect(|team| {
                tracing::trace!(
                    app = sources.app.app_name(),
                    source = *source,
                    team = %team,
                    "team resolved"
                );
            })
        })
        .unwrap_or_default();

    let config = sources.config;
    let team = match config.retired_teams.get(&team) {
        Some(replacement) if !team.is_empty() && !replacement.is_empty() => replacement.clone(),
        _ => team,
    };
    if team.is_empty() {
        config.default_team.clone()
    } else {
        team
    }
}

/// Finds an AppCatalogEntry by name in the first namespace that has it.
pub async fn find_catalog_entry(
    control_plane: &dyn ControlPlane,
    name: &str,
) -> ControlPlaneResult<Option<CatalogEntry>> {
    for namespace in CATALOG_ENTRY_NAMESPACES {
        if let Some(entry) = control_plane.get_catalog_entry(namespace, name).await? {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

/// Resolves teams for one pass, reading each AppCatalogEntry at most once.
pub struct TeamResolver<'a> {
    control_plane: &'a dyn ControlPlane,
    config: &'a TeamConfig,
    entries: HashMap<String, EntryTeamFacts>,
}

impl<'a> TeamResolver<'a> {
    pub fn new(control_plane: &'a dyn ControlPlane, config: &'a TeamConfig) -> Self {
        Self {
            control_plane,
            config,
            entries: HashMap::new(),
        }
    }

    pub async fn resolve(&mut self, app: &InstalledApp) -> CollectResult<String> {
        let config = self.config;
        let entry = if from_app_team_mapping(&TeamSources {
            app,
            entry: &NO_ENTRY_FACTS,
            config,
        })
        .is_some()
        {
            &NO_ENTRY_FACTS
        } else {
            self.entry_facts(app).await?
        };
        Ok(resolve_team(&TeamSources { app, entry, config }))
    }

    async fn entry_facts(&mut self, app: &InstalledApp) -> CollectResult<&EntryTeamFacts> {
        let entry_name = app.catalog_entry_name();
        let loaded = if self.entries.contains_key(&entry_name) {
            None
        } else {
            Some(self.load_entry_facts(app, &entry_name).await?)
        };
        Ok(self
            .entries
            .entry(entry_name)
            .or_insert_with(|| loaded.unwrap_or_default()))
    }

    async fn load_entry_facts(
        &self,
        app: &InstalledApp,
        entry_name: &str,
    ) -> CollectResult<EntryTeamFacts> {
        match find_catalog_entry(self.control_plane, entry_name).await? {
            Some(entry) => Ok(EntryTeamFacts::from_entry(app, &entry)),
            None => {
                tracing::debug!(
                    app = app.app_name(),
                    entry = entry_name,
                    "catalog entry not found"
                );
                Ok(EntryTeamFacts::default())
            }
        }
    }

    /// Number of distinct catalog entries looked up so far.
    pub fn cached_entries(&self) -> usize {
        self.entries.len()
    }
}
