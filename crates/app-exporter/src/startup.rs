use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use app_exporter_collector::{CollectorSet, TeamConfig};
use app_exporter_kube::{ApiServerSettings, KubeConfigSource, KubeControlPlane};
use app_exporter_resources::ControlPlane;
use app_exporter_server::{run_exporter_server, ExporterServerConfig, VersionDocument};

use crate::cli_args::Cli;

/// Parses a YAML string-to-string mapping. Blank and `null` input is empty.
pub(crate) fn parse_team_mapping(flag: &str, raw: &str) -> Result<BTreeMap<String, String>> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let mapping: Option<BTreeMap<String, String>> = serde_yaml::from_str(raw)
        .with_context(|| format!("invalid --{flag}: expected a YAML mapping of names"))?;
    Ok(mapping.unwrap_or_default())
}

/// Builds and validates the team attribution configuration.
pub(crate) fn team_config_from_cli(cli: &Cli) -> Result<TeamConfig> {
    let config = TeamConfig {
        app_team_mappings: parse_team_mapping("app-team-mappings", &cli.app_team_mappings)?,
        retired_teams: parse_team_mapping("retired-teams", &cli.retired_teams)?,
        default_team: cli.default_team.clone(),
        provider: cli.provider.clone(),
    };
    config
        .validate()
        .context("invalid team attribution configuration")?;
    Ok(config)
}

pub(crate) fn kube_config_source(cli: &Cli) -> KubeConfigSource {
    let api_server = cli
        .kubernetes_address
        .as_ref()
        .map(|address| ApiServerSettings {
            address: address.clone(),
            ca_file: cli.kubernetes_tls_ca_file.clone(),
            crt_file: cli.kubernetes_tls_crt_file.clone(),
            key_file: cli.kubernetes_tls_key_file.clone(),
        });
    KubeConfigSource::from_flags(cli.kubeconfig.clone(), cli.kube_in_cluster, api_server)
}

pub(crate) fn build_collectors(
    control_plane: Arc<dyn ControlPlane>,
    config: TeamConfig,
) -> Result<CollectorSet> {
    CollectorSet::for_control_plane(control_plane, Arc::new(config))
        .context("invalid collector configuration")
}

/// Runs one pass and renders the successful families.
pub(crate) async fn render_once(collectors: &CollectorSet) -> Result<String> {
    let collection = collectors
        .collect()
        .await
        .context("metrics collection failed")?;
    for collector in collection.failed_collectors() {
        tracing::warn!(collector = *collector, "families omitted from output");
    }
    collection.render().context("failed to render exposition")
}

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    let team_config = team_config_from_cli(&cli)?;
    tracing::info!(
        default_team = %team_config.default_team,
        provider = %team_config.provider,
        app_team_mappings = team_config.app_team_mappings.len(),
        retired_teams = team_config.retired_teams.len(),
        "team attribution configured"
    );

    let source = kube_config_source(&cli);
    let client = app_exporter_kube::connect(&source)
        .await
        .context("failed to connect to the cluster API")?;
    let control_plane: Arc<dyn ControlPlane> = Arc::new(KubeControlPlane::new(client));
    let collectors = build_collectors(control_plane, team_config)?;

    if cli.collect_once {
        let output = render_once(&collectors).await?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(output.as_bytes())
            .context("failed to write exposition to stdout")?;
        stdout.flush().context("failed to flush stdout")?;
        return Ok(());
    }

    run_exporter_server(
        ExporterServerConfig {
            bind: cli.listen,
            version: VersionDocument::default(),
        },
        collectors,
    )
    .await
}
