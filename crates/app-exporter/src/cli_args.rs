use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "app-exporter",
    about = "Prometheus exporter for managed app status and app-operator readiness",
    version
)]
pub struct Cli {
    #[arg(
        long,
        env = "APP_EXPORTER_LISTEN",
        default_value = "0.0.0.0:8000",
        help = "Socket address the metrics server binds to"
    )]
    pub listen: String,

    #[arg(
        long,
        env = "APP_EXPORTER_KUBECONFIG",
        help = "Explicit kubeconfig path. Takes precedence over --kube-in-cluster."
    )]
    pub kubeconfig: Option<PathBuf>,

    #[arg(
        long = "kube-in-cluster",
        env = "APP_EXPORTER_KUBE_IN_CLUSTER",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Use the pod service account instead of inferring the cluster configuration"
    )]
    pub kube_in_cluster: bool,

    #[arg(
        long = "kubernetes-address",
        env = "APP_EXPORTER_KUBERNETES_ADDRESS",
        help = "API server address used when neither a kubeconfig nor in-cluster access is selected"
    )]
    pub kubernetes_address: Option<String>,

    #[arg(
        long = "kubernetes-tls-ca-file",
        env = "APP_EXPORTER_KUBERNETES_TLS_CA_FILE",
        requires = "kubernetes_address",
        help = "CA bundle for verifying --kubernetes-address"
    )]
    pub kubernetes_tls_ca_file: Option<PathBuf>,

    #[arg(
        long = "kubernetes-tls-crt-file",
        env = "APP_EXPORTER_KUBERNETES_TLS_CRT_FILE",
        requires_all = ["kubernetes_address", "kubernetes_tls_key_file"],
        help = "Client certificate presented to --kubernetes-address"
    )]
    pub kubernetes_tls_crt_file: Option<PathBuf>,

    #[arg(
        long = "kubernetes-tls-key-file",
        env = "APP_EXPORTER_KUBERNETES_TLS_KEY_FILE",
        requires_all = ["kubernetes_address", "kubernetes_tls_crt_file"],
        help = "Private key for --kubernetes-tls-crt-file"
    )]
    pub kubernetes_tls_key_file: Option<PathBuf>,

    #[arg(
        long = "default-team",
        env = "APP_EXPORTER_DEFAULT_TEAM",
        help = "Team attributed to apps no other source assigns an owner to"
    )]
    pub default_team: String,

    #[arg(
        long,
        env = "APP_EXPORTER_PROVIDER",
        help = "Provider identity matched against catalog entry owners"
    )]
    pub provider: String,

    #[arg(
        long = "retired-teams",
        env = "APP_EXPORTER_RETIRED_TEAMS",
        default_value = "{}",
        help = "YAML mapping of retired team names to their replacements"
    )]
    pub retired_teams: String,

    #[arg(
        long = "app-team-mappings",
        env = "APP_EXPORTER_APP_TEAM_MAPPINGS",
        default_value = "{}",
        help = "YAML mapping of app names to owning teams. Overrides every other team source."
    )]
    pub app_team_mappings: String,

    #[arg(
        long = "collect-once",
        env = "APP_EXPORTER_COLLECT_ONCE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Run a single collection pass, print the exposition to stdout and exit"
    )]
    pub collect_once: bool,
}
