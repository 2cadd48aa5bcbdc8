use std::{collections::BTreeMap, net::SocketAddr, sync::Arc, time::Duration};

use app_exporter_collector::{CollectorSet, TeamConfig};
use app_exporter_resources::{
    keys::{
        APP_OPERATOR_VERSION_LABEL, CATALOG_NAME_LABEL, CATALOG_TYPE_LABEL,
        CATALOG_VISIBILITY_LABEL, CLUSTER_LABEL, CORDON_REASON_ANNOTATION,
        CORDON_UNTIL_ANNOTATION, KUBERNETES_NAME_LABEL, KUBERNETES_VERSION_LABEL, LATEST_LABEL,
        OPERATOR_NAME, OWNERS_ANNOTATION, TEAM_ANNOTATION,
    },
    AppSpec, AppStatus, AppStatusRelease, Catalog, CatalogEntry, ControlPlane,
    InMemoryControlPlane, InstalledApp, OperatorDeployment, ResourceMeta,
};
use app_exporter_server::{
    build_exporter_router, ExporterServerState, VersionDocument, METRICS_ENDPOINT,
};
use tokio::{net::TcpListener, task::JoinHandle};

fn team_config() -> TeamConfig {
    TeamConfig {
        app_team_mappings: BTreeMap::new(),
        retired_teams: BTreeMap::from([("batman".to_string(), "phoenix".to_string())]),
        default_team: "noteam".to_string(),
        provider: "aws".to_string(),
    }
}

fn app(name: &str, namespace: &str, catalog: &str, version: &str) -> InstalledApp {
    InstalledApp {
        meta: ResourceMeta::new(name, namespace),
        spec: AppSpec {
            name: name.to_string(),
            namespace: "kube-system".to_string(),
            catalog: catalog.to_string(),
            version: version.to_string(),
        },
        status: AppStatus::default(),
    }
}

fn deployed(mut app: InstalledApp, version: &str, app_version: &str) -> InstalledApp {
    app.status = AppStatus {
        version: version.to_string(),
        app_version: app_version.to_string(),
        release: AppStatusRelease {
            status: "deployed".to_string(),
        },
    };
    app
}

fn catalog(name: &str, visibility: &str, catalog_type: &str) -> Catalog {
    Catalog {
        meta: ResourceMeta::new(name, "default")
            .with_label(CATALOG_VISIBILITY_LABEL, visibility)
            .with_label(CATALOG_TYPE_LABEL, catalog_type),
    }
}

fn entry(app_name: &str, catalog: &str, version: &str, latest: bool) -> CatalogEntry {
    let mut entry = CatalogEntry::new(app_name, catalog, "default", version);
    entry.meta = entry
        .meta
        .with_label(CATALOG_NAME_LABEL, catalog)
        .with_label(LATEST_LABEL, if latest { "true" } else { "false" })
        .with_annotation(
            OWNERS_ANNOTATION,
            "- team: team-honeybadger\n  catalog: giantswarm\n",
        );
    entry
}

fn operator(namespace: &str, version: &str, ready_replicas: u32) -> OperatorDeployment {
    OperatorDeployment {
        meta: ResourceMeta::new(format!("{OPERATOR_NAME}-{version}"), namespace)
            .with_label(KUBERNETES_NAME_LABEL, OPERATOR_NAME)
            .with_label(KUBERNETES_VERSION_LABEL, version),
        ready_replicas,
    }
}

fn fleet_apps() -> Vec<InstalledApp> {
    let hello = deployed(
        app("hello-world-app", "org-acme", "giantswarm", "v0.2.0"),
        "0.2.0",
        "1.1.0",
    );

    let mut kiam = app("kiam", "abc01", "default", "2.1.0");
    kiam.meta = kiam
        .meta
        .with_label(CLUSTER_LABEL, "abc01")
        .with_label(APP_OPERATOR_VERSION_LABEL, "6.3.0")
        .with_annotation(TEAM_ANNOTATION, "team-batman")
        .with_annotation(CORDON_REASON_ANNOTATION, "maintenance")
        .with_annotation(CORDON_UNTIL_ANNOTATION, "2030-01-01T00:00:00.000Z");

    let mut nginx = deployed(app("nginx", "xyz01", "default", "1.2.0"), "1.2.0", "1.2.0");
    nginx.meta = nginx.meta.with_label(APP_OPERATOR_VERSION_LABEL, "1.0.0");

    vec![hello, kiam, nginx]
}

fn fleet() -> InMemoryControlPlane {
    InMemoryControlPlane::new()
        .with_apps(fleet_apps())
        .with_catalogs([
            catalog("giantswarm", "public", "stable"),
            catalog("community", "public", "community"),
            catalog("internal", "private", "stable"),
        ])
        .with_catalog_entries([
            entry("hello-world-app", "giantswarm", "0.3.0", true),
            entry("hello-world-app", "giantswarm", "0.2.0", false),
            entry("hello-world-app", "community", "9.9.9", true),
            entry("hello-world-app", "internal", "8.8.8", true),
        ])
        .with_deployments([
            operator("abc01", "6.3.0", 1),
            operator("giantswarm", "1.0.0", 2),
            operator("kube-system", "1.3.0", 1),
        ])
}

async fn spawn_exporter(
    control_plane: Arc<dyn ControlPlane>,
) -> (SocketAddr, JoinHandle<()>) {
    let collectors = CollectorSet::for_control_plane(control_plane, Arc::new(team_config()))
        .expect("collector set");
    let state = Arc::new(ExporterServerState::new(
        collectors,
        VersionDocument::default(),
    ));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener addr");
    let app = build_exporter_router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    (addr, handle)
}

async fn scrape(addr: SocketAddr) -> String {
    let response = reqwest::Client::new()
        .get(format!("http://{addr}{METRICS_ENDPOINT}"))
        .send()
        .await
        .expect("scrape");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.text().await.expect("scrape body")
}

fn sample_lines<'a>(body: &'a str, family: &str) -> Vec<&'a str> {
    let prefix = format!("{family}{{");
    body.lines()
        .filter(|line| line.starts_with(&prefix))
        .collect()
}

#[tokio::test]
async fn integration_scrape_reports_fleet_status() {
    let (addr, handle) = spawn_exporter(Arc::new(fleet())).await;
    let body = scrape(addr).await;

    let info = sample_lines(&body, "app_operator_app_info");
    assert_eq!(info.len(), 3, "{body}");

    let hello = info
        .iter()
        .find(|line| line.contains(r#"app="hello-world-app""#))
        .expect("hello-world-app sample");
    for label in [
        r#"app_version="1.1.0""#,
        r#"cluster_missing="true""#,
        r#"latest_version="0.3.0""#,
        r#"team="honeybadger""#,
        r#"upgrade_available="true""#,
        r#"version="0.2.0""#,
        r#"version_mismatch="false""#,
    ] {
        assert!(hello.contains(label), "missing {label} in {hello}");
    }

    let kiam = info
        .iter()
        .find(|line| line.contains(r#"app="kiam""#))
        .expect("kiam sample");
    for label in [
        r#"cluster_missing="false""#,
        r#"latest_version="""#,
        r#"status="not-installed""#,
        r#"team="phoenix""#,
        r#"upgrade_available="false""#,
        r#"version_mismatch="true""#,
    ] {
        assert!(kiam.contains(label), "missing {label} in {kiam}");
    }

    let nginx = info
        .iter()
        .find(|line| line.contains(r#"app="nginx""#))
        .expect("nginx sample");
    assert!(nginx.contains(r#"app_version="""#));
    assert!(nginx.contains(r#"team="noteam""#));

    assert_eq!(
        sample_lines(&body, "app_operator_app_cordon_expire_time_seconds"),
        [r#"app_operator_app_cordon_expire_time_seconds{name="kiam",namespace="kube-system"} 1893456000"#]
    );
    assert_eq!(
        sample_lines(&body, "app_operator_ready_total"),
        [
            r#"app_operator_ready_total{namespace="abc01",version="6.3.0"} 1"#,
            r#"app_operator_ready_total{namespace="giantswarm",version="1.0.0"} 3"#,
        ]
    );

    handle.abort();
}

#[tokio::test]
async fn integration_each_scrape_reads_current_state() {
    let control_plane = Arc::new(fleet());
    let (addr, handle) = spawn_exporter(control_plane.clone()).await;

    let first = scrape(addr).await;
    assert!(first.contains(r#"app="kiam""#));

    let remaining: Vec<_> = fleet_apps()
        .into_iter()
        .filter(|app| app.spec.name != "kiam")
        .collect();
    control_plane.replace_apps(remaining).await;

    let second = scrape(addr).await;
    assert!(!second.contains(r#"app="kiam""#));
    assert!(!second.contains("app_operator_app_cordon_expire_time_seconds{"));
    assert_eq!(sample_lines(&second, "app_operator_app_info").len(), 2);
    assert_eq!(
        sample_lines(&second, "app_operator_ready_total"),
        [r#"app_operator_ready_total{namespace="giantswarm",version="1.0.0"} 3"#]
    );

    handle.abort();
}

#[tokio::test]
async fn integration_catalog_entry_lookups_are_shared_within_one_pass() {
    let hello = |namespace: &str| {
        deployed(
            app("hello-world-app", namespace, "giantswarm", "0.2.0"),
            "0.2.0",
            "",
        )
    };
    let control_plane = Arc::new(
        InMemoryControlPlane::new()
            .with_apps([hello("org-acme"), hello("org-umbrella"), hello("org-initech")])
            .with_catalogs([catalog("giantswarm", "public", "stable")])
            .with_catalog_entries([entry("hello-world-app", "giantswarm", "0.2.0", true)]),
    );
    let collectors = CollectorSet::for_control_plane(
        control_plane.clone() as Arc<dyn ControlPlane>,
        Arc::new(team_config()),
    )
    .expect("collector set");

    let collection = collectors.collect().await.expect("first pass");
    assert_eq!(control_plane.catalog_entry_get_count(), 2);
    let output = collection.render().expect("render");
    assert_eq!(output.matches(r#"team="honeybadger""#).count(), 3);

    collectors.collect().await.expect("second pass");
    assert_eq!(control_plane.catalog_entry_get_count(), 4);
}

#[tokio::test]
async fn integration_version_document_is_served_at_root() {
    let (addr, handle) = spawn_exporter(Arc::new(InMemoryControlPlane::new())).await;
    let document = reqwest::get(format!("http://{addr}/"))
        .await
        .expect("version request")
        .json::<serde_json::Value>()
        .await
        .expect("version json");
    assert_eq!(document["source"], "https://github.com/giantswarm/app-exporter");
    handle.abort();
}
