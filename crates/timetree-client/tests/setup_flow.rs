//! End-to-end tests of the CLI commands against a mock TimeTree server.

use chrono::Utc;
use serde_json::json;
use timetree_client::commands::{calendars, events, setup};
use timetree_client::config::ClientConfig;
use timetree_client::error::ClientError;
use timetree_server::{SetupError, UpdateInterval};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing at the mock server, with no account yet.
fn base_config(server: &MockServer) -> String {
    format!(
        "[timetree]\nbase_url = \"{}/api/v1\"\ntimeout_secs = 2\n",
        server.uri()
    )
}

fn args(calendar_id: Option<i64>) -> setup::SetupArgs {
    setup::SetupArgs {
        email: "me@example.com".to_string(),
        password: "hunter2".to_string(),
        calendar_id,
        update_interval: Some(UpdateInterval::FifteenMinutes),
        force: false,
    }
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/api/v1/auth/email/signin"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "_session_id=abc; path=/"),
        )
        .mount(server)
        .await;
}

async fn mount_calendars(server: &MockServer, calendars: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/v1/calendars"))
        .and(header("cookie", "_session_id=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "calendars": calendars })))
        .mount(server)
        .await;
}

struct Workspace {
    _dir: tempfile::TempDir,
    path: std::path::PathBuf,
}

impl Workspace {
    fn new(content: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::load_from(&self.path).unwrap()
    }
}

#[tokio::test]
async fn setup_saves_single_calendar_then_queries_work() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_calendars(
        &server,
        json!([
            {"id": 42, "name": "Family", "deactivated_at": null},
            {"id": 7, "name": "Old", "deactivated_at": 1_600_000_000}
        ]),
    )
    .await;

    let tomorrow = (Utc::now() + chrono::TimeDelta::days(1)).timestamp_millis();
    Mock::given(method("GET"))
        .and(path("/api/v1/calendar/42/events/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [{
                "uuid": "e1",
                "title": "Dentist",
                "start_at": tomorrow,
                "end_at": tomorrow + 3_600_000,
                "start_timezone": "Asia/Tokyo",
                "end_timezone": "Asia/Tokyo",
                "all_day": false
            }],
            "chunk": false
        })))
        .mount(&server)
        .await;

    let workspace = Workspace::new(&base_config(&server));
    setup::run(&workspace.path, &workspace.config(), args(None))
        .await
        .unwrap();

    let config = workspace.config();
    let timetree = config.timetree().unwrap();
    assert_eq!(timetree.calendar_id, Some(42));
    assert_eq!(timetree.calendar_name.as_deref(), Some("Family"));
    assert_eq!(timetree.update_interval, UpdateInterval::FifteenMinutes);
    // Settings that were already there survive
    assert!(timetree.base_url.as_deref().unwrap().starts_with(&server.uri()));

    calendars::run(&config, true).await.unwrap();
    events::list(&config, false, Some(3)).await.unwrap();
    events::next(&config, true).await.unwrap();
}

#[tokio::test]
async fn rejected_credentials_leave_config_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/auth/email/signin"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let content = base_config(&server);
    let workspace = Workspace::new(&content);
    let err = setup::run(&workspace.path, &workspace.config(), args(Some(42)))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Setup(SetupError::InvalidAuth)));
    assert_eq!(std::fs::read_to_string(&workspace.path).unwrap(), content);
}

#[tokio::test]
async fn several_calendars_need_an_id() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_calendars(
        &server,
        json!([{"id": 1, "name": "Family"}, {"id": 2, "name": "Work"}]),
    )
    .await;

    let workspace = Workspace::new(&base_config(&server));
    let err = setup::run(&workspace.path, &workspace.config(), args(None))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));

    let err = setup::run(&workspace.path, &workspace.config(), args(Some(3)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Setup(SetupError::CalendarNotFound(3))
    ));

    setup::run(&workspace.path, &workspace.config(), args(Some(2)))
        .await
        .unwrap();
    assert_eq!(workspace.config().timetree().unwrap().calendar_id, Some(2));
}

#[tokio::test]
async fn same_calendar_twice_is_already_configured() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    mount_calendars(&server, json!([{"id": 42, "name": "Family"}])).await;

    let workspace = Workspace::new(&base_config(&server));
    setup::run(&workspace.path, &workspace.config(), args(None))
        .await
        .unwrap();

    let err = setup::run(&workspace.path, &workspace.config(), args(None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Setup(SetupError::AlreadyConfigured(_))
    ));

    let mut forced = args(None);
    forced.force = true;
    setup::run(&workspace.path, &workspace.config(), forced)
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_service_cannot_connect() {
    let server = MockServer::start().await;
    let content = base_config(&server);
    drop(server);

    let workspace = Workspace::new(&content);
    let err = setup::run(&workspace.path, &workspace.config(), args(Some(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Setup(SetupError::CannotConnect)));
}
