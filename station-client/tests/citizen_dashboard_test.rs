//! Citizen dashboard integration tests against a mock backend

mod common;

use serde_json::json;
use std::sync::Arc;
use station_client::{CitizenDashboard, ClientError, ScriptedPrompter};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const REASON: &str = "Please review: missing witness statement.";

async fn mount_my_firs(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/fir/list_by_aadhar"))
        .and(query_param("aadhar_no", CITIZEN_AADHAR))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn dashboard(server: &MockServer, prompter: Arc<ScriptedPrompter>) -> CitizenDashboard {
    let routes = routes_for(server);
    sign_in(&routes, citizen());
    let dashboard = CitizenDashboard::mount(routes, prompter).unwrap();
    dashboard.settle().await;
    dashboard
}

#[tokio::test]
async fn test_my_firs_are_listed() {
    let server = MockServer::start().await;
    mount_my_firs(
        &server,
        json!([
            fir_row("abc-123", "Theft", "Alice Example", "active"),
            fir_row("def-456", "Assault", "Bob Example", "closed")
        ]),
    )
    .await;

    let dash = dashboard(&server, Arc::new(ScriptedPrompter::new())).await;
    let text = dash.render().await;
    assert!(text.contains("My FIRs"));
    assert!(text.contains("Theft — Alice Example"));
    assert!(text.contains("Assault — Bob Example"));
    assert!(text.contains("#def-456 • Station Market • CLOSED"));
}

#[tokio::test]
async fn test_detail_by_path_id() {
    let server = MockServer::start().await;
    mount_my_firs(&server, json!([fir_row("abc-123", "Theft", "Alice Example", "active")])).await;
    Mock::given(method("GET"))
        .and(path("/fir/detail/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fir_detail("abc-123")))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard(&server, Arc::new(ScriptedPrompter::new())).await;
    dash.open_detail("abc-123").await.unwrap();

    let text = dash.render().await;
    assert!(text.contains("FIR Details"));
    assert!(text.contains("abc-123"));
    assert!(text.contains("CCTV footage collected"));
}

/// The escalation body is exactly `{fir_id, reason}` whatever the pre-fill was.
#[tokio::test]
async fn test_escalation_sends_only_fir_and_reason() {
    let server = MockServer::start().await;
    mount_my_firs(&server, json!([fir_row("xyz-9", "Theft", "Alice Example", "active")])).await;
    Mock::given(method("POST"))
        .and(path("/citizen/escalatefir"))
        .and(body_json(json!({"fir_id": "abc-123", "reason": REASON})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fir_id": "abc-123",
            "aadhar_no": CITIZEN_AADHAR,
            "reason": REASON
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prompter = Arc::new(ScriptedPrompter::new());
    let dash = dashboard(&server, prompter.clone()).await;

    // Pre-filled from a row, then overwritten by hand
    dash.set_escalation_fir("xyz-9").await;
    dash.set_escalation_fir("abc-123").await;
    dash.set_escalation_reason(REASON).await;
    assert_eq!(dash.snapshot().await.escalation.aadhar_no(), CITIZEN_AADHAR);

    let receipt = dash.submit_escalation().await.unwrap();
    assert_eq!(receipt.fir_id, "abc-123");
    assert_eq!(prompter.alerts(), vec!["Escalation submitted."]);
    assert!(dash.snapshot().await.escalation.reason.is_empty());
}

#[tokio::test]
async fn test_use_open_fir_for_escalation() {
    let server = MockServer::start().await;
    mount_my_firs(&server, json!([fir_row("abc-123", "Theft", "Alice Example", "active")])).await;
    Mock::given(method("GET"))
        .and(path("/fir/detail/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fir_detail("abc-123")))
        .mount(&server)
        .await;

    let dash = dashboard(&server, Arc::new(ScriptedPrompter::new())).await;
    assert!(matches!(
        dash.use_selected_for_escalation().await,
        Err(ClientError::NothingSelected)
    ));

    dash.open_detail("abc-123").await.unwrap();
    assert_eq!(dash.use_selected_for_escalation().await.unwrap(), "abc-123");
    assert_eq!(dash.snapshot().await.escalation.fir_id, "abc-123");
}

#[tokio::test]
async fn test_escalation_requires_both_fields() {
    let server = MockServer::start().await;
    mount_my_firs(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/citizen/escalatefir"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let prompter = Arc::new(ScriptedPrompter::new());
    let dash = dashboard(&server, prompter.clone()).await;
    dash.set_escalation_fir("abc-123").await;

    assert!(matches!(
        dash.submit_escalation().await,
        Err(ClientError::Validation(_))
    ));
    assert_eq!(prompter.alerts(), vec!["FIR ID and reason are required"]);
}

#[tokio::test]
async fn test_no_firs_message() {
    let server = MockServer::start().await;
    mount_my_firs(&server, json!([])).await;

    let dash = dashboard(&server, Arc::new(ScriptedPrompter::new())).await;
    assert!(dash.render().await.contains("No FIRs found."));
}

/// Unmounting stops a load that is still in flight.
#[tokio::test]
async fn test_unmount_cancels_pending_load() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fir/list_by_aadhar"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let routes = routes_for(&server);
    sign_in(&routes, citizen());
    let dash = CitizenDashboard::mount(routes, Arc::new(ScriptedPrompter::new())).unwrap();
    let started = std::time::Instant::now();
    dash.unmount();
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}
