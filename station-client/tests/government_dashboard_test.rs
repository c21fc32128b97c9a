//! Government dashboard integration tests against a mock backend

mod common;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::json;
use std::sync::Arc;
use station_client::{EscalationStatus, GovernmentDashboard, ScriptedPrompter};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

const FIR_ID: &str = "5ffd53c0-ae10-4d40-b584-5d59098da021";
const OTHER_FIR_ID: &str = "23ab91c7-f5b1-408d-9c3c-0e2835a3ac98";

fn escalation(status: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "fir_id": FIR_ID,
        "citizen_id": 5,
        "aadhar_no": CITIZEN_AADHAR,
        "reason": "Investigation was not done properly",
        "status": status,
        "created_at": "2025-11-04T09:30:00",
        "updated_at": null
    })
}

async fn mount_backend(server: &MockServer, escalations: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/government/escalations"))
        .and(query_param("status", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(escalations))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fir/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"fir_id": FIR_ID, "status": "active"},
            {"fir_id": OTHER_FIR_ID, "offence_type": "Theft", "fullname": "Alice Citizen"}
        ])))
        .mount(server)
        .await;
}

async fn dashboard(
    server: &MockServer,
    token: Option<String>,
    member_id: Option<i64>,
) -> GovernmentDashboard {
    let routes = routes_for(server);
    routes
        .session()
        .save(
            token.as_deref().unwrap_or("gov-token"),
            official(member_id),
        )
        .unwrap();
    let dashboard =
        GovernmentDashboard::mount(routes, Arc::new(ScriptedPrompter::new())).unwrap();
    dashboard.settle().await;
    dashboard
}

#[tokio::test]
async fn test_mount_lists_escalations_and_all_firs() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([escalation("pending")])).await;

    let dash = dashboard(&server, None, Some(9999)).await;
    let text = dash.render().await;
    assert!(text.contains("Government Member ID: 9999"));
    assert!(text.contains("All FIRs (All Stations)"));
    assert!(text.contains(&format!("FIR #{}", FIR_ID)));
    assert!(text.contains(OTHER_FIR_ID));
    assert!(text.contains("PENDING"));
}

#[tokio::test]
async fn test_member_label_without_identity() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([])).await;

    let dash = dashboard(&server, None, None).await;
    assert_eq!(dash.member_label(), "—");
    assert!(dash.render().await.contains("No escalations."));
}

#[tokio::test]
async fn test_member_label_from_token_claim() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([])).await;

    let payload = URL_SAFE_NO_PAD.encode(br#"{"government_member_id": 4242}"#);
    let token = format!("header.{}.sig", payload);
    let dash = dashboard(&server, Some(token), None).await;
    assert_eq!(dash.member_label(), "4242");
}

/// Opening an escalation shows the FIR detail plus the escalation reason.
#[tokio::test]
async fn test_open_escalation_shows_reason() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([escalation("pending")])).await;
    Mock::given(method("GET"))
        .and(path("/fir/details"))
        .and(query_param("fir_id", FIR_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(fir_detail(FIR_ID)))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard(&server, None, Some(9999)).await;
    dash.open_escalation(1).await.unwrap();

    let text = dash.render().await;
    assert!(text.contains("FIR Details"));
    assert!(text.contains("Escalation Reason"));
    assert!(text.contains("Investigation was not done properly"));
    assert!(text.contains("CCTV footage collected"));
    assert!(text.contains("Video evidence"));

    dash.close_detail().await;
    assert!(!dash.render().await.contains("Escalation Reason"));
}

#[tokio::test]
async fn test_unknown_escalation_is_rejected() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([])).await;

    let dash = dashboard(&server, None, Some(1)).await;
    assert!(dash.open_escalation(42).await.is_err());
}

#[tokio::test]
async fn test_escalation_status_update() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([escalation("pending")])).await;
    Mock::given(method("PATCH"))
        .and(path("/government/escalations/1/status"))
        .and(query_param("new_status", "in_review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(escalation("in_review")))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard(&server, None, Some(9999)).await;
    let updated = dash
        .set_escalation_status(1, EscalationStatus::InReview)
        .await
        .unwrap();
    assert_eq!(updated.status, EscalationStatus::InReview);
    assert_eq!(
        dash.snapshot().await.escalations[0].status,
        EscalationStatus::InReview
    );
}

#[tokio::test]
async fn test_region_search() {
    let server = MockServer::start().await;
    mount_backend(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/government/governmentsearchfir"))
        .and(body_json(json!({"region": "Main Square"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fir": [{
            "fullname": "Charlie Test",
            "age": 28,
            "gender": "Male",
            "address": "12 Test Lane",
            "contact_number": "9876543210",
            "id_proof_type": "Aadhar",
            "id_proof_value": null,
            "incident_date": "2025-11-06",
            "incident_time": "10:30",
            "offence_type": "Robbery",
            "incident_location": "Main Square",
            "case_narrative": "Bag snatched"
        }]})))
        .expect(1)
        .mount(&server)
        .await;

    let dash = dashboard(&server, None, Some(9999)).await;
    assert_eq!(dash.search_region("Main Square").await.unwrap(), 1);
    assert!(dash.render().await.contains("Robbery — Charlie Test"));

    assert_eq!(dash.search_region("").await.unwrap(), 0);
    assert!(dash.snapshot().await.region_results.is_none());
}

/// A successful reload clears the error left by an earlier failed load.
#[tokio::test]
async fn test_refresh_clears_previous_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/government/escalations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fir/list"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "Database unavailable"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fir/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"fir_id": FIR_ID}])))
        .mount(&server)
        .await;

    let dash = dashboard(&server, None, Some(9999)).await;
    assert_eq!(
        dash.snapshot().await.firs_error.as_deref(),
        Some("Database unavailable")
    );
    assert!(dash.render().await.contains("Error: Database unavailable"));

    dash.refresh();
    dash.settle().await;
    let state = dash.snapshot().await;
    assert!(state.firs_error.is_none());
    assert_eq!(state.firs.len(), 1);
    assert!(!dash.render().await.contains("Error:"));
}
