//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use station_client::{ApiConfig, GatewayClient, Profile, RouteService, SessionStore};
use wiremock::MockServer;

pub const CITIZEN_AADHAR: &str = "123412341234";

/// Gateway pointed at `server` with an in-memory session.
pub fn gateway_for(server: &MockServer) -> GatewayClient {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    GatewayClient::new(&config, SessionStore::in_memory()).expect("gateway")
}

pub fn routes_for(server: &MockServer) -> RouteService {
    RouteService::new(gateway_for(server))
}

pub fn sign_in(routes: &RouteService, profile: Profile) {
    routes
        .session()
        .save("test-token", profile)
        .expect("save session");
}

pub fn citizen() -> Profile {
    Profile::Citizen {
        citizen_id: Some(5),
        aadhar_no: CITIZEN_AADHAR.to_string(),
    }
}

pub fn officer() -> Profile {
    Profile::Police {
        police_member_id: 77,
        station_id: 9,
        name: "Officer Jane".to_string(),
    }
}

pub fn official(member_id: Option<i64>) -> Profile {
    Profile::Government {
        government_member_id: member_id,
    }
}

pub fn fir_row(id: &str, offence: &str, name: &str, status: &str) -> Value {
    json!({
        "fir_id": id,
        "fullname": name,
        "offence_type": offence,
        "incident_location": "Station Market",
        "status": status,
        "incident_date": "2025-11-01"
    })
}

pub fn fir_detail(id: &str) -> Value {
    json!({
        "fir_id": id,
        "fullname": "Alice Citizen",
        "age": 34,
        "gender": "Female",
        "address": "4 Lake Road",
        "contact_number": "9000000001",
        "id_proof_type": "Aadhar",
        "id_proof_value": CITIZEN_AADHAR,
        "incident_date": "2025-11-01",
        "incident_time": "18:45",
        "offence_type": "Theft",
        "incident_location": "Station Market",
        "case_narrative": "Phone stolen from a parked scooter",
        "station_id": 9,
        "member_id": 77,
        "status": "active",
        "progress": [
            {
                "id": 2,
                "progress_text": "CCTV footage collected",
                "evidence_text": "Video evidence",
                "created_at": "2025-11-03T10:00:00"
            }
        ],
        "culprits": []
    })
}
