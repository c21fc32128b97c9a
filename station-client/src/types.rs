//! Request and response types for the station backend

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deserialize `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifiers arrive as strings (UUIDs) or integers depending on the table.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match LooseId::deserialize(deserializer)? {
        LooseId::Number(n) => Ok(n.to_string()),
        LooseId::Text(s) => Ok(s),
    }
}

/// An identifier that may be numeric or textual on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for LooseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LooseId::Number(n) => write!(f, "{}", n),
            LooseId::Text(s) => f.write_str(s),
        }
    }
}

// ==================== FIRs ====================

/// FIR lifecycle state. Anything other than `closed` reads as active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirStatus {
    Closed,
    #[default]
    #[serde(other)]
    Active,
}

impl FirStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FirStatus::Active => "ACTIVE",
            FirStatus::Closed => "CLOSED",
        }
    }
}

/// FIR row as returned by the list and search endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub fir_id: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub offence_type: Option<String>,
    #[serde(default)]
    pub incident_location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: FirStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<LooseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_narrative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl FirSummary {
    /// Row carrying only an id, for FIRs opened from outside a list.
    pub fn with_id(fir_id: impl Into<String>) -> Self {
        Self {
            fir_id: fir_id.into(),
            fullname: None,
            offence_type: None,
            incident_location: None,
            status: FirStatus::Active,
            incident_date: None,
            station_id: None,
            case_narrative: None,
            created_at: None,
        }
    }

    /// "Theft — Alice Citizen", or "FIR #id" when the offence is unknown.
    pub fn headline(&self) -> String {
        match self.offence_type.as_deref().filter(|o| !o.is_empty()) {
            Some(offence) => format!(
                "{} — {}",
                offence,
                self.fullname.as_deref().unwrap_or_default()
            ),
            None => format!("FIR #{}", self.fir_id),
        }
    }

    /// "#id • location", optionally followed by the status label.
    pub fn subline(&self, with_status: bool) -> String {
        let location = self
            .incident_location
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or("—");
        if with_status {
            format!("#{} • {} • {}", self.fir_id, location, self.status.label())
        } else {
            format!("#{} • {}", self.fir_id, location)
        }
    }
}

/// Station-scoped FIR lists from `/fir/list_by_station`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationFirs {
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: Vec<FirSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub closed: Vec<FirSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all: Vec<FirSummary>,
}

/// Append-only progress record on a FIR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub progress_text: Option<String>,
    #[serde(default)]
    pub evidence_text: Option<String>,
    #[serde(default)]
    pub evidence_photos: Option<String>,
    #[serde(default)]
    pub witness_info: Option<String>,
    #[serde(default)]
    pub other_info: Option<String>,
    #[serde(default)]
    pub culprit_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Suspect attached to a FIR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulpritRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub identity_marks: Option<String>,
    #[serde(default)]
    pub custody_status: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub last_known_location: Option<String>,
}

/// Full FIR record from `/fir/details` or `/fir/detail/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirDetail {
    #[serde(deserialize_with = "string_or_number")]
    pub fir_id: String,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub id_proof_type: Option<String>,
    #[serde(default)]
    pub id_proof_value: Option<String>,
    #[serde(default)]
    pub incident_date: Option<String>,
    #[serde(default)]
    pub incident_time: Option<String>,
    #[serde(default)]
    pub offence_type: Option<String>,
    #[serde(default)]
    pub incident_location: Option<String>,
    #[serde(default)]
    pub case_narrative: Option<String>,
    #[serde(default)]
    pub station_id: Option<LooseId>,
    #[serde(default)]
    pub member_id: Option<LooseId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: FirStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: Vec<ProgressEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub culprits: Vec<CulpritRecord>,
}

/// Payload for `/fir/register_incident`; also the wizard's output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirCreate {
    pub fullname: String,
    pub age: i64,
    pub gender: String,
    pub address: String,
    pub contact_number: String,
    pub id_proof_type: String,
    pub id_proof_value: Option<String>,
    pub incident_date: String,
    pub incident_time: String,
    pub offence_type: String,
    pub incident_location: String,
    pub case_narrative: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FirRegistered {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(deserialize_with = "string_or_number")]
    pub report_id: String,
    #[serde(default)]
    pub registered_by_id: Option<i64>,
    #[serde(default)]
    pub registered_by_name: Option<String>,
}

/// Optional suspect block on a progress update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CulpritInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_marks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custody_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_known_location: Option<String>,
}

impl CulpritInput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Payload for `/fir/add_progress`; absent fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub fir_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_photos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witness_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culprit: Option<CulpritInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: Vec<ProgressEntry>,
}

/// Body for endpoints keyed only by FIR id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirRef {
    pub fir_id: String,
}

/// `{ "message": ... }` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// ==================== Citizens ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitizenCredentials {
    pub aadhar_no: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CitizenRegistered {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CitizenAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<i64>,
    #[serde(default)]
    pub aadhar_no: Option<String>,
}

// ==================== Police ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPoliceMember {
    pub name: String,
    pub password: String,
    pub station_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoliceMemberCreated {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub member_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoliceCredentials {
    pub station_id: i64,
    pub member_id: i64,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoliceAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub police_member_id: Option<i64>,
    #[serde(default)]
    pub station_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Station roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliceMember {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

// ==================== Government ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernmentCredentials {
    pub government_member_id: i64,
    pub password: String,
}

/// Response of `/government/addgovernment`; some deployments also sign in
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GovernmentCreated {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub government_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GovernmentAuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionQuery {
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegionSearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fir: Vec<FirCreate>,
}

// ==================== Escalations ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    #[default]
    Pending,
    InReview,
    Resolved,
    Rejected,
}

impl EscalationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationStatus::Pending => "pending",
            EscalationStatus::InReview => "in_review",
            EscalationStatus::Resolved => "resolved",
            EscalationStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for EscalationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(EscalationStatus::Pending),
            "in_review" => Ok(EscalationStatus::InReview),
            "resolved" => Ok(EscalationStatus::Resolved),
            "rejected" => Ok(EscalationStatus::Rejected),
            other => Err(format!("unknown escalation status: {}", other)),
        }
    }
}

/// Filter for `/government/escalations`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscalationFilter {
    #[default]
    All,
    Only(EscalationStatus),
}

impl EscalationFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationFilter::All => "all",
            EscalationFilter::Only(status) => status.as_str(),
        }
    }
}

/// Citizen request for review, read by the government role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    pub id: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub fir_id: String,
    #[serde(default)]
    pub citizen_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aadhar_no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: EscalationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for `/citizen/escalatefir`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EscalationRequest {
    pub fir_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EscalationReceipt {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fir_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aadhar_no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

/// Render a backend timestamp as `YYYY-MM-DD HH:MM`.
///
/// Accepts RFC 3339 and the naive ISO form the backend emits; anything else
/// is shown unchanged.
pub fn display_timestamp(raw: &str) -> String {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&chrono::Utc).format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(ts) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_headline_and_subline() {
        let fir: FirSummary = serde_json::from_value(json!({
            "fir_id": "act-1",
            "fullname": "Alice Citizen",
            "offence_type": "Theft",
            "incident_location": "Station Market",
            "status": "active"
        }))
        .unwrap();
        assert_eq!(fir.headline(), "Theft — Alice Citizen");
        assert_eq!(fir.subline(false), "#act-1 • Station Market");
        assert_eq!(fir.subline(true), "#act-1 • Station Market • ACTIVE");
    }

    #[test]
    fn test_summary_without_offence_uses_id() {
        let fir: FirSummary = serde_json::from_value(json!({"fir_id": 17})).unwrap();
        assert_eq!(fir.fir_id, "17");
        assert_eq!(fir.headline(), "FIR #17");
        assert_eq!(fir.subline(true), "#17 • — • ACTIVE");
    }

    #[test]
    fn test_unknown_or_null_status_reads_active() {
        let fir: FirSummary =
            serde_json::from_value(json!({"fir_id": "x", "status": "reopened"})).unwrap();
        assert_eq!(fir.status, FirStatus::Active);
        let fir: FirSummary = serde_json::from_value(json!({"fir_id": "x", "status": null})).unwrap();
        assert_eq!(fir.status, FirStatus::Active);
        let fir: FirSummary =
            serde_json::from_value(json!({"fir_id": "x", "status": "closed"})).unwrap();
        assert_eq!(fir.status, FirStatus::Closed);
    }

    #[test]
    fn test_detail_accepts_mixed_id_types() {
        let detail: FirDetail = serde_json::from_value(json!({
            "fir_id": "abc-123",
            "station_id": "ST-001",
            "member_id": 42,
            "progress": [{"id": 10, "progress_text": "CCTV footage collected"}],
            "culprits": [{"name": "", "custody_status": "at large"}]
        }))
        .unwrap();
        assert_eq!(detail.station_id, Some(LooseId::Text("ST-001".into())));
        assert_eq!(detail.member_id.unwrap().to_string(), "42");
        assert_eq!(detail.progress.len(), 1);
        assert_eq!(detail.culprits[0].custody_status.as_deref(), Some("at large"));
    }

    #[test]
    fn test_progress_update_omits_absent_fields() {
        let update = ProgressUpdate {
            fir_id: "act-1".into(),
            progress_text: Some("Initial update".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"fir_id": "act-1", "progress_text": "Initial update"})
        );
    }

    #[test]
    fn test_fir_create_keeps_null_id_proof_value() {
        let payload = FirCreate {
            fullname: "A".into(),
            age: 28,
            gender: "Male".into(),
            address: "X".into(),
            contact_number: "1".into(),
            id_proof_type: "Aadhar".into(),
            id_proof_value: None,
            incident_date: "2025-11-06".into(),
            incident_time: "10:30".into(),
            offence_type: "Robbery".into(),
            incident_location: "Main Square".into(),
            case_narrative: "n".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["id_proof_value"].is_null());
        assert!(value["age"].is_i64());
    }

    #[test]
    fn test_escalation_status_wire_names() {
        let esc: Escalation = serde_json::from_value(json!({
            "id": 1,
            "fir_id": "f",
            "aadhar_no": "123",
            "reason": "r",
            "status": "in_review"
        }))
        .unwrap();
        assert_eq!(esc.status, EscalationStatus::InReview);
        assert_eq!(EscalationFilter::All.as_str(), "all");
        assert_eq!("resolved".parse::<EscalationStatus>().unwrap(), EscalationStatus::Resolved);
    }

    #[test]
    fn test_display_timestamp_formats() {
        assert_eq!(display_timestamp("2025-11-06T14:15:00Z"), "2025-11-06 14:15");
        assert_eq!(display_timestamp("2025-11-06T14:15:00.123456"), "2025-11-06 14:15");
        assert_eq!(display_timestamp("yesterday"), "yesterday");
    }
}
