//! Role dashboards.
//!
//! Each dashboard owns its list and detail state and a [`TaskScope`]. Mount
//! starts the role's list loads in the background; user actions are awaited
//! through the scope so they stop when the dashboard is dropped.
//!
//! [`TaskScope`]: crate::task::TaskScope

pub mod citizen;
pub mod government;
pub mod police;

pub use citizen::{CitizenDashboard, CitizenState, EscalationForm};
pub use government::{GovernmentDashboard, GovernmentState};
pub use police::{PoliceDashboard, PoliceState, ProgressDraft};

use std::fmt::Write;

use crate::error::ClientError;
use crate::prompt::Prompter;
use crate::types::{display_timestamp, FirDetail, FirStatus, FirSummary, LooseId};

/// Selected FIR and its independently fetched detail record.
///
/// Every `open` bumps a sequence number; a fetch result is applied only if
/// it belongs to the latest `open`, so a slow response for a FIR the user has
/// already moved away from is dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    seq: u64,
    pub selected: Option<FirSummary>,
    pub record: Option<FirDetail>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DetailView {
    /// Select a FIR and return the ticket its fetch must present.
    pub fn open(&mut self, selected: FirSummary) -> u64 {
        self.seq += 1;
        self.selected = Some(selected);
        self.record = None;
        self.loading = true;
        self.error = None;
        self.seq
    }

    /// Re-fetch the current selection without clearing what is shown.
    pub fn reload(&mut self) -> Option<u64> {
        self.selected.as_ref()?;
        self.seq += 1;
        self.loading = true;
        Some(self.seq)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.seq && self.selected.is_some()
    }

    /// Store a fetched record. Returns false if the ticket is stale.
    pub fn apply(&mut self, ticket: u64, record: FirDetail) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(fir_id = %record.fir_id, "Dropping stale detail");
            return false;
        }
        self.record = Some(record);
        self.loading = false;
        true
    }

    pub fn fail(&mut self, ticket: u64, message: String) {
        if self.is_current(ticket) {
            self.loading = false;
            self.error = Some(message);
        }
    }

    pub fn close(&mut self) {
        self.seq += 1;
        self.selected = None;
        self.record = None;
        self.loading = false;
        self.error = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    /// True when either the selected row or the fetched record is closed.
    pub fn is_closed(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.status == FirStatus::Closed)
            || self
                .selected
                .as_ref()
                .is_some_and(|s| s.status == FirStatus::Closed)
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.fir_id.as_str())
    }

    /// Plain-text rendering of the open detail, or `None` when closed.
    pub fn render(&self) -> Option<String> {
        let selected = self.selected.as_ref()?;
        let mut out = String::new();
        match (&self.record, &self.error) {
            (Some(record), _) => out.push_str(&render_detail(record)),
            (None, Some(error)) => {
                let _ = writeln!(out, "FIR #{}", selected.fir_id);
                let _ = writeln!(out, "Could not load details: {}", error);
            }
            (None, None) if self.loading => {
                let _ = writeln!(out, "FIR #{}", selected.fir_id);
                out.push_str("Loading...\n");
            }
            (None, None) => {
                let _ = writeln!(out, "FIR #{}", selected.fir_id);
                out.push_str("No details available.\n");
            }
        }
        Some(out)
    }
}

/// Alert the user about a failed action.
///
/// Invalidated sessions are handled by the router, and cancellations mean the
/// view is gone, so neither is shown.
pub(crate) fn report(prompter: &dyn Prompter, err: &ClientError) {
    if err.is_unauthenticated() || matches!(err, ClientError::Cancelled) {
        return;
    }
    prompter.alert(&err.user_message());
}

/// Titled list of FIR rows, or `empty` when there are none.
pub fn render_list(title: &str, rows: &[FirSummary], empty: &str, with_status: bool) -> String {
    let mut out = format!("== {} ({}) ==\n", title, rows.len());
    if rows.is_empty() {
        let _ = writeln!(out, "  {}", empty);
        return out;
    }
    for row in rows {
        let _ = writeln!(out, "  {}", row.headline());
        let _ = writeln!(out, "    {}", row.subline(with_status));
    }
    out
}

fn field(out: &mut String, label: &str, value: Option<&str>) {
    let value = value.filter(|v| !v.is_empty()).unwrap_or("—");
    let _ = writeln!(out, "  {:<18}{}", format!("{}:", label), value);
}

fn id_field(out: &mut String, label: &str, value: Option<&LooseId>) {
    let text = value.map(|v| v.to_string());
    field(out, label, text.as_deref());
}

/// Full FIR record. Depends only on `detail`, so equal records render equally.
pub fn render_detail(detail: &FirDetail) -> String {
    let mut out = String::new();
    out.push_str("FIR Details\n");
    field(&mut out, "FIR ID", Some(detail.fir_id.as_str()));
    field(&mut out, "Status", Some(detail.status.label()));

    out.push_str("Complainant\n");
    field(&mut out, "Name", detail.fullname.as_deref());
    let age = detail.age.map(|a| a.to_string());
    field(&mut out, "Age", age.as_deref());
    field(&mut out, "Gender", detail.gender.as_deref());
    field(&mut out, "Address", detail.address.as_deref());
    field(&mut out, "Contact", detail.contact_number.as_deref());
    let proof = match (&detail.id_proof_type, &detail.id_proof_value) {
        (Some(kind), Some(value)) if !value.is_empty() => Some(format!("{} ({})", kind, value)),
        (Some(kind), _) => Some(kind.clone()),
        _ => None,
    };
    field(&mut out, "ID proof", proof.as_deref());

    out.push_str("Incident\n");
    field(&mut out, "Offence", detail.offence_type.as_deref());
    field(&mut out, "Date", detail.incident_date.as_deref());
    field(&mut out, "Time", detail.incident_time.as_deref());
    field(&mut out, "Location", detail.incident_location.as_deref());
    id_field(&mut out, "Station", detail.station_id.as_ref());
    id_field(&mut out, "Registered by", detail.member_id.as_ref());
    field(&mut out, "Narrative", detail.case_narrative.as_deref());

    let _ = writeln!(out, "Progress ({})", detail.progress.len());
    if detail.progress.is_empty() {
        out.push_str("  No progress recorded yet.\n");
    }
    for entry in &detail.progress {
        let when = entry
            .created_at
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(
            out,
            "  [{}] {}",
            when,
            entry.progress_text.as_deref().unwrap_or("(no summary)")
        );
        for (label, value) in [
            ("Evidence", &entry.evidence_text),
            ("Photos", &entry.evidence_photos),
            ("Witnesses", &entry.witness_info),
            ("Other", &entry.other_info),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                let _ = writeln!(out, "    {}: {}", label, value);
            }
        }
    }

    let _ = writeln!(out, "Culprits ({})", detail.culprits.len());
    for culprit in &detail.culprits {
        let name = if culprit.name.is_empty() { "Unknown" } else { culprit.name.as_str() };
        let custody = culprit.custody_status.as_deref().unwrap_or("unknown");
        let _ = writeln!(out, "  {} ({})", name, custody);
        let demographics = match (culprit.age, culprit.gender.as_deref()) {
            (Some(age), Some(gender)) => Some(format!("{}, {}", age, gender)),
            (Some(age), None) => Some(age.to_string()),
            (None, Some(gender)) => Some(gender.to_string()),
            (None, None) => None,
        };
        if let Some(demographics) = demographics {
            let _ = writeln!(out, "    Age/Gender: {}", demographics);
        }
        for (label, value) in [
            ("Address", &culprit.address),
            ("Identity marks", &culprit.identity_marks),
            ("Details", &culprit.details),
            ("Last seen", &culprit.last_known_location),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                let _ = writeln!(out, "    {}: {}", label, value);
            }
        }
    }
    out
}
