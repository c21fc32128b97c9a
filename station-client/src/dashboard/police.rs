//! Police dashboard: station lists, roster, search, filing wizard, progress
//! composer and FIR closing.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{render_list, report, DetailView};
use crate::error::{ClientError, Result, ValidationError};
use crate::prompt::Prompter;
use crate::routes::RouteService;
use crate::session::{Profile, Session};
use crate::task::TaskScope;
use crate::types::{CulpritInput, FirStatus, FirSummary, PoliceMember, ProgressUpdate};
use crate::wizard::{FilingWizard, WizardStep};

pub const CLOSE_CONFIRMATION: &str = "Close this FIR? This action cannot be undone.";
pub const CLOSED_FIR_MESSAGE: &str = "This FIR is already closed.";

/// Progress composer input. Every field is optional; blank means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDraft {
    pub progress_text: String,
    pub evidence_text: String,
    pub evidence_photos: String,
    pub witness_info: String,
    pub other_info: String,
    /// Whether the culprit block is filled in at all
    pub culprit_open: bool,
    pub culprit_name: String,
    pub culprit_age: String,
    pub culprit_gender: String,
    pub culprit_address: String,
    pub culprit_identity_marks: String,
    pub culprit_custody_status: String,
    pub culprit_details: String,
    pub culprit_last_known_location: String,
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ProgressDraft {
    /// Build the wire update for `fir_id`.
    pub fn to_update(&self, fir_id: &str) -> std::result::Result<ProgressUpdate, ValidationError> {
        let culprit = if self.culprit_open {
            let age = match optional(&self.culprit_age) {
                Some(raw) => Some(
                    raw.parse::<i64>()
                        .map_err(|_| ValidationError::new("Culprit age must be a number."))?,
                ),
                None => None,
            };
            let culprit = CulpritInput {
                name: optional(&self.culprit_name),
                age,
                gender: optional(&self.culprit_gender),
                address: optional(&self.culprit_address),
                identity_marks: optional(&self.culprit_identity_marks),
                custody_status: optional(&self.culprit_custody_status),
                details: optional(&self.culprit_details),
                last_known_location: optional(&self.culprit_last_known_location),
            };
            (!culprit.is_empty()).then_some(culprit)
        } else {
            None
        };

        Ok(ProgressUpdate {
            fir_id: fir_id.to_string(),
            progress_text: optional(&self.progress_text),
            evidence_text: optional(&self.evidence_text),
            evidence_photos: optional(&self.evidence_photos),
            witness_info: optional(&self.witness_info),
            other_info: optional(&self.other_info),
            culprit,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoliceState {
    pub active: Vec<FirSummary>,
    pub closed: Vec<FirSummary>,
    pub all: Vec<FirSummary>,
    pub members: Vec<PoliceMember>,
    pub loading: bool,
    pub members_loading: bool,
    pub error: Option<String>,
    pub search_query: String,
    /// `None` until a search has been run
    pub search_results: Option<Vec<FirSummary>>,
    pub detail: DetailView,
    pub wizard: FilingWizard,
    pub wizard_open: bool,
    pub filing: bool,
}

impl PoliceState {
    fn find(&self, fir_id: &str) -> Option<&FirSummary> {
        self.all
            .iter()
            .chain(&self.active)
            .chain(&self.closed)
            .chain(self.search_results.iter().flatten())
            .find(|f| f.fir_id == fir_id)
    }
}

/// Signed-in officer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Officer {
    pub name: String,
    pub member_id: i64,
    pub station_id: i64,
}

pub struct PoliceDashboard {
    routes: RouteService,
    prompter: Arc<dyn Prompter>,
    scope: TaskScope,
    state: Arc<RwLock<PoliceState>>,
    /// Bumped by every refresh; only the latest one may apply its lists
    generation: Arc<AtomicU64>,
    officer: Officer,
}

impl PoliceDashboard {
    /// Mount for the signed-in officer and start loading station data.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(routes: RouteService, prompter: Arc<dyn Prompter>) -> Result<Self> {
        let Some(Session {
            profile:
                Profile::Police {
                    police_member_id,
                    station_id,
                    name,
                },
            ..
        }) = routes.session().load()
        else {
            return Err(ClientError::NotSignedIn);
        };

        let state = PoliceState {
            loading: true,
            members_loading: true,
            ..Default::default()
        };
        let dashboard = Self {
            routes,
            prompter,
            scope: TaskScope::new(),
            state: Arc::new(RwLock::new(state)),
            generation: Arc::new(AtomicU64::new(0)),
            officer: Officer {
                name,
                member_id: police_member_id,
                station_id,
            },
        };
        dashboard.refresh();
        Ok(dashboard)
    }

    pub fn officer(&self) -> &Officer {
        &self.officer
    }

    /// Reload the station lists and the roster in the background.
    ///
    /// When refreshes overlap, only the most recent one applies its results.
    pub fn refresh(&self) {
        let current = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let routes = self.routes.clone();
        let state = self.state.clone();
        let cancel = self.scope.token();
        let generation = self.generation.clone();
        self.scope.spawn(async move {
            state.write().await.loading = true;
            let result = routes.list_by_station().await;
            if cancel.is_cancelled() {
                return;
            }
            if generation.load(Ordering::SeqCst) != current {
                tracing::debug!("Dropping superseded station FIRs");
                return;
            }
            let mut st = state.write().await;
            st.loading = false;
            match result {
                Ok(lists) => {
                    tracing::debug!(
                        active = lists.active.len(),
                        closed = lists.closed.len(),
                        "Loaded station FIRs"
                    );
                    st.active = lists.active;
                    st.closed = lists.closed;
                    st.all = lists.all;
                    st.error = None;
                }
                Err(e) => {
                    tracing::warn!("Failed to load station FIRs: {}", e);
                    st.error = Some(e.user_message());
                }
            }
        });

        let routes = self.routes.clone();
        let state = self.state.clone();
        let cancel = self.scope.token();
        let generation = self.generation.clone();
        self.scope.spawn(async move {
            let result = routes.all_members().await;
            if cancel.is_cancelled() || generation.load(Ordering::SeqCst) != current {
                return;
            }
            let mut st = state.write().await;
            st.members_loading = false;
            match result {
                Ok(members) => st.members = members,
                Err(e) => tracing::warn!("Failed to load station members: {}", e),
            }
        });
    }

    pub async fn settle(&self) {
        self.scope.settle().await;
    }

    pub async fn snapshot(&self) -> PoliceState {
        self.state.read().await.clone()
    }

    // ==================== Filing wizard ====================

    pub async fn open_wizard(&self) {
        let mut st = self.state.write().await;
        st.wizard.reset();
        st.wizard_open = true;
    }

    pub async fn cancel_wizard(&self) {
        let mut st = self.state.write().await;
        st.wizard.reset();
        st.wizard_open = false;
    }

    /// Set a form field by wire name. Returns false for an unknown name.
    pub async fn set_filing_field(&self, name: &str, value: &str) -> bool {
        self.state.write().await.wizard.form.set_field(name, value)
    }

    /// Advance the wizard; validation failures are alerted.
    pub async fn wizard_next(&self) -> Result<WizardStep> {
        let result = self.state.write().await.wizard.next();
        result.map_err(|e| {
            let err = ClientError::from(e);
            report(self.prompter.as_ref(), &err);
            err
        })
    }

    pub async fn wizard_back(&self) -> WizardStep {
        self.state.write().await.wizard.back()
    }

    /// Create the FIR from the final wizard step.
    ///
    /// On success the new FIR is put at the top of the active and "all" lists
    /// without re-fetching, and the wizard is reset and closed.
    pub async fn submit_filing(&self) -> Result<FirSummary> {
        let payload = {
            let mut st = self.state.write().await;
            if st.filing {
                return Err(ValidationError::new("A filing is already in progress.").into());
            }
            match st.wizard.build_payload() {
                Ok(payload) => {
                    st.filing = true;
                    payload
                }
                Err(e) => {
                    drop(st);
                    let err = ClientError::from(e);
                    report(self.prompter.as_ref(), &err);
                    return Err(err);
                }
            }
        };

        let result = self.scope.run(self.routes.register_incident(&payload)).await;
        let mut st = self.state.write().await;
        st.filing = false;
        match result {
            Ok(created) => {
                tracing::info!(fir_id = %created.report_id, "FIR registered");
                let fir = FirSummary {
                    status: FirStatus::Active,
                    fullname: Some(payload.fullname),
                    offence_type: Some(payload.offence_type),
                    incident_location: Some(payload.incident_location),
                    case_narrative: Some(payload.case_narrative),
                    incident_date: Some(payload.incident_date),
                    created_at: Some(chrono::Utc::now().to_rfc3339()),
                    ..FirSummary::with_id(created.report_id)
                };
                st.active.insert(0, fir.clone());
                st.all.insert(0, fir.clone());
                st.wizard.reset();
                st.wizard_open = false;
                Ok(fir)
            }
            Err(e) => {
                drop(st);
                report(self.prompter.as_ref(), &e);
                Err(e)
            }
        }
    }

    // ==================== Search ====================

    /// Search FIRs. A blank query clears the results without a call.
    pub async fn search(&self, query: &str) -> Result<usize> {
        let query = query.trim().to_string();
        {
            let mut st = self.state.write().await;
            st.search_query = query.clone();
            if query.is_empty() {
                st.search_results = None;
                return Ok(0);
            }
        }

        let result = self.scope.run(self.routes.search(&query)).await;
        let mut st = self.state.write().await;
        if st.search_query != query {
            // A newer search replaced this one
            return Ok(0);
        }
        match result {
            Ok(rows) => {
                let count = rows.len();
                st.search_results = Some(rows);
                Ok(count)
            }
            Err(e) => {
                st.search_results = Some(Vec::new());
                drop(st);
                report(self.prompter.as_ref(), &e);
                Err(e)
            }
        }
    }

    // ==================== Detail ====================

    pub async fn open_detail(&self, fir_id: &str) -> Result<()> {
        let ticket = {
            let mut st = self.state.write().await;
            let row = st
                .find(fir_id)
                .cloned()
                .unwrap_or_else(|| FirSummary::with_id(fir_id));
            st.detail.open(row)
        };
        self.fetch_detail(fir_id, ticket).await
    }

    async fn fetch_detail(&self, fir_id: &str, ticket: u64) -> Result<()> {
        let result = self.scope.run(self.routes.fir_details(fir_id)).await;
        let mut st = self.state.write().await;
        match result {
            Ok(record) => {
                st.detail.apply(ticket, record);
                Ok(())
            }
            Err(e) => {
                st.detail.fail(ticket, e.user_message());
                Err(e)
            }
        }
    }

    pub async fn close_detail(&self) {
        self.state.write().await.detail.close();
    }

    /// Append progress to the open FIR, then reload its detail.
    pub async fn add_progress(&self, draft: &ProgressDraft) -> Result<()> {
        let (fir_id, closed) = {
            let st = self.state.read().await;
            let fir_id = st
                .detail
                .selected_id()
                .map(str::to_string)
                .ok_or(ClientError::NothingSelected)?;
            (fir_id, st.detail.is_closed())
        };
        if closed {
            let err = ClientError::from(ValidationError::new(CLOSED_FIR_MESSAGE));
            report(self.prompter.as_ref(), &err);
            return Err(err);
        }

        let update = match draft.to_update(&fir_id) {
            Ok(update) => update,
            Err(e) => {
                let err = ClientError::from(e);
                report(self.prompter.as_ref(), &err);
                return Err(err);
            }
        };

        if let Err(e) = self.scope.run(self.routes.add_progress(&update)).await {
            report(self.prompter.as_ref(), &e);
            return Err(e);
        }
        tracing::info!(fir_id = %fir_id, "Progress added");

        let ticket = self.state.write().await.detail.reload();
        match ticket {
            Some(ticket) => self.fetch_detail(&fir_id, ticket).await,
            None => Ok(()),
        }
    }

    /// Close the open FIR after confirmation. Returns false if the user
    /// declined.
    ///
    /// On success the FIR leaves the active list, goes to the top of the
    /// closed list, is marked closed in "all" and the detail view closes.
    pub async fn close_selected(&self) -> Result<bool> {
        let selected = self
            .state
            .read()
            .await
            .detail
            .selected
            .clone()
            .ok_or(ClientError::NothingSelected)?;

        if self.state.read().await.detail.is_closed() {
            let err = ClientError::from(ValidationError::new(CLOSED_FIR_MESSAGE));
            report(self.prompter.as_ref(), &err);
            return Err(err);
        }

        if !self.prompter.confirm(CLOSE_CONFIRMATION) {
            return Ok(false);
        }

        if let Err(e) = self.scope.run(self.routes.close_fir(&selected.fir_id)).await {
            report(self.prompter.as_ref(), &e);
            return Err(e);
        }
        tracing::info!(fir_id = %selected.fir_id, "FIR closed");

        let mut st = self.state.write().await;
        st.active.retain(|f| f.fir_id != selected.fir_id);
        if !st.closed.iter().any(|f| f.fir_id == selected.fir_id) {
            st.closed.insert(
                0,
                FirSummary {
                    status: FirStatus::Closed,
                    ..selected.clone()
                },
            );
        }
        for fir in st.all.iter_mut().filter(|f| f.fir_id == selected.fir_id) {
            fir.status = FirStatus::Closed;
        }
        if st.detail.selected_id() == Some(selected.fir_id.as_str()) {
            st.detail.close();
        }
        Ok(true)
    }

    // ==================== Rendering ====================

    pub async fn render(&self) -> String {
        let st = self.state.read().await;
        let mut out = String::from("Digital Police Station | Police\n");
        let _ = writeln!(out, "On Duty:    {}", self.officer.name);
        let _ = writeln!(out, "Member ID:  {}", self.officer.member_id);
        let _ = writeln!(out, "Station ID: {}\n", self.officer.station_id);

        if let Some(error) = &st.error {
            let _ = writeln!(out, "Error: {}\n", error);
        }

        if st.loading && st.all.is_empty() {
            out.push_str("Loading station FIRs...\n");
        } else {
            out.push_str(&render_list("Active FIRs", &st.active, "No active FIRs.", false));
            out.push_str(&render_list("Closed FIRs", &st.closed, "No closed FIRs.", false));
            out.push_str(&render_list(
                "All Station FIRs",
                &st.all,
                "No FIRs for this station.",
                true,
            ));
        }

        let _ = writeln!(out, "== Station Members ({}) ==", st.members.len());
        if st.members.is_empty() {
            let message = if st.members_loading { "Loading..." } else { "No members found." };
            let _ = writeln!(out, "  {}", message);
        }
        for member in &st.members {
            let _ = writeln!(out, "  {}", member.name);
        }

        if let Some(results) = &st.search_results {
            let title = format!("Search Results for \"{}\"", st.search_query);
            out.push_str(&render_list(&title, results, "No results.", true));
        }

        if st.wizard_open {
            let step = st.wizard.step();
            let _ = writeln!(
                out,
                "\nFiling FIR: step {}/{} ({})",
                step.index() + 1,
                WizardStep::ALL.len(),
                step.title()
            );
        }

        if let Some(detail) = st.detail.render() {
            out.push('\n');
            out.push_str(&detail);
        }
        out
    }

    pub fn unmount(self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_omits_blank_fields() {
        let draft = ProgressDraft {
            progress_text: "  Initial update ".into(),
            ..Default::default()
        };
        let update = draft.to_update("act-1").unwrap();
        assert_eq!(update.progress_text.as_deref(), Some("Initial update"));
        assert!(update.evidence_text.is_none());
        assert!(update.culprit.is_none());
    }

    #[test]
    fn test_draft_culprit_block() {
        let mut draft = ProgressDraft {
            culprit_open: true,
            ..Default::default()
        };
        // An open but blank culprit block is dropped
        assert!(draft.to_update("x").unwrap().culprit.is_none());

        draft.culprit_name = "Suspect".into();
        draft.culprit_age = "31".into();
        let culprit = draft.to_update("x").unwrap().culprit.unwrap();
        assert_eq!(culprit.name.as_deref(), Some("Suspect"));
        assert_eq!(culprit.age, Some(31));

        draft.culprit_age = "old".into();
        assert_eq!(
            draft.to_update("x").unwrap_err().message,
            "Culprit age must be a number."
        );
    }

    #[test]
    fn test_closed_culprit_block_is_ignored() {
        let draft = ProgressDraft {
            culprit_name: "Ignored".into(),
            ..Default::default()
        };
        assert!(draft.to_update("x").unwrap().culprit.is_none());
    }
}
