//! Government dashboard: escalations, all FIRs across stations and region
//! search.

use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{render_list, report, DetailView};
use crate::error::{ClientError, Result, ValidationError};
use crate::prompt::Prompter;
use crate::routes::RouteService;
use crate::session::Role;
use crate::task::TaskScope;
use crate::types::{
    display_timestamp, Escalation, EscalationFilter, EscalationStatus, FirCreate, FirSummary,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GovernmentState {
    pub escalations: Vec<Escalation>,
    pub firs: Vec<FirSummary>,
    pub escalations_loading: bool,
    pub firs_loading: bool,
    pub escalations_error: Option<String>,
    pub firs_error: Option<String>,
    pub detail: DetailView,
    /// Reason of the escalation the open detail was reached from
    pub escalation_reason: Option<String>,
    pub region_query: String,
    /// `None` until a region search has been run
    pub region_results: Option<Vec<FirCreate>>,
}

pub struct GovernmentDashboard {
    routes: RouteService,
    prompter: Arc<dyn Prompter>,
    scope: TaskScope,
    state: Arc<RwLock<GovernmentState>>,
    member_id: Option<i64>,
}

impl GovernmentDashboard {
    /// Mount for the signed-in official and start loading escalations and
    /// FIRs.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(routes: RouteService, prompter: Arc<dyn Prompter>) -> Result<Self> {
        let session = routes
            .session()
            .load()
            .filter(|s| s.role() == Role::Government)
            .ok_or(ClientError::NotSignedIn)?;

        let state = GovernmentState {
            escalations_loading: true,
            firs_loading: true,
            ..Default::default()
        };
        let dashboard = Self {
            routes,
            prompter,
            scope: TaskScope::new(),
            state: Arc::new(RwLock::new(state)),
            member_id: session.government_member_id(),
        };
        dashboard.refresh();
        Ok(dashboard)
    }

    /// Government member id for the profile menu, or "—" when unknown.
    pub fn member_label(&self) -> String {
        self.member_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "—".to_string())
    }

    pub fn refresh(&self) {
        let routes = self.routes.clone();
        let state = self.state.clone();
        let cancel = self.scope.token();
        self.scope.spawn(async move {
            state.write().await.escalations_loading = true;
            let result = routes.escalations(EscalationFilter::All).await;
            if cancel.is_cancelled() {
                return;
            }
            let mut st = state.write().await;
            st.escalations_loading = false;
            match result {
                Ok(escalations) => {
                    tracing::debug!(count = escalations.len(), "Loaded escalations");
                    st.escalations = escalations;
                    st.escalations_error = None;
                }
                Err(e) => {
                    tracing::warn!("Failed to load escalations: {}", e);
                    st.escalations_error = Some(e.user_message());
                }
            }
        });

        let routes = self.routes.clone();
        let state = self.state.clone();
        let cancel = self.scope.token();
        self.scope.spawn(async move {
            state.write().await.firs_loading = true;
            let result = routes.list_all().await;
            if cancel.is_cancelled() {
                return;
            }
            let mut st = state.write().await;
            st.firs_loading = false;
            match result {
                Ok(firs) => {
                    tracing::debug!(count = firs.len(), "Loaded all FIRs");
                    st.firs = firs;
                    st.firs_error = None;
                }
                Err(e) => {
                    tracing::warn!("Failed to load FIRs: {}", e);
                    st.firs_error = Some(e.user_message());
                }
            }
        });
    }

    pub async fn settle(&self) {
        self.scope.settle().await;
    }

    pub async fn snapshot(&self) -> GovernmentState {
        self.state.read().await.clone()
    }

    /// Open a FIR from the "All FIRs" list.
    pub async fn open_fir(&self, fir_id: &str) -> Result<()> {
        self.open(fir_id, None).await
    }

    /// Open the FIR behind an escalation, showing the escalation reason.
    pub async fn open_escalation(&self, escalation_id: i64) -> Result<()> {
        let escalation = self
            .state
            .read()
            .await
            .escalations
            .iter()
            .find(|e| e.id == escalation_id)
            .cloned();
        let Some(escalation) = escalation else {
            return Err(ValidationError::new(format!(
                "Escalation {} not found",
                escalation_id
            ))
            .into());
        };
        self.open(&escalation.fir_id, Some(escalation.reason)).await
    }

    async fn open(&self, fir_id: &str, reason: Option<String>) -> Result<()> {
        let ticket = {
            let mut st = self.state.write().await;
            let row = st
                .firs
                .iter()
                .find(|f| f.fir_id == fir_id)
                .cloned()
                .unwrap_or_else(|| FirSummary::with_id(fir_id));
            st.escalation_reason = reason;
            st.detail.open(row)
        };

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
        let mut st = self.state.write().await;
        st.detail.close();
        st.escalation_reason = None;
    }

    /// Move an escalation to a new review status.
    pub async fn set_escalation_status(
        &self,
        escalation_id: i64,
        status: EscalationStatus,
    ) -> Result<Escalation> {
        match self
            .scope
            .run(self.routes.update_escalation_status(escalation_id, status))
            .await
        {
            Ok(updated) => {
                tracing::info!(escalation_id, status = status.as_str(), "Escalation updated");
                let mut st = self.state.write().await;
                if let Some(slot) = st.escalations.iter_mut().find(|e| e.id == updated.id) {
                    *slot = updated.clone();
                }
                Ok(updated)
            }
            Err(e) => {
                report(self.prompter.as_ref(), &e);
                Err(e)
            }
        }
    }

    /// Search FIRs by region. A blank region clears the results without a
    /// call.
    pub async fn search_region(&self, region: &str) -> Result<usize> {
        let region = region.trim().to_string();
        {
            let mut st = self.state.write().await;
            st.region_query = region.clone();
            if region.is_empty() {
                st.region_results = None;
                return Ok(0);
            }
        }

        let result = self.scope.run(self.routes.government_search_fir(&region)).await;
        let mut st = self.state.write().await;
        if st.region_query != region {
            return Ok(0);
        }
        match result {
            Ok(found) => {
                let count = found.fir.len();
                st.region_results = Some(found.fir);
                Ok(count)
            }
            Err(e) => {
                st.region_results = Some(Vec::new());
                drop(st);
                report(self.prompter.as_ref(), &e);
                Err(e)
            }
        }
    }

    pub async fn render(&self) -> String {
        let st = self.state.read().await;
        let mut out = String::from("Digital Police Station | Government\n");
        let _ = writeln!(out, "Government Member ID: {}\n", self.member_label());

        for error in st.escalations_error.iter().chain(&st.firs_error) {
            let _ = writeln!(out, "Error: {}\n", error);
        }

        let _ = writeln!(out, "== Escalations ({}) ==", st.escalations.len());
        if st.escalations.is_empty() {
            let message = if st.escalations_loading { "Loading..." } else { "No escalations." };
            let _ = writeln!(out, "  {}", message);
        }
        for esc in &st.escalations {
            let when = esc
                .created_at
                .as_deref()
                .map(display_timestamp)
                .unwrap_or_else(|| "—".to_string());
            let _ = writeln!(
                out,
                "  [{}] FIR #{} • {} • {}",
                esc.id,
                esc.fir_id,
                esc.status.as_str().to_uppercase(),
                when
            );
            let _ = writeln!(out, "    Aadhar {}: {}", esc.aadhar_no, esc.reason);
        }

        if st.firs_loading && st.firs.is_empty() {
            out.push_str("== All FIRs (All Stations) ==\n  Loading...\n");
        } else {
            out.push_str(&render_list(
                "All FIRs (All Stations)",
                &st.firs,
                "No FIRs found.",
                true,
            ));
        }

        if let Some(results) = &st.region_results {
            let _ = writeln!(
                out,
                "== Region \"{}\" ({}) ==",
                st.region_query,
                results.len()
            );
            if results.is_empty() {
                out.push_str("  No results.\n");
            }
            for fir in results {
                let _ = writeln!(out, "  {} — {}", fir.offence_type, fir.fullname);
                let _ = writeln!(out, "    {} • {}", fir.incident_location, fir.incident_date);
            }
        }

        if let Some(detail) = st.detail.render() {
            out.push('\n');
            out.push_str(&detail);
            if let Some(reason) = &st.escalation_reason {
                let _ = writeln!(out, "Escalation Reason\n  {}", reason);
            }
        }
        out
    }

    pub fn unmount(self) {
        self.scope.cancel();
    }
}
