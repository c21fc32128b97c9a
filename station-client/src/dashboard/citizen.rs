//! Citizen dashboard: own FIRs, detail view and the escalation form.

use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{render_list, report, DetailView};
use crate::error::{ClientError, Result, ValidationError};
use crate::prompt::Prompter;
use crate::routes::RouteService;
use crate::session::{Profile, Session};
use crate::task::TaskScope;
use crate::types::{EscalationReceipt, EscalationRequest, FirSummary};

/// Escalation input. The aadhar number is filled from the session and is
/// not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationForm {
    pub fir_id: String,
    pub reason: String,
    aadhar_no: String,
}

impl EscalationForm {
    fn new(aadhar_no: String) -> Self {
        Self {
            aadhar_no,
            ..Default::default()
        }
    }

    pub fn aadhar_no(&self) -> &str {
        &self.aadhar_no
    }

    fn request(&self) -> std::result::Result<EscalationRequest, ValidationError> {
        let fir_id = self.fir_id.trim();
        let reason = self.reason.trim();
        if fir_id.is_empty() || reason.is_empty() {
            return Err(ValidationError::new("FIR ID and reason are required"));
        }
        Ok(EscalationRequest {
            fir_id: fir_id.to_string(),
            reason: reason.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitizenState {
    pub firs: Vec<FirSummary>,
    pub loading: bool,
    pub error: Option<String>,
    pub detail: DetailView,
    pub escalation: EscalationForm,
}

pub struct CitizenDashboard {
    routes: RouteService,
    prompter: Arc<dyn Prompter>,
    scope: TaskScope,
    state: Arc<RwLock<CitizenState>>,
    aadhar_no: String,
}

impl CitizenDashboard {
    /// Mount for the signed-in citizen and start loading their FIRs.
    ///
    /// Must be called inside a tokio runtime.
    pub fn mount(routes: RouteService, prompter: Arc<dyn Prompter>) -> Result<Self> {
        let Some(Session {
            profile: Profile::Citizen { aadhar_no, .. },
            ..
        }) = routes.session().load()
        else {
            return Err(ClientError::NotSignedIn);
        };

        let state = CitizenState {
            loading: true,
            escalation: EscalationForm::new(aadhar_no.clone()),
            ..Default::default()
        };
        let dashboard = Self {
            routes,
            prompter,
            scope: TaskScope::new(),
            state: Arc::new(RwLock::new(state)),
            aadhar_no,
        };
        dashboard.refresh();
        Ok(dashboard)
    }

    /// Reload "My FIRs" in the background.
    pub fn refresh(&self) {
        let routes = self.routes.clone();
        let state = self.state.clone();
        let aadhar_no = self.aadhar_no.clone();
        let cancel = self.scope.token();

        self.scope.spawn(async move {
            state.write().await.loading = true;
            let result = routes.list_by_aadhar(&aadhar_no).await;
            if cancel.is_cancelled() {
                return;
            }
            let mut st = state.write().await;
            st.loading = false;
            match result {
                Ok(firs) => {
                    tracing::debug!(count = firs.len(), "Loaded citizen FIRs");
                    st.firs = firs;
                    st.error = None;
                }
                Err(e) => {
                    tracing::warn!("Failed to load citizen FIRs: {}", e);
                    st.error = Some(e.user_message());
                }
            }
        });
    }

    /// Wait for background loads to finish.
    pub async fn settle(&self) {
        self.scope.settle().await;
    }

    pub async fn snapshot(&self) -> CitizenState {
        self.state.read().await.clone()
    }

    /// Select a FIR and fetch its detail.
    pub async fn open_detail(&self, fir_id: &str) -> Result<()> {
        let ticket = {
            let mut st = self.state.write().await;
            let row = st
                .firs
                .iter()
                .find(|f| f.fir_id == fir_id)
                .cloned()
                .unwrap_or_else(|| FirSummary::with_id(fir_id));
            st.detail.open(row)
        };

        let result = self.scope.run(self.routes.fir_detail(fir_id)).await;
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

    pub async fn set_escalation_fir(&self, fir_id: &str) {
        self.state.write().await.escalation.fir_id = fir_id.to_string();
    }

    pub async fn set_escalation_reason(&self, reason: &str) {
        self.state.write().await.escalation.reason = reason.to_string();
    }

    /// Copy the open FIR's id into the escalation form.
    pub async fn use_selected_for_escalation(&self) -> Result<String> {
        let mut st = self.state.write().await;
        let fir_id = st
            .detail
            .selected_id()
            .map(str::to_string)
            .ok_or(ClientError::NothingSelected)?;
        st.escalation.fir_id = fir_id.clone();
        Ok(fir_id)
    }

    /// Send the escalation form. Only `{fir_id, reason}` goes over the wire.
    pub async fn submit_escalation(&self) -> Result<EscalationReceipt> {
        let request = self.state.read().await.escalation.request();
        let request = match request {
            Ok(request) => request,
            Err(e) => {
                let err = ClientError::from(e);
                report(self.prompter.as_ref(), &err);
                return Err(err);
            }
        };

        match self.scope.run(self.routes.escalate_fir(&request)).await {
            Ok(receipt) => {
                tracing::info!(fir_id = %request.fir_id, "Escalation submitted");
                let mut st = self.state.write().await;
                st.escalation.fir_id.clear();
                st.escalation.reason.clear();
                drop(st);
                self.prompter.alert("Escalation submitted.");
                Ok(receipt)
            }
            Err(e) => {
                report(self.prompter.as_ref(), &e);
                Err(e)
            }
        }
    }

    pub async fn render(&self) -> String {
        let st = self.state.read().await;
        let mut out = String::from("Digital Police Station | Citizen\n");
        let _ = writeln!(out, "Aadhar: {}\n", self.aadhar_no);

        if st.loading && st.firs.is_empty() {
            out.push_str("== My FIRs ==\n  Loading...\n");
        } else {
            out.push_str(&render_list("My FIRs", &st.firs, "No FIRs found.", true));
        }
        if let Some(error) = &st.error {
            let _ = writeln!(out, "  Error: {}", error);
        }

        if let Some(detail) = st.detail.render() {
            out.push('\n');
            out.push_str(&detail);
        }

        out.push_str("\n== Escalate Case ==\n");
        let _ = writeln!(out, "  FIR ID:  {}", st.escalation.fir_id);
        let _ = writeln!(out, "  Reason:  {}", st.escalation.reason);
        let _ = writeln!(out, "  Aadhar:  {} (read-only)", st.escalation.aadhar_no());
        out
    }

    /// Tear down; in-flight loads are cancelled.
    pub fn unmount(self) {
        self.scope.cancel();
    }
}
