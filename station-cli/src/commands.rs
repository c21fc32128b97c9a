//! Command execution
//!
//! Each command drives the same view models a screen would: the login form,
//! the router guard and the role dashboards. Output is the rendered text.

use anyhow::{anyhow, bail};
use std::fmt::Write as _;
use std::sync::Arc;

use station_client::dashboard::{render_detail, render_list};
use station_client::{
    display_timestamp, CitizenDashboard, ClientError, EscalationFilter, EscalationStatus,
    GovernmentDashboard, LoginMode, LoginOutcome, LoginScreen, PoliceDashboard, Profile,
    ProgressDraft, Prompter, Role, RouteService, Screen, ViewRouter,
};

use crate::cli::{Commands, CredentialArgs, FileArgs, FirCommands, ProgressArgs};

/// Everything a command needs to talk to the backend and the user
pub struct Context {
    routes: RouteService,
    prompter: Arc<dyn Prompter>,
}

impl Context {
    pub fn new(routes: RouteService, prompter: Arc<dyn Prompter>) -> Self {
        Self { routes, prompter }
    }

    fn router(&self) -> ViewRouter {
        ViewRouter::new(self.routes.gateway())
    }

    /// Fail unless the stored session belongs to `role`.
    fn require(&self, role: Role) -> anyhow::Result<()> {
        let mut router = self.router();
        if router.navigate(Screen::for_role(role).path()) == Screen::Login {
            bail!(
                "This command needs a {} session. Run `station login --role {}` first.",
                role,
                role
            );
        }
        Ok(())
    }
}

/// Turn a client error into the message the user sees.
fn failed(err: ClientError) -> anyhow::Error {
    if err.is_unauthenticated() {
        anyhow!("Session expired. Run `station login` again.")
    } else {
        anyhow!(err.user_message())
    }
}

/// Execute a command and return its output
pub async fn execute_command(ctx: &Context, command: Commands) -> anyhow::Result<String> {
    match command {
        Commands::Login(args) => authenticate(ctx, LoginMode::Login, args).await,
        Commands::Register(args) => authenticate(ctx, LoginMode::Register, args).await,

        Commands::Logout => {
            ctx.router().logout()?;
            Ok("Signed out.".to_string())
        }

        Commands::Whoami => match ctx.routes.session().load() {
            None => Ok("Not signed in.".to_string()),
            Some(session) => {
                let mut out = format!("Role: {}\n", session.role());
                match &session.profile {
                    Profile::Citizen { aadhar_no, .. } => {
                        let _ = writeln!(out, "Aadhar: {}", aadhar_no);
                    }
                    Profile::Police {
                        police_member_id,
                        station_id,
                        name,
                    } => {
                        let _ = writeln!(out, "Name: {}", name);
                        let _ = writeln!(out, "Member ID: {}", police_member_id);
                        let _ = writeln!(out, "Station ID: {}", station_id);
                    }
                    Profile::Government { .. } => {
                        let member = session
                            .government_member_id()
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| "—".to_string());
                        let _ = writeln!(out, "Government Member ID: {}", member);
                    }
                }
                Ok(out.trim_end().to_string())
            }
        },

        Commands::Dashboard => show_dashboard(ctx).await,

        Commands::Fir(fir_cmd) => execute_fir_command(ctx, fir_cmd).await,

        Commands::Escalate { fir_id, reason } => {
            ctx.require(Role::Citizen)?;
            let dash = CitizenDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            dash.set_escalation_fir(&fir_id).await;
            dash.set_escalation_reason(&reason).await;
            let result = dash.submit_escalation().await;
            dash.unmount();
            let receipt = result.map_err(failed)?;
            Ok(format!("Escalation recorded for FIR #{}", receipt.fir_id))
        }

        Commands::Escalations { status } => {
            ctx.require(Role::Government)?;
            let filter = match status.trim() {
                "" | "all" => EscalationFilter::All,
                other => EscalationFilter::Only(
                    other.parse::<EscalationStatus>().map_err(|e| anyhow!(e))?,
                ),
            };
            let escalations = ctx.routes.escalations(filter).await.map_err(failed)?;

            let mut out = format!("== Escalations ({}) ==\n", escalations.len());
            if escalations.is_empty() {
                out.push_str("  No escalations.\n");
            }
            for esc in &escalations {
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
                let _ = writeln!(out, "    {}", esc.reason);
            }
            Ok(out.trim_end().to_string())
        }

        Commands::EscalationStatus { id, status } => {
            ctx.require(Role::Government)?;
            let dash = GovernmentDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            let result = dash.set_escalation_status(id, status).await;
            dash.unmount();
            let updated = result.map_err(failed)?;
            Ok(format!(
                "Escalation {} is now {}",
                updated.id,
                updated.status.as_str()
            ))
        }

        Commands::RegionSearch { region } => {
            ctx.require(Role::Government)?;
            let dash = GovernmentDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            let result = dash.search_region(&region).await;
            let state = dash.snapshot().await;
            dash.unmount();
            result.map_err(failed)?;

            let results = state.region_results.unwrap_or_default();
            let mut out = format!("== Region \"{}\" ({}) ==\n", state.region_query, results.len());
            if results.is_empty() {
                out.push_str("  No results.\n");
            }
            for fir in &results {
                let _ = writeln!(
                    out,
                    "  {} — {} • {} {}",
                    fir.offence_type, fir.fullname, fir.incident_date, fir.incident_location
                );
            }
            Ok(out.trim_end().to_string())
        }
    }
}

async fn authenticate(
    ctx: &Context,
    mode: LoginMode,
    args: CredentialArgs,
) -> anyhow::Result<String> {
    let mut login = LoginScreen::new(ctx.routes.clone());
    login.select_role(args.role);
    login.set_mode(mode);
    login.form.password = args.password.unwrap_or_default();
    login.form.aadhar_no = args.aadhar.unwrap_or_default();
    login.form.name = args.name.unwrap_or_default();
    login.form.station_id = args.station_id.unwrap_or_default();
    login.form.member_id = args.member_id.unwrap_or_default();
    login.form.government_member_id = args.government_member_id.unwrap_or_default();

    match login.submit().await.map_err(failed)? {
        LoginOutcome::SignedIn(role) => {
            let screen = ctx.router().on_authenticated();
            Ok(format!("Signed in as {}. Dashboard: {}", role, screen.path()))
        }
        LoginOutcome::Registered { notice } => Ok(notice),
    }
}

async fn show_dashboard(ctx: &Context) -> anyhow::Result<String> {
    let mut router = ctx.router();
    let routes = ctx.routes.clone();
    let prompter = ctx.prompter.clone();

    let output = match router.restore() {
        Screen::Login => bail!("Not signed in. Run `station login` first."),
        Screen::Citizen => {
            let dash = CitizenDashboard::mount(routes, prompter).map_err(failed)?;
            dash.settle().await;
            let text = dash.render().await;
            dash.unmount();
            text
        }
        Screen::Police => {
            let dash = PoliceDashboard::mount(routes, prompter).map_err(failed)?;
            dash.settle().await;
            let text = dash.render().await;
            dash.unmount();
            text
        }
        Screen::Government => {
            let dash = GovernmentDashboard::mount(routes, prompter).map_err(failed)?;
            dash.settle().await;
            let text = dash.render().await;
            dash.unmount();
            text
        }
    };

    if router.poll_events() == Some(Screen::Login) {
        bail!("Session expired. Run `station login` again.");
    }
    Ok(output.trim_end().to_string())
}

async fn execute_fir_command(ctx: &Context, command: FirCommands) -> anyhow::Result<String> {
    match command {
        FirCommands::Show { fir_id } => {
            let session = ctx
                .routes
                .session()
                .load()
                .ok_or_else(|| anyhow!("Not signed in. Run `station login` first."))?;
            let detail = match session.role() {
                Role::Citizen => ctx.routes.fir_detail(&fir_id).await,
                Role::Police | Role::Government => ctx.routes.fir_details(&fir_id).await,
            }
            .map_err(failed)?;
            Ok(render_detail(&detail).trim_end().to_string())
        }

        FirCommands::File(args) => {
            ctx.require(Role::Police)?;
            file_fir(ctx, &args).await
        }

        FirCommands::Progress(args) => {
            ctx.require(Role::Police)?;
            let draft = progress_draft(&args);
            let dash = PoliceDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            let result: station_client::Result<()> = async {
                dash.open_detail(&args.fir_id).await?;
                dash.add_progress(&draft).await
            }
            .await;
            let detail = dash.snapshot().await.detail.render();
            dash.unmount();
            result.map_err(failed)?;
            Ok(detail
                .unwrap_or_else(|| format!("Progress added to FIR #{}", args.fir_id))
                .trim_end()
                .to_string())
        }

        FirCommands::Close { fir_id } => {
            ctx.require(Role::Police)?;
            let dash = PoliceDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            let result: station_client::Result<bool> = async {
                dash.open_detail(&fir_id).await?;
                dash.close_selected().await
            }
            .await;
            dash.unmount();
            if result.map_err(failed)? {
                Ok(format!("FIR #{} closed.", fir_id))
            } else {
                Ok("Cancelled.".to_string())
            }
        }

        FirCommands::Search { query } => {
            ctx.require(Role::Police)?;
            let dash = PoliceDashboard::mount(ctx.routes.clone(), ctx.prompter.clone())
                .map_err(failed)?;
            let result = dash.search(&query).await;
            let state = dash.snapshot().await;
            dash.unmount();
            result.map_err(failed)?;

            let rows = state.search_results.unwrap_or_default();
            Ok(render_list(
                &format!("Search Results for \"{}\"", state.search_query),
                &rows,
                "No results.",
                true,
            )
            .trim_end()
            .to_string())
        }
    }
}

/// Walk the filing wizard step by step, then submit.
async fn file_fir(ctx: &Context, args: &FileArgs) -> anyhow::Result<String> {
    let dash =
        PoliceDashboard::mount(ctx.routes.clone(), ctx.prompter.clone()).map_err(failed)?;
    dash.open_wizard().await;
    for (name, value) in args.fields() {
        dash.set_filing_field(name, value).await;
    }

    let result: station_client::Result<_> = async {
        dash.wizard_next().await?;
        dash.wizard_next().await?;
        dash.submit_filing().await
    }
    .await;
    dash.unmount();

    let fir = result.map_err(failed)?;
    Ok(format!("FIR registered: #{}\n{}", fir.fir_id, fir.headline()))
}

fn progress_draft(args: &ProgressArgs) -> ProgressDraft {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let culprit = [
        &args.culprit_name,
        &args.culprit_age,
        &args.culprit_gender,
        &args.culprit_address,
        &args.culprit_marks,
        &args.culprit_custody,
        &args.culprit_details,
        &args.culprit_location,
    ];

    ProgressDraft {
        progress_text: text(&args.text),
        evidence_text: text(&args.evidence),
        evidence_photos: text(&args.photos),
        witness_info: text(&args.witness),
        other_info: text(&args.other),
        culprit_open: culprit.iter().any(|v| v.is_some()),
        culprit_name: text(&args.culprit_name),
        culprit_age: text(&args.culprit_age),
        culprit_gender: text(&args.culprit_gender),
        culprit_address: text(&args.culprit_address),
        culprit_identity_marks: text(&args.culprit_marks),
        culprit_custody_status: text(&args.culprit_custody),
        culprit_details: text(&args.culprit_details),
        culprit_last_known_location: text(&args.culprit_location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use station_client::{ApiConfig, GatewayClient, ScriptedPrompter, SessionStore};

    fn offline_context() -> Context {
        let gateway = GatewayClient::new(&ApiConfig::default(), SessionStore::in_memory()).unwrap();
        Context::new(
            RouteService::new(gateway),
            Arc::new(ScriptedPrompter::new()),
        )
    }

    fn progress_args() -> ProgressArgs {
        ProgressArgs {
            fir_id: "abc-123".into(),
            text: Some("Suspect identified".into()),
            evidence: None,
            photos: None,
            witness: None,
            other: None,
            culprit_name: None,
            culprit_age: None,
            culprit_gender: None,
            culprit_address: None,
            culprit_marks: None,
            culprit_custody: None,
            culprit_details: None,
            culprit_location: None,
        }
    }

    #[test]
    fn test_culprit_block_opens_only_when_given() {
        let draft = progress_draft(&progress_args());
        assert!(!draft.culprit_open);
        assert_eq!(draft.progress_text, "Suspect identified");

        let mut args = progress_args();
        args.culprit_age = Some("31".into());
        let update = progress_draft(&args).to_update("abc-123").unwrap();
        assert_eq!(update.culprit.and_then(|c| c.age), Some(31));
    }

    #[tokio::test]
    async fn test_whoami_without_session() {
        let ctx = offline_context();
        assert_eq!(
            execute_command(&ctx, Commands::Whoami).await.unwrap(),
            "Not signed in."
        );
    }

    #[tokio::test]
    async fn test_role_commands_need_session() {
        let ctx = offline_context();
        let err = execute_command(
            &ctx,
            Commands::Escalations {
                status: "all".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("needs a government session"));

        let err = execute_command(&ctx, Commands::Dashboard).await.unwrap_err();
        assert!(err.to_string().contains("Not signed in"));
    }
}
