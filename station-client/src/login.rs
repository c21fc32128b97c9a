//! Login screen: role selector, login/register mode and credential submit.

use crate::error::{ClientError, Result, ValidationError};
use crate::routes::RouteService;
use crate::session::Role;
use crate::types::{
    CitizenCredentials, GovernmentCredentials, NewPoliceMember, PoliceCredentials,
};

/// Shown when a government account is created but the server neither signs
/// it in nor returns its id.
pub const GOVERNMENT_PENDING_NOTICE: &str = "Government account created successfully, but server did not return credentials/token. Please contact admin for verification.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginMode {
    #[default]
    Login,
    Register,
}

/// Raw credential input; which fields matter depends on role and mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub aadhar_no: String,
    pub password: String,
    pub name: String,
    pub station_id: String,
    pub member_id: String,
    pub government_member_id: String,
}

/// What a successful submit led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A session for this role is now stored
    SignedIn(Role),
    /// Account created but not signed in; stay on the login screen
    Registered { notice: String },
}

/// Validated request, ready to send
#[derive(Debug, Clone, PartialEq)]
enum Submission {
    CitizenLogin(CitizenCredentials),
    CitizenRegister(CitizenCredentials),
    PoliceLogin(PoliceCredentials),
    PoliceRegister {
        member: NewPoliceMember,
        fallback_member_id: i64,
    },
    GovernmentLogin(GovernmentCredentials),
    GovernmentRegister(GovernmentCredentials),
}

#[derive(Debug, Clone)]
pub struct LoginScreen {
    routes: RouteService,
    role: Role,
    mode: LoginMode,
    pub form: LoginForm,
}

impl LoginScreen {
    pub fn new(routes: RouteService) -> Self {
        Self {
            routes,
            role: Role::Citizen,
            mode: LoginMode::Login,
            form: LoginForm::default(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn mode(&self) -> LoginMode {
        self.mode
    }

    /// Switch role. Clears the form and returns to login mode.
    pub fn select_role(&mut self, role: Role) {
        self.role = role;
        self.mode = LoginMode::Login;
        self.form = LoginForm::default();
    }

    pub fn set_mode(&mut self, mode: LoginMode) {
        self.mode = mode;
    }

    /// Presence and number checks for the current role and mode.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.submission().map(|_| ())
    }

    fn submission(&self) -> std::result::Result<Submission, ValidationError> {
        let f = &self.form;
        let present = |v: &str| !v.is_empty();

        match (self.role, self.mode) {
            (Role::Citizen, mode) => {
                if !present(&f.aadhar_no) || !present(&f.password) {
                    return Err(ValidationError::new("Aadhar and password are required"));
                }
                let creds = CitizenCredentials {
                    aadhar_no: f.aadhar_no.clone(),
                    password: f.password.clone(),
                };
                Ok(match mode {
                    LoginMode::Login => Submission::CitizenLogin(creds),
                    LoginMode::Register => Submission::CitizenRegister(creds),
                })
            }
            (Role::Police, LoginMode::Register) => {
                if !present(&f.name) || !present(&f.password) || !present(&f.station_id) {
                    return Err(ValidationError::new("Name, password and station ID required"));
                }
                let fallback_member_id = if present(&f.member_id) {
                    parse_id(&f.member_id, "Member ID")?
                } else {
                    0
                };
                Ok(Submission::PoliceRegister {
                    member: NewPoliceMember {
                        name: f.name.clone(),
                        password: f.password.clone(),
                        station_id: parse_id(&f.station_id, "Station ID")?,
                    },
                    fallback_member_id,
                })
            }
            (Role::Police, LoginMode::Login) => {
                if !present(&f.station_id) || !present(&f.member_id) || !present(&f.password) {
                    return Err(ValidationError::new(
                        "Station ID, Member ID and password required",
                    ));
                }
                Ok(Submission::PoliceLogin(PoliceCredentials {
                    station_id: parse_id(&f.station_id, "Station ID")?,
                    member_id: parse_id(&f.member_id, "Member ID")?,
                    password: f.password.clone(),
                }))
            }
            (Role::Government, mode) => {
                if !present(&f.government_member_id) || !present(&f.password) {
                    return Err(ValidationError::new(
                        "Government Member ID and password are required",
                    ));
                }
                let creds = GovernmentCredentials {
                    government_member_id: parse_id(
                        &f.government_member_id,
                        "Government Member ID",
                    )?,
                    password: f.password.clone(),
                };
                Ok(match mode {
                    LoginMode::Login => Submission::GovernmentLogin(creds),
                    LoginMode::Register => Submission::GovernmentRegister(creds),
                })
            }
        }
    }

    /// Validate, then run the login or register flow for the selected role.
    pub async fn submit(&self) -> Result<LoginOutcome> {
        let submission = self.submission()?;
        let routes = &self.routes;
        tracing::info!(role = %self.role, mode = ?self.mode, "Submitting credentials");

        match submission {
            Submission::CitizenLogin(creds) => {
                let auth = routes.citizen_auth(&creds).await?;
                signed_in(Role::Citizen, auth.access_token.is_some())
            }
            Submission::CitizenRegister(creds) => {
                routes.add_citizen(&creds).await?;
                let auth = routes.citizen_auth(&creds).await?;
                signed_in(Role::Citizen, auth.access_token.is_some())
            }
            Submission::PoliceLogin(creds) => {
                let auth = routes.police_auth(&creds).await?;
                signed_in(Role::Police, auth.access_token.is_some())
            }
            Submission::PoliceRegister {
                member,
                fallback_member_id,
            } => {
                let created = routes.add_police_member(&member).await?;
                let creds = PoliceCredentials {
                    station_id: member.station_id,
                    member_id: created
                        .member_id
                        .filter(|id| *id != 0)
                        .unwrap_or(fallback_member_id),
                    password: member.password,
                };
                let auth = routes.police_auth(&creds).await?;
                signed_in(Role::Police, auth.access_token.is_some())
            }
            Submission::GovernmentLogin(creds) => {
                let auth = routes.government_auth(&creds).await?;
                signed_in(Role::Government, auth.access_token.is_some())
            }
            Submission::GovernmentRegister(creds) => {
                let created = routes.add_government(&creds).await?;
                if created.access_token.is_some() {
                    return Ok(LoginOutcome::SignedIn(Role::Government));
                }
                if created.government_id.is_some() {
                    let auth = routes.government_auth(&creds).await?;
                    return signed_in(Role::Government, auth.access_token.is_some());
                }
                tracing::info!("Government account created without credentials");
                Ok(LoginOutcome::Registered {
                    notice: GOVERNMENT_PENDING_NOTICE.to_string(),
                })
            }
        }
    }
}

fn signed_in(role: Role, has_token: bool) -> Result<LoginOutcome> {
    if has_token {
        Ok(LoginOutcome::SignedIn(role))
    } else {
        Err(ClientError::NoToken(role))
    }
}

fn parse_id(raw: &str, label: &str) -> std::result::Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::new(format!("{} must be a number", label)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::gateway::GatewayClient;
    use crate::session::SessionStore;

    fn screen() -> LoginScreen {
        let gateway = GatewayClient::new(&ApiConfig::default(), SessionStore::in_memory()).unwrap();
        LoginScreen::new(RouteService::new(gateway))
    }

    #[test]
    fn test_citizen_requires_aadhar_and_password() {
        let mut login = screen();
        login.form.aadhar_no = "123412341234".into();
        assert_eq!(
            login.validate().unwrap_err().message,
            "Aadhar and password are required"
        );
        login.form.password = "pw".into();
        assert!(login.validate().is_ok());
    }

    #[test]
    fn test_police_messages_depend_on_mode() {
        let mut login = screen();
        login.select_role(Role::Police);
        assert_eq!(
            login.validate().unwrap_err().message,
            "Station ID, Member ID and password required"
        );
        login.set_mode(LoginMode::Register);
        assert_eq!(
            login.validate().unwrap_err().message,
            "Name, password and station ID required"
        );
    }

    #[test]
    fn test_numeric_ids_are_checked() {
        let mut login = screen();
        login.select_role(Role::Police);
        login.form.station_id = "north".into();
        login.form.member_id = "7".into();
        login.form.password = "pw".into();
        assert_eq!(
            login.validate().unwrap_err().message,
            "Station ID must be a number"
        );
    }

    #[test]
    fn test_government_message() {
        let mut login = screen();
        login.select_role(Role::Government);
        login.set_mode(LoginMode::Register);
        login.form.password = "pw".into();
        assert_eq!(
            login.validate().unwrap_err().message,
            "Government Member ID and password are required"
        );
    }

    #[test]
    fn test_select_role_resets_form_and_mode() {
        let mut login = screen();
        login.set_mode(LoginMode::Register);
        login.form.aadhar_no = "1".into();
        login.select_role(Role::Police);
        assert_eq!(login.mode(), LoginMode::Login);
        assert_eq!(login.form, LoginForm::default());
    }
}
