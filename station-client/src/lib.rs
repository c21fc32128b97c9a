//! Client for the Digital Police Station backend
//!
//! Citizens, police officers and government officials sign in against the
//! same REST backend and each get a role-scoped dashboard. This crate holds
//! everything below the screen: the persisted session, the HTTP gateway with
//! its session-expiry handling, one typed function per backend route, the
//! role-guarded router and the dashboard view models.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use station_client::{
//!     ApiConfig, GatewayClient, LoginOutcome, LoginScreen, RouteService, Screen,
//!     ScriptedPrompter, SessionStore, ViewRouter, PoliceDashboard, Role,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayClient::new(&ApiConfig::default(), SessionStore::in_memory())?;
//! let routes = RouteService::new(gateway.clone());
//! let mut router = ViewRouter::new(&gateway);
//!
//! let mut login = LoginScreen::new(routes.clone());
//! login.select_role(Role::Police);
//! login.form.station_id = "9".into();
//! login.form.member_id = "77".into();
//! login.form.password = "secret".into();
//!
//! if let LoginOutcome::SignedIn(_) = login.submit().await? {
//!     assert_eq!(router.on_authenticated(), Screen::Police);
//!     let dashboard = PoliceDashboard::mount(routes, Arc::new(ScriptedPrompter::new()))?;
//!     dashboard.settle().await;
//!     println!("{}", dashboard.render().await);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod login;
pub mod prompt;
pub mod router;
pub mod routes;
pub mod session;
pub mod storage;
pub mod task;
pub mod types;
pub mod wizard;

// Re-export main types
pub use config::{ApiConfig, ClientConfig, SessionConfig};
pub use dashboard::{
    CitizenDashboard, CitizenState, DetailView, GovernmentDashboard, GovernmentState,
    PoliceDashboard, PoliceState, ProgressDraft,
};
pub use error::{ApiError, ClientError, ConfigError, Result, StorageError, ValidationError};
pub use gateway::{GatewayClient, SessionEvent};
pub use login::{LoginForm, LoginMode, LoginOutcome, LoginScreen};
pub use prompt::{Prompter, ScriptedPrompter};
pub use router::{Screen, ViewRouter};
pub use routes::RouteService;
pub use session::{Profile, Role, Session, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use task::TaskScope;
pub use types::*;
pub use wizard::{FilingForm, FilingWizard, WizardStep};
