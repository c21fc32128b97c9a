//! Role-aware view router.
//!
//! Every navigation goes through [`ViewRouter::resolve`]: a dashboard path is
//! entered only when the stored session's role matches it. Anything else (no
//! session, wrong role, unknown path) lands on the login screen. Session
//! invalidation published by the gateway also sends the router back to login.

use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::error::StorageError;
use crate::gateway::{GatewayClient, SessionEvent};
use crate::session::{Role, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Citizen,
    Police,
    Government,
}

impl Screen {
    pub fn path(&self) -> &'static str {
        match self {
            Screen::Login => "/",
            Screen::Citizen => "/citizen",
            Screen::Police => "/police",
            Screen::Government => "/government",
        }
    }

    /// Screen for an exact path. Trailing slashes are ignored.
    pub fn from_path(path: &str) -> Option<Screen> {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" if trimmed.starts_with('/') => "/",
            other => other,
        };
        match normalized {
            "/" => Some(Screen::Login),
            "/citizen" => Some(Screen::Citizen),
            "/police" => Some(Screen::Police),
            "/government" => Some(Screen::Government),
            _ => None,
        }
    }

    /// Dashboard for a signed-in role.
    pub fn for_role(role: Role) -> Screen {
        match role {
            Role::Citizen => Screen::Citizen,
            Role::Police => Screen::Police,
            Role::Government => Screen::Government,
        }
    }

    /// Role needed to enter this screen, if any.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Screen::Login => None,
            Screen::Citizen => Some(Role::Citizen),
            Screen::Police => Some(Role::Police),
            Screen::Government => Some(Role::Government),
        }
    }
}

#[derive(Debug)]
pub struct ViewRouter {
    session: SessionStore,
    events: broadcast::Receiver<SessionEvent>,
    current: Screen,
}

impl ViewRouter {
    /// Router starting on the login screen, listening to `gateway`'s events.
    pub fn new(gateway: &GatewayClient) -> Self {
        Self {
            session: gateway.session().clone(),
            events: gateway.subscribe(),
            current: Screen::Login,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Where a request for `path` ends up given the stored session.
    pub fn resolve(&self, path: &str) -> Screen {
        let Some(screen) = Screen::from_path(path) else {
            tracing::debug!(path, "Unknown path, showing login");
            return Screen::Login;
        };
        match screen.required_role() {
            None => screen,
            Some(required) => match self.session.role() {
                Some(role) if role == required => screen,
                Some(role) => {
                    tracing::warn!(path, %role, "Role not allowed here, showing login");
                    Screen::Login
                }
                None => Screen::Login,
            },
        }
    }

    pub fn navigate(&mut self, path: &str) -> Screen {
        self.current = self.resolve(path);
        tracing::info!(path = self.current.path(), "Navigated");
        self.current
    }

    /// Enter the stored role's dashboard, or the login screen if none.
    pub fn restore(&mut self) -> Screen {
        match self.session.role() {
            Some(role) => self.navigate(Screen::for_role(role).path()),
            None => self.navigate(Screen::Login.path()),
        }
    }

    /// Called after a successful sign-in.
    pub fn on_authenticated(&mut self) -> Screen {
        self.restore()
    }

    /// Clear the session and return to login.
    pub fn logout(&mut self) -> Result<Screen, StorageError> {
        self.session.clear()?;
        Ok(self.navigate(Screen::Login.path()))
    }

    /// Apply pending session events without waiting.
    ///
    /// Returns the new screen when an event moved the router.
    pub fn poll_events(&mut self) -> Option<Screen> {
        let mut moved = None;
        loop {
            match self.events.try_recv() {
                Ok(event) => moved = self.apply(event).or(moved),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Session events lagged");
                    moved = self.recheck().or(moved);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return moved,
            }
        }
    }

    /// Wait for the next session event and apply it.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => {
                    self.apply(event);
                    return Some(event);
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    self.recheck();
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Option<Screen> {
        match event {
            SessionEvent::Invalidated => {
                if self.current == Screen::Login {
                    return None;
                }
                tracing::info!("Session invalidated, returning to login");
                self.current = Screen::Login;
                Some(Screen::Login)
            }
        }
    }

    fn recheck(&mut self) -> Option<Screen> {
        let resolved = self.resolve(self.current.path());
        if resolved != self.current {
            self.current = resolved;
            return Some(resolved);
        }
        None
    }
}
