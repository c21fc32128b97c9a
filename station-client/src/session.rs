//! Persisted identity: bearer token, role and role-specific profile.
//!
//! Stored under two keys of a [`KeyValueStore`]:
//! - `token`: the raw bearer token
//! - `user`: the profile as JSON, tagged with its `role`
//!
//! A session is replaced wholesale on every successful sign-in and removed on
//! logout. Nothing here checks expiry; an expired token surfaces as a 401 on
//! the next call (see [`crate::gateway`]).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, MemoryStore};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Who is signed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Police,
    Government,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Police => "police",
            Role::Government => "government",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "citizen" => Ok(Role::Citizen),
            "police" => Ok(Role::Police),
            "government" => Ok(Role::Government),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Role-specific identity fields derived from the auth response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Profile {
    Citizen {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        citizen_id: Option<i64>,
        aadhar_no: String,
    },
    Police {
        police_member_id: i64,
        station_id: i64,
        #[serde(default)]
        name: String,
    },
    Government {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        government_member_id: Option<i64>,
    },
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Citizen { .. } => Role::Citizen,
            Profile::Police { .. } => Role::Police,
            Profile::Government { .. } => Role::Government,
        }
    }
}

/// A loaded session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

impl Session {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Government member id.
    ///
    /// The stored profile field wins; the `government_member_id` claim inside
    /// the token is only consulted when the profile lacks it.
    pub fn government_member_id(&self) -> Option<i64> {
        match &self.profile {
            Profile::Government {
                government_member_id: Some(id),
            } => Some(*id),
            Profile::Government { .. } => decode_token_claims(&self.token)
                .and_then(|claims| claim_as_i64(claims.get("government_member_id")?)),
            _ => None,
        }
    }
}

fn claim_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode the (unverified) JSON payload segment of a JWT.
pub fn decode_token_claims(token: &str) -> Option<Value> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Read/write/clear access to the persisted session
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Session store over a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the stored session. The role is the profile's tag.
    ///
    /// The old token is removed before anything is written and the new one
    /// goes in last, so a failed write never pairs a token with another
    /// sign-in's profile.
    pub fn save(&self, token: &str, profile: Profile) -> Result<Session, StorageError> {
        let user = serde_json::to_string(&profile)?;
        self.backend.remove(TOKEN_KEY)?;
        let written = self
            .backend
            .set(USER_KEY, &user)
            .and_then(|_| self.backend.set(TOKEN_KEY, token));
        if let Err(e) = written {
            self.discard("incomplete write");
            return Err(e);
        }
        tracing::info!(role = %profile.role(), "Session saved");
        Ok(Session {
            token: token.to_string(),
            profile,
        })
    }

    /// Current session, if a complete and well-formed one is stored.
    ///
    /// A half-written or corrupt session is discarded and reads as empty.
    pub fn load(&self) -> Option<Session> {
        let token = self.backend.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let user = self.backend.get(USER_KEY);

        match (token, user) {
            (None, None) => None,
            (Some(token), Some(user)) => match serde_json::from_str::<Profile>(&user) {
                Ok(profile) => Some(Session { token, profile }),
                Err(e) => {
                    self.discard(&format!("unreadable profile: {}", e));
                    None
                }
            },
            (Some(_), None) => {
                self.discard("token without profile");
                None
            }
            (None, Some(_)) => {
                self.discard("profile without token");
                None
            }
        }
    }

    /// Raw bearer token, independent of the profile record.
    pub fn token(&self) -> Option<String> {
        self.backend.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn role(&self) -> Option<Role> {
        self.load().map(|s| s.role())
    }

    /// Remove everything from the backing storage.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.clear()?;
        tracing::info!("Session cleared");
        Ok(())
    }

    fn discard(&self, reason: &str) {
        tracing::warn!("Discarding stored session: {}", reason);
        if let Err(e) = self.backend.clear() {
            tracing::warn!("Failed to discard stored session: {}", e);
        }
    }
}
