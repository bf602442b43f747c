//! The signed-in user, passed explicitly to the backend client.
use crate::backend::{BackendClient, BackendError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// A session from a token alone, e.g. one stored by an earlier run.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthResponse {
    token: String,
    name: String,
    email: String,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Session::authenticated(
            response.token,
            UserProfile {
                id: None,
                name: response.name,
                email: response.email,
            },
        )
    }
}

impl BackendClient {
    /// `POST /login`. The returned session can be installed with [`BackendClient::with_session`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, BackendError> {
        let response: AuthResponse = self.post_json("login", credentials).await?;
        info!(email = %response.email, "Signed in");
        Ok(response.into())
    }

    /// `POST /register`.
    pub async fn register(&self, registration: &Registration) -> Result<Session, BackendError> {
        let response: AuthResponse = self.post_json("register", registration).await?;
        info!(email = %response.email, "Registered new account");
        Ok(response.into())
    }

    /// `GET /me`, validating the current token.
    pub async fn me(&self) -> Result<UserProfile, BackendError> {
        self.get_json_authed("me").await
    }
}
