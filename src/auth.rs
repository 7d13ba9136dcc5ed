use crate::error::{AuthError, StoreError};
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const TOKEN_KEY: &str = "authToken";

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::validation("Please enter your email"));
    }
    if password.trim().is_empty() {
        return Err(AuthError::validation("Please enter your password"));
    }
    Ok(LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<CreateUserRequest, AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::validation("Please enter your name"));
    }
    if email.trim().is_empty() {
        return Err(AuthError::validation("Please enter your email"));
    }
    if password.trim().is_empty() {
        return Err(AuthError::validation("Please enter a password"));
    }
    if password != confirm_password {
        return Err(AuthError::validation("Passwords do not match"));
    }
    Ok(CreateUserRequest {
        email: email.trim().to_string(),
        name: Some(name.trim().to_string()),
        password: password.to_string(),
    })
}

pub struct Session<S> {
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    pub fn is_authenticated(&self) -> bool {
        match self.token() {
            Ok(token) => token.is_some(),
            Err(err) => {
                warn!("could not read session token: {err}");
                false
            }
        }
    }

    pub fn sign_in(&mut self, token: &str) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token)
    }

    pub fn sign_out(&mut self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)
    }
}

pub struct AuthClient {
    base_url: String,
    agent: ureq::Agent,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        debug!("logging in as {}", request.email);
        match self
            .agent
            .post(&self.url("/auth/login"))
            .set("Content-Type", "application/json")
            .send_json(request)
        {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(code, _)) => {
                info!("login rejected with status {code}");
                Err(AuthError::InvalidCredentials)
            }
            Err(ureq::Error::Transport(err)) => Err(AuthError::Transport(err.to_string())),
        }
    }

    pub fn register(&self, request: &CreateUserRequest) -> Result<User, AuthError> {
        debug!("registering {}", request.email);
        match self
            .agent
            .post(&self.url("/users"))
            .set("Content-Type", "application/json")
            .send_json(request)
        {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(code, _)) => Err(AuthError::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(AuthError::Transport(err.to_string())),
        }
    }

    /// GET with the session's bearer token. A 401 signs the session out.
    pub fn get_authorized<T, S>(&self, path: &str, session: &mut Session<S>) -> Result<T, AuthError>
    where
        T: DeserializeOwned,
        S: KeyValueStore,
    {
        let mut request = self
            .agent
            .get(&self.url(path))
            .set("Content-Type", "application/json");
        if let Some(token) = session.token()? {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        match request.call() {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(401, _)) => {
                warn!("session expired, clearing token");
                session.sign_out()?;
                Err(AuthError::SessionExpired)
            }
            Err(ureq::Error::Status(code, _)) => Err(AuthError::Status(code)),
            Err(ureq::Error::Transport(err)) => Err(AuthError::Transport(err.to_string())),
        }
    }
}
