//! Mock authentication service backed by a fixed directory.
//!
//! Simulates the login round-trip (including latency), issues placeholder
//! session tokens, and mirrors login state to durable storage so a
//! restarted caller can recover it. The whole flow is a prototyping aid:
//! passwords are compared verbatim and the token is not verifiable.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ChatClientError;
use crate::storage::KeyValueStore;

mod directory;
pub mod token;

pub use directory::{Credentials, Identity, UserRole};

/// Storage key for the session token mirror.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Storage key for the identity mirror.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Storage key for the opt-in remembered login.
pub const REMEMBERED_USER_KEY: &str = "rememberedUser";

/// Simulated network latency applied to every login call.
const LOGIN_LATENCY: Duration = Duration::from_millis(1000);

/// Remembered role/username pair, persisted when the caller opts in.
///
/// Lives independently of the session mirrors: logout keeps it, and
/// clearing it keeps the session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RememberedLogin {
    #[serde(rename = "userType")]
    pub role: UserRole,
    pub username: String,
}

/// Outcome of a login attempt.
#[derive(Clone, Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub message: String,
}

impl LoginResponse {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            user: None,
            token: None,
            message,
        }
    }
}

/// Mock auth service. Construct once and share by reference; `logout`
/// tears the session down.
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    current_user: Mutex<Option<Identity>>,
    auth_token: Mutex<Option<String>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current_user: Mutex::new(None),
            auth_token: Mutex::new(None),
        }
    }

    /// Simulated login round-trip against the fixed directory.
    ///
    /// Failures are reported in the response rather than as errors: the
    /// mock network call cannot fail except logically.
    pub async fn login(&self, credentials: &Credentials) -> LoginResponse {
        log::info!("Login attempt for user: {}", credentials.username);
        tokio::time::sleep(LOGIN_LATENCY).await;

        let user = directory::DIRECTORY
            .iter()
            .find(|u| u.username == credentials.username && u.role == credentials.role);

        let Some(user) = user else {
            return LoginResponse::failure(ChatClientError::UserNotFound.to_string());
        };

        if directory::password_for(&user.username) != Some(credentials.password.as_str()) {
            log::warn!("Failed login attempt for user: {}", credentials.username);
            return LoginResponse::failure(ChatClientError::BadCredential.to_string());
        }

        let token = match token::issue(user, token::now_ms()) {
            Ok(token) => token,
            Err(err) => {
                return LoginResponse::failure(format!("Failed to issue session token: {}", err))
            }
        };

        let user = user.clone();
        *self.current_user.lock() = Some(user.clone());
        *self.auth_token.lock() = Some(token.clone());

        self.store.set(AUTH_TOKEN_KEY, &token);
        match serde_json::to_string(&user) {
            Ok(json) => self.store.set(CURRENT_USER_KEY, &json),
            Err(err) => log::warn!("Failed to serialize identity for storage: {}", err),
        }

        if credentials.remember {
            let remembered = RememberedLogin {
                role: user.role,
                username: user.username.clone(),
            };
            match serde_json::to_string(&remembered) {
                Ok(json) => self.store.set(REMEMBERED_USER_KEY, &json),
                Err(err) => log::warn!("Failed to serialize remembered login: {}", err),
            }
        }

        log::info!(
            "Successful login for user: {} (id: {})",
            user.username,
            user.id
        );

        LoginResponse {
            success: true,
            user: Some(user),
            token: Some(token),
            message: "Login successful".to_string(),
        }
    }

    /// Clears the in-memory login state and its durable mirrors.
    ///
    /// Calling while already logged out is a no-op. The remembered login
    /// record is left untouched.
    pub fn logout(&self) {
        *self.current_user.lock() = None;
        *self.auth_token.lock() = None;
        self.store.remove(AUTH_TOKEN_KEY);
        self.store.remove(CURRENT_USER_KEY);
    }

    /// Returns the authenticated identity, recovering it from storage when
    /// the in-memory copy is gone.
    ///
    /// Recovery requires BOTH mirrors to be present. Malformed stored data
    /// is logged and treated as logged out.
    pub fn current_user(&self) -> Option<Identity> {
        if let Some(user) = self.current_user.lock().clone() {
            return Some(user);
        }

        let saved_user = self.store.get(CURRENT_USER_KEY)?;
        let saved_token = self.store.get(AUTH_TOKEN_KEY)?;

        match serde_json::from_str::<Identity>(&saved_user) {
            Ok(user) => {
                *self.current_user.lock() = Some(user.clone());
                *self.auth_token.lock() = Some(saved_token);
                Some(user)
            }
            Err(err) => {
                log::warn!("Ignoring malformed stored identity: {}", err);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Returns the session token issued at login, if any.
    pub fn session_token(&self) -> Option<String> {
        // Hydrates from storage when only the mirrors survived.
        let _ = self.current_user();
        self.auth_token.lock().clone()
    }

    /// Returns the remembered role/username pair, if the caller opted in.
    pub fn remembered_login(&self) -> Option<RememberedLogin> {
        let raw = self.store.get(REMEMBERED_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(remembered) => Some(remembered),
            Err(err) => {
                log::warn!("Ignoring malformed remembered login: {}", err);
                None
            }
        }
    }

    pub fn clear_remembered_login(&self) {
        self.store.remove(REMEMBERED_USER_KEY);
    }

    /// Full fixed directory. Diagnostic/dev use only.
    pub fn directory_entries(&self) -> Vec<Identity> {
        directory::DIRECTORY.clone()
    }
}
