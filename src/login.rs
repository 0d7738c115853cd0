use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    api::{ApiState, INCORRECT_CREDENTIALS},
    error::{AppError, NETWORK_ERROR_MESSAGE},
    guard::{Destination, Flow},
    models::{AdminProfile, Credentials, Role},
    session::SessionStore,
    validate::is_valid_email,
};

pub const MISSING_CREDENTIALS: &str = "Please enter both email and password.";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";

/// LoginForm
///
/// The login page state. `login_type` picks the endpoint and defaults to
/// sub-admin.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default = "default_login_type")]
    pub login_type: Role,
    #[serde(default, skip_deserializing)]
    pub loading: bool,
    #[serde(default, skip_deserializing)]
    pub error: Option<String>,
}

fn default_login_type() -> Role {
    Role::SubAdmin
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            login_type: default_login_type(),
            loading: false,
            error: None,
        }
    }
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>, login_type: Role) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            login_type,
            ..Self::default()
        }
    }

    /// Validates, calls the role's login endpoint and stores the principal.
    ///
    /// On failure `error` holds the message to display, nothing is stored
    /// and the form stays. On success the browser moves to the role's
    /// dashboard. `loading` is false on every return.
    pub async fn submit(&mut self, api: &ApiState, session: &SessionStore) -> Flow {
        self.error = None;

        if self.email.is_empty() || self.password.is_empty() {
            self.error = Some(MISSING_CREDENTIALS.to_string());
            return Flow::Stay;
        }
        if !is_valid_email(&self.email) {
            self.error = Some(INVALID_EMAIL.to_string());
            return Flow::Stay;
        }

        self.loading = true;
        let credentials = Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        };
        let result = api.login(self.login_type, &credentials).await;
        self.loading = false;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(role = self.login_type.as_str(), error = %e, "login failed");
                self.error = Some(match e {
                    AppError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
                    AppError::Unauthorized(msg) | AppError::Validation(msg) if !msg.is_empty() => {
                        msg
                    }
                    _ => INCORRECT_CREDENTIALS.to_string(),
                });
                return Flow::Stay;
            }
        };

        if response.token.is_empty() {
            self.error = Some(INCORRECT_CREDENTIALS.to_string());
            return Flow::Stay;
        }

        let stored = session
            .set_principal(self.login_type, &response.token)
            .and_then(|_| {
                session.set_profile(&AdminProfile {
                    name: response.name.clone(),
                    role: self.login_type.as_str().to_string(),
                })
            });
        if let Err(e) = stored {
            tracing::error!(error = %e, "could not persist session");
            self.error = Some(e.user_message());
            return Flow::Stay;
        }

        tracing::info!(
            role = self.login_type.as_str(),
            server_role = ?response.role,
            name = %response.name,
            "logged in"
        );
        Flow::Redirect(Destination::Dashboard(self.login_type))
    }
}
