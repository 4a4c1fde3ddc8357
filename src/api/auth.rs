use super::client::ApiClient;
use super::error::ApiError;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Client-side view of the authentication state machine.
///
/// `Unknown -> Checking -> {Authenticated, Anonymous}`. The only producer
/// of `Authenticated` is a successful identity check against the backend —
/// never a login response body on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Before the startup session check has been spawned.
    Unknown,
    /// The startup session check is in flight.
    Checking,
    /// The backend confirmed the session; holds the username.
    Authenticated(String),
    /// No working session. The login gate renders in this state.
    Anonymous,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    /// Username when authenticated, empty string otherwise.
    pub fn username(&self) -> &str {
        match self {
            AuthState::Authenticated(name) => name,
            _ => "",
        }
    }
}

/// Identity returned by `GET /api/users/me/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    password2: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordBody<'a> {
    old_password: &'a str,
    new_password: &'a str,
    new_password2: &'a str,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl ApiClient {
    /// Asks the backend who the current session belongs to.
    ///
    /// Ensures the CSRF cookie exists first so the very first authenticated
    /// flow of the process has the token ready for any mutation that follows.
    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.ensure_csrf_token().await;
        self.get_json("/api/users/me/").await
    }

    /// Logs in and re-verifies the session before trusting it.
    ///
    /// A 2xx login response proves nothing about the session cookie — a
    /// backend can return 200 yet fail to set a working session. The
    /// identity check is re-run and only its answer decides the outcome;
    /// on verification failure this returns [`ApiError::SessionUnverified`].
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        let body = LoginBody {
            username: username.trim(),
            password: password.expose_secret(),
        };
        let _: serde_json::Value = self
            .send_json(Method::POST, "/api/users/login/", &body)
            .await?;

        tracing::debug!(username = body.username, "Login accepted, verifying session");
        match self.current_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::warn!(error = %e, "Session verification after login failed");
                Err(ApiError::SessionUnverified)
            }
        }
    }

    /// Best-effort server-side logout.
    ///
    /// Callers must clear local session state regardless of the returned
    /// result — a failed logout request never leaves the client logged in.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.send_no_content::<()>(Method::POST, "/api/users/logout/", None)
            .await
    }

    /// Registers a new account. The backend logs the user in on success,
    /// so the session is re-verified exactly as after a login.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
        password2: &SecretString,
    ) -> Result<CurrentUser, ApiError> {
        let body = RegisterBody {
            username: username.trim(),
            email: email.trim(),
            password: password.expose_secret(),
            password2: password2.expose_secret(),
        };
        let _: serde_json::Value = self
            .send_json(Method::POST, "/api/users/register/", &body)
            .await?;

        match self.current_user().await {
            Ok(user) => Ok(user),
            Err(e) => {
                tracing::warn!(error = %e, "Session verification after registration failed");
                Err(ApiError::SessionUnverified)
            }
        }
    }

    /// Changes the password of the logged-in user. The backend invalidates
    /// the session on success, so the caller should expect to re-login.
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        new_password2: &SecretString,
    ) -> Result<String, ApiError> {
        let body = ChangePasswordBody {
            old_password: old_password.expose_secret(),
            new_password: new_password.expose_secret(),
            new_password2: new_password2.expose_secret(),
        };
        let response: MessageBody = self
            .send_json(Method::POST, "/api/users/change-password/", &body)
            .await?;
        Ok(response.message)
    }

    /// Requests a password-reset email. The backend answers with the same
    /// message whether or not the address exists.
    pub async fn request_password_reset(&self, email: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "email": email.trim() });
        let response: MessageBody = self
            .send_json(Method::POST, "/api/users/password-reset-request/", &body)
            .await?;
        Ok(response.message)
    }

    /// Completes a password reset with the uid/token pair from the email.
    pub async fn confirm_password_reset(
        &self,
        uidb64: &str,
        token: &str,
        new_password: &SecretString,
        new_password2: &SecretString,
    ) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "uidb64": uidb64,
            "token": token,
            "new_password": new_password.expose_secret(),
            "new_password2": new_password2.expose_secret(),
        });
        let response: MessageBody = self
            .send_json(Method::POST, "/api/users/password-reset-confirm/", &body)
            .await?;
        Ok(response.message)
    }
}
