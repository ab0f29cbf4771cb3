use reqwest::Method;
use tracing::{info, warn};

use crate::{
    client::{ApiClient, ErrorStyle},
    error::{Error, Result},
    models::{LoginRequest, LoginResponse, User, UserForm},
    session::Credential,
    validation::validate_user,
};

#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Exchange username/password for a token and store it in the session.
    ///
    /// Any rejection from the backend surfaces as `Error::Authentication`.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        let url = self.api.endpoint(&["auth", "login"])?;
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let response: LoginResponse = self
            .api
            .request(Method::POST, url, Some(body), ErrorStyle::ServerMessage)
            .await
            .map_err(|e| match e {
                Error::Api { status, .. } => Error::authentication(status),
                other => other,
            })?;

        let credential = Credential {
            token: response.token,
            username: response.username.or_else(|| Some(username.to_string())),
            role: response.role,
        };
        self.api.session().set(credential.clone())?;
        info!("Logged in as {}", username);
        Ok(credential)
    }

    pub async fn register(&self, form: &UserForm) -> Result<User> {
        validate_user(form)?;
        let url = self.api.endpoint(&["auth", "register"])?;
        self.api
            .request(Method::POST, url, Some(serde_json::to_value(form)?), ErrorStyle::ServerMessage)
            .await
    }

    /// Tell the backend, then forget the credential whatever it answered.
    pub async fn logout(&self) {
        if self.api.session().is_authenticated() {
            match self.api.endpoint(&["auth", "logout"]) {
                Ok(url) => {
                    if let Err(e) = self.api.execute(Method::POST, url, None, ErrorStyle::ServerMessage).await {
                        warn!("Backend logout failed: {}", e);
                    }
                }
                Err(e) => warn!("Backend logout failed: {}", e),
            }
        }
        self.api.session().clear();
        info!("Logged out");
    }
}
