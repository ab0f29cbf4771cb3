use reqwest::Method;
use tracing::info;

use crate::{
    client::{ApiClient, ErrorStyle},
    error::Result,
    models::{User, UserForm},
    validation::validate_user,
};

/// Staff accounts under `/users`.
#[derive(Debug, Clone)]
pub struct UserClient {
    api: ApiClient,
}

impl UserClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let url = self.api.endpoint(&["users"])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        let url = self.api.endpoint(&["users", &id.to_string()])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    pub async fn create(&self, form: &UserForm) -> Result<User> {
        validate_user(form)?;
        let url = self.api.endpoint(&["users"])?;
        let user: User = self
            .api
            .request(Method::POST, url, Some(serde_json::to_value(form)?), ErrorStyle::ServerMessage)
            .await?;
        info!("User {} created with role {}", user.username, user.role);
        Ok(user)
    }

    pub async fn update(&self, id: i64, form: &UserForm) -> Result<User> {
        validate_user(form)?;
        let url = self.api.endpoint(&["users", &id.to_string()])?;
        self.api
            .request(Method::PUT, url, Some(serde_json::to_value(form)?), ErrorStyle::ServerMessage)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let url = self.api.endpoint(&["users", &id.to_string()])?;
        self.api.execute(Method::DELETE, url, None, ErrorStyle::ServerMessage).await?;
        info!("User {} deleted", id);
        Ok(())
    }
}
