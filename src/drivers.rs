use reqwest::Method;
use tracing::info;

use crate::{
    client::{ApiClient, ErrorStyle},
    error::Result,
    models::{Driver, DriverForm},
    validation::validate_driver,
};

/// Driver directory under `/drivers`.
#[derive(Debug, Clone)]
pub struct DriverClient {
    api: ApiClient,
}

impl DriverClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Driver>> {
        let url = self.api.endpoint(&["drivers"])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    pub async fn get(&self, id: i64) -> Result<Driver> {
        let url = self.api.endpoint(&["drivers", &id.to_string()])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    /// Validates the form locally first; nothing is sent when it fails.
    pub async fn create(&self, form: &DriverForm) -> Result<Driver> {
        validate_driver(form)?;
        let url = self.api.endpoint(&["drivers"])?;
        let driver: Driver = self
            .api
            .request(Method::POST, url, Some(serde_json::to_value(form)?), ErrorStyle::ServerMessage)
            .await?;
        info!("Driver {} registered with plate {}", driver.driver_id, driver.license_plate);
        Ok(driver)
    }

    pub async fn update(&self, id: i64, form: &DriverForm) -> Result<Driver> {
        validate_driver(form)?;
        let url = self.api.endpoint(&["drivers", &id.to_string()])?;
        self.api
            .request(Method::PUT, url, Some(serde_json::to_value(form)?), ErrorStyle::ServerMessage)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let url = self.api.endpoint(&["drivers", &id.to_string()])?;
        self.api.execute(Method::DELETE, url, None, ErrorStyle::ServerMessage).await?;
        info!("Driver {} deleted", id);
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Driver>> {
        let url = self.api.endpoint_with_query(&["drivers", "search"], &[("query", query)])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    pub async fn by_license_plate(&self, plate: &str) -> Result<Driver> {
        let url = self.api.endpoint(&["drivers", "license", plate])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }

    pub async fn count_active(&self) -> Result<u64> {
        let url = self.api.endpoint(&["drivers", "count"])?;
        self.api.request(Method::GET, url, None, ErrorStyle::ServerMessage).await
    }
}
