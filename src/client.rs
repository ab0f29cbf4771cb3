//! Authenticated HTTP transport shared by every repository client.

use std::time::Duration;

use reqwest::{header::HeaderValue, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    session::Session,
};

/// How a non-2xx, non-auth response is turned into an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// `API error: <code> <reason>`.
    StatusLine,
    /// The JSON body's `message`, falling back to `HTTP error! status: <code>`.
    ServerMessage,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    session: Session,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or cannot carry a path.
    pub fn new(base_url: &str, session: Session) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, session: Session, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::other(format!("Base URL cannot carry a path: {}", base_url)));
        }
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            session,
            http_client,
        })
    }

    pub fn from_config(config: &Config, session: Session) -> Result<Self> {
        Self::with_timeout(&config.api_base, session, config.timeout)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::other("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Like [`endpoint`](Self::endpoint) with a query string. No `?` is added
    /// when `query` is empty.
    pub fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send a request and decode the JSON response body.
    pub async fn request<T>(&self, method: Method, url: Url, body: Option<Value>, style: ErrorStyle) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(method, url, body, style).await?;
        let text = response.text().await?;

        if text.trim().is_empty() {
            return serde_json::from_str("null").map_err(Error::from);
        }
        serde_json::from_str(&text).map_err(Error::from)
    }

    /// Send a request whose response body, if any, is not needed.
    pub async fn execute(&self, method: Method, url: Url, body: Option<Value>, style: ErrorStyle) -> Result<()> {
        self.send(method, url, body, style).await?;
        Ok(())
    }

    async fn send(&self, method: Method, url: Url, body: Option<Value>, style: ErrorStyle) -> Result<reqwest::Response> {
        debug!("{} {}", method, url.path());
        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "*/*");

        if let Some(token) = self.session.token() {
            let auth_header = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::other(format!("Invalid token format: {}", e)))?;
            request = request.header(reqwest::header::AUTHORIZATION, auth_header);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", method, url.path(), e);
            Error::from(e)
        })?;
        self.check_status(response, style).await
    }

    async fn check_status(&self, response: reqwest::Response, style: ErrorStyle) -> Result<reqwest::Response> {
        let status = response.status();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("{} from {}, clearing session", status.as_u16(), response.url().path());
                self.session.clear();
                Err(Error::authentication(status.as_u16()))
            }
            _ if !status.is_success() => {
                let message = match style {
                    ErrorStyle::StatusLine => status_line_message(status),
                    ErrorStyle::ServerMessage => {
                        let error_data: Value = response.json().await.unwrap_or_default();
                        error_data
                            .get("message")
                            .and_then(|v| v.as_str())
                            .filter(|m| !m.is_empty())
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
                    }
                };
                warn!("Request failed: {}", message);
                Err(Error::api(status.as_u16(), message))
            }
            _ => Ok(response),
        }
    }
}

fn status_line_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("API error: {} {}", status.as_u16(), reason),
        None => format!("API error: {}", status.as_u16()),
    }
}
