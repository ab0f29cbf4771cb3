//! Error types for parkdesk operations.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Result type alias for parkdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for backend calls, validation and local I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend answered 401 or 403. The session has already been cleared.
    #[error("Authentication failed. Please login again.")]
    Authentication { status: u16 },

    /// Any other non-2xx response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Client-side validation failed before any request was made.
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Network or HTTP error.
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// JSON parsing error.
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// URL parsing error.
    #[error("URL error: {source}")]
    Url {
        #[from]
        source: url::ParseError,
    },

    /// Token file I/O.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn authentication(status: u16) -> Self {
        Self::Authentication { status }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for 401/403 responses; callers use this to send the user back to login.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// HTTP status carried by the error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status } | Self::Api { status, .. } => Some(*status),
            Self::Network { source } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise `Error::Validation`.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}
