use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_secs = match env::var("PARKDESK_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("PARKDESK_TIMEOUT_SECS must be a positive integer, got {:?}", raw)
                })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_base: env::var("PARKDESK_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            token_file: env::var("PARKDESK_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_token_file()),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        if let Some(api_base) = api_base {
            self.api_base = api_base;
        }
        self
    }

    pub fn with_token_file(mut self, token_file: Option<PathBuf>) -> Self {
        if let Some(token_file) = token_file {
            self.token_file = token_file;
        }
        self
    }
}

fn default_token_file() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".parkdesk").join("token"),
        None => PathBuf::from(".parkdesk-token"),
    }
}
