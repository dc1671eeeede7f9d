//! Environment configuration

use anyhow::{bail, Context, Result};
use axum::http::HeaderName;

/// Which storage backend the service runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process maps, lost on restart
    Memory,
    /// DynamoDB metadata + S3 payloads
    Aws,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Service configuration, read from the environment at start-up
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    pub bucket: String,
    pub table: String,
    pub force_path_style: bool,
    pub max_payload_size: usize,
    pub owner_header: HeaderName,
    pub api_url: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let backend = match var("FRAGMENTS_BACKEND", "memory").to_ascii_lowercase().as_str() {
            "memory" => BackendKind::Memory,
            "aws" => BackendKind::Aws,
            other => bail!("FRAGMENTS_BACKEND must be 'memory' or 'aws', got '{other}'"),
        };

        let log_format = match var("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("LOG_FORMAT must be 'text' or 'json', got '{other}'"),
        };

        let port = var("FRAGMENTS_PORT", "8080")
            .parse::<u16>()
            .context("FRAGMENTS_PORT must be a port number")?;

        let max_payload_size = var("FRAGMENTS_MAX_PAYLOAD_BYTES", "5242880")
            .parse::<usize>()
            .context("FRAGMENTS_MAX_PAYLOAD_BYTES must be a byte count")?;

        let force_path_style = var("AWS_S3_FORCE_PATH_STYLE", "false")
            .parse::<bool>()
            .context("AWS_S3_FORCE_PATH_STYLE must be 'true' or 'false'")?;

        let owner_header = HeaderName::try_from(var("FRAGMENTS_OWNER_HEADER", "x-owner-id"))
            .context("FRAGMENTS_OWNER_HEADER must be a valid header name")?;

        let api_url = lookup("API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            host: var("FRAGMENTS_HOST", "0.0.0.0"),
            port,
            backend,
            bucket: var("AWS_S3_BUCKET_NAME", "fragments"),
            table: var("AWS_DYNAMODB_TABLE_NAME", "fragments"),
            force_path_style,
            max_payload_size,
            owner_header,
            api_url,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.max_payload_size, 5 * 1024 * 1024);
        assert_eq!(config.owner_header, "x-owner-id");
        assert_eq!(config.api_url, None);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.force_path_style);
    }

    #[test]
    fn test_aws_settings() {
        let config = config(&[
            ("FRAGMENTS_BACKEND", "AWS"),
            ("AWS_S3_BUCKET_NAME", "bucket"),
            ("AWS_DYNAMODB_TABLE_NAME", "table"),
            ("AWS_S3_FORCE_PATH_STYLE", "true"),
            ("API_URL", "http://localhost:8080/"),
        ])
        .unwrap();

        assert_eq!(config.backend, BackendKind::Aws);
        assert_eq!(config.bucket, "bucket");
        assert_eq!(config.table, "table");
        assert!(config.force_path_style);
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("FRAGMENTS_BACKEND", "sqlite")]).is_err());
        assert!(config(&[("FRAGMENTS_PORT", "http")]).is_err());
        assert!(config(&[("FRAGMENTS_MAX_PAYLOAD_BYTES", "-1")]).is_err());
        assert!(config(&[("FRAGMENTS_OWNER_HEADER", "bad header")]).is_err());
        assert!(config(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
