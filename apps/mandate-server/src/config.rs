// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] loaded from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PAYCORP_CLIENT_ID` | Merchant client id posted with each mandate | Required |
//! | `PAYCORP_ENCRYPTION_KEY` | Base64 AES-256 key for mandate payloads | Required |
//! | `PAYCORP_GATEWAY_URL` | Gateway endpoint the redirect page posts to | `http://localhost:9090/mandate/create` |
//! | `MANDATE_UTILITY_CODE` | NACH utility code stamped on mandates | `NACH0000MUTHPLBARB` |
//! | `MANDATE_SCHEME_NAME` | Scheme name stamped on mandates | `Vehicle` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;

use crate::crypto::{self, CryptoError};

pub const CLIENT_ID_ENV: &str = "PAYCORP_CLIENT_ID";

/// Environment variable holding the merchant's Base64 AES-256 key.
///
/// Generate one with `GET /createKey` or `POST /v1/keys`.
pub const ENCRYPTION_KEY_ENV: &str = "PAYCORP_ENCRYPTION_KEY";

pub const GATEWAY_URL_ENV: &str = "PAYCORP_GATEWAY_URL";
pub const UTILITY_CODE_ENV: &str = "MANDATE_UTILITY_CODE";
pub const SCHEME_NAME_ENV: &str = "MANDATE_SCHEME_NAME";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:9090/mandate/create";
pub const DEFAULT_UTILITY_CODE: &str = "NACH0000MUTHPLBARB";
pub const DEFAULT_SCHEME_NAME: &str = "Vehicle";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{name} does not hold a usable key: {source}")]
    Key {
        name: &'static str,
        source: CryptoError,
    },
}

/// Log output style selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` on its own, so logging can start before the rest
    /// of the configuration is validated.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub encryption_key: String,
    pub gateway_url: String,
    pub utility_code: String,
    pub scheme_name: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Values are trimmed and blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let client_id = required(CLIENT_ID_ENV)?;
        let encryption_key = required(ENCRYPTION_KEY_ENV)?;
        crypto::validate_key(&encryption_key).map_err(|source| ConfigError::Key {
            name: ENCRYPTION_KEY_ENV,
            source,
        })?;

        let gateway_url = get(GATEWAY_URL_ENV).unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        url::Url::parse(&gateway_url).map_err(|e| ConfigError::Invalid {
            name: GATEWAY_URL_ENV,
            reason: e.to_string(),
        })?;

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        Ok(Self {
            client_id,
            encryption_key,
            gateway_url,
            utility_code: get(UTILITY_CODE_ENV).unwrap_or_else(|| DEFAULT_UTILITY_CODE.to_string()),
            scheme_name: get(SCHEME_NAME_ENV).unwrap_or_else(|| DEFAULT_SCHEME_NAME.to_string()),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const KEY: &str = "AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = load(&[(CLIENT_ID_ENV, "client-1"), (ENCRYPTION_KEY_ENV, KEY)]).unwrap();
        assert_eq!(config.client_id, "client-1");
        assert_eq!(config.gateway_url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.utility_code, DEFAULT_UTILITY_CODE);
        assert_eq!(config.scheme_name, DEFAULT_SCHEME_NAME);
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn blank_required_value_counts_as_missing() {
        let err = load(&[(CLIENT_ID_ENV, "  "), (ENCRYPTION_KEY_ENV, KEY)]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(CLIENT_ID_ENV)));
    }

    #[test]
    fn rejects_short_encryption_key() {
        let err = load(&[(CLIENT_ID_ENV, "c"), (ENCRYPTION_KEY_ENV, "AAAA")]).unwrap_err();
        assert!(matches!(err, ConfigError::Key { .. }));
    }

    #[test]
    fn rejects_bad_port() {
        let err = load(&[
            (CLIENT_ID_ENV, "c"),
            (ENCRYPTION_KEY_ENV, KEY),
            (PORT_ENV, "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: PORT_ENV, .. }));
    }

    #[test]
    fn overrides_are_honoured() {
        let config = load(&[
            (CLIENT_ID_ENV, "c"),
            (ENCRYPTION_KEY_ENV, KEY),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (UTILITY_CODE_ENV, "NACH0000TEST"),
            (GATEWAY_URL_ENV, "https://gateway.example.com/create"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.utility_code, "NACH0000TEST");
        assert_eq!(config.gateway_url, "https://gateway.example.com/create");
    }

    #[test]
    fn log_format_defaults_to_pretty() {
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Pretty);
        assert_eq!(LogFormat::parse(None), LogFormat::Pretty);
    }
}
