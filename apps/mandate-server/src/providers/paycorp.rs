// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Paycorp SmartMandate gateway client.
//!
//! Two concerns live here: sealing a [`Mandate`] for the hosted gateway
//! page, and looking a mandate up by its source reference number.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    crypto::{self, CryptoError},
    mandate::Mandate,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SOURCE_REFERENCE_PATH: &str = "/api/v1/mandates/source-reference";
const API_KEY_HEADER: &str = "X-API-KEY";
const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway URL is invalid: {0}")]
    InvalidUrl(String),

    #[error("gateway API key is missing")]
    MissingApiKey,

    #[error("payload encryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("mandate serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// Outcome of a gateway call that produced an HTTP response.
///
/// Non-2xx statuses are still responses; only transport failures are errors.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Whether the status was 2xx.
    pub success: bool,
    /// Raw response body.
    pub message: String,
    /// Body decrypted with the caller's key, when it was an envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted: Option<String>,
    /// Request id sent in `X-Request-Id`.
    pub request_id: String,
}

impl ApiResponse {
    pub fn decrypted_or_message(&self) -> &str {
        self.decrypted.as_deref().unwrap_or(&self.message)
    }
}

/// Client for the gateway's lookup API, bound to one merchant's credentials.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    encryption_key: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str, encryption_key: &str) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http {
                endpoint: base_url.to_string(),
                source: e,
            })?;
        Self::with_http(http, base_url, api_key, encryption_key)
    }

    /// Build a client that shares an existing connection pool.
    pub fn with_http(
        http: Client,
        base_url: &str,
        api_key: &str,
        encryption_key: &str,
    ) -> Result<Self, GatewayError> {
        let base_url = base_url.trim();
        let parsed = url::Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        if api_key.trim().is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        crypto::validate_key(encryption_key)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            encryption_key: encryption_key.trim().to_string(),
            http,
        })
    }

    /// Look up a mandate by the merchant's source reference number.
    ///
    /// The reference travels encrypted and URL-safe encoded in the path.
    pub async fn find_by_source_reference(
        &self,
        reference: &str,
    ) -> Result<ApiResponse, GatewayError> {
        let envelope = crypto::encrypt(&self.encryption_key, reference)?;
        let token = crypto::url_encode(&envelope);
        let endpoint = format!("{}{}/{}", self.base_url, SOURCE_REFERENCE_PATH, token);
        let request_id = Uuid::new_v4().to_string();

        let response = self
            .http
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(REQUEST_ID_HEADER, &request_id)
            .send()
            .await
            .map_err(|e| GatewayError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GatewayError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        if status.is_success() {
            info!(
                request_id = %request_id,
                status = status.as_u16(),
                "gateway lookup by source reference succeeded"
            );
        } else {
            warn!(
                request_id = %request_id,
                status = status.as_u16(),
                body = %body,
                "gateway lookup by source reference returned an error status"
            );
        }

        let decrypted = self.try_decrypt(&body);
        Ok(ApiResponse {
            status: status.as_u16(),
            success: status.is_success(),
            message: body,
            decrypted,
            request_id,
        })
    }

    /// Gateway bodies are either a bare envelope or JSON carrying one.
    fn try_decrypt(&self, body: &str) -> Option<String> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(plain) = crypto::decrypt(&self.encryption_key, trimmed) {
            return Some(plain);
        }
        let json: Value = serde_json::from_str(trimmed).ok()?;
        ["encData", "data"]
            .iter()
            .filter_map(|field| json.get(field).and_then(Value::as_str))
            .find_map(|envelope| crypto::decrypt(&self.encryption_key, envelope).ok())
    }
}

/// Seal a mandate for the hosted gateway page.
///
/// The envelope is the AES-GCM encryption of the mandate's JSON form.
pub fn encrypt_mandate(encryption_key: &str, mandate: &Mandate) -> Result<String, GatewayError> {
    let json = serde_json::to_string(mandate)?;
    Ok(crypto::encrypt(encryption_key, &json)?)
}
