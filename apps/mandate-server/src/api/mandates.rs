// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mandate sealing and gateway lookup, shared by the HTML pages and the
//! JSON API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    crypto::{self, CryptoError},
    error::ApiError,
    logging::mask,
    mandate::{Mandate, MandateForm},
    providers::paycorp::{self, ApiClient, ApiResponse, GatewayError},
    state::AppState,
};

pub const ENCRYPT_FAILED: &str = "Failed to encrypt data";
pub const ENCODE_FAILED: &str = "Failed to encode data";

/// Encrypted mandate ready to be posted to the gateway.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SealedMandate {
    /// AES-GCM envelope of the mandate JSON.
    pub enc_data: String,
    /// Merchant client id to post alongside `enc_data`.
    pub client_id: String,
    /// Gateway endpoint that accepts the envelope.
    pub gateway_url: String,
}

/// Lookup parameters. Field names match the query form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Source reference number of the mandate.
    pub reference_number: String,
    /// Merchant's Base64 AES-256 key.
    pub encryption_key: String,
    /// Gateway API base URL.
    pub url: String,
    /// Merchant API key.
    pub api_key: String,
}

/// JSON result of a gateway lookup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QueryResponse {
    /// Encrypted reference number.
    pub enc_data: String,
    /// URL-safe encoding of `enc_data`, as sent in the lookup path.
    pub url_enc: String,
    /// Whether the gateway answered with a 2xx status.
    pub success: bool,
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Raw gateway body, or `HTTP {status}: {body}` on failure.
    pub enc_response: String,
    /// Decrypted gateway body when available.
    pub dec_response: String,
}

/// Everything produced while running a lookup.
pub struct QueryRun {
    /// Encrypted reference and its URL-safe form.
    pub encoded: Result<(String, String), CryptoError>,
    pub gateway: Result<ApiResponse, GatewayError>,
}

/// Build a mandate from the submitted form and encrypt it with the
/// merchant key.
pub fn seal_mandate(config: &AppConfig, form: MandateForm) -> Result<SealedMandate, ApiError> {
    info!(
        consumer_ref_number = %form.consumer_ref_number,
        reference_number = %form.reference_number,
        amount = %form.amount,
        frequency = %form.frqcy,
        first_collection_date = %form.first_collection_date,
        final_collection_date = %form.final_collection_date,
        debtor_name = %form.dbtr_nm,
        mobile = %mask(&form.mobile),
        debtor_account = %mask(&form.dbtr_acc_no),
        account_type = %form.dbtr_acc_tp,
        bank_id = %form.bnk_id,
        "mandate form received"
    );

    let mandate: Mandate = form
        .into_builder()?
        .utility_code(config.utility_code.as_str())
        .schm_nm(config.scheme_name.as_str())
        .build()
        .inspect_err(|e| warn!(error = %e, "mandate rejected"))?;

    let enc_data = paycorp::encrypt_mandate(&config.encryption_key, &mandate)?;
    info!(
        reference_number = %mandate.source_reference_number,
        enc_len = enc_data.len(),
        "mandate encrypted"
    );

    Ok(SealedMandate {
        enc_data,
        client_id: config.client_id.clone(),
        gateway_url: config.gateway_url.clone(),
    })
}

/// Encrypt the reference, check that the encoding reverses, and ask the
/// gateway for the mandate.
pub async fn run_query(http: &Client, request: &QueryRequest) -> QueryRun {
    info!(
        reference_number = %request.reference_number,
        url = %request.url,
        encryption_key = %mask(&request.encryption_key),
        api_key = %mask(&request.api_key),
        "mandate query received"
    );

    let encoded = crypto::encrypt(&request.encryption_key, &request.reference_number).map(|enc| {
        let url_enc = crypto::url_encode(&enc);
        verify_round_trip(&request.encryption_key, &url_enc);
        (enc, url_enc)
    });
    if let Err(e) = &encoded {
        warn!(error = %e, "reference encryption failed");
    }

    let gateway = match ApiClient::with_http(
        http.clone(),
        &request.url,
        &request.api_key,
        &request.encryption_key,
    ) {
        Ok(client) => client.find_by_source_reference(&request.reference_number).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &gateway {
        warn!(error = %e, "gateway lookup failed");
    }

    QueryRun { encoded, gateway }
}

/// Raw and decrypted texts shown for a gateway answer.
///
/// A non-2xx answer yields `HTTP {status}: {body}` for both.
pub fn response_texts(response: &ApiResponse) -> (String, String) {
    if response.success {
        (
            response.message.clone(),
            response.decrypted_or_message().to_string(),
        )
    } else {
        let summary = format!("HTTP {}: {}", response.status, response.message);
        (summary.clone(), summary)
    }
}

fn verify_round_trip(key: &str, url_enc: &str) {
    match crypto::url_decode(url_enc).and_then(|decoded| {
        debug!(decoded = %decoded, "decoded reference envelope");
        crypto::decrypt(key, &decoded)
    }) {
        Ok(plain) => debug!(decrypted = %plain, "reference round trip ok"),
        Err(e) => warn!(error = %e, "reference round trip failed"),
    }
}

#[utoipa::path(
    post,
    path = "/v1/mandates/encrypt",
    request_body = MandateForm,
    tag = "Mandates",
    responses(
        (status = 200, description = "Mandate encrypted", body = SealedMandate),
        (status = 400, description = "Missing or invalid mandate fields")
    )
)]
pub async fn encrypt_mandate(
    State(state): State<AppState>,
    payload: Result<Json<MandateForm>, JsonRejection>,
) -> Result<Json<SealedMandate>, ApiError> {
    let Json(form) = payload?;
    Ok(Json(seal_mandate(&state.config, form)?))
}

#[utoipa::path(
    post,
    path = "/v1/mandates/query",
    request_body = QueryRequest,
    tag = "Mandates",
    responses(
        (status = 200, description = "Gateway answered (any status)", body = QueryResponse),
        (status = 400, description = "Invalid key, URL or API key"),
        (status = 502, description = "Gateway unreachable")
    )
)]
pub async fn query_mandate(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let run = run_query(&state.http, &request).await;
    let (enc_data, url_enc) = run.encoded?;
    let response = run.gateway?;
    let (enc_response, dec_response) = response_texts(&response);
    Ok(Json(QueryResponse {
        enc_data,
        url_enc,
        success: response.success,
        status: response.status,
        enc_response,
        dec_response,
    }))
}
