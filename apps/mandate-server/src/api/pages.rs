// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Form-driven HTML pages of the onboarding demo.

use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    Form,
};
use tracing::info;

use super::mandates::{
    response_texts, run_query, seal_mandate, QueryRequest, ENCODE_FAILED, ENCRYPT_FAILED,
};
use crate::{
    crypto,
    error::PageError,
    mandate::{AccountType, Frequency, MandateForm},
    state::AppState,
    views::{self, QueryResult, QueryView},
};

/// GET /
pub async fn sign_in() -> Html<String> {
    Html(views::sign_in())
}

/// GET /home
pub async fn home() -> Html<String> {
    Html(views::home(&AccountType::options(), &Frequency::options()))
}

/// POST /home
///
/// Builds and encrypts the mandate, then hands off to the gateway page.
pub async fn submit_mandate(
    State(state): State<AppState>,
    payload: Result<Form<MandateForm>, FormRejection>,
) -> Result<Html<String>, PageError> {
    let Form(form) = payload?;
    let sealed = seal_mandate(&state.config, form)?;
    Ok(Html(views::redirect_to_gateway(
        &sealed.gateway_url,
        &sealed.enc_data,
        &sealed.client_id,
    )))
}

/// GET /queryMandate
pub async fn query_form() -> Html<String> {
    Html(views::query_mandate(&QueryView::default()))
}

/// POST /queryMandate
///
/// Lookup failures are shown inline on the page rather than as an error
/// status. Only a malformed form is rejected.
pub async fn submit_query(
    State(state): State<AppState>,
    payload: Result<Form<QueryRequest>, FormRejection>,
) -> Result<Html<String>, PageError> {
    let Form(request) = payload?;
    let run = run_query(&state.http, &request).await;

    let (enc_data, url_enc) = run
        .encoded
        .unwrap_or_else(|_| (ENCRYPT_FAILED.to_string(), ENCODE_FAILED.to_string()));

    let (enc_response, dec_response) = match &run.gateway {
        Ok(response) => response_texts(response),
        Err(e) => (e.to_string(), e.to_string()),
    };

    let view = QueryView {
        reference_number: request.reference_number,
        encryption_key: request.encryption_key,
        url: request.url,
        api_key: request.api_key,
        result: Some(QueryResult {
            enc_data,
            url_enc,
            enc_response,
            dec_response,
        }),
    };
    Ok(Html(views::query_mandate(&view)))
}

/// GET /createKey
pub async fn create_key() -> Result<Html<String>, PageError> {
    let key = crypto::generate_key()?;
    info!("generated new AES-256 key");
    Ok(Html(views::create_key(&key)))
}
