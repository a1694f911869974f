// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{crypto, error::ApiError};

#[derive(Debug, Serialize, ToSchema)]
pub struct KeyResponse {
    /// Base64 encoded 32-byte AES key.
    pub key: String,
}

#[utoipa::path(
    post,
    path = "/v1/keys",
    tag = "Keys",
    responses((status = 200, description = "New AES-256 key", body = KeyResponse))
)]
pub async fn create_key() -> Result<Json<KeyResponse>, ApiError> {
    let key = crypto::generate_key()?;
    info!("generated new AES-256 key");
    Ok(Json(KeyResponse { key }))
}
