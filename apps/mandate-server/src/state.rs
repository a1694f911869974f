// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use reqwest::Client;

use crate::config::AppConfig;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Connection pool shared by per-request gateway clients.
    pub http: Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}
