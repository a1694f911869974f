// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mandate Server - NACH Direct-Debit Mandate Onboarding Demo
//!
//! Renders the onboarding forms, builds NACH mandates from them, encrypts
//! them with the merchant's AES-256 key and hands them to the SmartMandate
//! gateway. Also exposes a lookup of existing mandates by source reference.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum): HTML pages, JSON API, health probes
//! - `config` - Environment-driven configuration
//! - `crypto` - AES-256-GCM envelopes and key generation
//! - `error` - JSON and HTML error responses
//! - `logging` - Tracing subscriber setup and secret masking
//! - `mandate` - NACH mandate model, code lists and form parsing
//! - `providers` - Gateway API client
//! - `state` - Shared application state
//! - `views` - HTML rendering

pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod mandate;
pub mod providers;
pub mod state;
pub mod views;
