//! Atelier API
//!
//! Backend core for a tailoring-studio dashboard: the order lifecycle, the
//! real-time order subscription contract, and the derived dashboard
//! analytics. The backing document store sits behind [`store::OrderStore`];
//! everything above it is a pure function of the snapshots that boundary
//! delivers.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod analytics;
pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod openapi;
pub mod services;
pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared handler state. Every collaborator is constructed once at startup
/// and injected; nothing reaches for ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub orders: services::OrderLifecycleService,
    pub store: Arc<dyn store::OrderStore>,
    pub auth: Arc<auth::AuthService>,
    pub config: config::AppConfig,
}

/// Uniform success envelope for JSON responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
