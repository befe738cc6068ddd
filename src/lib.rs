//! # Inventory API Library
//!
//! Multi-tenant inventory service: credential storage, session tokens, the
//! authentication gate, tenancy/ownership authorization and the
//! registration/approval workflow, exposed over an axum HTTP API.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod services;
pub mod telemetry;
pub use migration;
