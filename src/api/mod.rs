//! Arbilo REST API integration.
//!
//! This module provides a typed client for the Arbilo backend and the
//! conversion of its loosely shaped payloads into client rows.

mod client;
pub mod converter;
pub mod models;

pub use client::{ApiClient, ApiClientBuilder};
pub use models::{ApiMessage, LoginResponse};
