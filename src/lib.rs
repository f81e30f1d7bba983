//! # Arbilo - terminal client for the Arbilo arbitrage service
//!
//! Authenticates end users and admins against the Arbilo REST API, keeps a
//! periodically refreshed cache of arbitrage opportunities and renders it as
//! sortable, paginated tables. Built with ratatui and reqwest.
//!
//! ## Architecture
//!
//! The application follows a clean architecture pattern:
//!
//! - **App**: Core application state and lifecycle management
//! - **UI**: Layout and rendering logic
//! - **API**: Arbilo REST API integration layer
//! - **Auth**: Session contexts and route guards
//! - **Dashboard**: Polling cache for the arbitrage datasets
//! - **Storage**: Durable and session-scoped token storage
//! - **State**: Centralized state management
//! - **Events**: Input handling and event processing
//! - **Config**: Configuration management

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
