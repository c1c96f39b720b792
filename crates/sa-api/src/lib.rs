//! HTTP API of the study-aid service.
//!
//! Wires the study engine to persistence, the generation service, and the
//! session timers, and exposes everything as axum routes behind bearer
//! token authentication.

pub mod auth;
pub mod config;
pub mod deck;
pub mod error;
pub mod generation;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod quiz;
pub mod router;
pub mod state;
pub mod store;
pub mod summary;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
