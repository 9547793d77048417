//! # API Shared
//!
//! Shared wire types for the patient records APIs.
//!
//! Contains:
//! - Request/response bodies with OpenAPI schemas (`wire` module)
//! - Translation between wire bodies and `patients-core` domain types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and `patients-cli`.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
