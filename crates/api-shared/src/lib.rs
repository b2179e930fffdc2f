//! # API Shared
//!
//! Shared definitions for the ERA HTTP API.
//!
//! Contains:
//! - Request form and response body types (`types` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and by anything that needs to speak the same JSON shapes.

pub mod health;
pub mod types;

pub use health::HealthService;
pub use types::*;
