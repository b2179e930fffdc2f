//! # ERA Core
//!
//! Core logic for the ERA webpage generator.
//!
//! This crate turns experiment parameters and a screenshot into a standalone tracking webpage:
//! - Prompt construction from structured experiment parameters (`prompt`)
//! - Normalisation of provider output into a guaranteed HTML document (`normalise`)
//! - The embedded fallback page (`fallback`)
//! - Generation provider clients, SMTP mail and upload staging at the boundary
//!
//! **No HTTP server concerns**: routing, multipart parsing and JSON envelopes belong in
//! `api-rest`; shared response types live in `api-shared`.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod experiment;
pub mod fallback;
pub mod generation;
pub mod mail;
pub mod normalise;
pub mod prompt;
pub mod service;
pub mod uploads;

pub use config::EraConfig;
pub use document::{DocumentOrigin, GeneratedDocument};
pub use error::{EraError, EraResult};
pub use experiment::{DataPoint, ExperimentSpec, WebpageRequest};
pub use generation::{GenerationClient, RawProviderResponse};
pub use mail::Mailer;
pub use service::{Screenshot, SharedExample, WebpageOutcome, WebpageService};
pub use uploads::{StagedUpload, UploadDir};
