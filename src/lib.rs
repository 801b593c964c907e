//! frame-audit: a framing-analysis service.
//!
//! Accepts a short natural-language scenario over HTTP, forwards it to a
//! generative model with a fixed instructional prompt, verifies the returned
//! JSON against a structural contract, and serves the verified result.
//! Admission is controlled by a per-caller sliding-window rate limiter.

pub mod analysis;
pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod prompts;
pub mod rate_limit;
pub mod validation;

// Load env from .env if present; silently ignores a missing file.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}
