//! Generation backends behind the [`TextGenerator`] seam.

pub mod demo;
pub mod gemini;
pub mod traits;

pub use demo::DemoGenerator;
pub use gemini::GeminiGenerator;
pub use traits::{GenerateError, TextGenerator};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::config::LlmConfig;

/// Factory for the configured generation backend.
///
/// Provider selection:
/// 1) `demo` runs the deterministic local generator (no key, no network)
/// 2) `gemini` (the default) requires a usable GEMINI_API_KEY
pub fn create_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>> {
    let is_placeholder = |s: &str| {
        let t = s.trim();
        t.is_empty()
            || t.contains("${")
            || t.eq_ignore_ascii_case("your-api-key-here")
            || t.eq_ignore_ascii_case("changeme")
    };

    match config.provider.as_str() {
        "demo" => {
            info!("Using demo generator (deterministic, no network)");
            Ok(Arc::new(DemoGenerator::new()))
        }
        "gemini" => {
            let key = config.api_key.clone().unwrap_or_default();
            if is_placeholder(&key) {
                anyhow::bail!("FRAME_LLM_PROVIDER=gemini but GEMINI_API_KEY is not set");
            }
            info!("Using Gemini generator (model={})", config.model);
            Ok(Arc::new(GeminiGenerator::new(
                key,
                config.model.clone(),
                config.temperature,
                config.max_output_tokens,
                Duration::from_millis(config.request_timeout_ms),
            )?))
        }
        other => {
            anyhow::bail!("Unknown LLM provider '{other}' (expected \"gemini\" or \"demo\")")
        }
    }
}
