//! Per-request orchestration: validate input, generate, verify output,
//! attach timing metadata.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::clients::TextGenerator;
use crate::config::InputConfig;
use crate::error::{FrameAuditError, Result};
use crate::model::{AnalysisOutcome, AnalysisResponse, Metadata};
use crate::prompts;
use crate::validation::{InputValidator, response};

/// Composes the pipeline for one request. Admission control is the caller's
/// job (the HTTP layer applies the rate limiter before invoking this).
pub struct AnalysisEngine {
    validator: InputValidator,
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisEngine {
    pub fn new(input: &InputConfig, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            validator: InputValidator::new(input.min_length, input.max_length),
            generator,
        }
    }

    /// Runs the full pipeline for a scenario. `identifier` is only used for
    /// observability; results are never persisted.
    pub async fn analyze(&self, scenario: &str, identifier: &str) -> Result<AnalysisResponse> {
        let started = Instant::now();

        self.validator.validate(scenario)?;
        info!(
            identifier,
            chars = scenario.trim().chars().count(),
            model = self.generator.model(),
            "processing scenario"
        );

        let prompt = format!(
            "{}\n\n{}",
            prompts::system_prompt(),
            prompts::user_prompt(scenario.trim())
        );

        // Transient failures (provider error, empty output, unparseable
        // output) get exactly one retry of the generation step.
        let payload = match self.generate_payload(&prompt).await {
            Ok(payload) => payload,
            Err(err) if err.is_transient() => {
                warn!(identifier, error = %err, "generation failed, retrying once");
                self.generate_payload(&prompt).await?
            }
            Err(err) => return Err(err),
        };

        let report = response::validate(&payload);
        if !report.is_valid {
            warn!(
                identifier,
                errors = ?report.errors,
                "generated analysis failed contract validation"
            );
            return Err(FrameAuditError::Contract {
                errors: report.errors,
            });
        }

        if let Some(system_map) = payload.get("systemMap") {
            if response::has_image_or_diagram_content(system_map) {
                warn!(identifier, "system map contains embedded media markup");
            }
        }

        let outcome: AnalysisOutcome =
            serde_json::from_value(payload).map_err(|e| FrameAuditError::Contract {
                errors: vec![format!("typed conversion failed: {e}")],
            })?;

        let processing_time = started.elapsed().as_millis() as u64;
        info!(identifier, processing_ms = processing_time, "analysis complete");

        Ok(AnalysisResponse {
            outcome,
            metadata: Metadata {
                analyzed_at: Utc::now(),
                processing_time,
            },
        })
    }

    /// One generation attempt: call the backend, strip code fences, parse.
    async fn generate_payload(&self, prompt: &str) -> Result<Value> {
        let text = self
            .generator
            .generate(prompt)
            .await
            .map_err(FrameAuditError::from)?;

        let cleaned = strip_code_fences(&text);
        if cleaned.is_empty() {
            return Err(FrameAuditError::Parse {
                message: "model returned no content".to_string(),
            });
        }
        serde_json::from_str(cleaned).map_err(|e| FrameAuditError::Parse {
            message: format!("model output is not valid JSON: {e}"),
        })
    }
}

/// Models routinely wrap JSON in markdown code fences despite instructions
/// not to; strip one outer fence if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence) {
            return rest.strip_suffix("```").unwrap_or(rest).trim();
        }
    }
    trimmed
}
