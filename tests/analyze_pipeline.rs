//! End-to-end tests of the analysis pipeline with scripted generation
//! backends: happy path, refusal, the single-retry budget, and contract
//! failures.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use frame_audit::analysis::AnalysisEngine;
use frame_audit::clients::{DemoGenerator, GenerateError, TextGenerator};
use frame_audit::config::InputConfig;
use frame_audit::error::FrameAuditError;
use frame_audit::model::{AnalysisOutcome, FramingVerdict};

/// Plays back a fixed sequence of generation results and counts calls.
struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerateError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(responses: Vec<Result<String, GenerateError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(GenerateError::Empty))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

fn engine_with(generator: Arc<dyn TextGenerator>) -> AnalysisEngine {
    AnalysisEngine::new(&InputConfig::default(), generator)
}

fn valid_analysis_text() -> String {
    json!({
        "frameAudit": {
            "assumptions": ["the migration must be all at once"],
            "falseBinaries": ["migrate now or never"],
            "artificialConstraints": [],
            "beneficiaries": "the vendor pushing the new platform",
            "hiddenElements": ["incremental paths"],
            "framingVerdict": "FALSE_DILEMMA",
            "confidenceScore": 0.9,
            "whyThisFramingPersists": "vendor incentives reward big-bang commitments"
        },
        "systemMap": {
            "actors": [
                { "name": "Platform team", "type": "institution", "role": "operates" }
            ],
            "controlPoints": ["contract renewal"],
            "dependencies": [],
            "failureModes": ["cutover failure"],
            "powerAsymmetries": [],
            "primaryControlHolder": "Vendor",
            "primaryCostBearer": "Platform team",
            "misalignmentDescription": "the party pushing the timeline carries no operational risk"
        },
        "realityCompression": {
            "coreTruths": [
                "the deadline comes from the vendor, not the system",
                "incremental migration is possible but unpriced",
                "risk concentrates on one night by choice"
            ]
        }
    })
    .to_string()
}

fn refusal_text() -> String {
    json!({
        "refusalReason": "The prompt demands a sacrifice decision",
        "reframedQuestion": "What makes triage policies contested?"
    })
    .to_string()
}

#[tokio::test]
async fn returns_a_typed_analysis_with_metadata() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(valid_analysis_text())]));
    let engine = engine_with(generator.clone());

    let response = engine.analyze("Migrate now or never?", "test").await.unwrap();
    match response.outcome {
        AnalysisOutcome::Analysis(analysis) => {
            assert_eq!(
                analysis.frame_audit.framing_verdict,
                FramingVerdict::FalseDilemma
            );
            assert_eq!(analysis.reality_compression.core_truths.len(), 3);
        }
        AnalysisOutcome::Refusal(_) => panic!("expected analysis"),
    }
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn refusals_come_back_as_the_refusal_variant() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(refusal_text())]));
    let engine = engine_with(generator);

    let response = engine.analyze("who deserves to die?", "test").await.unwrap();
    match response.outcome {
        AnalysisOutcome::Refusal(refusal) => {
            assert!(refusal.refusal_reason.contains("sacrifice"));
            assert!(refusal.reframed_question.is_some());
        }
        AnalysisOutcome::Analysis(_) => panic!("expected refusal"),
    }
}

#[tokio::test]
async fn fenced_output_is_accepted() {
    let fenced = format!("```json\n{}\n```", valid_analysis_text());
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(fenced)]));
    let engine = engine_with(generator);

    assert!(engine.analyze("a scenario", "test").await.is_ok());
}

#[tokio::test]
async fn unparseable_output_is_retried_once_and_recovers() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok("the model chats instead of emitting JSON".to_string()),
        Ok(valid_analysis_text()),
    ]));
    let engine = engine_with(generator.clone());

    assert!(engine.analyze("a scenario", "test").await.is_ok());
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn provider_failure_is_retried_once_and_recovers() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(GenerateError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }),
        Ok(valid_analysis_text()),
    ]));
    let engine = engine_with(generator.clone());

    assert!(engine.analyze("a scenario", "test").await.is_ok());
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn two_failures_exhaust_the_retry_budget() {
    let generator = Arc::new(ScriptedGenerator::new(vec![
        Err(GenerateError::Empty),
        Err(GenerateError::Api {
            status: 500,
            message: "boom".to_string(),
        }),
    ]));
    let engine = engine_with(generator.clone());

    let err = engine.analyze("a scenario", "test").await.unwrap_err();
    assert!(matches!(err, FrameAuditError::Provider { .. }));
    assert_eq!(generator.calls(), 2);
}

#[tokio::test]
async fn contract_violations_are_not_retried() {
    let mut payload: serde_json::Value =
        serde_json::from_str(&valid_analysis_text()).unwrap();
    payload["realityCompression"]["coreTruths"] = json!(["one", "two"]);

    let generator = Arc::new(ScriptedGenerator::new(vec![
        Ok(payload.to_string()),
        Ok(valid_analysis_text()),
    ]));
    let engine = engine_with(generator.clone());

    let err = engine.analyze("a scenario", "test").await.unwrap_err();
    match err {
        FrameAuditError::Contract { errors } => {
            assert!(errors.iter().any(|e| e.contains("found 2")));
        }
        other => panic!("expected contract error, got {other:?}"),
    }
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn mixed_refusal_and_analysis_is_rejected() {
    let mut payload: serde_json::Value =
        serde_json::from_str(&valid_analysis_text()).unwrap();
    payload["refusalReason"] = json!("also refusing, somehow");

    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(payload.to_string())]));
    let engine = engine_with(generator);

    let err = engine.analyze("a scenario", "test").await.unwrap_err();
    assert!(matches!(err, FrameAuditError::Contract { .. }));
}

#[tokio::test]
async fn invalid_input_short_circuits_before_generation() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(valid_analysis_text())]));
    let engine = engine_with(generator.clone());

    let scenario = "x".repeat(1501);
    let err = engine.analyze(&scenario, "test").await.unwrap_err();
    match err {
        FrameAuditError::Validation { message } => assert!(message.contains("1501")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn empty_input_short_circuits_before_generation() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(valid_analysis_text())]));
    let engine = engine_with(generator.clone());

    let err = engine.analyze("   ", "test").await.unwrap_err();
    assert!(matches!(err, FrameAuditError::Validation { .. }));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn demo_generator_drives_the_whole_pipeline() {
    let engine = engine_with(Arc::new(DemoGenerator::new()));
    let response = engine.analyze("A", "test").await.unwrap();
    match response.outcome {
        AnalysisOutcome::Analysis(analysis) => {
            assert_eq!(
                analysis.frame_audit.framing_verdict,
                FramingVerdict::PartiallyFlawed
            );
        }
        AnalysisOutcome::Refusal(_) => panic!("demo payload should be an analysis"),
    }
}
