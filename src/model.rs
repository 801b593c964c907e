//! Wire types for analysis payloads.
//!
//! The generated output is modeled as a tagged union: a response is either a
//! refusal or a full analysis, never a mix. The union is only constructed
//! after [`crate::validation::response`] has accepted the raw JSON, so the
//! exclusivity invariant holds at the type level from that point on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of how flawed a scenario's stated framing is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FramingVerdict {
    WellFramed,
    PartiallyFlawed,
    FundamentallyFlawed,
    FalseDilemma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    Person,
    System,
    Institution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeverType {
    Structural,
    Incentive,
    Information,
    Governance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeverFocus {
    Prevention,
    Redesign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeverImpact {
    High,
    Medium,
    Low,
}

/// First analysis section: why the problem as stated may be flawed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAudit {
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub false_binaries: Vec<String>,
    #[serde(default)]
    pub artificial_constraints: Vec<String>,
    #[serde(default)]
    pub beneficiaries: String,
    #[serde(default)]
    pub hidden_elements: Vec<String>,
    pub framing_verdict: FramingVerdict,
    /// Confidence that the verdict classification is correct, not confidence
    /// in the analysis itself.
    pub confidence_score: f64,
    pub why_this_framing_persists: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    #[serde(rename = "type")]
    pub actor_type: ActorType,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemDependency {
    pub from: String,
    pub to: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerAsymmetry {
    pub decision_maker: String,
    pub cost_bearer: String,
    pub description: String,
}

/// Second analysis section: the actual system, not the story.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMap {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub control_points: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<SystemDependency>,
    #[serde(default)]
    pub failure_modes: Vec<String>,
    #[serde(default)]
    pub power_asymmetries: Vec<PowerAsymmetry>,
    pub primary_control_holder: String,
    pub primary_cost_bearer: String,
    pub misalignment_description: String,
}

/// Third analysis section: 3-5 core truths, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealityCompression {
    pub core_truths: Vec<String>,
}

/// A described system change point. Levers are descriptive, not
/// recommendations; the validator rejects prescriptive phrasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lever {
    pub description: String,
    pub lever_type: LeverType,
    pub focus: LeverFocus,
    pub impact: LeverImpact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Levers {
    pub change_points: Vec<Lever>,
}

/// Terminal outcome where the system declines to analyze the scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refusal {
    pub refusal_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reframed_question: Option<String>,
}

/// A complete analysis: the three core sections, levers optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub frame_audit: FrameAudit,
    pub system_map: SystemMap,
    pub reality_compression: RealityCompression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levers: Option<Levers>,
}

/// Refusal or analysis, never both. Matched exhaustively everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Refusal(Refusal),
    Analysis(Analysis),
}

/// Timing metadata computed by the engine; anything the model emits under
/// `metadata` is discarded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub analyzed_at: DateTime<Utc>,
    /// Elapsed wall time in milliseconds from request entry to completion.
    pub processing_time: u64,
}

/// Response envelope: the outcome's fields at the top level plus metadata.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    RateLimitError,
    ProcessingError,
}

/// JSON error envelope returned by the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: ErrorCode,
    pub message: String,
}
