//! Structural and semantic validation of generated analysis payloads.
//!
//! The model's output is untrusted: it has already been parsed as JSON, but
//! nothing else about it can be assumed. Validation runs over the raw
//! [`serde_json::Value`] so that a payload with the wrong type in one field
//! still gets every other check applied, and every defect is collected in a
//! single pass. Nothing here touches the network.

use serde_json::Value;

pub const FRAMING_VERDICTS: [&str; 4] = [
    "WELL_FRAMED",
    "PARTIALLY_FLAWED",
    "FUNDAMENTALLY_FLAWED",
    "FALSE_DILEMMA",
];

pub const LEVER_TYPES: [&str; 4] = ["STRUCTURAL", "INCENTIVE", "INFORMATION", "GOVERNANCE"];

/// Phrases that make a lever a recommendation instead of a description.
/// Matched case-insensitively against lever descriptions.
const PRESCRIPTIVE_PHRASES: [&str; 5] = [
    "you should",
    "you must",
    "you need to",
    "you ought to",
    "you have to",
];

/// Markers of embedded media or diagram markup in a serialized section.
const MEDIA_INDICATORS: [&str; 7] = [
    "data:image",
    "<svg",
    "<img",
    "base64",
    "![",
    "mermaid",
    "graphviz",
];

/// Every problem found in a payload, in discovery order. Validation never
/// stops at the first defect.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Returns the value under `key` when present and non-null.
fn get_present<'a>(payload: &'a Value, key: &str) -> Option<&'a Value> {
    payload.get(key).filter(|v| !v.is_null())
}

fn is_non_empty_string(value: &Value) -> bool {
    matches!(value.as_str(), Some(s) if !s.is_empty())
}

/// A payload counts as refusal-shaped when it carries either refusal field,
/// so a refusal missing its reason is reported as exactly that rather than
/// as three missing analysis sections.
fn is_refusal_shaped(payload: &Value) -> bool {
    payload.get("refusalReason").is_some() || payload.get("reframedQuestion").is_some()
}

/// Validates a parsed analysis payload against the output contract.
pub fn validate(payload: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    if is_refusal_shaped(payload) {
        validate_refusal(payload, &mut errors);
    } else {
        match get_present(payload, "frameAudit") {
            None => errors.push("Missing required frameAudit section".to_string()),
            Some(section) => validate_frame_audit(section, &mut errors),
        }
        match get_present(payload, "systemMap") {
            None => errors.push("Missing required systemMap section".to_string()),
            Some(section) => validate_system_map(section, &mut errors),
        }
        match get_present(payload, "realityCompression") {
            None => errors.push("Missing required realityCompression section".to_string()),
            Some(section) => validate_reality_compression(section, &mut errors),
        }
        if let Some(levers) = get_present(payload, "levers") {
            validate_levers(levers, &mut errors);
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn validate_refusal(payload: &Value, errors: &mut Vec<String>) {
    match get_present(payload, "refusalReason") {
        Some(reason) if is_non_empty_string(reason) => {}
        _ => errors.push("Refusal response missing refusalReason".to_string()),
    }

    // reframedQuestion is optional; only its shape is checked when present
    if let Some(question) = get_present(payload, "reframedQuestion") {
        if !is_non_empty_string(question) {
            errors.push("Refusal response reframedQuestion must be a non-empty string".to_string());
        }
    }

    for section in ["frameAudit", "systemMap", "realityCompression"] {
        if get_present(payload, section).is_some() {
            errors.push(format!(
                "Refusal response should not include {section} section"
            ));
        }
    }
}

fn validate_frame_audit(section: &Value, errors: &mut Vec<String>) {
    let verdict = section.get("framingVerdict");
    let verdict_ok = verdict
        .and_then(Value::as_str)
        .is_some_and(|v| FRAMING_VERDICTS.contains(&v));
    if !verdict_ok {
        errors.push(format!(
            "Invalid framingVerdict: {}. Must be one of: {}",
            display_value(verdict),
            FRAMING_VERDICTS.join(", ")
        ));
    }

    let score_ok = section
        .get("confidenceScore")
        .and_then(Value::as_f64)
        .is_some_and(|score| (0.0..=1.0).contains(&score));
    if !score_ok {
        errors.push("confidenceScore must be a number between 0 and 1".to_string());
    }

    let persists_ok = section
        .get("whyThisFramingPersists")
        .is_some_and(is_non_empty_string);
    if !persists_ok {
        errors.push("whyThisFramingPersists is required and must be a string".to_string());
    }
}

fn validate_system_map(section: &Value, errors: &mut Vec<String>) {
    for field in [
        "primaryControlHolder",
        "primaryCostBearer",
        "misalignmentDescription",
    ] {
        if !section.get(field).is_some_and(is_non_empty_string) {
            errors.push(format!("{field} is required and must be a string"));
        }
    }
}

fn validate_reality_compression(section: &Value, errors: &mut Vec<String>) {
    // A non-array reports the type error alone; cardinality is meaningless then
    let Some(truths) = section.get("coreTruths").and_then(Value::as_array) else {
        errors.push("coreTruths must be an array".to_string());
        return;
    };
    let count = truths.len();
    if !(3..=5).contains(&count) {
        errors.push(format!("coreTruths must contain 3-5 items, found {count}"));
    }
}

fn validate_levers(levers: &Value, errors: &mut Vec<String>) {
    let Some(change_points) = levers.get("changePoints").and_then(Value::as_array) else {
        errors.push("levers.changePoints must be an array".to_string());
        return;
    };

    for (index, lever) in change_points.iter().enumerate() {
        let lever_type = lever.get("leverType");
        let type_ok = lever_type
            .and_then(Value::as_str)
            .is_some_and(|t| LEVER_TYPES.contains(&t));
        if !type_ok {
            errors.push(format!(
                "Lever {index}: Invalid leverType: {}. Must be one of: {}",
                display_value(lever_type),
                LEVER_TYPES.join(", ")
            ));
        }

        if let Some(description) = lever.get("description").and_then(Value::as_str) {
            let lowered = description.to_lowercase();
            let found: Vec<&str> = PRESCRIPTIVE_PHRASES
                .iter()
                .copied()
                .filter(|phrase| lowered.contains(phrase))
                .collect();
            if !found.is_empty() {
                errors.push(format!(
                    "Lever {index}: Contains prescriptive language: {}",
                    found.join(", ")
                ));
            }
        }
    }
}

/// Heuristic media-leak detector: serializes the section and scans for
/// embedded image data or diagram markup. A hit is worth a log line, not a
/// rejection.
pub fn has_image_or_diagram_content(section: &Value) -> bool {
    let content = section.to_string();
    MEDIA_INDICATORS
        .iter()
        .any(|indicator| content.contains(indicator))
}

fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "missing".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_analysis() -> Value {
        json!({
            "frameAudit": {
                "assumptions": ["the stated deadline is immovable"],
                "falseBinaries": ["ship broken or miss the date"],
                "artificialConstraints": [],
                "beneficiaries": "whoever set the date",
                "hiddenElements": ["scope was never negotiated"],
                "framingVerdict": "FALSE_DILEMMA",
                "confidenceScore": 0.85,
                "whyThisFramingPersists": "deadline pressure rewards simple either/or stories"
            },
            "systemMap": {
                "actors": [
                    { "name": "Engineering", "type": "institution", "role": "delivers" },
                    { "name": "Sales", "type": "institution", "role": "commits dates" }
                ],
                "controlPoints": ["contract signature"],
                "dependencies": [
                    { "from": "Sales", "to": "Engineering", "description": "commitments flow one way" }
                ],
                "failureModes": ["quality collapse near the date"],
                "powerAsymmetries": [
                    { "decisionMaker": "Sales", "costBearer": "Engineering", "description": "date setters do not build" }
                ],
                "primaryControlHolder": "Sales leadership",
                "primaryCostBearer": "Engineering team",
                "misalignmentDescription": "those committing dates bear none of the delivery cost"
            },
            "realityCompression": {
                "coreTruths": [
                    "the date was a sales artifact, not an engineering estimate",
                    "scope and date were never connected",
                    "the binary hides the option of renegotiating scope"
                ]
            },
            "levers": {
                "changePoints": [
                    {
                        "description": "date commitments pass through delivery estimation",
                        "leverType": "GOVERNANCE",
                        "focus": "prevention",
                        "impact": "high"
                    }
                ]
            }
        })
    }

    #[test]
    fn accepts_a_complete_analysis() {
        let report = validate(&valid_analysis());
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn accepts_analysis_without_levers() {
        let mut payload = valid_analysis();
        payload.as_object_mut().unwrap().remove("levers");
        assert!(validate(&payload).is_valid);
    }

    #[test]
    fn accepts_a_refusal_with_reframe() {
        let payload = json!({
            "refusalReason": "asks for a moral ranking of human worth",
            "reframedQuestion": "what makes triage policies contested?"
        });
        assert!(validate(&payload).is_valid);
    }

    #[test]
    fn refusal_without_reframed_question_is_valid() {
        let payload = json!({ "refusalReason": "pure trolling, no analyzable framing" });
        assert!(validate(&payload).is_valid);
    }

    #[test]
    fn refusal_missing_reason_reports_exactly_one_error() {
        let payload = json!({ "reframedQuestion": "an analyzable alternative" });
        let report = validate(&payload);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("missing refusalReason"));
    }

    #[test]
    fn refusal_carrying_analysis_sections_reports_each() {
        let payload = json!({
            "refusalReason": "irredeemable",
            "frameAudit": { "framingVerdict": "WELL_FRAMED" },
            "systemMap": {}
        });
        let report = validate(&payload);
        assert!(!report.is_valid);
        assert!(
            report
                .errors
                .iter()
                .any(|e| e.contains("should not include frameAudit"))
        );
        assert!(
            report
                .errors
                .iter()
                .any(|e| e.contains("should not include systemMap"))
        );
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn empty_reframed_question_is_an_error() {
        let payload = json!({ "refusalReason": "irredeemable", "reframedQuestion": "" });
        let report = validate(&payload);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("reframedQuestion"));
    }

    #[test]
    fn missing_sections_report_one_error_each() {
        let report = validate(&json!({}));
        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].contains("frameAudit"));
        assert!(report.errors[1].contains("systemMap"));
        assert!(report.errors[2].contains("realityCompression"));
    }

    #[test]
    fn invalid_verdict_is_reported_with_allowed_values() {
        let mut payload = valid_analysis();
        payload["frameAudit"]["framingVerdict"] = json!("SOMEWHAT_FLAWED");
        let report = validate(&payload);
        assert!(!report.is_valid);
        assert!(
            report.errors[0].contains("Invalid framingVerdict: SOMEWHAT_FLAWED"),
            "got: {}",
            report.errors[0]
        );
        assert!(report.errors[0].contains("WELL_FRAMED"));
    }

    #[test]
    fn confidence_score_must_be_a_number_in_range() {
        for bad in [json!(1.5), json!(-0.1), json!("0.5"), json!(null)] {
            let mut payload = valid_analysis();
            payload["frameAudit"]["confidenceScore"] = bad;
            let report = validate(&payload);
            assert!(
                report
                    .errors
                    .iter()
                    .any(|e| e.contains("confidenceScore must be a number between 0 and 1"))
            );
        }
        for good in [json!(0), json!(1), json!(0.5)] {
            let mut payload = valid_analysis();
            payload["frameAudit"]["confidenceScore"] = good;
            assert!(validate(&payload).is_valid);
        }
    }

    #[test]
    fn missing_power_analysis_fields_are_each_reported() {
        let mut payload = valid_analysis();
        let map = payload["systemMap"].as_object_mut().unwrap();
        map.remove("primaryControlHolder");
        map.insert("primaryCostBearer".to_string(), json!(""));
        let report = validate(&payload);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("primaryControlHolder"));
        assert!(report.errors[1].contains("primaryCostBearer"));
    }

    #[test]
    fn core_truths_cardinality_bounds() {
        for (count, expect_valid) in [(2, false), (3, true), (4, true), (5, true), (6, false)] {
            let mut payload = valid_analysis();
            payload["realityCompression"]["coreTruths"] =
                json!(vec!["a truth".to_string(); count]);
            let report = validate(&payload);
            assert_eq!(
                report.is_valid, expect_valid,
                "count {count}: {:?}",
                report.errors
            );
            if !expect_valid {
                assert!(report.errors[0].contains(&format!("found {count}")));
            }
        }
    }

    #[test]
    fn non_array_core_truths_reports_type_error_only() {
        let mut payload = valid_analysis();
        payload["realityCompression"]["coreTruths"] = json!("not an array");
        let report = validate(&payload);
        assert_eq!(report.errors, vec!["coreTruths must be an array".to_string()]);
    }

    #[test]
    fn prescriptive_lever_language_is_flagged_case_insensitively() {
        for description in [
            "you should fix this",
            "YOU SHOULD fix this",
            "clearly You Must act here",
            "teams find you need to intervene",
        ] {
            let mut payload = valid_analysis();
            payload["levers"]["changePoints"][0]["description"] = json!(description);
            let report = validate(&payload);
            assert!(
                report
                    .errors
                    .iter()
                    .any(|e| e.contains("prescriptive language")),
                "not flagged: {description}"
            );
        }
    }

    #[test]
    fn invalid_lever_type_reports_indexed_error() {
        let mut payload = valid_analysis();
        payload["levers"]["changePoints"]
            .as_array_mut()
            .unwrap()
            .push(json!({
                "description": "budget authority moves closer to the work",
                "leverType": "FINANCIAL",
                "focus": "redesign",
                "impact": "medium"
            }));
        let report = validate(&payload);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Lever 1:"));
        assert!(report.errors[0].contains("FINANCIAL"));
    }

    #[test]
    fn non_array_change_points_is_an_error() {
        let mut payload = valid_analysis();
        payload["levers"] = json!({ "changePoints": {} });
        let report = validate(&payload);
        assert_eq!(
            report.errors,
            vec!["levers.changePoints must be an array".to_string()]
        );
    }

    #[test]
    fn all_defects_are_collected_in_one_pass() {
        let payload = json!({
            "frameAudit": {
                "framingVerdict": "WRONG",
                "confidenceScore": 7,
                "whyThisFramingPersists": ""
            },
            "realityCompression": { "coreTruths": ["only", "two"] },
            "levers": { "changePoints": [ { "description": "you should act", "leverType": "NOPE" } ] }
        });
        let report = validate(&payload);
        // verdict + confidence + persists + missing systemMap + cardinality
        // + lever type + prescriptive language
        assert_eq!(report.errors.len(), 7, "{:?}", report.errors);
    }

    #[test]
    fn media_markers_are_detected() {
        let with_svg = json!({ "misalignmentDescription": "see <svg width='10'>" });
        assert!(has_image_or_diagram_content(&with_svg));

        let with_markdown_image = json!({ "notes": "![diagram](x.png)" });
        assert!(has_image_or_diagram_content(&with_markdown_image));

        let clean = valid_analysis();
        assert!(!has_image_or_diagram_content(&clean["systemMap"]));
    }
}
