//! Deterministic, local generator for testing and quota-free operation (no
//! network).

use async_trait::async_trait;
use serde_json::json;

use crate::clients::traits::{GenerateError, TextGenerator};

/// Returns a fixed, contract-conforming analysis regardless of the scenario.
pub struct DemoGenerator;

impl DemoGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for DemoGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        let payload = json!({
            "frameAudit": {
                "assumptions": [
                    "The problem as stated is the actual problem",
                    "Current constraints are fixed and unchangeable",
                    "All stakeholders have been identified"
                ],
                "falseBinaries": ["Either solve it this way or fail"],
                "artificialConstraints": ["Time pressure may be self-imposed"],
                "beneficiaries": "Those who benefit from maintaining the current framing",
                "hiddenElements": ["Systemic factors", "Power dynamics", "Alternative approaches"],
                "framingVerdict": "PARTIALLY_FLAWED",
                "confidenceScore": 0.7,
                "whyThisFramingPersists": "Institutional inertia and cognitive shortcuts make this framing convenient"
            },
            "systemMap": {
                "actors": [
                    { "name": "Decision Maker", "type": "person", "role": "Makes choices" },
                    { "name": "System", "type": "system", "role": "Executes decisions" }
                ],
                "controlPoints": ["Decision point", "Resource allocation"],
                "dependencies": [
                    { "from": "Decision Maker", "to": "System", "description": "Controls system behavior" }
                ],
                "failureModes": ["Misaligned incentives", "Information asymmetry"],
                "powerAsymmetries": [
                    {
                        "decisionMaker": "Decision Maker",
                        "costBearer": "End Users",
                        "description": "Those who decide don't bear the costs"
                    }
                ],
                "primaryControlHolder": "Decision Maker",
                "primaryCostBearer": "End Users",
                "misalignmentDescription": "Control and cost are separated, creating misaligned incentives"
            },
            "realityCompression": {
                "coreTruths": [
                    "The framing of the problem shapes what solutions appear possible",
                    "Power asymmetries mean those who decide often don't bear the consequences",
                    "Systemic issues require systemic solutions, not individual fixes"
                ]
            }
        });

        Ok(payload.to_string())
    }

    fn model(&self) -> &str {
        "demo"
    }
}
