//! Negotiation scenarios.
//!
//! The core of a scenario (topic, parties, conflict and negotiable points,
//! non-negotiables, walkaway conditions) is required. `strategies` and
//! `tactics` are optional sections: absence is only a warning, but a present
//! section must validate on its own. Optional scalars serialize as `null` so
//! artifacts keep a stable shape.
//!
//! Each scenario is written to its own artifact named after `topic.title`,
//! wrapped in `"scenarios"`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use promptforge_contracts::{
    artifact::ArtifactLayout,
    chat::PromptSpec,
    verify::{CrossFieldCheck, FieldFailure, OptionalSection, RecordSchema},
};
use promptforge_core::traits::GeneratedRecord;
use promptforge_verify::SchemaVerifier;

const PREAMBLE: &str = "Generate a negotiation scenario with the following context:";
const INSTRUCTIONS: &str = include_str!("../prompts/negotiation.txt");

/// Cross-field check: every party id appears once. Stricter than the schema
/// alone; scenarios with repeated ids are rejected and regenerated.
pub const DISTINCT_PARTY_IDS: &str = "distinct-party-ids";

// ── Enumerations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorityLevel {
    Full,
    Limited,
    Consultant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flexibility {
    Rigid,
    Moderate,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesiredOutcome {
    Strengthen,
    Maintain,
    ProfessionalDistance,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallApproach {
    Competitive,
    Collaborative,
    Accommodating,
    Compromising,
    Avoiding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    Reciprocity,
    SocialProof,
    Authority,
    Scarcity,
    Consistency,
    Liking,
}

// ── Record types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub title: String,
    pub description: String,
    pub context: String,
    pub industry: Option<String>,
    pub expected_timeframe: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub role: String,
    pub interests: Vec<String>,
    pub constraints: Vec<String>,
    pub authority_level: Option<AuthorityLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictPoint {
    pub id: String,
    pub description: String,
    pub severity: Severity,
    pub impact: String,
    pub related_points: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub party1_position: String,
    pub party2_position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptableRange {
    pub minimum: String,
    pub maximum: String,
    pub preferred_outcome: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiablePoint {
    pub id: String,
    pub topic: String,
    pub current_position: Position,
    pub acceptable_range: AcceptableRange,
    pub priority: Option<Priority>,
    pub flexibility: Option<Flexibility>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonNegotiablePoint {
    pub id: String,
    pub description: String,
    pub rationale: String,
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkawayCondition {
    pub condition: String,
    pub threshold: String,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkawayConditions {
    pub party1_conditions: Vec<WalkawayCondition>,
    pub party2_conditions: Vec<WalkawayCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTermObjective {
    pub objective: String,
    pub importance: Importance,
    pub timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipGoals {
    pub desired_outcome: DesiredOutcome,
    pub future_interactions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub overall_approach: OverallApproach,
    pub long_term_objectives: Vec<LongTermObjective>,
    pub relationship_goals: RelationshipGoals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningApproach {
    pub initial_offer: String,
    pub anchoring_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcessionStage {
    pub stage: String,
    pub possible_concessions: Vec<String>,
    pub trigger_conditions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConcessionPlan {
    pub sequence: Vec<ConcessionStage>,
    pub pacing: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersuasionTechnique {
    pub technique: Technique,
    pub application_context: String,
    pub fallback_options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformationGathering {
    pub key_questions: Vec<String>,
    pub observation_focus: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockBreaker {
    pub approach: String,
    pub conditions: String,
    pub risks: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tactics {
    pub opening_approach: OpeningApproach,
    pub concession_plan: ConcessionPlan,
    pub persuasion_techniques: Vec<PersuasionTechnique>,
    pub information_gathering: InformationGathering,
    pub deadlock_breakers: Vec<DeadlockBreaker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationScenario {
    pub negotiation_id: String,
    pub topic: Topic,
    pub parties: Vec<Party>,
    pub conflict_points: Vec<ConflictPoint>,
    pub negotiable_points: Vec<NegotiablePoint>,
    pub non_negotiable_points: Vec<NonNegotiablePoint>,
    pub walkaway_conditions: WalkawayConditions,
    pub strategies: Option<Strategy>,
    pub tactics: Option<Tactics>,
}

// ── Schema ────────────────────────────────────────────────────────────────────

fn string() -> Value {
    json!({ "type": "string" })
}

fn optional_string() -> Value {
    json!({ "type": ["string", "null"] })
}

fn strings() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn optional_strings() -> Value {
    json!({ "type": ["array", "null"], "items": { "type": "string" } })
}

fn one_of(values: &[&str]) -> Value {
    json!({ "type": "string", "enum": values })
}

fn optional_one_of(values: &[&str]) -> Value {
    let mut allowed: Vec<Value> = values.iter().map(|v| json!(v)).collect();
    allowed.push(Value::Null);
    json!({ "type": ["string", "null"], "enum": allowed })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

fn strategy_schema() -> Value {
    object(
        json!({
            "overallApproach": one_of(&[
                "competitive", "collaborative", "accommodating", "compromising", "avoiding",
            ]),
            "longTermObjectives": array_of(object(
                json!({
                    "objective": string(),
                    "importance": one_of(&["critical", "high", "medium", "low"]),
                    "timeframe": string()
                }),
                &["objective", "importance", "timeframe"],
            )),
            "relationshipGoals": object(
                json!({
                    "desiredOutcome": one_of(&[
                        "strengthen", "maintain", "professional-distance", "terminate",
                    ]),
                    "futureInteractions": optional_string()
                }),
                &["desiredOutcome"],
            )
        }),
        &["overallApproach", "longTermObjectives", "relationshipGoals"],
    )
}

fn tactics_schema() -> Value {
    object(
        json!({
            "openingApproach": object(
                json!({ "initialOffer": string(), "anchoringStrategy": string() }),
                &["initialOffer", "anchoringStrategy"],
            ),
            "concessionPlan": object(
                json!({
                    "sequence": array_of(object(
                        json!({
                            "stage": string(),
                            "possibleConcessions": strings(),
                            "triggerConditions": strings()
                        }),
                        &["stage", "possibleConcessions", "triggerConditions"],
                    )),
                    "pacing": string()
                }),
                &["sequence", "pacing"],
            ),
            "persuasionTechniques": array_of(object(
                json!({
                    "technique": one_of(&[
                        "reciprocity", "social-proof", "authority", "scarcity", "consistency", "liking",
                    ]),
                    "applicationContext": string(),
                    "fallbackOptions": optional_strings()
                }),
                &["technique", "applicationContext"],
            )),
            "informationGathering": object(
                json!({ "keyQuestions": strings(), "observationFocus": strings() }),
                &["keyQuestions", "observationFocus"],
            ),
            "deadlockBreakers": array_of(object(
                json!({ "approach": string(), "conditions": string(), "risks": string() }),
                &["approach", "conditions", "risks"],
            ))
        }),
        &[
            "openingApproach",
            "concessionPlan",
            "persuasionTechniques",
            "informationGathering",
            "deadlockBreakers",
        ],
    )
}

fn walkaway_condition() -> Value {
    object(
        json!({ "condition": string(), "threshold": string(), "reasoning": optional_string() }),
        &["condition", "threshold"],
    )
}

fn scenario_schema() -> Value {
    let mut parties = array_of(object(
        json!({
            "id": string(),
            "name": string(),
            "role": string(),
            "interests": strings(),
            "constraints": strings(),
            "authorityLevel": optional_one_of(&["full", "limited", "consultant"])
        }),
        &["id", "name", "role", "interests", "constraints"],
    ));
    parties["minItems"] = json!(1);

    object(
        json!({
            "negotiationId": string(),
            "topic": object(
                json!({
                    "title": string(),
                    "description": string(),
                    "context": string(),
                    "industry": optional_string(),
                    "expectedTimeframe": optional_string()
                }),
                &["title", "description", "context"],
            ),
            "parties": parties,
            "conflictPoints": array_of(object(
                json!({
                    "id": string(),
                    "description": string(),
                    "severity": one_of(&["low", "medium", "high", "critical"]),
                    "impact": string(),
                    "relatedPoints": optional_strings()
                }),
                &["id", "description", "severity", "impact"],
            )),
            "negotiablePoints": array_of(object(
                json!({
                    "id": string(),
                    "topic": string(),
                    "currentPosition": object(
                        json!({ "party1Position": string(), "party2Position": string() }),
                        &["party1Position", "party2Position"],
                    ),
                    "acceptableRange": object(
                        json!({ "minimum": string(), "maximum": string(), "preferredOutcome": string() }),
                        &["minimum", "maximum", "preferredOutcome"],
                    ),
                    "priority": optional_one_of(&["low", "medium", "high"]),
                    "flexibility": optional_one_of(&["rigid", "moderate", "flexible"])
                }),
                &["id", "topic", "currentPosition", "acceptableRange"],
            )),
            "nonNegotiablePoints": array_of(object(
                json!({
                    "id": string(),
                    "description": string(),
                    "rationale": string(),
                    "impact": optional_string()
                }),
                &["id", "description", "rationale"],
            )),
            "walkawayConditions": object(
                json!({
                    "party1Conditions": array_of(walkaway_condition()),
                    "party2Conditions": array_of(walkaway_condition())
                }),
                &["party1Conditions", "party2Conditions"],
            ),
            "strategies": { "type": ["object", "null"] },
            "tactics": { "type": ["object", "null"] }
        }),
        &[
            "negotiationId",
            "topic",
            "parties",
            "conflictPoints",
            "negotiablePoints",
            "nonNegotiablePoints",
            "walkawayConditions",
        ],
    )
}

impl GeneratedRecord for NegotiationScenario {
    const KIND: &'static str = "scenario";
    const WRAPPER_KEY: &'static str = "scenarios";

    fn schema() -> RecordSchema {
        RecordSchema {
            schema_id: "negotiation-scenario-v1".to_string(),
            json_schema: scenario_schema(),
            sections: vec![
                OptionalSection {
                    field: "strategies".to_string(),
                    json_schema: strategy_schema(),
                },
                OptionalSection {
                    field: "tactics".to_string(),
                    json_schema: tactics_schema(),
                },
            ],
            checks: vec![CrossFieldCheck {
                check_id: DISTINCT_PARTY_IDS.to_string(),
                description: "each party id appears once".to_string(),
            }],
        }
    }

    fn prompt() -> PromptSpec {
        PromptSpec::new(PREAMBLE, INSTRUCTIONS)
    }

    fn layout() -> ArtifactLayout {
        ArtifactLayout::PerRecord
    }

    fn title(&self) -> Option<&str> {
        Some(&self.topic.title)
    }
}

// ── Cross-field checks ────────────────────────────────────────────────────────

fn distinct_party_ids(candidate: &Value) -> Option<FieldFailure> {
    let ids: Vec<&str> = candidate
        .get("parties")?
        .as_array()?
        .iter()
        .filter_map(|p| p.get("id").and_then(Value::as_str))
        .collect();

    ids.iter()
        .enumerate()
        .find(|&(i, id)| ids[..i].contains(id))
        .map(|(_, id)| FieldFailure::new("parties", format!("party id '{id}' appears more than once")))
}

/// Register the scenario's cross-field checks with `verifier`.
pub fn install_checks(verifier: &mut SchemaVerifier) {
    verifier.register_check(DISTINCT_PARTY_IDS, Box::new(distinct_party_ids));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
