//! Sample records and model replies.
//!
//! All data here is hardcoded and fictional. Tests and offline demos use it
//! in place of a live model.

use serde_json::{json, Value};

// ── Characters ───────────────────────────────────────────────────────────────

/// A complete, valid character record.
pub fn character_value() -> Value {
    json!({
        "name": "Maya Okafor",
        "verbs": ["negotiates", "mentors", "analyzes"],
        "adjectives": ["pragmatic", "curious", "steady"],
        "categories": {
            "character": [
                { "text": "Keeps her word", "emoji": "🤝" },
                { "text": "Quietly competitive", "emoji": "🏁" }
            ],
            "business": [
                { "text": "Supply chain planning", "emoji": "📦" },
                { "text": "Vendor negotiation", "emoji": "💼" }
            ],
            "psychology": [
                { "text": "Thrives under pressure", "emoji": "🔥" },
                { "text": "Dislikes ambiguity", "emoji": "🧭" }
            ],
            "desires": [
                { "text": "Run her own logistics firm", "emoji": "🚚" },
                { "text": "Sail around Cape Horn", "emoji": "⛵" }
            ]
        }
    })
}

/// A chatty model reply with the character inside a `json` fence.
pub fn character_reply() -> String {
    let body = serde_json::to_string_pretty(&character_value()).unwrap_or_default();
    format!("Here is the profile you asked for:\n```json\n{body}\n```\nLet me know if you need more.")
}

// ── Negotiation scenarios ─────────────────────────────────────────────────────

/// A complete, valid negotiation scenario with both optional sections.
pub fn scenario_value() -> Value {
    json!({
        "negotiationId": "neg-2024-cloud-001",
        "topic": {
            "title": "Cloud Migration Contract Renewal",
            "description": "Renewal of a three-year managed cloud hosting agreement.",
            "context": "The incumbent provider raised prices 18% after an outage last quarter.",
            "industry": "Information technology",
            "expectedTimeframe": "6 weeks"
        },
        "parties": [
            {
                "id": "party1",
                "name": "Northwind Retail",
                "role": "Customer",
                "interests": ["Lower hosting cost", "Stronger uptime guarantees"],
                "constraints": ["Board-approved budget cap"],
                "authorityLevel": "full"
            },
            {
                "id": "party2",
                "name": "Stratus Hosting",
                "role": "Provider",
                "interests": ["Retain a flagship account", "Protect margins"],
                "constraints": ["Regional pricing policy"],
                "authorityLevel": "limited"
            }
        ],
        "conflictPoints": [
            {
                "id": "conflict1",
                "description": "Price increase versus service credits for the outage",
                "severity": "high",
                "impact": "Could end the relationship",
                "relatedPoints": ["point1"]
            }
        ],
        "negotiablePoints": [
            {
                "id": "point1",
                "topic": "Annual fee",
                "currentPosition": {
                    "party1Position": "Flat renewal at current price",
                    "party2Position": "18% increase"
                },
                "acceptableRange": {
                    "minimum": "0% increase",
                    "maximum": "8% increase",
                    "preferredOutcome": "4% increase with service credits"
                },
                "priority": "high",
                "flexibility": "moderate"
            }
        ],
        "nonNegotiablePoints": [
            {
                "id": "nonNeg1",
                "description": "Data must stay in the EU region",
                "rationale": "Regulatory requirement",
                "impact": "Limits the provider's cost-saving options"
            }
        ],
        "walkawayConditions": {
            "party1Conditions": [
                {
                    "condition": "Uptime SLA below 99.9%",
                    "threshold": "99.9%",
                    "reasoning": "Checkout downtime costs more than the contract"
                }
            ],
            "party2Conditions": [
                {
                    "condition": "Price below cost of service",
                    "threshold": "3% margin",
                    "reasoning": null
                }
            ]
        },
        "strategies": {
            "overallApproach": "collaborative",
            "longTermObjectives": [
                {
                    "objective": "Multi-year partnership",
                    "importance": "high",
                    "timeframe": "3 years"
                }
            ],
            "relationshipGoals": {
                "desiredOutcome": "strengthen",
                "futureInteractions": "Quarterly service reviews"
            }
        },
        "tactics": {
            "openingApproach": {
                "initialOffer": "Flat renewal plus outage credits",
                "anchoringStrategy": "Anchor on competitor quotes"
            },
            "concessionPlan": {
                "sequence": [
                    {
                        "stage": "Opening",
                        "possibleConcessions": ["Longer term"],
                        "triggerConditions": ["Provider offers credits"]
                    }
                ],
                "pacing": "One concession per meeting"
            },
            "persuasionTechniques": [
                {
                    "technique": "social-proof",
                    "applicationContext": "Cite peers who negotiated credits",
                    "fallbackOptions": ["Escalate to account executive"]
                }
            ],
            "informationGathering": {
                "keyQuestions": ["What caused the outage?"],
                "observationFocus": ["Flexibility on term length"]
            },
            "deadlockBreakers": [
                {
                    "approach": "Bring in a neutral benchmark",
                    "conditions": "After two stalled rounds",
                    "risks": "Benchmark may favour the provider"
                }
            ]
        }
    })
}

/// A model reply with the scenario inside an untagged fence.
pub fn scenario_reply() -> String {
    let body = serde_json::to_string_pretty(&scenario_value()).unwrap_or_default();
    format!("```\n{body}\n```")
}
