//! Remote tool contracts served by the workflow backend.

use protocol::assistant::{FunctionSpec, ToolSchema, ToolServer};
use serde_json::{json, Value};

pub const SAVE_FIELD: &str = "save_field";
pub const CHECK_DISQUALIFIER: &str = "check_disqualifier";
pub const CHECK_HOT_LEAD: &str = "check_hot_lead";
pub const ROUTE_EXISTING_CUSTOMER: &str = "route_existing_customer";
pub const ROUTE_CLAIM: &str = "route_claim";

/// Webhook path (under the workflow base URL) for each tool.
pub fn webhook_path(tool: &str) -> Option<&'static str> {
    match tool {
        SAVE_FIELD => Some("vapi-save-field"),
        CHECK_DISQUALIFIER => Some("vapi-check-disqualifier"),
        CHECK_HOT_LEAD => Some("vapi-check-hotlead"),
        ROUTE_EXISTING_CUSTOMER => Some("vapi-existing-customer"),
        ROUTE_CLAIM => Some("vapi-claim"),
        _ => None,
    }
}

/// Post-call report endpoint.
pub const CALL_ENDED_PATH: &str = "vapi-call-ended";

/// Intake fields accepted by `save_field` during business hours.
pub const BUSINESS_FIELDS: &[&str] = &[
    "caller_name",
    "caller_phone",
    "caller_email",
    "caller_address",
    "caller_dob",
    "caller_occupation",
    "policy_type",
    "referral_source",
    "shopping_reason",
    "current_coverage",
    "claims_history",
    "coverage_urgency",
    "reason_for_calling",
];

/// After hours only a callback message is taken.
pub const AFTER_HOURS_FIELDS: &[&str] = &["caller_name", "caller_phone", "reason_for_calling"];

pub fn endpoint(webhook_base: &str, path: &str) -> String {
    format!("{}/{}", webhook_base.trim_end_matches('/'), path)
}

fn tool(webhook_base: &str, name: &str, description: &str, parameters: Value) -> ToolSchema {
    let path = webhook_path(name).unwrap_or(name);
    ToolSchema {
        kind: "function".to_string(),
        function: FunctionSpec {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        },
        server: ToolServer {
            url: endpoint(webhook_base, path),
        },
    }
}

fn call_id() -> Value {
    json!({ "type": "string", "description": "The current call id." })
}

pub fn save_field(webhook_base: &str, allowed: &[&str]) -> ToolSchema {
    tool(
        webhook_base,
        SAVE_FIELD,
        "Save one piece of caller information as soon as it is collected.",
        json!({
            "type": "object",
            "properties": {
                "call_id": call_id(),
                "field_name": {
                    "type": "string",
                    "enum": allowed,
                    "description": "Which intake field is being saved."
                },
                "field_value": {
                    "type": "string",
                    "description": "The value exactly as confirmed with the caller."
                }
            },
            "required": ["field_name", "field_value"]
        }),
    )
}

pub fn check_disqualifier(webhook_base: &str) -> ToolSchema {
    tool(
        webhook_base,
        CHECK_DISQUALIFIER,
        "Check whether the caller is disqualified (3+ claims in the worst year, or property coverage needed within 72 hours).",
        json!({
            "type": "object",
            "properties": {
                "call_id": call_id(),
                "claims_count_worst_year": {
                    "type": "integer",
                    "description": "Number of claims in the caller's worst year out of the last five."
                },
                "urgency_hours": {
                    "type": "integer",
                    "description": "Hours until coverage must start. 0 when there is no deadline."
                },
                "policy_type": {
                    "type": "string",
                    "enum": ["auto", "renters", "property", "business"]
                }
            },
            "required": ["claims_count_worst_year", "urgency_hours"]
        }),
    )
}

pub fn check_hot_lead(webhook_base: &str) -> ToolSchema {
    tool(
        webhook_base,
        CHECK_HOT_LEAD,
        "Check whether the caller is a hot lead (property over $2M or auto over $180K) that needs an immediate transfer.",
        json!({
            "type": "object",
            "properties": {
                "call_id": call_id(),
                "policy_type": {
                    "type": "string",
                    "enum": ["auto", "property", "homeowners", "renters", "business"]
                },
                "estimated_value": {
                    "type": "number",
                    "description": "Estimated value in US dollars."
                }
            },
            "required": ["policy_type", "estimated_value"]
        }),
    )
}

pub fn route_existing_customer(webhook_base: &str) -> ToolSchema {
    tool(
        webhook_base,
        ROUTE_EXISTING_CUSTOMER,
        "Create a service ticket for an existing customer and notify the account manager.",
        json!({
            "type": "object",
            "properties": {
                "call_id": call_id(),
                "caller_name": { "type": "string" },
                "caller_phone": { "type": "string" },
                "policy_type": {
                    "type": "string",
                    "enum": ["auto", "renters", "property", "business", "life", "health", "other"]
                },
                "request_description": { "type": "string" }
            },
            "required": ["caller_name", "caller_phone", "request_description"]
        }),
    )
}

pub fn route_claim(webhook_base: &str) -> ToolSchema {
    tool(
        webhook_base,
        ROUTE_CLAIM,
        "File a claim report and send a priority notification to the claims team.",
        json!({
            "type": "object",
            "properties": {
                "call_id": call_id(),
                "caller_name": { "type": "string" },
                "caller_phone": { "type": "string" },
                "policy_number": {
                    "type": "string",
                    "description": "Empty when the caller does not have it."
                },
                "claim_type": {
                    "type": "string",
                    "enum": ["auto", "property", "renters", "business", "other"]
                },
                "claim_description": { "type": "string" },
                "claim_urgency": {
                    "type": "string",
                    "enum": ["low", "medium", "high"]
                }
            },
            "required": ["caller_name", "caller_phone", "claim_type", "claim_description"]
        }),
    )
}
