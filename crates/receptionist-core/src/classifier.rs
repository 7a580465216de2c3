//! Classification of inbound SDK payloads.
//!
//! Tool results and errors arrive as free text, so outcomes are inferred by
//! substring matching against a fixed vocabulary. The matching is a
//! heuristic and can misfire on ambiguous phrasing (for example "not a hot
//! lead" also contains "hot lead" and is read as a hot lead). The rules below
//! are kept exactly as the workflow backend's responses have been read so far.

use protocol::{FunctionCall, SdkError};
use serde_json::Value;

use crate::assistant::tools;
use crate::audio::NOISE_FILTER_MARKERS;

/// What a named remote call means for the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAction {
    SaveField { name: Option<String>, value: String },
    CheckDisqualifier,
    CheckHotLead,
    RouteExistingCustomer,
    RouteClaim,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCall {
    pub action: ToolAction,
    /// False when string-encoded arguments failed to parse; they are treated as empty.
    pub arguments_ok: bool,
}

pub fn classify_call(call: &FunctionCall) -> ClassifiedCall {
    let parsed = call.parsed_arguments();
    let arguments_ok = parsed.is_some();
    let args = parsed.unwrap_or_default();

    let action = match call.name.as_str() {
        tools::SAVE_FIELD => ToolAction::SaveField {
            name: args.get("field_name").map(text_of).filter(|s| !s.is_empty()),
            value: args.get("field_value").map(text_of).unwrap_or_default(),
        },
        tools::CHECK_DISQUALIFIER => ToolAction::CheckDisqualifier,
        tools::CHECK_HOT_LEAD => ToolAction::CheckHotLead,
        tools::ROUTE_EXISTING_CUSTOMER => ToolAction::RouteExistingCustomer,
        tools::ROUTE_CLAIM => ToolAction::RouteClaim,
        other => ToolAction::Unknown(other.to_string()),
    };
    ClassifiedCall { action, arguments_ok }
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisqualifierVerdict {
    Qualified,
    Disqualified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadVerdict {
    Hot,
    Standard,
}

/// Independent readings of one tool result; any combination may be present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultVerdict {
    pub disqualifier: Option<DisqualifierVerdict>,
    pub lead: Option<LeadVerdict>,
    pub workflow_complete: bool,
}

impl ResultVerdict {
    pub fn is_empty(&self) -> bool {
        self.disqualifier.is_none() && self.lead.is_none() && !self.workflow_complete
    }
}

pub fn classify_result(result: &str) -> ResultVerdict {
    let r = result.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| r.contains(n));

    // Qualifying phrases win over the bare "disqualified" they contain.
    let disqualifier = if has(&["not disqualified", "qualifies"]) {
        Some(DisqualifierVerdict::Qualified)
    } else if has(&["disqualified"]) {
        Some(DisqualifierVerdict::Disqualified)
    } else {
        None
    };

    let lead = if has(&["hot lead", "high value", "transfer"]) {
        Some(LeadVerdict::Hot)
    } else if has(&["not a hot lead", "standard", "not hot"]) {
        Some(LeadVerdict::Standard)
    } else {
        None
    };

    ResultVerdict {
        disqualifier,
        lead,
        workflow_complete: has(&["ticket created", "notification sent"]),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Known noise-filter incompatibility; the call carries on.
    Benign,
    /// The transport kicked us out of the room.
    Ejection,
    /// Failure to start (auth, bad request, start method rejected).
    FatalStart,
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub class: ErrorClass,
    pub message: String,
    pub status: Option<u16>,
}

pub fn classify_error(err: &SdkError) -> ClassifiedError {
    let message = err.message();
    let status = err.status_code();
    let mentions = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

    let class = if mentions(NOISE_FILTER_MARKERS) || mentions(&["mic processor"]) {
        ErrorClass::Benign
    } else if mentions(&["ejected", "Meeting has ended"]) {
        ErrorClass::Ejection
    } else if err.kind() == Some("start-method-error")
        || status.is_some_and(|s| s >= 400)
        || mentions(&["start", "unauthorized"])
    {
        ErrorClass::FatalStart
    } else {
        ErrorClass::Unclassified
    };

    ClassifiedError { class, message, status }
}
