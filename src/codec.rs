//! Decoding model replies into [`Action`]s.
//!
//! The model is asked for one fenced JSON object per reply, e.g.
//!
//! ~~~text
//! ```json
//! {"action": "fetch", "url": "https://example.com"}
//! ```
//! ~~~
//!
//! Decoding never fails: anything that cannot be understood becomes
//! [`Action::Invalid`] with a diagnostic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::ContentRef;
use crate::types::Action;

/// The four action shapes as they appear on the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum WireAction {
    Fetch {
        url: String,
    },
    Render {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wait_for: Option<String>,
    },
    Extract {
        content_id: ContentRef,
        selector: String,
    },
    Response {
        content: Value,
    },
}

impl From<WireAction> for Action {
    fn from(wire: WireAction) -> Self {
        match wire {
            WireAction::Fetch { url } => Action::Fetch { url },
            WireAction::Render { url, wait_for } => Action::Render {
                url,
                wait_for: wait_for.filter(|s| !s.trim().is_empty()),
            },
            WireAction::Extract {
                content_id,
                selector,
            } => Action::Extract {
                content_ref: content_id,
                selector,
            },
            WireAction::Response { content } => Action::Respond {
                content: match content {
                    Value::String(text) => text,
                    structured => structured.to_string(),
                },
            },
        }
    }
}

/// Decode a raw model reply.
///
/// Tries the first fenced block, then the span between the first `{` and
/// the last `}` of the whole reply.
pub fn decode(reply: &str) -> Action {
    let mut failures = Vec::new();

    if let Some(block) = fenced_block(reply) {
        match parse_object(block) {
            Ok(object) => return into_action(object),
            Err(e) => failures.push(format!("fenced block: {e}")),
        }
    }

    match brace_span(reply) {
        Some(span) => match parse_object(span) {
            Ok(object) => return into_action(object),
            Err(e) => failures.push(format!("brace span: {e}")),
        },
        None => failures.push("no JSON object found".to_string()),
    }

    Action::Invalid {
        reason: failures.join("; "),
    }
}

/// Render an action in the fenced wire shape. `Invalid` has no wire form.
pub fn encode(action: &Action) -> Option<String> {
    let wire = match action.clone() {
        Action::Fetch { url } => WireAction::Fetch { url },
        Action::Render { url, wait_for } => WireAction::Render { url, wait_for },
        Action::Extract {
            content_ref,
            selector,
        } => WireAction::Extract {
            content_id: content_ref,
            selector,
        },
        Action::Respond { content } => WireAction::Response {
            content: Value::String(content),
        },
        Action::Invalid { .. } => return None,
    };
    let json = serde_json::to_string(&wire).ok()?;
    Some(format!("```json\n{json}\n```"))
}

fn fenced_block(reply: &str) -> Option<&str> {
    let start = reply.find("```")? + 3;
    let rest = &reply[start..];
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    let body = match body.split_once('\n') {
        Some((info, tail)) if info.trim().eq_ignore_ascii_case("json") => tail,
        _ => body,
    };
    Some(body.trim())
}

fn brace_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn into_action(object: Map<String, Value>) -> Action {
    let tag = match object.get("action") {
        Some(Value::String(tag)) => tag.clone(),
        Some(_) => {
            return Action::Invalid {
                reason: "`action` field is not a string".to_string(),
            };
        }
        None => {
            return Action::Invalid {
                reason: "missing `action` field".to_string(),
            };
        }
    };

    match serde_json::from_value::<WireAction>(Value::Object(object)) {
        Ok(wire) => wire.into(),
        Err(e) => Action::Invalid {
            reason: format!("unusable `{tag}` action: {e}"),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
