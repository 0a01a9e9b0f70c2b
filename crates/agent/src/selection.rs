//! Selection resolution — normalizing model responses into one shape.
//!
//! Models answer in two incompatible forms: native structured tool calls,
//! or free text with a ```json fenced payload. Both (and their legacy field
//! spellings `name`/`arguments` vs `actionName`/`params`) normalize here
//! into a single [`Selection`] at the boundary; nothing downstream ever
//! sees the ambiguity. Resolution failure is a value, not an error — the
//! dispatcher reports it and the loop continues.

use serde::{Deserialize, Serialize};
use webpilot_core::fence::extract_json_block;
use webpilot_core::provider::ModelResponse;
use webpilot_core::tool::ToolParams;

/// The normalized model decision: which tool, with which parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "actionName")]
    pub action_name: String,
    pub params: ToolParams,
}

/// Resolve a model response into a selection.
///
/// `native_tool_calls` names the designated convention for the model that
/// produced the response, but both shapes are always accepted — robustness
/// over strictness. Returns `None` for absent or malformed payloads.
pub fn resolve(response: &ModelResponse, native_tool_calls: bool) -> Option<Selection> {
    if native_tool_calls {
        from_native(response).or_else(|| from_text(response))
    } else {
        from_text(response).or_else(|| from_native(response))
    }
}

/// First native tool-call entry, arguments parsed from their wire encoding.
fn from_native(response: &ModelResponse) -> Option<Selection> {
    let call = response.tool_calls.first()?;
    if call.name.is_empty() {
        return None;
    }

    let params = if call.arguments.trim().is_empty() {
        ToolParams::new()
    } else {
        match serde_json::from_str::<serde_json::Value>(&call.arguments) {
            Ok(serde_json::Value::Object(map)) => map,
            Ok(serde_json::Value::Null) => ToolParams::new(),
            _ => return None,
        }
    };

    Some(Selection {
        action_name: call.name.clone(),
        params,
    })
}

/// Fenced (or bare) JSON payload in the response text.
fn from_text(response: &ModelResponse) -> Option<Selection> {
    let content = response.content.trim();
    if content.is_empty() {
        return None;
    }

    let payload = extract_json_block(content);
    let value = serde_json::from_str::<serde_json::Value>(payload).ok()?;
    selection_from_value(&value)
}

fn selection_from_value(value: &serde_json::Value) -> Option<Selection> {
    let obj = value.as_object()?;

    let action_name = obj
        .get("name")
        .or_else(|| obj.get("actionName"))?
        .as_str()?
        .to_string();

    let params = match obj.get("arguments").or_else(|| obj.get("params")) {
        None | Some(serde_json::Value::Null) => ToolParams::new(),
        Some(serde_json::Value::Object(map)) => map.clone(),
        // a params value that is itself a JSON-encoded string
        Some(serde_json::Value::String(s)) => match serde_json::from_str(s) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => return None,
        },
        Some(_) => return None,
    };

    Some(Selection {
        action_name,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use webpilot_core::provider::ModelToolCall;

    fn text_response(content: &str) -> ModelResponse {
        ModelResponse {
            content: content.into(),
            tool_calls: vec![],
            model: "mock-model".into(),
            usage: None,
        }
    }

    fn native_response(name: &str, arguments: &str) -> ModelResponse {
        ModelResponse {
            content: String::new(),
            tool_calls: vec![ModelToolCall {
                name: name.into(),
                arguments: arguments.into(),
            }],
            model: "mock-model".into(),
            usage: None,
        }
    }

    #[test]
    fn native_payload_resolves() {
        let selection = resolve(&native_response("navigate", r#"{"url":"a.com"}"#), true).unwrap();
        assert_eq!(selection.action_name, "navigate");
        assert_eq!(selection.params["url"], serde_json::json!("a.com"));
    }

    #[test]
    fn fenced_payload_resolves() {
        let selection = resolve(
            &text_response("```json\n{\"name\":\"finish\",\"params\":{\"success\":true}}\n```"),
            false,
        )
        .unwrap();
        assert_eq!(selection.action_name, "finish");
        assert_eq!(selection.params["success"], serde_json::json!(true));
    }

    #[test]
    fn bare_json_without_fence_resolves() {
        let selection = resolve(
            &text_response(r#"{"actionName":"click","params":{"element_id":"2a"}}"#),
            false,
        )
        .unwrap();
        assert_eq!(selection.action_name, "click");
        assert_eq!(selection.params["element_id"], serde_json::json!("2a"));
    }

    #[test]
    fn legacy_spelling_accepted() {
        let selection = resolve(
            &text_response(r#"{"name":"type","arguments":{"text":"hi"}}"#),
            false,
        )
        .unwrap();
        assert_eq!(selection.action_name, "type");
        assert_eq!(selection.params["text"], serde_json::json!("hi"));
    }

    #[test]
    fn string_encoded_params_reparsed() {
        let selection = resolve(
            &text_response(r#"{"name":"navigate","arguments":"{\"url\":\"a.com\"}"}"#),
            false,
        )
        .unwrap();
        assert_eq!(selection.params["url"], serde_json::json!("a.com"));
    }

    #[test]
    fn missing_params_resolves_to_empty_map() {
        let selection = resolve(&text_response(r#"{"name":"go_back"}"#), false).unwrap();
        assert!(selection.params.is_empty());
    }

    #[test]
    fn unparsable_text_is_unresolved() {
        assert!(resolve(&text_response("I think we should navigate somewhere"), false).is_none());
        assert!(resolve(&text_response(""), false).is_none());
    }

    #[test]
    fn missing_name_is_unresolved() {
        assert!(resolve(&text_response(r#"{"params":{"url":"a.com"}}"#), false).is_none());
    }

    #[test]
    fn malformed_native_arguments_unresolved() {
        assert!(resolve(&native_response("navigate", "{not json"), true).is_none());
    }

    #[test]
    fn empty_native_arguments_resolve_to_empty_map() {
        let selection = resolve(&native_response("go_back", ""), true).unwrap();
        assert!(selection.params.is_empty());
    }

    #[test]
    fn unexpected_shape_still_accepted() {
        // native designated, but the model answered in text
        let selection = resolve(
            &text_response("```json\n{\"name\":\"finish\",\"params\":{}}\n```"),
            true,
        )
        .unwrap();
        assert_eq!(selection.action_name, "finish");

        // text designated, but the model answered with a native call
        let selection = resolve(&native_response("navigate", r#"{"url":"a.com"}"#), false).unwrap();
        assert_eq!(selection.action_name, "navigate");
    }

    #[test]
    fn serializes_with_action_name_spelling() {
        let selection = Selection {
            action_name: "navigate".into(),
            params: ToolParams::new(),
        };
        let json = serde_json::to_string(&selection).unwrap();
        assert!(json.contains("\"actionName\""));
        assert!(json.contains("\"params\""));
    }
}
