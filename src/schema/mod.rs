//! Response schemas in the generative API's schema dialect, plus a validator
//! that enforces them on our side. Remote enforcement is best-effort.

use serde_json::{json, Value};

use crate::domain::{PersonaId, Rating};

fn csr_item_schema() -> Value {
    let ratings: Vec<&str> = Rating::ALL.iter().map(|r| r.label()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "rating": { "type": "STRING", "enum": ratings },
            "key_points": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["rating", "key_points"]
    })
}

pub fn council_result_schema() -> Value {
    let persona_ids: Vec<&str> = PersonaId::ALL.iter().map(|p| p.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "scenario_summary": {
                "type": "STRING",
                "description": "A concise, neutral summary of the user's scenario."
            },
            "assumptions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Key assumptions the council made to evaluate the scenario."
            },
            "personas": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING", "enum": persona_ids },
                        "title": { "type": "STRING" },
                        "primary_concerns": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "statement": {
                            "type": "STRING",
                            "description": "The persona's detailed analysis and opinion on the scenario."
                        }
                    },
                    "required": ["id", "title", "primary_concerns", "statement"]
                }
            },
            "csr_assessment": {
                "type": "OBJECT",
                "properties": {
                    "environmental": csr_item_schema(),
                    "social": csr_item_schema(),
                    "governance_economic": csr_item_schema()
                },
                "required": ["environmental", "social", "governance_economic"]
            },
            "options_and_recommendation": {
                "type": "OBJECT",
                "properties": {
                    "option_summaries": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "option_name": { "type": "STRING" },
                                "description": { "type": "STRING" },
                                "csr_implications": { "type": "STRING" }
                            },
                            "required": ["option_name", "description", "csr_implications"]
                        }
                    },
                    "recommended_option": {
                        "type": "STRING",
                        "description": "The name of the recommended option."
                    }
                },
                "required": ["option_summaries", "recommended_option"]
            }
        },
        "required": [
            "scenario_summary",
            "assumptions",
            "personas",
            "csr_assessment",
            "options_and_recommendation"
        ]
    })
}

pub fn improvement_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggested_changes": { "type": "ARRAY", "items": { "type": "STRING" } },
            "impact_shift_comment": { "type": "STRING" }
        },
        "required": ["suggested_changes", "impact_shift_comment"]
    })
}

pub fn explanation_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary_paragraphs": { "type": "ARRAY", "items": { "type": "STRING" } },
            "guidance": { "type": "STRING" }
        },
        "required": ["summary_paragraphs", "guidance"]
    })
}

/// Check `value` against `schema`. Returns the JSON path of the first violation.
///
/// Supports the subset the schemas above use: `type` (OBJECT, ARRAY, STRING,
/// NUMBER, INTEGER, BOOLEAN; case-insensitive), `properties`, `required`,
/// `items` and string `enum`. Unknown properties are allowed.
pub fn validate(value: &Value, schema: &Value) -> Result<(), String> {
    validate_at(value, schema, "$")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    let ty = schema
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_ascii_uppercase)
        .unwrap_or_default();

    match ty.as_str() {
        "OBJECT" => {
            let obj = value
                .as_object()
                .ok_or_else(|| format!("{path}: expected object, got {}", kind_of(value)))?;
            if let Some(required) = schema.get("required").and_then(Value::as_array) {
                for field in required.iter().filter_map(Value::as_str) {
                    if !obj.contains_key(field) {
                        return Err(format!("{path}: missing required field `{field}`"));
                    }
                }
            }
            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                for (name, sub) in props {
                    if let Some(v) = obj.get(name) {
                        validate_at(v, sub, &format!("{path}.{name}"))?;
                    }
                }
            }
        }
        "ARRAY" => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("{path}: expected array, got {}", kind_of(value)))?;
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    validate_at(item, item_schema, &format!("{path}[{i}]"))?;
                }
            }
        }
        "STRING" => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("{path}: expected string, got {}", kind_of(value)))?;
            if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
                if !allowed.iter().any(|a| a.as_str() == Some(s)) {
                    return Err(format!("{path}: `{s}` is not one of the allowed values"));
                }
            }
        }
        "NUMBER" if !value.is_number() => {
            return Err(format!("{path}: expected number, got {}", kind_of(value)));
        }
        "INTEGER" if !(value.is_i64() || value.is_u64()) => {
            return Err(format!("{path}: expected integer, got {}", kind_of(value)));
        }
        "BOOLEAN" if !value.is_boolean() => {
            return Err(format!("{path}: expected boolean, got {}", kind_of(value)));
        }
        _ => {}
    }
    Ok(())
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
