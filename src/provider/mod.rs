use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::{CouncilError, Result};
use crate::schema;
use crate::wire::{ModelOutput, ModelRequest};

pub mod gemini;
#[cfg(test)]
pub mod mock;

/// One round trip to a generative model. Implementations return the raw text
/// of the reply; JSON handling lives in [`invoke`].
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, req: &ModelRequest) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

/// Stand-in used when no API key is configured. Every call fails the same way.
pub struct Unconfigured {
    reason: CouncilError,
}

#[async_trait]
impl Provider for Unconfigured {
    async fn generate(&self, _req: &ModelRequest) -> Result<String> {
        Err(self.reason.clone())
    }
}

/// Build the provider for `cfg`. A missing key is logged and degrades to
/// [`Unconfigured`] instead of failing startup.
pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    match cfg.resolve_api_key() {
        Some(key) => Ok(Arc::new(gemini::GeminiProvider::new(cfg, key)?)),
        None => {
            let reason = cfg.missing_key_error();
            tracing::warn!("{reason}; model calls will fail until a key is provided");
            Ok(Arc::new(Unconfigured { reason }))
        }
    }
}

/// Send `req` and interpret the reply. Without a schema the text comes back
/// untouched; with one it must parse as JSON and satisfy the schema.
pub async fn invoke(provider: &dyn Provider, req: &ModelRequest) -> Result<ModelOutput> {
    let text = provider.generate(req).await?;
    match &req.response_schema {
        None => Ok(ModelOutput::Text(text)),
        Some(schema) => parse_structured(&text, schema).map(ModelOutput::Structured),
    }
}

/// [`invoke`] for a schema-constrained request, deserialized into `T`.
pub async fn invoke_structured<T: DeserializeOwned>(
    provider: &dyn Provider,
    req: &ModelRequest,
) -> Result<T> {
    let schema = req
        .response_schema
        .as_ref()
        .ok_or_else(|| {
            CouncilError::Validation("structured call without a response schema".into())
        })?;
    let text = provider.generate(req).await?;
    let value = parse_structured(&text, schema)?;
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(content = %text, "model response does not deserialize: {e}");
        CouncilError::MalformedResponse(format!("response does not match the expected shape: {e}"))
    })
}

/// [`invoke`] for a free-text request.
pub async fn invoke_text(provider: &dyn Provider, req: &ModelRequest) -> Result<String> {
    match invoke(provider, req).await? {
        ModelOutput::Text(t) => Ok(t),
        ModelOutput::Structured(v) => Ok(v.to_string()),
    }
}

fn parse_structured(text: &str, schema: &Value) -> Result<Value> {
    let trimmed = text.trim();
    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(v) => v,
        Err(strict_err) => {
            // Models sometimes wrap the object in a code fence or a sentence.
            extract_first_json_object(trimmed)
                .and_then(|obj| serde_json::from_str::<Value>(&obj).ok())
                .ok_or_else(|| {
                    tracing::error!(content = %text, "model returned invalid JSON: {strict_err}");
                    CouncilError::MalformedResponse(format!("invalid JSON: {strict_err}"))
                })?
        }
    };

    schema::validate(&value, schema).map_err(|violation| {
        tracing::error!(content = %text, "model response violates schema: {violation}");
        CouncilError::MalformedResponse(violation)
    })?;
    Ok(value)
}

/// Extracts the first top-level JSON object substring from a string.
/// Braces inside string literals are skipped; returns None if unbalanced.
fn extract_first_json_object(s: &str) -> Option<String> {
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if start.is_some() => in_string = true,
            b'{' => {
                start.get_or_insert(i);
                depth += 1;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| s[st..=i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::mock::ScriptedProvider;
    use super::*;
    use crate::domain::fixtures::COUNCIL_JSON;
    use crate::domain::{CouncilResult, ImprovementSuggestion};
    use crate::schema::{council_result_schema, improvement_schema};

    #[tokio::test]
    async fn text_calls_return_raw_text() {
        let p = ScriptedProvider::new(vec![Ok("  Add a budget.  ".into())]);
        let out = invoke(&p, &ModelRequest::prompt("coach me")).await.unwrap();
        assert_eq!(out, ModelOutput::Text("  Add a budget.  ".into()));
    }

    #[tokio::test]
    async fn invalid_json_is_malformed() {
        let p = ScriptedProvider::new(vec![Ok("{".into())]);
        let req = ModelRequest::prompt("debate").with_schema(council_result_schema());
        let err = invoke(&p, &req).await.unwrap_err();
        assert!(matches!(err, CouncilError::MalformedResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn missing_required_field_is_malformed_not_defaulted() {
        let p = ScriptedProvider::new(vec![Ok(r#"{"suggested_changes": ["x"]}"#.into())]);
        let req = ModelRequest::prompt("improve").with_schema(improvement_schema());
        let err = invoke_structured::<ImprovementSuggestion>(&p, &req).await.unwrap_err();
        assert_eq!(
            err,
            CouncilError::MalformedResponse("$: missing required field `impact_shift_comment`".into())
        );
    }

    #[tokio::test]
    async fn fenced_json_is_recovered() {
        let fenced = format!("Here you go:\n```json\n{COUNCIL_JSON}\n```");
        let p = ScriptedProvider::new(vec![Ok(fenced)]);
        let req = ModelRequest::prompt("debate").with_schema(council_result_schema());
        let result: CouncilResult = invoke_structured(&p, &req).await.unwrap();
        assert_eq!(result.options_and_recommendation.recommended_option, "Option A");
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let p = ScriptedProvider::new(vec![Err(CouncilError::Network("timeout".into()))]);
        let err = invoke_text(&p, &ModelRequest::prompt("hi")).await.unwrap_err();
        assert_eq!(err, CouncilError::Network("timeout".into()));
    }

    #[tokio::test]
    async fn unconfigured_provider_fails_every_call() {
        let p = Unconfigured { reason: Config::default().missing_key_error() };
        for _ in 0..2 {
            let err = invoke_text(&p, &ModelRequest::prompt("hi")).await.unwrap_err();
            assert!(matches!(err, CouncilError::Configuration(_)));
        }
    }

    #[test]
    fn extraction_skips_braces_in_strings() {
        let s = r#"noise {"a": "}{", "b": {"c": 1}} trailing"#;
        assert_eq!(extract_first_json_object(s).as_deref(), Some(r#"{"a": "}{", "b": {"c": 1}}"#));
        assert_eq!(extract_first_json_object("{"), None);
        assert_eq!(extract_first_json_object("no json here"), None);
    }
}
