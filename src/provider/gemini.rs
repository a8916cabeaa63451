use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::Provider;
use crate::config::Config;
use crate::errors::{CouncilError, Result};
use crate::wire::{ModelRequest, Part, Turn};

/// Gemini `generateContent` over plain REST. One POST per call, no retries.
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    pub fn new(cfg: &Config, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Turn],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn build_body(req: &ModelRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: &req.contents,
        system_instruction: req
            .system_instruction
            .as_ref()
            .map(|s| SystemInstruction { parts: vec![Part::text(s.clone())] }),
        generation_config: req.response_schema.as_ref().map(|schema| GenerationConfig {
            response_mime_type: "application/json",
            response_schema: schema,
        }),
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| CouncilError::Network(format!("unreadable Gemini envelope: {e}")))?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CouncilError::Network(
            "Gemini returned no text in the response candidates".into(),
        ));
    }
    Ok(text)
}

fn describe_http_error(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|w| match (w.error.status, w.error.message) {
            (Some(s), Some(m)) => format!("{s}: {m}"),
            (None, Some(m)) => m,
            (Some(s), None) => s,
            (None, None) => body.to_string(),
        })
        .unwrap_or_else(|| body.to_string());
    format!("Gemini API error ({status}): {detail}")
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, req: &ModelRequest) -> Result<String> {
        let body = build_body(req);
        let url = self.endpoint();

        if tracing::enabled!(tracing::Level::DEBUG) {
            let pretty = serde_json::to_string_pretty(&body).unwrap_or_default();
            tracing::debug!(%url, "POST generateContent body:\n{pretty}");
        }

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%status, "raw response:\n{text}");

        if !status.is_success() {
            return Err(CouncilError::Network(describe_http_error(status, &text)));
        }
        extract_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ImageAttachment;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let len = text[..end]
            .lines()
            .filter_map(|l| l.split_once(':'))
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= end + 4 + len
    }

    /// Answer one HTTP request with a canned reply; the handle yields the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (Config, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let cfg = Config {
            api_base: format!("http://{}/v1beta", listener.local_addr().unwrap()),
            ..Config::default()
        };
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&raw) {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(reply.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        (cfg, handle)
    }

    #[tokio::test]
    async fn generate_posts_with_api_key_header() {
        let (cfg, server) =
            serve_once("200 OK", r#"{"candidates":[{"content":{"parts":[{"text":"hello"}]}}]}"#)
                .await;
        let p = GeminiProvider::new(&cfg, "secret-key".into()).unwrap();
        let text = p.generate(&ModelRequest::prompt("hi")).await.unwrap();
        assert_eq!(text, "hello");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("x-goog-api-key: secret-key"));
        assert!(raw.contains(r#""contents":[{"role":"user","parts":[{"text":"hi"}]}]"#));
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let (cfg, server) = serve_once("403 Forbidden", body).await;
        let p = GeminiProvider::new(&cfg, "bad".into()).unwrap();
        let err = p.generate(&ModelRequest::prompt("hi")).await.unwrap_err();
        server.await.unwrap();
        match err {
            CouncilError::Network(msg) => assert!(msg.contains("PERMISSION_DENIED"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_over_http_are_a_network_error() {
        let (cfg, server) = serve_once("200 OK", r#"{"candidates":[]}"#).await;
        let p = GeminiProvider::new(&cfg, "k".into()).unwrap();
        let res = p.generate(&ModelRequest::prompt("hi")).await;
        server.await.unwrap();
        assert!(matches!(res, Err(CouncilError::Network(_))));
    }

    #[test]
    fn body_uses_gemini_field_names() {
        let req = ModelRequest::conversation(vec![Turn {
            role: crate::wire::Role::User,
            parts: vec![
                Part::image(&ImageAttachment::new(vec![0xff], "image/jpeg")),
                Part::text("describe"),
            ],
        }])
        .with_system("be brief")
        .with_schema(json!({ "type": "OBJECT" }));

        let v = serde_json::to_value(build_body(&req)).unwrap();
        assert_eq!(
            v,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/w==" } },
                        { "text": "describe" }
                    ]
                }],
                "systemInstruction": { "parts": [{ "text": "be brief" }] },
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })
        );
    }

    #[test]
    fn plain_prompt_has_no_generation_config() {
        let v = serde_json::to_value(build_body(&ModelRequest::prompt("hi"))).unwrap();
        assert!(v.get("generationConfig").is_none());
        assert!(v.get("systemInstruction").is_none());
    }

    #[test]
    fn text_parts_are_joined() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn empty_candidates_are_a_network_error() {
        assert!(matches!(extract_text(r#"{"candidates":[]}"#), Err(CouncilError::Network(_))));
        assert!(matches!(extract_text(r#"{"promptFeedback":{}}"#), Err(CouncilError::Network(_))));
    }

    #[test]
    fn http_error_body_is_summarised() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let msg = describe_http_error(reqwest::StatusCode::FORBIDDEN, body);
        assert_eq!(msg, "Gemini API error (403 Forbidden): PERMISSION_DENIED: API key not valid");
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let cfg = Config { api_base: "http://localhost:8080/v1beta/".into(), ..Config::default() };
        let p = GeminiProvider::new(&cfg, "k".into()).unwrap();
        assert_eq!(
            p.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
