use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::media::DataUri;
use crate::utils::http::get_http_client;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeminiImageConfig {
    pub aspect_ratio: Option<String>,
}

impl GeminiImageConfig {
    pub fn square() -> Self {
        GeminiImageConfig {
            aspect_ratio: Some("1:1".to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GeminiResponse {
    pub candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiContent {
    pub parts: Option<Vec<GeminiPart>>,
}

/// Parts carry at most one payload kind; fields this crate does not use
/// (function calls, thought signatures, ...) are dropped during decoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiInlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    pub image: DataUri,
    pub prompt: String,
    pub image_config: GeminiImageConfig,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn model(&self) -> &str;

    async fn generate_content(&self, request: &ImageEditRequest) -> Result<GeminiResponse>;
}

pub struct GeminiImageApi {
    client: &'static Client,
    api_key: String,
    model: String,
    base_url: String,
    safety_profile: String,
}

impl GeminiImageApi {
    pub fn from_config(config: &Config) -> Self {
        GeminiImageApi {
            client: get_http_client(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_image_model.clone(),
            base_url: config.gemini_base_url.clone(),
            safety_profile: config.gemini_safety_settings.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call_gemini_api(&self, payload: Value) -> Result<GeminiResponse> {
        if tracing::enabled!(tracing::Level::DEBUG) {
            let payload_summary = summarize_gemini_payload(&payload);
            debug!(target: "llm.gemini", model = %self.model, payload = %payload_summary);
        }

        let response = match self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "Gemini request failed to send: {} (timeout={}, connect={}, status={:?})",
                    err,
                    err.is_timeout(),
                    err.is_connect(),
                    err.status()
                );
                return Err(anyhow!("Gemini request failed: {}", err));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, body_summary) = summarize_error_body(&body);
            warn!("Gemini API error: status={}, body={}", status, body_summary);
            return Err(anyhow!(service_error_message(status, message, body_summary)));
        }

        let value = response.json::<GeminiResponse>().await?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let response_summary = summarize_gemini_response(&value);
            debug!(target: "llm.gemini", model = %self.model, response = %response_summary);
        }
        Ok(value)
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageApi {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(&self, request: &ImageEditRequest) -> Result<GeminiResponse> {
        let payload = build_image_edit_payload(request, &self.safety_profile);
        self.call_gemini_api(payload).await
    }
}

fn build_safety_settings(profile: &str) -> Vec<Value> {
    let threshold = match profile {
        "standard" => "BLOCK_MEDIUM_AND_ABOVE",
        "permissive" => "OFF",
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}', using standard defaults.",
                profile
            );
            "BLOCK_MEDIUM_AND_ABOVE"
        }
    };

    vec![
        json!({ "category": "HARM_CATEGORY_HARASSMENT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": threshold }),
        json!({ "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": threshold }),
    ]
}

fn build_image_config(config: &GeminiImageConfig) -> Option<Value> {
    let mut map = Map::new();

    if let Some(aspect_ratio) = config.aspect_ratio.as_deref() {
        let trimmed = aspect_ratio.trim();
        if !trimmed.is_empty() {
            map.insert("aspectRatio".to_string(), json!(trimmed));
        }
    }

    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn build_image_edit_payload(request: &ImageEditRequest, safety_profile: &str) -> Value {
    let parts = vec![
        json!({
            "inlineData": {
                "mimeType": request.image.mime_type,
                "data": request.image.data
            }
        }),
        json!({ "text": request.prompt }),
    ];

    let mut generation_config = json!({
        "responseModalities": ["TEXT", "IMAGE"]
    });
    if let Some(image_config) = build_image_config(&request.image_config) {
        if let Some(config_object) = generation_config.as_object_mut() {
            config_object.insert("imageConfig".to_string(), image_config);
        }
    }

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": generation_config,
        "safetySettings": build_safety_settings(safety_profile),
    })
}

fn service_error_message(
    status: StatusCode,
    message: Option<String>,
    body_summary: String,
) -> String {
    match message {
        Some(message) if !message.trim().is_empty() => message,
        _ => format!(
            "Gemini request failed with status {}: {}",
            status, body_summary
        ),
    }
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_gemini_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|value| value.as_str()) {
                json!({ "text": truncate_for_log(text, 200) })
            } else if let Some(inline_data) = part.get("inlineData") {
                let mime_type = inline_data
                    .get("mimeType")
                    .and_then(|value| value.as_str())
                    .unwrap_or("unknown");
                let data_len = inline_data
                    .get("data")
                    .and_then(|value| value.as_str())
                    .map(|value| value.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": mime_type, "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_gemini_payload(payload: &Value) -> Value {
    let mut summary = Map::new();

    if let Some(contents) = payload.get("contents").and_then(|value| value.as_array()) {
        let summarized_contents = contents
            .iter()
            .map(|content| {
                let role = content
                    .get("role")
                    .and_then(|value| value.as_str())
                    .unwrap_or("user");
                let parts = content
                    .get("parts")
                    .and_then(|value| value.as_array())
                    .map(|parts| summarize_gemini_parts(parts))
                    .unwrap_or_default();
                json!({ "role": role, "parts": parts })
            })
            .collect();
        summary.insert("contents".to_string(), Value::Array(summarized_contents));
    }

    if let Some(config) = payload.get("generationConfig") {
        summary.insert("generationConfig".to_string(), config.clone());
    }

    if let Some(safety) = payload
        .get("safetySettings")
        .and_then(|value| value.as_array())
    {
        summary.insert("safetySettingsCount".to_string(), json!(safety.len()));
    }

    Value::Object(summary)
}

fn summarize_gemini_response(response: &GeminiResponse) -> Value {
    let mut text_parts = 0usize;
    let mut image_parts = 0usize;
    let mut text_preview = None;

    let candidates = response.candidates.as_deref().unwrap_or(&[]);
    for part in candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .filter_map(|content| content.parts.as_ref())
        .flatten()
    {
        if let Some(text) = &part.text {
            text_parts += 1;
            if text_preview.is_none() && !text.trim().is_empty() {
                text_preview = Some(truncate_for_log(text, 200));
            }
        }
        if part.inline_data.is_some() {
            image_parts += 1;
        }
    }

    json!({
        "candidates": candidates.len(),
        "textParts": text_parts,
        "imageParts": image_parts,
        "textPreview": text_preview
    })
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}
