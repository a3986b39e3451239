use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::gemini::{GeminiResponse, ImageEditRequest, ImageGenerator};

enum Reply {
    Respond(Value),
    Fail(String),
}

/// In-memory stand-in for the Gemini endpoint that records every request.
pub(crate) struct ScriptedGenerator {
    reply: Reply,
    requests: Mutex<Vec<ImageEditRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn responding(response: Value) -> Self {
        ScriptedGenerator {
            reply: Reply::Respond(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        ScriptedGenerator {
            reply: Reply::Fail(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ImageEditRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted-image-model"
    }

    async fn generate_content(&self, request: &ImageEditRequest) -> Result<GeminiResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Respond(value) => Ok(serde_json::from_value(value.clone())?),
            Reply::Fail(message) => Err(anyhow::Error::msg(message.clone())),
        }
    }
}

pub(crate) fn image_response(data: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "inlineData": { "mimeType": "image/png", "data": data } }]
            },
            "finishReason": "STOP"
        }]
    })
}
