use serde_json::json;
use tracing::{debug, error};

use crate::headshot::prompts::build_headshot_prompt;
use crate::llm::gemini::{GeminiImageConfig, GeminiResponse, ImageEditRequest, ImageGenerator};
use crate::llm::media::DataUri;
use crate::utils::timing::log_llm_timing;

pub const NO_IMAGE_MESSAGE: &str =
    "The model did not return an image. Please try a different photo.";
pub const TRANSFORM_FALLBACK_MESSAGE: &str = "An error occurred during image transformation.";
pub const INVALID_SOURCE_MESSAGE: &str = "The selected photo is not a valid image data URI.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeadshotError {
    #[error("{}", INVALID_SOURCE_MESSAGE)]
    InvalidSource,
    #[error("{}", NO_IMAGE_MESSAGE)]
    NoImageReturned,
    #[error("{0}")]
    Service(String),
}

impl HeadshotError {
    fn from_call_error(err: anyhow::Error) -> Self {
        if let Some(known) = err.downcast_ref::<HeadshotError>() {
            return known.clone();
        }
        let message = err.to_string();
        if message.trim().is_empty() {
            HeadshotError::Service(TRANSFORM_FALLBACK_MESSAGE.to_string())
        } else {
            HeadshotError::Service(message)
        }
    }
}

/// Turns a photo and a blazer color into a single image-edit request.
/// Holds no per-call state.
pub struct TransformationClient<G> {
    generator: G,
}

impl<G: ImageGenerator> TransformationClient<G> {
    pub fn new(generator: G) -> Self {
        TransformationClient { generator }
    }

    #[cfg(test)]
    pub(crate) fn generator(&self) -> &G {
        &self.generator
    }

    /// Returns the headshot as a PNG data URI. One attempt, no timeout.
    pub async fn transform(&self, source_image: &str, color: &str) -> Result<String, HeadshotError> {
        let image = DataUri::parse(source_image).ok_or(HeadshotError::InvalidSource)?;
        let request = ImageEditRequest {
            image,
            prompt: build_headshot_prompt(color),
            image_config: GeminiImageConfig::square(),
        };
        let metadata = json!({
            "color": color,
            "mimeType": request.image.mime_type,
            "sourceLen": request.image.data.len(),
        });

        let outcome = log_llm_timing(
            "gemini",
            self.generator.model(),
            "transform_headshot",
            Some(metadata),
            || async {
                let response = self.generator.generate_content(&request).await?;
                extract_headshot(response)
                    .ok_or_else(|| anyhow::Error::new(HeadshotError::NoImageReturned))
            },
        )
        .await;

        outcome.map_err(|err| {
            error!("Gemini Error: {err:#}");
            HeadshotError::from_call_error(err)
        })
    }
}

fn extract_headshot(response: GeminiResponse) -> Option<String> {
    let candidate = response.candidates?.into_iter().next()?;
    let inline_data = candidate
        .content?
        .parts?
        .into_iter()
        .filter_map(|part| part.inline_data)
        .find(|inline_data| !inline_data.data.trim().is_empty())?;
    debug!(
        target: "llm.gemini",
        "Using inline image part (mime={:?}, dataLen={})",
        inline_data.mime_type,
        inline_data.data.len()
    );
    Some(DataUri::png(inline_data.data).to_uri())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headshot::testing::{image_response, ScriptedGenerator};
    use serde_json::json;

    const SOURCE: &str = "data:image/jpeg;base64,/9j/4AAQ";

    #[tokio::test]
    async fn returns_the_inline_image_as_png_data_uri() {
        let client = TransformationClient::new(ScriptedGenerator::responding(image_response("BBBB")));
        let result = client.transform(SOURCE, "Burgundy").await;
        assert_eq!(result, Ok("data:image/png;base64,BBBB".to_string()));
    }

    #[tokio::test]
    async fn sends_exactly_one_request_with_the_decomposed_source() {
        let client = TransformationClient::new(ScriptedGenerator::responding(image_response("BBBB")));
        client.transform(SOURCE, "Slate Blue").await.unwrap();

        let requests = client.generator().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.image.mime_type, "image/jpeg");
        assert_eq!(request.image.data, "/9j/4AAQ");
        assert!(request.prompt.contains("blazer in Slate Blue"));
        assert_eq!(request.image_config.aspect_ratio.as_deref(), Some("1:1"));
    }

    #[tokio::test]
    async fn picks_the_first_image_part_of_the_first_candidate() {
        let response = json!({
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "Here is your headshot." },
                            { "inlineData": { "mimeType": "image/png", "data": "FIRST" } },
                            { "inlineData": { "mimeType": "image/png", "data": "SECOND" } }
                        ]
                    }
                },
                {
                    "content": {
                        "parts": [{ "inlineData": { "mimeType": "image/png", "data": "OTHER" } }]
                    }
                }
            ]
        });
        let client = TransformationClient::new(ScriptedGenerator::responding(response));
        let result = client.transform(SOURCE, "Navy Blue").await;
        assert_eq!(result, Ok("data:image/png;base64,FIRST".to_string()));
    }

    #[tokio::test]
    async fn empty_inline_data_is_skipped() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "" } },
                        { "inlineData": { "mimeType": "image/png", "data": "X" } }
                    ]
                }
            }]
        });
        let client = TransformationClient::new(ScriptedGenerator::responding(response));
        let result = client.transform(SOURCE, "Navy Blue").await;
        assert_eq!(result, Ok("data:image/png;base64,X".to_string()));

        let response = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "  " } }] } }]
        });
        let client = TransformationClient::new(ScriptedGenerator::responding(response));
        let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
        assert_eq!(err, HeadshotError::NoImageReturned);
    }

    #[tokio::test]
    async fn no_candidates_means_no_image_returned() {
        for response in [json!({}), json!({ "candidates": [] })] {
            let client = TransformationClient::new(ScriptedGenerator::responding(response));
            let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
            assert_eq!(err, HeadshotError::NoImageReturned);
            assert_eq!(err.to_string(), NO_IMAGE_MESSAGE);
        }
    }

    #[tokio::test]
    async fn text_only_candidate_means_no_image_returned() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't edit this photo." }] } }]
        });
        let client = TransformationClient::new(ScriptedGenerator::responding(response));
        let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
        assert_eq!(err, HeadshotError::NoImageReturned);
    }

    #[tokio::test]
    async fn later_candidates_are_not_consulted() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "refused" }] } },
                { "content": { "parts": [{ "inlineData": { "mimeType": "image/png", "data": "LATE" } }] } }
            ]
        });
        let client = TransformationClient::new(ScriptedGenerator::responding(response));
        let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
        assert_eq!(err, HeadshotError::NoImageReturned);
    }

    #[tokio::test]
    async fn service_failures_keep_their_message() {
        let client = TransformationClient::new(ScriptedGenerator::failing("quota exceeded"));
        let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(client.generator().requests().len(), 1);
    }

    #[tokio::test]
    async fn blank_failures_use_the_fallback_message() {
        let client = TransformationClient::new(ScriptedGenerator::failing(""));
        let err = client.transform(SOURCE, "Navy Blue").await.unwrap_err();
        assert_eq!(err.to_string(), TRANSFORM_FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_sources_fail_before_dispatch() {
        let client = TransformationClient::new(ScriptedGenerator::responding(image_response("BBBB")));
        let err = client.transform("not a data uri", "Navy Blue").await.unwrap_err();
        assert_eq!(err, HeadshotError::InvalidSource);
        assert!(client.generator().requests().is_empty());
    }
}
