use tracing::{info, warn};

use crate::headshot::client::{HeadshotError, TransformationClient};
use crate::headshot::colors::BlazerColor;
use crate::llm::gemini::ImageGenerator;
use crate::state::Session;

struct PendingTransform {
    source_image: String,
    color: BlazerColor,
}

/// Owns the current session and drives the generate trigger.
pub struct Studio<G> {
    session: Session,
    client: TransformationClient<G>,
}

impl<G: ImageGenerator> Studio<G> {
    pub fn new(client: TransformationClient<G>, initial_color: BlazerColor) -> Self {
        Studio {
            session: Session::new(initial_color),
            client,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub fn select_image(&mut self, payload: &str) {
        self.session = self.session.select_image(payload);
    }

    pub fn select_color(&mut self, color: BlazerColor) {
        self.session = self.session.select_color(color);
    }

    pub async fn generate(&mut self) -> &Session {
        let Some(pending) = self.start_generation() else {
            warn!("Generate ignored: no photo selected or a request is already running");
            return &self.session;
        };
        let outcome = self
            .client
            .transform(&pending.source_image, pending.color.label())
            .await;
        self.finish_generation(outcome);
        &self.session
    }

    fn start_generation(&mut self) -> Option<PendingTransform> {
        if !self.session.can_generate() {
            return None;
        }
        self.session = self.session.begin_processing();
        let source_image = self.session.original_image.clone()?;
        info!(
            "Generating headshot (color={}, source_len={})",
            self.session.selected_color,
            source_image.len()
        );
        Some(PendingTransform {
            source_image,
            color: self.session.selected_color,
        })
    }

    fn finish_generation(&mut self, outcome: Result<String, HeadshotError>) {
        self.session = match outcome {
            Ok(result) => {
                info!("Headshot ready ({} bytes of data URI)", result.len());
                self.session.complete_processing(result)
            }
            Err(err) => {
                warn!("Headshot generation failed: {err}");
                self.session.fail_processing(Some(&err.to_string()))
            }
        };
    }
}
