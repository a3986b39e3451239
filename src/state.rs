use crate::headshot::colors::BlazerColor;

pub const PROCESSING_FALLBACK_MESSAGE: &str = "Something went wrong while processing your image.";

/// One upload → processing → result cycle. Transitions never mutate in place;
/// each returns the next value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub original_image: Option<String>,
    pub processed_image: Option<String>,
    pub selected_color: BlazerColor,
    pub is_processing: bool,
    pub error: Option<String>,
}

impl Session {
    pub fn new(selected_color: BlazerColor) -> Self {
        Session {
            selected_color,
            ..Session::default()
        }
    }

    pub fn select_image(&self, payload: &str) -> Session {
        if payload.trim().is_empty() {
            return self.clone();
        }
        Session {
            original_image: Some(payload.to_string()),
            processed_image: None,
            error: None,
            ..self.clone()
        }
    }

    pub fn begin_processing(&self) -> Session {
        if self.original_image.is_none() {
            return self.clone();
        }
        Session {
            is_processing: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn complete_processing(&self, result: String) -> Session {
        Session {
            processed_image: Some(result),
            is_processing: false,
            error: None,
            ..self.clone()
        }
    }

    pub fn fail_processing(&self, message: Option<&str>) -> Session {
        let message = message
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(PROCESSING_FALLBACK_MESSAGE);
        Session {
            is_processing: false,
            error: Some(message.to_string()),
            ..self.clone()
        }
    }

    pub fn select_color(&self, color: BlazerColor) -> Session {
        Session {
            selected_color: color,
            ..self.clone()
        }
    }

    pub fn can_generate(&self) -> bool {
        self.original_image.is_some() && !self.is_processing
    }
}
