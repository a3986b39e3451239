use std::env;
use std::path::PathBuf;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::headshot::colors::BlazerColor;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_dir: PathBuf,
    pub gemini_api_key: String,
    pub gemini_image_model: String,
    pub gemini_base_url: String,
    pub gemini_safety_settings: String,
    pub default_blazer_color: BlazerColor,
    pub output_dir: PathBuf,
    /// Fallbacks taken while loading; logged once the subscriber is installed.
    pub warnings: Vec<String>,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_first_non_empty(names: &[&str], default: &str) -> String {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn normalize_base_url(value: String) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "https://generativelanguage.googleapis.com/v1beta".to_string();
    }
    trimmed.to_string()
}

fn normalize_gemini_safety_settings(value: String, warnings: &mut Vec<String>) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "standard".to_string();
    }

    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "permissive" | "off" | "none" => "permissive".to_string(),
        "standard" => "standard".to_string(),
        _ => {
            warnings.push(format!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}'; defaulting to standard.",
                value
            ));
            "standard".to_string()
        }
    }
}

fn parse_default_color(value: &str, warnings: &mut Vec<String>) -> BlazerColor {
    if value.trim().is_empty() {
        return BlazerColor::default();
    }
    match value.parse::<BlazerColor>() {
        Ok(color) => color,
        Err(err) => {
            warnings.push(format!("{err}; defaulting to {}.", BlazerColor::default()));
            BlazerColor::default()
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut warnings = Vec::new();
        let gemini_safety_settings = normalize_gemini_safety_settings(
            env_string("GEMINI_SAFETY_SETTINGS", "standard"),
            &mut warnings,
        );
        let default_blazer_color =
            parse_default_color(&env_string("DEFAULT_BLAZER_COLOR", ""), &mut warnings);

        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            log_dir: PathBuf::from(env_string("LOG_DIR", "logs")),
            gemini_api_key: env_first_non_empty(&["GEMINI_API_KEY", "API_KEY"], "")
                .trim()
                .to_string(),
            gemini_image_model: env_string("GEMINI_IMAGE_MODEL", "gemini-2.5-flash-image"),
            gemini_base_url: normalize_base_url(env_string(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            )),
            gemini_safety_settings,
            default_blazer_color,
            output_dir: PathBuf::from(env_string("OUTPUT_DIR", ".")),
            warnings,
        })
    }

    /// `CONFIG` is first touched while logging is being set up, so fallbacks
    /// are reported here instead of during `load`.
    pub fn log_warnings(&self) {
        for message in &self.warnings {
            warn!("{message}");
        }
    }

    pub fn has_gemini_api_key(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }
}

pub const HEADSHOT_PROMPT: &str = r#"Task: Corporate Headshot Transformation
Target Attire: Well-fitted professional blazer/coat in {color}.

Strict Requirements:
1. FACIAL INTEGRITY: Keep the person's identity, facial features, expressions, and proportions EXACTLY the same as the source image. Do not distort the face.
2. LIGHTING: Apply soft, cinematic studio lighting (key, fill, and rim light).
3. ATTIRE: Replace the existing clothes with a high-end, modern blazer in {color} that looks naturally fitted to their shoulders and torso.
4. BACKGROUND: A clean, neutral, premium studio background with soft bokeh/blur.
5. RETOUCHING: Apply subtle, professional skin retouching and eye clarity enhancements while keeping natural skin texture.
6. FINAL OUTPUT: A polished, LinkedIn-ready corporate headshot.
"#;
