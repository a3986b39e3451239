use crate::config::HEADSHOT_PROMPT;

pub fn build_headshot_prompt(color: &str) -> String {
    HEADSHOT_PROMPT.replace("{color}", color.trim())
}
