use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlazerColor {
    #[default]
    NavyBlue,
    CharcoalGrey,
    DeepBlack,
    SoftBeige,
    OliveGreen,
    Burgundy,
    SlateBlue,
    WarmTaupe,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown blazer color '{input}'. Available colors: {available}")]
pub struct UnknownColorError {
    pub input: String,
    pub available: String,
}

impl BlazerColor {
    pub const ALL: [BlazerColor; 8] = [
        BlazerColor::NavyBlue,
        BlazerColor::CharcoalGrey,
        BlazerColor::DeepBlack,
        BlazerColor::SoftBeige,
        BlazerColor::OliveGreen,
        BlazerColor::Burgundy,
        BlazerColor::SlateBlue,
        BlazerColor::WarmTaupe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlazerColor::NavyBlue => "Navy Blue",
            BlazerColor::CharcoalGrey => "Charcoal Grey",
            BlazerColor::DeepBlack => "Deep Black",
            BlazerColor::SoftBeige => "Soft Beige",
            BlazerColor::OliveGreen => "Olive Green",
            BlazerColor::Burgundy => "Burgundy",
            BlazerColor::SlateBlue => "Slate Blue",
            BlazerColor::WarmTaupe => "Warm Taupe",
        }
    }

    /// Lowercase, hyphenated form used for output file names.
    pub fn slug(self) -> String {
        self.label().to_lowercase().replace(' ', "-")
    }
}

impl fmt::Display for BlazerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize_color_name(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for BlazerColor {
    type Err = UnknownColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_color_name(value);
        BlazerColor::ALL
            .into_iter()
            .find(|color| color.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownColorError {
                input: value.trim().to_string(),
                available: BlazerColor::ALL
                    .iter()
                    .map(|color| color.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
