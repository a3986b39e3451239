use base64::{engine::general_purpose, Engine as _};

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

pub fn normalize_image_mime_type(mime_type: &str) -> String {
    let lowered = mime_type.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        "image/x-png" => "image/png".to_string(),
        _ => lowered,
    }
}

/// `data:<mime>;base64,<payload>` split into its two halves. The payload stays
/// base64 text; nothing is decoded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: String,
}

impl DataUri {
    pub fn parse(value: &str) -> Option<Self> {
        let rest = value.trim().strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.split(';').next().unwrap_or_default().trim();
        if mime_type.is_empty() || data.trim().is_empty() {
            return None;
        }
        Some(DataUri {
            mime_type: mime_type.to_string(),
            data: data.trim().to_string(),
        })
    }

    pub fn png(data: impl Into<String>) -> Self {
        DataUri {
            mime_type: "image/png".to_string(),
            data: data.into(),
        }
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        DataUri {
            mime_type: mime_type.to_string(),
            data: general_purpose::STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(self.data.as_bytes())
    }

    pub fn to_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}
