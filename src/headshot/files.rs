use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use image::ImageReader;
use tracing::info;

use crate::headshot::colors::BlazerColor;
use crate::llm::media::{detect_mime_type, normalize_image_mime_type, DataUri};

pub const ACCEPTED_PHOTO_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, thiserror::Error)]
pub enum PhotoError {
    #[error("Failed to read photo {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Photo {0} is empty")]
    Empty(PathBuf),
    #[error("Unsupported photo type {mime_type} for {path}; use JPG, PNG or WEBP")]
    Unsupported { path: PathBuf, mime_type: String },
    #[error("Photo {path} could not be decoded: {source}")]
    Undecodable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Reads a JPEG, PNG or WEBP file into the data URI a session expects.
pub async fn read_photo(path: &Path) -> Result<String, PhotoError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| PhotoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(PhotoError::Empty(path.to_path_buf()));
    }

    let mime_type = detect_mime_type(&bytes)
        .map(|value| normalize_image_mime_type(&value))
        .unwrap_or_else(|| "application/octet-stream".to_string());
    if !ACCEPTED_PHOTO_TYPES.contains(&mime_type.as_str()) {
        return Err(PhotoError::Unsupported {
            path: path.to_path_buf(),
            mime_type,
        });
    }

    let (width, height) = photo_dimensions(&bytes).map_err(|source| PhotoError::Undecodable {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "Loaded photo {} ({}, {}x{}, {} bytes)",
        path.display(),
        mime_type,
        width,
        height,
        bytes.len()
    );

    Ok(DataUri::from_bytes(&mime_type, &bytes).to_uri())
}

fn photo_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}

pub fn download_file_name(color: BlazerColor) -> String {
    format!("professional-headshot-{}.png", color.slug())
}

/// Writes the processed headshot to `output`, or to the color-derived file
/// name inside `output_dir`.
pub async fn save_headshot(
    processed_image: &str,
    color: BlazerColor,
    output: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf> {
    let data_uri = DataUri::parse(processed_image)
        .ok_or_else(|| anyhow!("Processed headshot is not a data URI"))?;
    let bytes = data_uri
        .decode()
        .context("Processed headshot is not valid base64")?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(download_file_name(color)),
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Saved headshot to {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn encoded_photo(format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        RgbImage::new(4, 3).write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn reads_png_into_a_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("casual.png");
        let bytes = encoded_photo(ImageFormat::Png);
        std::fs::write(&path, &bytes).unwrap();

        let uri = read_photo(&path).await.unwrap();
        let parsed = DataUri::parse(&uri).unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.decode().unwrap(), bytes);
    }

    #[tokio::test]
    async fn type_comes_from_content_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mislabelled.png");
        std::fs::write(&path, encoded_photo(ImageFormat::Jpeg)).unwrap();

        let uri = read_photo(&path).await.unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn rejects_empty_and_non_image_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.jpg");
        std::fs::write(&empty, b"").unwrap();
        assert!(matches!(read_photo(&empty).await, Err(PhotoError::Empty(_))));

        let text = dir.path().join("notes.jpg");
        std::fs::write(&text, b"just some notes, not a photo").unwrap();
        assert!(matches!(
            read_photo(&text).await,
            Err(PhotoError::Unsupported { .. })
        ));

        let missing = dir.path().join("missing.jpg");
        assert!(matches!(read_photo(&missing).await, Err(PhotoError::Io { .. })));
    }

    #[tokio::test]
    async fn rejects_truncated_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated.png");
        let bytes = encoded_photo(ImageFormat::Png);
        std::fs::write(&path, &bytes[..10]).unwrap();
        assert!(matches!(
            read_photo(&path).await,
            Err(PhotoError::Undecodable { .. })
        ));
    }

    #[test]
    fn download_names_follow_the_color() {
        assert_eq!(
            download_file_name(BlazerColor::NavyBlue),
            "professional-headshot-navy-blue.png"
        );
        assert_eq!(
            download_file_name(BlazerColor::Burgundy),
            "professional-headshot-burgundy.png"
        );
    }

    #[tokio::test]
    async fn saves_into_the_output_dir_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_headshot(
            "data:image/png;base64,iVBORw0K",
            BlazerColor::CharcoalGrey,
            None,
            &dir.path().join("out"),
        )
        .await
        .unwrap();

        assert_eq!(
            path,
            dir.path().join("out").join("professional-headshot-charcoal-grey.png")
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG\r\n".to_vec());
    }

    #[tokio::test]
    async fn explicit_output_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("me.png");
        let path = save_headshot(
            "data:image/png;base64,QUJD",
            BlazerColor::WarmTaupe,
            Some(&target),
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(path, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"ABC".to_vec());
    }

    #[tokio::test]
    async fn refuses_to_save_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_headshot("not a uri", BlazerColor::NavyBlue, None, dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a data URI"));
    }
}
