//! Image uploads: validate, shrink to fit, re-encode and store under the
//! public uploads directory.

use std::{io::Cursor, path::Path};

use chrono::Utc;
use image::{
    DynamicImage,
    codecs::{jpeg::JpegEncoder, png::PngEncoder},
    imageops::FilterType,
};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{
    dto::images::UploadResponse,
    error::{AppError, AppResult},
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_DIMENSION: u32 = 2560;
const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// PNG stays PNG; everything else is stored as JPEG.
    pub fn for_content_type(content_type: &str) -> Self {
        if content_type.eq_ignore_ascii_case("image/png") {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

#[derive(Debug)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

pub fn validate(file: &IncomingFile) -> AppResult<OutputFormat> {
    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest("File must be an image".into()));
    }
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("Empty file".into()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(
            "File size must be less than 10MB".into(),
        ));
    }
    Ok(OutputFormat::for_content_type(content_type))
}

/// Decodes, shrinks to fit inside `MAX_DIMENSION` (never enlarging) and
/// re-encodes.
pub fn process(bytes: &[u8], format: OutputFormat) -> AppResult<ProcessedImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid image: {e}")))?;

    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        match format {
            OutputFormat::Png => img.write_with_encoder(PngEncoder::new(&mut cursor)),
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY))
            }
        }
        .map_err(|e| AppError::Internal(anyhow::anyhow!("image encoding failed: {e}")))?;
    }

    Ok(ProcessedImage {
        bytes: buffer,
        format,
        width: img.width(),
        height: img.height(),
    })
}

/// Keeps the base name only, with anything outside `[A-Za-z0-9._-]`
/// replaced by a dash.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '-').to_string();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// `{millis}-{tag}-{stem}.{ext}` where the extension follows the stored format.
pub fn stored_file_name(
    millis: i64,
    tag: &str,
    original: Option<&str>,
    format: OutputFormat,
) -> String {
    let sanitized = sanitize_file_name(original.unwrap_or("image"));
    let stem = match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => sanitized.as_str(),
    };
    format!("{millis}-{tag}-{stem}.{}", format.extension())
}

pub async fn store(dir: &Path, file: IncomingFile) -> AppResult<UploadResponse> {
    let format = validate(&file)?;
    let IncomingFile {
        file_name, bytes, ..
    } = file;

    let processed = tokio::task::spawn_blocking(move || process(&bytes, format))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("image task failed: {e}")))??;

    let tag = Uuid::new_v4().simple().to_string();
    let filename = stored_file_name(
        Utc::now().timestamp_millis(),
        &tag[..8],
        file_name.as_deref(),
        processed.format,
    );

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    // Never overwrite an existing upload.
    let mut out = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dir.join(&filename))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    out.write_all(&processed.bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    out.flush().await.map_err(|e| AppError::Internal(e.into()))?;

    tracing::info!(
        filename = %filename,
        width = processed.width,
        height = processed.height,
        bytes = processed.bytes.len(),
        "image stored"
    );

    Ok(UploadResponse {
        image_url: format!("/uploads/{filename}"),
        filename,
        width: processed.width,
        height: processed.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn incoming(content_type: &str, bytes: Vec<u8>) -> IncomingFile {
        IncomingFile {
            file_name: Some("photo.png".into()),
            content_type: Some(content_type.into()),
            bytes,
        }
    }

    #[test]
    fn rejects_non_images_and_oversized_files() {
        let err = validate(&incoming("application/pdf", vec![1])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = validate(&incoming("image/png", vec![0; MAX_UPLOAD_BYTES + 1])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        assert_eq!(
            validate(&incoming("image/webp", vec![1])).unwrap(),
            OutputFormat::Jpeg
        );
        assert_eq!(
            validate(&incoming("image/png", vec![1])).unwrap(),
            OutputFormat::Png
        );
    }

    #[test]
    fn large_images_shrink_to_fit_keeping_aspect() {
        let out = process(&png_bytes(3000, 1500), OutputFormat::Jpeg).unwrap();
        assert_eq!((out.width, out.height), (2560, 1280));
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let out = process(&png_bytes(40, 20), OutputFormat::Png).unwrap();
        assert_eq!((out.width, out.height), (40, 20));
        assert_eq!(&out.bytes[1..4], b"PNG");
    }

    #[test]
    fn garbage_is_a_bad_request() {
        let err = process(b"not an image", OutputFormat::Jpeg).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("my photo (1).JPG"), "my-photo--1-.JPG");
        assert_eq!(sanitize_file_name("..."), "image");
        assert_eq!(
            stored_file_name(1700000000000, "a1b2c3d4", Some("Kopi Klotok.webp"), OutputFormat::Jpeg),
            "1700000000000-a1b2c3d4-Kopi-Klotok.jpg"
        );
        assert_eq!(
            stored_file_name(1, "00ff00ff", None, OutputFormat::Png),
            "1-00ff00ff-image.png"
        );
    }

    #[tokio::test]
    async fn same_name_uploads_never_overwrite_each_other() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4().simple()));

        let first = store(&dir, incoming("image/png", png_bytes(4, 4))).await.unwrap();
        let second = store(&dir, incoming("image/png", png_bytes(8, 8))).await.unwrap();

        assert_ne!(first.filename, second.filename);
        assert!(first.filename.ends_with("-photo.png"));
        assert!(dir.join(&first.filename).exists());
        assert!(dir.join(&second.filename).exists());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
