//! Upload validation and the media storage port

use crate::contract::CatalogError;
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// What an uploaded file is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProjectThumbnail,
    ProjectData,
    SoftwareDefaultFile,
}

impl UploadKind {
    /// Multipart field carrying the file
    pub fn field(self) -> &'static str {
        match self {
            Self::ProjectThumbnail => "thumbnail",
            Self::ProjectData => "data",
            Self::SoftwareDefaultFile => "default_file",
        }
    }

    /// Directory under `uploads/`
    pub fn directory(self) -> &'static str {
        match self {
            Self::ProjectThumbnail | Self::ProjectData => "project",
            Self::SoftwareDefaultFile => "software",
        }
    }

    fn requires_image(self) -> bool {
        matches!(self, Self::ProjectThumbnail)
    }
}

/// File part extracted from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// `None` for plain form values
    pub file_name: Option<String>,
    pub contents: Bytes,
}

/// Stores uploaded files and hands back a reference to save on the entity
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store `contents` under a collision-resistant name, returning its reference
    async fn store(&self, kind: UploadKind, extension: &str, contents: Bytes) -> Result<String>;

    /// Remove a previously stored file
    async fn remove(&self, reference: &str) -> Result<()>;
}

/// Image formats accepted for thumbnails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Jpeg => ".jpg",
            Self::Gif => ".gif",
            Self::WebP => ".webp",
            Self::Bmp => ".bmp",
        }
    }
}

struct ImageSignature {
    offset: usize,
    bytes: &'static [u8],
    format: ImageFormat,
}

impl ImageSignature {
    fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len()) == Some(self.bytes)
    }
}

static IMAGE_SIGNATURES: &[ImageSignature] = &[
    ImageSignature {
        offset: 0,
        bytes: &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A],
        format: ImageFormat::Png,
    },
    ImageSignature {
        offset: 0,
        bytes: &[0xFF, 0xD8, 0xFF],
        format: ImageFormat::Jpeg,
    },
    ImageSignature {
        offset: 0,
        bytes: b"GIF87a",
        format: ImageFormat::Gif,
    },
    ImageSignature {
        offset: 0,
        bytes: b"GIF89a",
        format: ImageFormat::Gif,
    },
    ImageSignature {
        offset: 8,
        bytes: b"WEBP",
        format: ImageFormat::WebP,
    },
    ImageSignature {
        offset: 0,
        bytes: b"BM",
        format: ImageFormat::Bmp,
    },
];

/// Detect an image format from its magic bytes
pub fn sniff_image(data: &[u8]) -> Option<ImageFormat> {
    IMAGE_SIGNATURES
        .iter()
        .find(|sig| sig.matches(data))
        .map(|sig| sig.format)
        .filter(|format| *format != ImageFormat::WebP || data.starts_with(b"RIFF"))
}

/// Validate an upload and pick the extension to store it under
pub fn validate(
    kind: UploadKind,
    file: Option<&UploadedFile>,
    max_size: usize,
) -> Result<String, CatalogError> {
    let field = kind.field();
    let file = file.ok_or_else(|| CatalogError::validation(field, "No file was submitted."))?;
    let file_name = file.file_name.as_deref().ok_or_else(|| {
        CatalogError::validation(
            field,
            "The submitted data was not a file. Check the encoding type on the form.",
        )
    })?;

    if file.contents.is_empty() {
        return Err(CatalogError::validation(field, "The submitted file is empty."));
    }
    if file.contents.len() > max_size {
        return Err(CatalogError::validation(
            field,
            format!("The submitted file exceeds {} bytes.", max_size),
        ));
    }

    if kind.requires_image() {
        return sniff_image(&file.contents)
            .map(|format| format.extension().to_string())
            .ok_or_else(|| {
                CatalogError::validation(
                    field,
                    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
                )
            });
    }

    Ok(extension_of(file_name))
}

/// Extension of the client file name, kept only when it is short and plain
fn extension_of(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 10
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}
