use std::path::Path;

/// Largest image the backend accepts
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// An image file ready to be attached to a project form
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImageValidationError {
    #[error("File size must be less than 5MB")]
    TooLarge(usize),

    #[error("Only image files are allowed (jpeg, jpg, png, gif, webp)")]
    UnsupportedType(String),
}

/// Content type inferred from the file extension
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

impl ImageUpload {
    pub fn new(
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageValidationError> {
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageValidationError::TooLarge(bytes.len()));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(ImageValidationError::UnsupportedType(mime_type));
        }
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}
