use crate::error::ValidationError;

/// Multipart field the client must send the image under.
pub const UPLOAD_FIELD: &str = "file";

/// One uploaded file as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Cheap precondition checks, in order, stopping at the first failure.
///
/// Only the declared metadata is inspected; whether the bytes really are an
/// image is left to the normalizer.
pub fn validate(upload: Option<&RawUpload>) -> Result<&RawUpload, ValidationError> {
    let upload = upload.ok_or(ValidationError::MissingFile)?;
    if upload.filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    if !is_image_mime(&upload.content_type) {
        return Err(ValidationError::NotAnImage { content_type: upload.content_type.clone() });
    }
    Ok(upload)
}

fn is_image_mime(content_type: &str) -> bool {
    content_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
