use autospector_core::media::DataUriError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("Please upload a valid image file (JPG, PNG).")]
    NotAnImage { mime: Option<String> },
    #[error("Failed to read file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to access camera: {0}")]
    CameraUnavailable(String),
    #[error("camera session already closed")]
    CameraClosed,
    #[error("invalid image data URI")]
    DataUri(#[from] DataUriError),
    #[error("invalid base64 image payload")]
    Base64(#[from] base64::DecodeError),
    #[error("decode/encode image")]
    Image(#[from] image::ImageError),
}
