use crate::AcquisitionError;
use autospector_core::media::EncodedImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

const SUPPORTED: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

pub fn load_file(path: &Path) -> Result<EncodedImage, AcquisitionError> {
    let bytes = std::fs::read(path).map_err(|source| AcquisitionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let image = from_bytes(&bytes, None)?;
    tracing::debug!(path = %path.display(), mime = %image.mime, bytes = bytes.len(), "loaded image");
    Ok(image)
}

/// Validates that `bytes` hold a supported image and encodes them.
/// `declared_mime` is what the source claimed (e.g. a drop payload type);
/// anything not `image/*` is refused before looking at the bytes.
pub fn from_bytes(bytes: &[u8], declared_mime: Option<&str>) -> Result<EncodedImage, AcquisitionError> {
    if let Some(mime) = declared_mime {
        if !mime.starts_with("image/") {
            return Err(AcquisitionError::NotAnImage {
                mime: Some(mime.to_string()),
            });
        }
    }

    let format = image::guess_format(bytes)
        .ok()
        .filter(|f| SUPPORTED.contains(f))
        .ok_or_else(|| AcquisitionError::NotAnImage {
            mime: declared_mime.map(str::to_string),
        })?;

    Ok(EncodedImage::new(format.to_mime_type(), STANDARD.encode(bytes)))
}

pub fn raw_bytes(image: &EncodedImage) -> Result<Vec<u8>, AcquisitionError> {
    Ok(STANDARD.decode(image.base64.trim())?)
}

pub fn decode(image: &EncodedImage) -> Result<DynamicImage, AcquisitionError> {
    let bytes = raw_bytes(image)?;
    Ok(image::load_from_memory(&bytes)?)
}

pub fn decode_data_uri(uri: &str) -> Result<DynamicImage, AcquisitionError> {
    decode(&EncodedImage::parse_data_uri(uri)?)
}

/// Lossy JPEG re-encode, `quality` in 1..=100.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<EncodedImage, AcquisitionError> {
    let mut buf = Cursor::new(Vec::new());
    let rgb = img.to_rgb8();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;
    Ok(EncodedImage::new("image/jpeg", STANDARD.encode(buf.into_inner())))
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, AcquisitionError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}
