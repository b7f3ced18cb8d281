use crate::acquire::{decode_data_uri, encode_jpeg};
use crate::AcquisitionError;
use autospector_core::history::Thumbnailer;
use image::imageops::FilterType;
use image::DynamicImage;

#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_width: 300,
            jpeg_quality: 70,
        }
    }
}

/// Downscale to `max_width` (aspect kept, never upscaled), then JPEG.
pub fn shrink(img: &DynamicImage, cfg: &ThumbnailConfig) -> DynamicImage {
    if img.width() <= cfg.max_width || img.width() == 0 {
        return img.clone();
    }
    let scale = cfg.max_width as f64 / img.width() as f64;
    let height = ((img.height() as f64 * scale).round() as u32).max(1);
    img.resize_exact(cfg.max_width, height, FilterType::Triangle)
}

pub fn thumbnail_data_uri(data_uri: &str, cfg: &ThumbnailConfig) -> Result<String, AcquisitionError> {
    let img = decode_data_uri(data_uri)?;
    let small = shrink(&img, cfg);
    Ok(encode_jpeg(&small, cfg.jpeg_quality)?.to_data_uri())
}

#[derive(Debug, Clone, Default)]
pub struct JpegThumbnailer {
    cfg: ThumbnailConfig,
}

impl JpegThumbnailer {
    pub fn new(cfg: ThumbnailConfig) -> Self {
        Self { cfg }
    }
}

impl Thumbnailer for JpegThumbnailer {
    fn thumbnail(&self, data_uri: &str) -> Option<String> {
        match thumbnail_data_uri(data_uri, &self.cfg) {
            Ok(thumb) => Some(thumb),
            Err(err) => {
                tracing::warn!(error = %err, "thumbnail failed, keeping original image");
                None
            }
        }
    }
}
