//! Exclusive ownership of a capture device for the "use camera" flow.

use crate::acquire::encode_jpeg;
use crate::AcquisitionError;
use autospector_core::media::EncodedImage;
use image::DynamicImage;

const CAPTURE_JPEG_QUALITY: u8 = 92;

/// A video source. `release` must stop every stream the device holds and be
/// safe to call more than once.
pub trait CaptureDevice {
    fn open(&mut self) -> Result<(), AcquisitionError>;
    fn frame(&mut self) -> Result<DynamicImage, AcquisitionError>;
    fn release(&mut self);
}

/// An open device. It is released exactly once, on whichever comes first:
/// [`CameraSession::capture`], [`CameraSession::cancel`], or drop.
pub struct CameraSession<D: CaptureDevice> {
    device: Option<D>,
}

impl<D: CaptureDevice> CameraSession<D> {
    pub fn start(mut device: D) -> Result<Self, AcquisitionError> {
        if let Err(err) = device.open() {
            tracing::warn!(error = %err, "camera unavailable");
            device.release();
            return Err(err);
        }
        Ok(Self {
            device: Some(device),
        })
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Current frame for a live preview; the session stays open.
    pub fn preview(&mut self) -> Result<DynamicImage, AcquisitionError> {
        self.device
            .as_mut()
            .ok_or(AcquisitionError::CameraClosed)?
            .frame()
    }

    /// Grabs one frame as JPEG and closes the session.
    pub fn capture(mut self) -> Result<EncodedImage, AcquisitionError> {
        let mut device = self.device.take().ok_or(AcquisitionError::CameraClosed)?;
        let frame = device.frame();
        device.release();
        encode_jpeg(&frame?, CAPTURE_JPEG_QUALITY)
    }

    pub fn cancel(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.release();
        }
    }
}

impl<D: CaptureDevice> Drop for CameraSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}

/// The machine's camera at `index`. Builds without the `native-camera`
/// feature have no capture backend and fail to open with
/// [`AcquisitionError::CameraUnavailable`].
pub struct NativeCamera {
    index: u32,
    #[cfg(feature = "native-camera")]
    stream: Option<nokhwa::Camera>,
}

impl NativeCamera {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            #[cfg(feature = "native-camera")]
            stream: None,
        }
    }
}

#[cfg(feature = "native-camera")]
impl CaptureDevice for NativeCamera {
    fn open(&mut self) -> Result<(), AcquisitionError> {
        use nokhwa::pixel_format::RgbFormat;
        use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = nokhwa::Camera::new(CameraIndex::Index(self.index), requested)
            .map_err(|e| AcquisitionError::CameraUnavailable(e.to_string()))?;
        camera
            .open_stream()
            .map_err(|e| AcquisitionError::CameraUnavailable(e.to_string()))?;
        tracing::debug!(index = self.index, "camera stream open");
        self.stream = Some(camera);
        Ok(())
    }

    fn frame(&mut self) -> Result<DynamicImage, AcquisitionError> {
        use nokhwa::pixel_format::RgbFormat;

        let camera = self.stream.as_mut().ok_or(AcquisitionError::CameraClosed)?;
        let decoded = camera
            .frame()
            .and_then(|buf| buf.decode_image::<RgbFormat>())
            .map_err(|e| AcquisitionError::CameraUnavailable(e.to_string()))?;
        let (w, h) = (decoded.width(), decoded.height());
        image::RgbImage::from_raw(w, h, decoded.into_raw())
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| AcquisitionError::CameraUnavailable("frame size mismatch".to_string()))
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.stream.take() {
            if let Err(err) = camera.stop_stream() {
                tracing::warn!(error = %err, "failed to stop camera stream");
            }
            tracing::debug!(index = self.index, "camera released");
        }
    }
}

#[cfg(not(feature = "native-camera"))]
impl CaptureDevice for NativeCamera {
    fn open(&mut self) -> Result<(), AcquisitionError> {
        tracing::debug!(index = self.index, "built without a camera backend");
        Err(AcquisitionError::CameraUnavailable(
            "this build has no camera support".to_string(),
        ))
    }

    fn frame(&mut self) -> Result<DynamicImage, AcquisitionError> {
        Err(AcquisitionError::CameraClosed)
    }

    fn release(&mut self) {}
}
