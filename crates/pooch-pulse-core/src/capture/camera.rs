//! Camera capture.
//!
//! Hosts implement [`CameraDevice`] over their platform camera. Holding the
//! stream is scoped by [`CameraSession`]: dropping the session releases the
//! device on every path, including capture errors and early returns.

use super::{CaptureError, CaptureResult, ImageData};

/// Which lens to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, preferred for photographing the ground
    Environment,
    /// Front camera
    User,
}

/// Platform camera stream.
pub trait CameraDevice {
    /// Acquire the stream.
    fn open(&mut self, facing: Facing) -> CaptureResult<()>;

    /// Grab one still frame as JPEG bytes.
    fn capture_jpeg(&mut self) -> CaptureResult<Vec<u8>>;

    /// Release the stream. Must be safe to call once per successful `open`.
    fn release(&mut self);
}

/// An open camera stream, released on drop.
pub struct CameraSession<'a, D: CameraDevice> {
    device: &'a mut D,
}

impl<'a, D: CameraDevice> CameraSession<'a, D> {
    /// Open the device. On failure nothing is held.
    pub fn start(device: &'a mut D, facing: Facing) -> CaptureResult<Self> {
        device.open(facing)?;
        tracing::debug!(?facing, "Camera stream acquired");
        Ok(Self { device })
    }

    /// Capture a frame as JPEG image data.
    pub fn capture(&mut self) -> CaptureResult<ImageData> {
        let bytes = self.device.capture_jpeg()?;
        if bytes.is_empty() {
            return Err(CaptureError::CaptureFailed("camera returned an empty frame".into()));
        }
        ImageData::from_bytes(&bytes)
    }
}

impl<D: CameraDevice> Drop for CameraSession<'_, D> {
    fn drop(&mut self) {
        self.device.release();
        tracing::debug!("Camera stream released");
    }
}

/// Open the rear camera, take one photo, release.
pub fn capture_still<D: CameraDevice>(device: &mut D) -> CaptureResult<ImageData> {
    let mut session = CameraSession::start(device, Facing::Environment)?;
    session.capture()
}
