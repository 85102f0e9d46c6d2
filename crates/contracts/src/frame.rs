//! Pixel payload contracts between the world client and the capture crate.

use bytes::Bytes;

/// CARLA actor handle type
pub type ActorId = u32;

/// One rendered camera frame as delivered by the simulator.
///
/// CARLA cameras produce BGRA8; the capture side converts on save.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Simulator frame number the image belongs to
    pub frame_number: u64,
    pub width: u32,
    pub height: u32,
    /// Raw BGRA8 pixels, `width * height * 4` bytes
    pub data: Bytes,
}

/// Frame-save callback type
///
/// Invoked by the world client out of band with the stepping loop, on the
/// simulator's callback thread (real mode) or inline during a step (mock).
pub type FrameCallback = Box<dyn FnMut(CapturedFrame) + Send + 'static>;

/// A decoded sign texture ready for upload to in-world objects.
///
/// Always RGBA8 with every alpha byte forced to 255: the original sign
/// material expects fully opaque replacement pixels.
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, `width * height * 4` bytes, alpha = 255 throughout
    pub data: Bytes,
}

impl CapturedFrame {
    /// Byte length expected for the declared dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}
