use crate::error::{RawplayError, RawplayResult};

/// Per-pixel byte arrangement on the renderer's wire, fixed for the lifetime
/// of a preview session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3-channel interleaved color, no transparency.
    Rgb24,
    /// 4-channel color-then-alpha, used when the source carries a mask.
    Rgba,
}

impl PixelLayout {
    pub fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb24 => 3,
            PixelLayout::Rgba => 4,
        }
    }

    /// The name ffplay expects after `-pixel_format`.
    pub fn ffplay_name(self) -> &'static str {
        match self {
            PixelLayout::Rgb24 => "rgb24",
            PixelLayout::Rgba => "rgba",
        }
    }

    pub fn frame_len(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.channels()
    }
}

/// One timestamped rgb24 color frame produced by a frame source.
///
/// `data` is interleaved, row-major, and must hold exactly
/// `width * height * 3` bytes for the source's declared size.
#[derive(Clone, Debug)]
pub struct TimedFrame {
    /// Presentation time in seconds from the start of the stream.
    pub t: f64,
    pub data: Vec<u8>,
}

/// A per-pixel grid of normalized opacity values in `[0, 1]`, sampled at the
/// same timestamp and dimensions as the color frame it will be composited
/// onto.
#[derive(Clone, Debug)]
pub struct MaskFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl MaskFrame {
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> RawplayResult<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(RawplayError::validation(format!(
                "mask length {} does not match {}x{} grid",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn check_size(&self, width: u32, height: u32) -> RawplayResult<()> {
        if self.width != width || self.height != height {
            return Err(RawplayError::validation(format!(
                "mask size mismatch: got {}x{}, expected {}x{}",
                self.width, self.height, width, height
            )));
        }
        Ok(())
    }
}
