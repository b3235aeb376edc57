use crate::{
    error::{RawplayError, RawplayResult},
    frame::{MaskFrame, PixelLayout},
};

/// Convert one normalized opacity value to an 8-bit alpha sample.
pub fn mask_to_alpha(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Produces the exact byte layout the renderer expects for one frame,
/// reusing a single scratch buffer across the stream.
///
/// The layout is fixed at construction; whether a mask is supplied per frame
/// must agree with it. An rgb24 composer passes color frames through
/// untouched, an rgba composer interleaves the mask as a fourth channel.
pub struct FrameComposer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    scratch: Vec<u8>,
}

impl FrameComposer {
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> Self {
        let scratch = match layout {
            PixelLayout::Rgb24 => Vec::new(),
            PixelLayout::Rgba => vec![0u8; layout.frame_len(width, height)],
        };
        Self {
            width,
            height,
            layout,
            scratch,
        }
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn compose<'a>(
        &'a mut self,
        rgb: &'a [u8],
        mask: Option<&MaskFrame>,
    ) -> RawplayResult<&'a [u8]> {
        let expected = PixelLayout::Rgb24.frame_len(self.width, self.height);
        if rgb.len() != expected {
            return Err(RawplayError::validation(format!(
                "color frame length {} does not match {}x{} rgb24 ({} bytes)",
                rgb.len(),
                self.width,
                self.height,
                expected
            )));
        }

        match (self.layout, mask) {
            (PixelLayout::Rgb24, None) => Ok(rgb),
            (PixelLayout::Rgb24, Some(_)) => Err(RawplayError::validation(
                "mask supplied for an rgb24 session",
            )),
            (PixelLayout::Rgba, None) => Err(RawplayError::validation(
                "rgba session requires a mask sample for every frame",
            )),
            (PixelLayout::Rgba, Some(mask)) => {
                mask.check_size(self.width, self.height)?;
                for ((dst, src), &m) in self
                    .scratch
                    .chunks_exact_mut(4)
                    .zip(rgb.chunks_exact(3))
                    .zip(mask.data.iter())
                {
                    dst[..3].copy_from_slice(src);
                    dst[3] = mask_to_alpha(m);
                }
                Ok(&self.scratch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_conversion_rounds_and_clamps() {
        assert_eq!(mask_to_alpha(0.0), 0);
        assert_eq!(mask_to_alpha(1.0), 255);
        assert_eq!(mask_to_alpha(0.5), 128);
        assert_eq!(mask_to_alpha(0.25), 64);
        assert_eq!(mask_to_alpha(-0.5), 0);
        assert_eq!(mask_to_alpha(1.5), 255);
    }

    #[test]
    fn rgb24_without_mask_is_passthrough() {
        let mut composer = FrameComposer::new(2, 1, PixelLayout::Rgb24);
        let rgb = [1u8, 2, 3, 4, 5, 6];
        let out = composer.compose(&rgb, None).unwrap();
        assert_eq!(out, &rgb);
    }

    #[test]
    fn rgba_interleaves_color_then_alpha() {
        let mut composer = FrameComposer::new(2, 1, PixelLayout::Rgba);
        let rgb = [10u8, 20, 30, 40, 50, 60];
        let mask = MaskFrame::new(2, 1, vec![0.0, 1.0]).unwrap();
        let out = composer.compose(&rgb, Some(&mask)).unwrap();
        assert_eq!(out, &[10, 20, 30, 0, 40, 50, 60, 255]);
    }

    #[test]
    fn layout_and_mask_presence_must_agree() {
        let mask = MaskFrame::new(2, 1, vec![0.5, 0.5]).unwrap();
        let rgb = [0u8; 6];

        let mut rgb24 = FrameComposer::new(2, 1, PixelLayout::Rgb24);
        assert!(rgb24.compose(&rgb, Some(&mask)).is_err());

        let mut rgba = FrameComposer::new(2, 1, PixelLayout::Rgba);
        assert!(rgba.compose(&rgb, None).is_err());
    }

    #[test]
    fn bad_buffer_sizes_are_rejected() {
        let mut composer = FrameComposer::new(2, 2, PixelLayout::Rgba);
        let rgb = [0u8; 12];
        assert!(composer.compose(&[0u8; 11], None).is_err());

        let wrong_mask = MaskFrame::new(2, 1, vec![0.5, 0.5]).unwrap();
        assert!(composer.compose(&rgb, Some(&wrong_mask)).is_err());
    }
}
