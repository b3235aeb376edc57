use crate::{
    composite::FrameComposer,
    error::{RawplayError, RawplayResult},
    frame::{MaskFrame, PixelLayout, TimedFrame},
    player::{FFPLAY_BINARY, FfplayPlayer, FrameSink},
    signal::StartHandshake,
};

/// Producer of per-pixel opacity grids, sampled at the color frame's
/// timestamp.
pub trait MaskSource {
    fn mask_at(&mut self, t: f64) -> RawplayResult<MaskFrame>;
}

/// Lazy, finite, time-ordered producer of color frames feeding a preview
/// session. Restartable only by recreation.
pub trait FrameSource {
    /// Declared frame size in pixels (width, height).
    fn size(&self) -> (u32, u32);

    /// The transparency mask attached to this source, if any. Presence is
    /// checked once at session start to pick the pixel layout; it must not
    /// change mid-stream.
    fn mask(&mut self) -> Option<&mut dyn MaskSource>;

    /// The next timestamped rgb24 frame at `fps`, or `None` once the source
    /// is exhausted. Timestamps must be strictly increasing.
    fn next_frame(&mut self, fps: f64) -> RawplayResult<Option<TimedFrame>>;
}

#[derive(Clone, Debug)]
pub struct PreviewOptions {
    /// Target display rate in frames per second.
    pub fps: f64,
    /// Explicit wire layout; defaults to mask-presence resolution.
    pub pixel_layout: Option<PixelLayout>,
    /// Alternative player binary; defaults to `ffplay`.
    pub binary: Option<String>,
}

impl PreviewOptions {
    pub fn new(fps: f64) -> Self {
        Self {
            fps,
            pixel_layout: None,
            binary: None,
        }
    }

    pub fn with_pixel_layout(mut self, layout: PixelLayout) -> Self {
        self.pixel_layout = Some(layout);
        self
    }
}

/// Pick the session's wire layout: an explicit override wins, otherwise
/// rgba when the source carries a mask and rgb24 when it does not.
pub fn resolve_layout(explicit: Option<PixelLayout>, has_mask: bool) -> PixelLayout {
    explicit.unwrap_or(if has_mask {
        PixelLayout::Rgba
    } else {
        PixelLayout::Rgb24
    })
}

/// Preview `source` end-to-end: resolve the pixel layout, spawn the
/// renderer, stream every frame, and release the renderer before returning
/// on both the success and the failure path.
#[tracing::instrument(skip(source, handshake), fields(fps = opts.fps))]
pub fn preview_video(
    source: &mut dyn FrameSource,
    opts: &PreviewOptions,
    handshake: StartHandshake<'_>,
) -> RawplayResult<()> {
    let (width, height) = source.size();
    let layout = resolve_layout(opts.pixel_layout, source.mask().is_some());
    let binary = opts.binary.as_deref().unwrap_or(FFPLAY_BINARY);

    let mut player = FfplayPlayer::open_with_binary(binary, width, height, opts.fps, layout)?;
    run_preview(&mut player, source, layout, opts.fps, handshake)
}

/// Drive the full frame loop against an already-open sink.
///
/// The sink is closed on every exit path. When the stream has already
/// failed, a close failure is logged and suppressed so the stream error
/// propagates; on the success path a close failure is the session's result.
pub fn run_preview(
    sink: &mut dyn FrameSink,
    source: &mut dyn FrameSource,
    layout: PixelLayout,
    fps: f64,
    handshake: StartHandshake<'_>,
) -> RawplayResult<()> {
    let result = stream_frames(sink, source, layout, fps, handshake);
    match sink.close() {
        Ok(()) => result,
        Err(close_err) => match result {
            Err(stream_err) => {
                tracing::warn!(error = %close_err, "suppressing renderer close failure after stream error");
                Err(stream_err)
            }
            Ok(()) => Err(close_err),
        },
    }
}

fn stream_frames(
    sink: &mut dyn FrameSink,
    source: &mut dyn FrameSource,
    layout: PixelLayout,
    fps: f64,
    handshake: StartHandshake<'_>,
) -> RawplayResult<()> {
    let (width, height) = source.size();
    let mut composer = FrameComposer::new(width, height, layout);
    let mut first_frame = true;

    while let Some(TimedFrame { t, data }) = source.next_frame(fps)? {
        let mask = match layout {
            PixelLayout::Rgb24 => None,
            PixelLayout::Rgba => {
                let Some(mask_source) = source.mask() else {
                    return Err(RawplayError::validation(
                        "mask disappeared mid-stream; mask presence is fixed at session start",
                    ));
                };
                Some(mask_source.mask_at(t)?)
            }
        };

        let wire = composer.compose(&data, mask.as_ref())?;
        tracing::trace!(t, bytes = wire.len(), "writing preview frame");
        sink.write_frame(wire)?;

        // One-time start-of-stream barrier. After this, video and audio run
        // free and may drift.
        if first_frame {
            first_frame = false;
            if let Some(video_ready) = handshake.video_ready {
                video_ready.set();
            }
            if let Some(audio_ready) = handshake.audio_ready {
                audio_ready.wait();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_defaults_to_rgba_with_mask() {
        assert_eq!(resolve_layout(None, true), PixelLayout::Rgba);
    }

    #[test]
    fn layout_defaults_to_rgb24_without_mask() {
        assert_eq!(resolve_layout(None, false), PixelLayout::Rgb24);
    }

    #[test]
    fn explicit_layout_wins_over_mask_presence() {
        assert_eq!(
            resolve_layout(Some(PixelLayout::Rgb24), true),
            PixelLayout::Rgb24
        );
        assert_eq!(
            resolve_layout(Some(PixelLayout::Rgba), false),
            PixelLayout::Rgba
        );
    }
}
