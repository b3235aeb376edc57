#![forbid(unsafe_code)]

//! Live raw-video preview: streams rgb24/rgba frames to an external ffplay
//! process for display, optionally compositing a per-pixel transparency mask
//! and synchronizing the first displayed frame with an independently running
//! audio activity.

pub mod composite;
pub mod error;
pub mod frame;
pub mod player;
pub mod session;
pub mod signal;

pub use composite::{FrameComposer, mask_to_alpha};
pub use error::{RawplayError, RawplayResult};
pub use frame::{MaskFrame, PixelLayout, TimedFrame};
pub use player::{FFPLAY_BINARY, FfplayPlayer, FrameSink, ffplay_args, is_ffplay_on_path};
pub use session::{
    FrameSource, MaskSource, PreviewOptions, preview_video, resolve_layout, run_preview,
};
pub use signal::{OnceFlag, StartHandshake, StartSignal};
