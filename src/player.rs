use std::{
    io::{Read as _, Write as _},
    process::{Child, ChildStdin, Command, Stdio},
    sync::{Arc, Mutex, PoisonError},
    thread::JoinHandle,
};

use crate::{
    error::{RawplayError, RawplayResult},
    frame::PixelLayout,
};

pub const FFPLAY_BINARY: &str = "ffplay";

/// Destination for composed wire-format frames.
///
/// [`FfplayPlayer`] is the real implementation; the session orchestration is
/// written against this trait so it can run against a mock renderer in tests.
pub trait FrameSink {
    /// Write one frame's raw bytes. Blocks until the sink accepts them;
    /// backpressure from the external process is expected.
    fn write_frame(&mut self, data: &[u8]) -> RawplayResult<()>;

    /// Release the sink. Must be idempotent.
    fn close(&mut self) -> RawplayResult<()>;
}

/// Ordered argument list for raw, headerless video ingestion. Order matters
/// to ffplay.
pub fn ffplay_args(width: u32, height: u32, fps: f64, layout: PixelLayout) -> Vec<String> {
    vec![
        // Without -autoexit ffplay keeps its window open after the stream ends.
        "-autoexit".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        layout.ffplay_name().to_string(),
        "-video_size".to_string(),
        format!("{width}x{height}"),
        "-framerate".to_string(),
        format!("{fps:.2}"),
        "-".to_string(),
    ]
}

pub fn is_on_path(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn is_ffplay_on_path() -> bool {
    is_on_path(FFPLAY_BINARY)
}

/// A spawned external player consuming a contiguous raw frame stream on its
/// stdin. stdout is discarded; stderr is kept piped so it can be surfaced
/// when a write fails.
///
/// Lifecycle is `open` then any number of `write_frame` calls then `close`.
/// Writing after close fails fast rather than silently succeeding.
#[derive(Debug)]
pub struct FfplayPlayer {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_buf: Arc<Mutex<Vec<u8>>>,
    stderr_reader: Option<JoinHandle<()>>,
    closed: bool,
}

impl FfplayPlayer {
    pub fn open(width: u32, height: u32, fps: f64, layout: PixelLayout) -> RawplayResult<Self> {
        Self::open_with_binary(FFPLAY_BINARY, width, height, fps, layout)
    }

    /// Like [`open`](Self::open) with an alternative player binary, for
    /// installations where ffplay lives under a different name or path.
    pub fn open_with_binary(
        binary: &str,
        width: u32,
        height: u32,
        fps: f64,
        layout: PixelLayout,
    ) -> RawplayResult<Self> {
        if width == 0 || height == 0 {
            return Err(RawplayError::validation(
                "preview width/height must be non-zero",
            ));
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(RawplayError::validation(
                "preview frame rate must be finite and positive",
            ));
        }

        let args = ffplay_args(width, height, fps, layout);
        tracing::debug!(binary, ?args, "spawning preview renderer");

        // We use the system binary rather than linking a player library; raw
        // frames over a pipe keep the renderer fully decoupled.
        let mut child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RawplayError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            RawplayError::validation("renderer stdin pipe missing (unexpected)")
        })?;

        // ffplay chatters on stderr for the whole session; without a reader
        // the pipe fills and the child stalls on fd 2, which in turn stalls
        // our frame writes. Drain continuously, keep the bytes for failure
        // diagnostics.
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            let buf = Arc::clone(&stderr_buf);
            std::thread::spawn(move || {
                let mut bytes = Vec::new();
                let _ = stderr.read_to_end(&mut bytes);
                buf.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(bytes);
            })
        });

        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr_buf,
            stderr_reader,
            closed: false,
        })
    }

    /// Push one frame's raw bytes into the renderer. Blocks on pipe
    /// backpressure. On failure the child is reaped and its stderr attached
    /// to the returned error.
    pub fn write_frame(&mut self, data: &[u8]) -> RawplayResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(RawplayError::validation(
                "write_frame called on a closed renderer",
            ));
        };

        if let Err(source) = stdin.write_all(data) {
            let diagnostic = self.drain_stderr();
            return Err(RawplayError::FrameWrite { source, diagnostic });
        }
        Ok(())
    }

    /// Reap a failed child and decode whatever it printed on stderr.
    fn drain_stderr(&mut self) -> String {
        // Closing our end of the pipe first guarantees the child reaches EOF
        // and exits, so the reader thread sees stderr EOF and finishes.
        drop(self.stdin.take());
        let _ = self.child.wait();
        if let Some(reader) = self.stderr_reader.take() {
            let _ = reader.join();
        }

        let bytes = self
            .stderr_buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Close the input pipe, wait for the process to terminate, and release
    /// the handle. Safe to call more than once; later calls are no-ops.
    pub fn close(&mut self) -> RawplayResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        drop(self.stdin.take());

        let status = self
            .child
            .wait()
            .map_err(|e| RawplayError::cleanup(format!("failed waiting for renderer exit: {e}")))?;
        if let Some(reader) = self.stderr_reader.take() {
            let _ = reader.join();
        }
        if !status.success() {
            tracing::debug!(%status, "renderer exited with non-success status");
        }
        Ok(())
    }
}

impl FrameSink for FfplayPlayer {
    fn write_frame(&mut self, data: &[u8]) -> RawplayResult<()> {
        FfplayPlayer::write_frame(self, data)
    }

    fn close(&mut self) -> RawplayResult<()> {
        FfplayPlayer::close(self)
    }
}

impl Drop for FfplayPlayer {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
