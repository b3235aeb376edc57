use std::sync::{Condvar, Mutex, PoisonError};

/// A one-shot cross-thread start signal: set at most once, observed at most
/// once per session.
///
/// The preview session never creates these; it accepts them from the caller,
/// sets `video_ready` after the first frame is shown, and waits on
/// `audio_ready` if the caller supplied one. Keeping them external keeps the
/// orchestration testable with recording mocks.
pub trait StartSignal: Send + Sync {
    fn set(&self);
    fn wait(&self);
}

/// The optional pair of start signals coordinating the first displayed frame
/// with an independently running audio activity.
#[derive(Clone, Copy, Default)]
pub struct StartHandshake<'a> {
    /// Set exactly once, immediately after the first frame write succeeds.
    pub video_ready: Option<&'a dyn StartSignal>,
    /// Waited on exactly once, before the second frame is produced. The wait
    /// has no timeout; a stalled audio activity stalls video indefinitely.
    pub audio_ready: Option<&'a dyn StartSignal>,
}

/// Mutex+Condvar one-shot flag for callers driving the audio side of the
/// handshake. `set` is idempotent and `wait` returns immediately once set.
#[derive(Default)]
pub struct OnceFlag {
    state: Mutex<bool>,
    cond: Condvar,
}

impl OnceFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StartSignal for OnceFlag {
    fn set(&self) {
        let mut set = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *set = true;
        self.cond.notify_all();
    }

    fn wait(&self) {
        let mut set = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while !*set {
            set = self
                .cond
                .wait(set)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
