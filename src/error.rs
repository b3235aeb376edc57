pub type RawplayResult<T> = Result<T, RawplayError>;

#[derive(thiserror::Error, Debug)]
pub enum RawplayError {
    #[error("validation error: {0}")]
    Validation(String),

    /// The external renderer binary could not be launched at all.
    #[error("failed to spawn renderer '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// A write to the renderer's input pipe failed, typically because the
    /// process exited. `diagnostic` holds whatever the renderer printed on
    /// stderr before dying.
    #[error("failed to write frame to renderer: {source}\n\nrenderer reported:\n{diagnostic}")]
    FrameWrite {
        #[source]
        source: std::io::Error,
        diagnostic: String,
    },

    #[error("cleanup error: {0}")]
    Cleanup(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RawplayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn cleanup(msg: impl Into<String>) -> Self {
        Self::Cleanup(msg.into())
    }
}
