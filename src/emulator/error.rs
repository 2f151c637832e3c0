use std::io;

/// Errors raised while dispatching a token
#[derive(Debug, thiserror::Error)]
pub enum EmulatorError {
    /// Reading input or writing a response failed; ends the session
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),

    #[error("invalid scroll region {top};{bottom} on a {rows}-row screen")]
    InvalidRegion { top: i32, bottom: i32, rows: usize },

    /// Recognized but not implemented
    #[error("unsupported {0}: {1}")]
    Unsupported(&'static str, i32),
}

impl EmulatorError {
    /// Whether the session has to stop
    pub fn is_fatal(&self) -> bool {
        matches!(self, EmulatorError::Transport(_))
    }
}
