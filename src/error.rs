use thiserror::Error;

/// All possible errors that can occur while trimming audio
#[derive(Debug, Error)]
pub enum AudioError {
    /// Failed to open or read the audio file from disk
    #[error("Failed to open audio file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },

    /// The bytes could not be parsed as a supported container/codec
    #[error("Audio decoding failed: {0}")]
    DecodeFailed(String),

    /// The resolved trim window is empty or inverted
    #[error("Invalid trim range ({start}s to {end}s) for audio of {duration}s")]
    InvalidRange {
        start: f64,
        end: f64,
        duration: f64,
    },

    /// The offline render stage failed internally
    #[error("Offline rendering failed: {0}")]
    RenderFailed(String),

    /// Error occurred while encoding to WAV
    #[error("WAV encoding failed: {0}")]
    EncodeFailed(String),

    /// A PCM buffer was built from inconsistent parts
    #[error("Invalid PCM buffer: {0}")]
    InvalidBuffer(String),

    /// A file name cannot be used as an upload target
    #[error("Invalid file name '{0}'")]
    InvalidName(String),

    /// The upload target already holds a file with this name
    #[error("A file named '{0}' already exists")]
    UploadConflict(String),

    /// Pipeline configuration could not be loaded or is out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse category of an [`AudioError`], stable for callers that branch on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    InvalidRange,
    Render,
    Encode,
    Upload,
    Config,
    Io,
}

impl AudioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudioError::DecodeFailed(_) => ErrorKind::Decode,
            AudioError::InvalidRange { .. } => ErrorKind::InvalidRange,
            AudioError::RenderFailed(_) => ErrorKind::Render,
            AudioError::EncodeFailed(_) | AudioError::InvalidBuffer(_) => ErrorKind::Encode,
            AudioError::InvalidName(_) | AudioError::UploadConflict(_) => ErrorKind::Upload,
            AudioError::Config(_) => ErrorKind::Config,
            AudioError::FileOpen { .. } | AudioError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Convenient Result type that uses our AudioError
pub type Result<T> = std::result::Result<T, AudioError>;
