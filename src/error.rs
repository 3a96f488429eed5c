//! Blend pipeline error types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors that can occur in the voice-blend pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BlendError {
    /// Text source file does not exist.
    #[error("Text file not found: {0}")]
    FileNotFound(PathBuf),

    /// Text source exists but is not a readable UTF-8 regular file.
    #[error("Text file is not readable: {0}")]
    NotReadable(PathBuf),

    /// Text source decoded to an empty (or whitespace-only) string,
    /// or no text has been loaded yet.
    #[error("No text to synthesize - the source is empty")]
    EmptyInput,

    /// Selected voice is not in the backend's catalog.
    #[error("Unknown voice: '{0}'")]
    UnknownVoice(String),

    /// Dual mode requires a second voice.
    #[error("A second voice is required when blending two voices")]
    MissingVoice2,

    /// Blend ratio outside the closed interval [0.0, 1.0].
    #[error("Blend ratio {0} is out of range (must be between 0.0 and 1.0)")]
    RatioOutOfRange(f32),

    /// Output filename contains a path separator, NUL, or reserved character.
    #[error("Output filename contains invalid characters: '{0}'")]
    InvalidCharacters(String),

    /// Output filename is empty.
    #[error("Output filename is empty")]
    EmptyName,

    /// A generation is already in flight; at most one runs at a time.
    #[error("A generation is already running")]
    AlreadyRunning,

    /// The synthesis backend failed.
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Writing the output waveform file failed.
    #[error("Failed to write output file: {0}")]
    IoWriteFailed(String),

    /// Model file not found at the expected path.
    #[error("Voice model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Failed to download a model file.
    #[error("Failed to download model file '{name}': {source}")]
    DownloadFailed { name: String, source: anyhow::Error },
}

impl BlendError {
    /// Flatten into the payload-free taxonomy stored in session state.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::NotReadable(_) => ErrorKind::NotReadable,
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::UnknownVoice(_) => ErrorKind::UnknownVoice,
            Self::MissingVoice2 => ErrorKind::MissingVoice2,
            Self::RatioOutOfRange(_) => ErrorKind::RatioOutOfRange,
            Self::InvalidCharacters(_) => ErrorKind::InvalidCharacters,
            Self::EmptyName => ErrorKind::EmptyName,
            Self::AlreadyRunning => ErrorKind::AlreadyRunning,
            Self::SynthesisFailed(_) => ErrorKind::SynthesisFailed,
            Self::IoWriteFailed(_) => ErrorKind::IoWriteFailed,
            Self::ModelNotFound(_) => ErrorKind::ModelNotFound,
            Self::DownloadFailed { .. } => ErrorKind::DownloadFailed,
        }
    }
}

/// Flat error taxonomy.
///
/// `SessionState.last_error` and `SessionEvent::Failed` carry this `Copy`
/// kind alongside the rendered message, so the presentation layer can match
/// on the category without owning the full [`BlendError`] payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    FileNotFound,
    NotReadable,
    EmptyInput,
    UnknownVoice,
    MissingVoice2,
    RatioOutOfRange,
    InvalidCharacters,
    EmptyName,
    AlreadyRunning,
    SynthesisFailed,
    IoWriteFailed,
    ModelNotFound,
    DownloadFailed,
}
