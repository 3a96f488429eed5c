//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Canonical audio extension for generated files (without the dot).
pub const AUDIO_EXTENSION: &str = "wav";

/// Configuration for the blend pipeline.
///
/// Paths are relative to the process working directory unless the embedder
/// resolves them beforehand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendConfig {
    /// Directory where generated audio files are written.
    pub output_dir: PathBuf,

    /// Directory holding the downloaded model files.
    pub voices_dir: PathBuf,

    /// Default blend ratio applied before the user picks one.
    pub default_ratio: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            voices_dir: PathBuf::from("voices"),
            default_ratio: 0.5,
        }
    }
}
