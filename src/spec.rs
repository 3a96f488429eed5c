//! Blend specification: a fully-resolved generation request.
//!
//! [`BlendSpec`] is built exclusively by [`build_spec`], which composes the
//! validation rules in a fixed order (text, voices, ratio, filename) and
//! short-circuits on the first failure. No partially-validated spec ever
//! escapes; once built, a spec is immutable and moved by value into the
//! coordinator.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::VoiceId;
use crate::error::BlendError;
use crate::validate;

// ── Voice mode ─────────────────────────────────────────────────────

/// How many voices take part in the generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VoiceMode {
    /// One voice narrates the whole text.
    Single,

    /// Two voices are blended into a custom style before synthesis.
    #[default]
    Dual,
}

// ── Blend ratio ────────────────────────────────────────────────────

/// Interpolation weight given to voice 1, in the closed interval
/// `[0.0, 1.0]`; voice 2 receives the complement.
///
/// Constructed only through [`BlendRatio::new`] (deserialization routes
/// through it as well), so a value outside the interval cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32")]
pub struct BlendRatio(f32);

impl TryFrom<f32> for BlendRatio {
    type Error = BlendError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl BlendRatio {
    /// Check the range and wrap the value.
    pub fn new(value: f32) -> Result<Self, BlendError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BlendError::RatioOutOfRange(value))
        }
    }

    /// Weight applied to voice 1.
    #[must_use]
    pub const fn weight1(self) -> f32 {
        self.0
    }

    /// Weight applied to voice 2. The two weights always sum to 1.
    #[must_use]
    pub const fn weight2(self) -> f32 {
        1.0 - self.0
    }
}

// ── Voice selection ────────────────────────────────────────────────

/// The validated voice choice of a [`BlendSpec`].
///
/// Encoding this as an enum makes the "voice 2 and ratio exist iff dual
/// mode" invariant unrepresentable to violate.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceSelection {
    Single {
        voice: VoiceId,
    },
    Dual {
        voice1: VoiceId,
        voice2: VoiceId,
        ratio: BlendRatio,
    },
}

impl VoiceSelection {
    #[must_use]
    pub const fn mode(&self) -> VoiceMode {
        match self {
            Self::Single { .. } => VoiceMode::Single,
            Self::Dual { .. } => VoiceMode::Dual,
        }
    }
}

// ── Raw inputs ─────────────────────────────────────────────────────

/// Unvalidated user input, as collected by the presentation layer.
#[derive(Debug, Clone)]
pub struct RawInputs {
    /// Path of the text file to narrate.
    pub text_path: PathBuf,

    /// Requested voice mode.
    pub mode: VoiceMode,

    /// First voice, if one has been picked.
    pub voice1: Option<VoiceId>,

    /// Second voice, if one has been picked.
    pub voice2: Option<VoiceId>,

    /// Requested blend ratio (ignored in single mode).
    pub ratio: f32,

    /// Bare output filename, with or without the audio extension.
    pub output_name: String,
}

// ── Blend spec ─────────────────────────────────────────────────────

/// One fully-resolved, immutable generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendSpec {
    /// Resolved text to synthesize (non-empty).
    pub source_text: String,

    /// Validated voice selection.
    pub selection: VoiceSelection,

    /// Resolved output path inside the configured output directory.
    pub output_path: PathBuf,
}

impl BlendSpec {
    #[must_use]
    pub const fn mode(&self) -> VoiceMode {
        self.selection.mode()
    }
}

/// Build a [`BlendSpec`] from raw inputs.
///
/// Validation order is text source, voice selection, ratio (dual mode
/// only), output filename; the first failure wins. Calling this twice with
/// identical inputs and an unchanged voice catalog yields equal specs.
pub fn build_spec(
    raw: &RawInputs,
    available: &HashSet<VoiceId>,
    output_dir: &Path,
) -> Result<BlendSpec, BlendError> {
    let source_text = validate::validate_text_source(&raw.text_path)?;

    let voice1 = raw
        .voice1
        .clone()
        .ok_or_else(|| BlendError::UnknownVoice("(no voice selected)".to_string()))?;
    validate::validate_voice_selection(raw.mode, &voice1, raw.voice2.as_ref(), available)?;

    let ratio = validate::validate_ratio(raw.mode, raw.ratio)?;
    let output_path = validate::validate_output_filename(&raw.output_name, output_dir)?;

    let selection = match raw.mode {
        VoiceMode::Single => VoiceSelection::Single { voice: voice1 },
        VoiceMode::Dual => {
            // Both are guaranteed Some by the validations above; stay total anyway.
            let voice2 = raw.voice2.clone().ok_or(BlendError::MissingVoice2)?;
            let ratio = ratio.ok_or(BlendError::RatioOutOfRange(raw.ratio))?;
            VoiceSelection::Dual {
                voice1,
                voice2,
                ratio,
            }
        }
    };

    Ok(BlendSpec {
        source_text,
        selection,
        output_path,
    })
}
