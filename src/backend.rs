//! Synthesis backend trait: engine-agnostic interface for voice synthesis.
//!
//! The [`SynthesisBackend`] trait abstracts over concrete speech engines
//! (Kokoro ONNX, sherpa-onnx, a test double). The blend pipeline operates on
//! trait objects (`Arc<dyn SynthesisBackend>`) so that engines can be swapped
//! without touching the mixing or coordination logic.
//!
//! Backend failures surface as opaque [`anyhow::Error`]s; the mixer wraps
//! them into [`BlendError::SynthesisFailed`](crate::error::BlendError) before
//! they cross back into the core. No engine-specific error type escapes this
//! boundary.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Kokoro TTS sample rate (24 kHz).
pub const KOKORO_SAMPLE_RATE: u32 = 24_000;

// ── Shared types ───────────────────────────────────────────────────

/// Opaque identifier for a voice in the backend's catalog.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VoiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A voice's style representation, the backend's numeric encoding of its
/// acoustic identity.
///
/// The core treats the contents as opaque; its only operation is the weighted
/// linear interpolation performed by [`crate::mixer`].
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceEmbedding(Vec<f32>);

impl VoiceEmbedding {
    #[must_use]
    pub const fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Audio produced by synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct TtsAudio {
    /// PCM f32 samples, mono.
    pub samples: Vec<f32>,

    /// Sample rate of the audio (e.g., 24 000 Hz for Kokoro).
    pub sample_rate: u32,

    /// Duration of the audio.
    pub duration: Duration,
}

impl TtsAudio {
    /// Build from samples, deriving the duration from the sample count.
    #[must_use]
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(samples.len() as f64 / f64::from(sample_rate))
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }
}

/// Information about an available voice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice identifier (used in API calls).
    pub id: VoiceId,

    /// Human-readable display name.
    pub name: String,

    /// Language/accent category.
    pub category: String,

    /// Gender.
    pub gender: VoiceGender,
}

/// Voice gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

// ── Synthesis backend trait ────────────────────────────────────────

/// Backend-agnostic voice synthesis engine.
///
/// Implementations must be `Send + Sync` so the coordinator can move them
/// into a background task behind an `Arc`.
///
/// The async methods (via [`async_trait`]) accommodate engines that perform
/// inference asynchronously; a purely synchronous engine simply returns
/// ready values.
#[async_trait::async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// List the identifiers of all loaded voices.
    ///
    /// The catalog is read-only after load and may be queried from any
    /// context.
    fn list_voices(&self) -> Vec<VoiceId>;

    /// Fetch the style representation for a single voice.
    async fn voice_representation(&self, voice: &VoiceId) -> anyhow::Result<VoiceEmbedding>;

    /// Render text to audio using the given style representation.
    async fn render(&self, style: &VoiceEmbedding, text: &str) -> anyhow::Result<TtsAudio>;

    /// Synthesize text with a single voice.
    ///
    /// `weight` is the voice's mixing weight; it is always `1.0` when only
    /// one voice is involved, so the default implementation ignores it and
    /// renders the voice's own representation. Because this is defined as
    /// `render(voice_representation(voice))`, single-voice synthesis is
    /// byte-identical to a degenerate blend at ratio 1.0.
    async fn synthesize(
        &self,
        text: &str,
        voice: &VoiceId,
        _weight: f32,
    ) -> anyhow::Result<TtsAudio> {
        let style = self.voice_representation(voice).await?;
        self.render(&style, text).await
    }
}

// ── Voice catalog ──────────────────────────────────────────────────

/// List all Kokoro v1.0 voices with metadata.
///
/// This is a free function so a presentation layer can populate voice
/// dropdowns before any model is loaded; a live backend's
/// [`SynthesisBackend::list_voices`] remains authoritative for validation.
#[must_use]
pub fn kokoro_voices() -> Vec<VoiceInfo> {
    vec![
        // American English, female
        voice_info("af_alloy", "Alloy", "American English", VoiceGender::Female),
        voice_info("af_aoede", "Aoede", "American English", VoiceGender::Female),
        voice_info("af_bella", "Bella", "American English", VoiceGender::Female),
        voice_info("af_heart", "Heart", "American English", VoiceGender::Female),
        voice_info(
            "af_jessica",
            "Jessica",
            "American English",
            VoiceGender::Female,
        ),
        voice_info(
            "af_nicole",
            "Nicole",
            "American English",
            VoiceGender::Female,
        ),
        voice_info("af_nova", "Nova", "American English", VoiceGender::Female),
        voice_info("af_river", "River", "American English", VoiceGender::Female),
        voice_info("af_sarah", "Sarah", "American English", VoiceGender::Female),
        voice_info("af_sky", "Sky", "American English", VoiceGender::Female),
        // American English, male
        voice_info("am_adam", "Adam", "American English", VoiceGender::Male),
        voice_info("am_echo", "Echo", "American English", VoiceGender::Male),
        voice_info("am_eric", "Eric", "American English", VoiceGender::Male),
        voice_info("am_fable", "Fable", "American English", VoiceGender::Male),
        voice_info("am_liam", "Liam", "American English", VoiceGender::Male),
        voice_info(
            "am_michael",
            "Michael",
            "American English",
            VoiceGender::Male,
        ),
        voice_info("am_onyx", "Onyx", "American English", VoiceGender::Male),
        voice_info("am_puck", "Puck", "American English", VoiceGender::Male),
        // British English, female
        voice_info("bf_alice", "Alice", "British English", VoiceGender::Female),
        voice_info("bf_emma", "Emma", "British English", VoiceGender::Female),
        voice_info(
            "bf_isabella",
            "Isabella",
            "British English",
            VoiceGender::Female,
        ),
        voice_info("bf_lily", "Lily", "British English", VoiceGender::Female),
        // British English, male
        voice_info("bm_daniel", "Daniel", "British English", VoiceGender::Male),
        voice_info("bm_george", "George", "British English", VoiceGender::Male),
        voice_info("bm_lewis", "Lewis", "British English", VoiceGender::Male),
    ]
}

/// Convenience constructor for [`VoiceInfo`].
fn voice_info(id: &str, name: &str, category: &str, gender: VoiceGender) -> VoiceInfo {
    VoiceInfo {
        id: VoiceId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        gender,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_contains_blendable_pair() {
        let voices = kokoro_voices();
        let ids: Vec<&str> = voices.iter().map(|v| v.id.as_str()).collect();
        assert!(ids.contains(&"am_adam"));
        assert!(ids.contains(&"af_bella"));
    }

    #[test]
    fn audio_duration_derived_from_sample_count() {
        let audio = TtsAudio::from_samples(vec![0.0; 24_000], KOKORO_SAMPLE_RATE);
        assert_eq!(audio.duration, Duration::from_secs(1));
    }

    #[test]
    fn zero_sample_rate_yields_zero_duration() {
        let audio = TtsAudio::from_samples(vec![0.0; 100], 0);
        assert_eq!(audio.duration, Duration::ZERO);
    }
}
