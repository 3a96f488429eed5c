//! Voice mixing: weighted interpolation of voice embeddings.
//!
//! The mixer owns the blend arithmetic and nothing else: embedding lookup
//! and waveform rendering are delegated to the [`SynthesisBackend`]. Its
//! contract is that the two weights sum to 1 and that the boundary ratios
//! collapse exactly: ratio 1.0 reduces to pure voice 1, ratio 0.0 to pure
//! voice 2.

use crate::backend::{SynthesisBackend, TtsAudio, VoiceEmbedding};
use crate::error::BlendError;
use crate::spec::{BlendRatio, BlendSpec, VoiceSelection};

/// Synthesize a spec against a backend.
///
/// Single mode delegates straight to the backend; dual mode fetches both
/// voice representations, interpolates them, and renders the mixed style.
/// Any backend error is wrapped into [`BlendError::SynthesisFailed`] here,
/// so no engine-specific error type crosses this boundary.
pub async fn synthesize(
    spec: &BlendSpec,
    backend: &dyn SynthesisBackend,
) -> Result<TtsAudio, BlendError> {
    match &spec.selection {
        VoiceSelection::Single { voice } => {
            tracing::debug!(voice = %voice, text_len = spec.source_text.len(), "Synthesizing single voice");
            backend
                .synthesize(&spec.source_text, voice, 1.0)
                .await
                .map_err(into_synthesis_error)
        }
        VoiceSelection::Dual {
            voice1,
            voice2,
            ratio,
        } => {
            tracing::debug!(
                voice1 = %voice1,
                voice2 = %voice2,
                weight1 = ratio.weight1(),
                text_len = spec.source_text.len(),
                "Synthesizing blended voices"
            );
            let style1 = backend
                .voice_representation(voice1)
                .await
                .map_err(into_synthesis_error)?;
            let style2 = backend
                .voice_representation(voice2)
                .await
                .map_err(into_synthesis_error)?;
            let mixed = blend_embeddings(&style1, &style2, *ratio)?;
            backend
                .render(&mixed, &spec.source_text)
                .await
                .map_err(into_synthesis_error)
        }
    }
}

/// Interpolate two voice embeddings: `ratio * a + (1 - ratio) * b`.
///
/// A length mismatch means the backend broke its contract; it surfaces as
/// [`BlendError::SynthesisFailed`] rather than a panic.
pub fn blend_embeddings(
    a: &VoiceEmbedding,
    b: &VoiceEmbedding,
    ratio: BlendRatio,
) -> Result<VoiceEmbedding, BlendError> {
    if a.len() != b.len() {
        return Err(BlendError::SynthesisFailed(format!(
            "voice representation length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let w1 = ratio.weight1();
    let w2 = ratio.weight2();
    let values = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| x * w1 + y * w2)
        .collect();
    Ok(VoiceEmbedding::new(values))
}

fn into_synthesis_error(e: anyhow::Error) -> BlendError {
    BlendError::SynthesisFailed(format!("{e:#}"))
}
