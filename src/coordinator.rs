//! Generation coordinator: owns the run lifecycle of a synthesis job.
//!
//! The coordinator is a small state machine:
//!
//! ```text
//!   Idle → Running → {Completed, Failed} → Idle (on acknowledge)
//! ```
//!
//! At most one generation is `Running` at a time; `start` refuses further
//! requests instead of queueing. The synthesis itself runs on the Tokio
//! runtime so the interaction context is never blocked, and the worker
//! reports back through a channel carrying the generation id. The worker
//! never mutates coordinator or session state directly; the owning context
//! applies the outcome via [`GenerationCoordinator::complete`].
//!
//! There is no mid-flight cancellation: the backend call is treated as
//! atomic, and the only interruption point is refusing a new `start`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::backend::SynthesisBackend;
use crate::error::BlendError;
use crate::spec::BlendSpec;
use crate::{mixer, wav};

// ── Phase & result types ───────────────────────────────────────────

/// Lifecycle state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// No generation in flight; `start` is permitted.
    Idle,

    /// A worker is synthesizing; `start` returns `AlreadyRunning`.
    Running,

    /// The last generation finished successfully; awaiting acknowledgment.
    Completed,

    /// The last generation failed; awaiting acknowledgment.
    Failed,
}

/// Successful generation output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Where the waveform file was written.
    pub output_path: PathBuf,

    /// Estimated playback duration of the generated audio.
    pub duration_estimate: Duration,

    /// Size of the written file in bytes.
    pub byte_size: u64,
}

/// Completion message posted by the worker, tagged with the generation id.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Id returned by the `start` call that spawned the worker.
    pub id: u64,

    /// The worker's result.
    pub result: Result<GenerationResult, BlendError>,
}

// ── Coordinator ────────────────────────────────────────────────────

/// Owns the run lifecycle and the at-most-one-running invariant.
///
/// All methods take `&mut self`; the coordinator lives on the interaction
/// context and is never shared with the worker.
pub struct GenerationCoordinator {
    phase: GenerationPhase,
    next_id: u64,
    current_id: Option<u64>,
    outcome_tx: mpsc::UnboundedSender<GenerationOutcome>,
}

impl GenerationCoordinator {
    /// Create a coordinator and the receiver for worker outcomes.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GenerationOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            phase: GenerationPhase::Idle,
            next_id: 1,
            current_id: None,
            outcome_tx,
        };
        (coordinator, outcome_rx)
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> GenerationPhase {
        self.phase
    }

    /// Id of the generation currently running or awaiting acknowledgment.
    #[must_use]
    pub const fn current_id(&self) -> Option<u64> {
        self.current_id
    }

    /// Start a generation for `spec`.
    ///
    /// Fails with [`BlendError::AlreadyRunning`] unless the phase is
    /// [`GenerationPhase::Idle`]. There is no queueing; the caller must
    /// wait (or the UI must disable its trigger) while one is outstanding.
    /// On success the phase moves to `Running`, a fresh monotonically
    /// increasing id is captured, and the work is scheduled on the runtime.
    pub fn start(
        &mut self,
        spec: BlendSpec,
        backend: Arc<dyn SynthesisBackend>,
    ) -> Result<u64, BlendError> {
        if self.phase != GenerationPhase::Idle {
            return Err(BlendError::AlreadyRunning);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.current_id = Some(id);
        self.phase = GenerationPhase::Running;

        tracing::info!(id, output = %spec.output_path.display(), "Starting generation");

        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = run_generation(spec, backend).await;
            if tx.send(GenerationOutcome { id, result }).is_err() {
                tracing::warn!(id, "Generation outcome receiver dropped");
            }
        });

        Ok(id)
    }

    /// Apply a worker outcome, transitioning to `Completed` or `Failed`.
    ///
    /// Outcomes whose id does not match the current generation are stale
    /// and discarded (`None`).
    pub fn complete(
        &mut self,
        outcome: GenerationOutcome,
    ) -> Option<Result<GenerationResult, BlendError>> {
        if self.current_id != Some(outcome.id) {
            tracing::warn!(id = outcome.id, "Discarding stale generation outcome");
            return None;
        }

        match &outcome.result {
            Ok(result) => {
                tracing::info!(
                    id = outcome.id,
                    byte_size = result.byte_size,
                    duration_ms = result.duration_estimate.as_millis(),
                    "Generation completed"
                );
                self.phase = GenerationPhase::Completed;
            }
            Err(e) => {
                tracing::warn!(id = outcome.id, error = %e, "Generation failed");
                self.phase = GenerationPhase::Failed;
            }
        }
        Some(outcome.result)
    }

    /// Acknowledge a finished generation, returning to `Idle`.
    ///
    /// A no-op while `Idle` or `Running`.
    pub fn acknowledge(&mut self) {
        if matches!(
            self.phase,
            GenerationPhase::Completed | GenerationPhase::Failed
        ) {
            self.phase = GenerationPhase::Idle;
            self.current_id = None;
        }
    }
}

/// The worker body: synthesize, then write the waveform file.
///
/// File IO runs on the blocking pool; synthesis is awaited wherever the
/// backend chooses to run it. Every error is converted to a [`BlendError`]
/// before it crosses back over the outcome channel.
async fn run_generation(
    spec: BlendSpec,
    backend: Arc<dyn SynthesisBackend>,
) -> Result<GenerationResult, BlendError> {
    let audio = mixer::synthesize(&spec, backend.as_ref()).await?;
    let duration_estimate = audio.duration;

    let output_path = spec.output_path;
    let write_path = output_path.clone();
    let byte_size = tokio::task::spawn_blocking(move || wav::write_wav(&write_path, &audio))
        .await
        .map_err(|e| BlendError::IoWriteFailed(e.to_string()))??;

    Ok(GenerationResult {
        output_path,
        duration_estimate,
        byte_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_creates_idle() {
        let (coordinator, _rx) = GenerationCoordinator::new();
        assert_eq!(coordinator.phase(), GenerationPhase::Idle);
        assert_eq!(coordinator.current_id(), None);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let (mut coordinator, _rx) = GenerationCoordinator::new();
        let applied = coordinator.complete(GenerationOutcome {
            id: 99,
            result: Err(BlendError::EmptyInput),
        });
        assert!(applied.is_none());
        assert_eq!(coordinator.phase(), GenerationPhase::Idle);
    }

    #[test]
    fn acknowledge_is_a_noop_while_idle() {
        let (mut coordinator, _rx) = GenerationCoordinator::new();
        coordinator.acknowledge();
        assert_eq!(coordinator.phase(), GenerationPhase::Idle);
    }
}
