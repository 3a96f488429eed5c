//! Session: the single-writer state object a presentation layer binds to.
//!
//! [`BlendSession`] owns the process-wide [`SessionState`], the
//! [`GenerationCoordinator`], and the backend handle. It accepts the
//! imperative calls (`load_text`, `set_selection`, `set_output_filename`,
//! `start_generation`, `acknowledge`) and emits [`SessionEvent`]s over an
//! unbounded channel for the UI to consume.
//!
//! # Ordering discipline
//!
//! Every mutation takes `&mut self`, so all state transitions happen in call
//! order on the interaction context. The background worker never touches the
//! session; it posts a [`GenerationOutcome`] that the interaction context
//! applies via [`BlendSession::await_completion`] (yielding, never blocking)
//! or [`BlendSession::try_poll_completion`] (for a redraw loop).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::backend::{SynthesisBackend, VoiceId};
use crate::config::BlendConfig;
use crate::coordinator::{GenerationCoordinator, GenerationOutcome, GenerationResult};
use crate::error::{BlendError, ErrorKind};
use crate::spec::{self, RawInputs, VoiceMode};
use crate::validate;

// ── Session phase ──────────────────────────────────────────────────

/// Lifecycle state of the session, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    /// Accepting input; generation may be started.
    #[default]
    Idle,

    /// `start_generation` is validating the current inputs.
    Validating,

    /// A generation is in flight; input mutations are refused.
    Generating,

    /// The last generation produced a file; awaiting acknowledgment.
    Succeeded,

    /// The last generation failed; awaiting acknowledgment.
    Failed,
}

// ── Events ─────────────────────────────────────────────────────────

/// Notifications emitted by the session for the presentation layer.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session phase changed.
    PhaseChanged(SessionPhase),

    /// A text file was loaded and validated.
    TextLoaded {
        /// Source path.
        path: PathBuf,
        /// Number of characters loaded.
        chars: usize,
    },

    /// A generation finished successfully.
    Completed(GenerationResult),

    /// An operation or generation failed.
    Failed {
        /// Flat error category.
        kind: ErrorKind,
        /// Human-readable message.
        message: String,
    },
}

// ── State ──────────────────────────────────────────────────────────

/// The user's current (possibly partial) voice selection.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Requested voice mode.
    pub mode: VoiceMode,

    /// First voice, if picked.
    pub voice1: Option<VoiceId>,

    /// Second voice, if picked.
    pub voice2: Option<VoiceId>,

    /// Blend ratio (weight of voice 1).
    pub ratio: f32,
}

/// Process-wide single-session state.
///
/// Initialized empty at start, mutated only through validated transitions
/// on the interaction context, and torn down with the process; nothing is
/// persisted.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Contents of the loaded text file.
    pub loaded_text: Option<String>,

    /// Path the text was loaded from.
    pub text_path: Option<PathBuf>,

    /// Current widget selections.
    pub selection: Selection,

    /// Bare output filename (without extension).
    pub output_name: String,

    /// Current phase.
    pub phase: SessionPhase,

    /// Category of the most recent error, if any.
    pub last_error: Option<ErrorKind>,

    /// Result of the most recent successful generation, cleared on
    /// acknowledgment.
    pub last_result: Option<GenerationResult>,
}

// ── Session ────────────────────────────────────────────────────────

/// Owns the session state and the generation lifecycle.
pub struct BlendSession {
    state: SessionState,
    coordinator: GenerationCoordinator,
    outcome_rx: mpsc::UnboundedReceiver<GenerationOutcome>,
    backend: Arc<dyn SynthesisBackend>,
    available: HashSet<VoiceId>,
    config: BlendConfig,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl BlendSession {
    /// Create a session over a backend.
    ///
    /// The backend's voice catalog is captured once here; it is read-only
    /// for the life of the session. Returns the session and the receiver
    /// for [`SessionEvent`]s.
    #[must_use]
    pub fn new(
        config: BlendConfig,
        backend: Arc<dyn SynthesisBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (coordinator, outcome_rx) = GenerationCoordinator::new();
        let available: HashSet<VoiceId> = backend.list_voices().into_iter().collect();

        tracing::info!(voices = available.len(), "Session initialized");

        let session = Self {
            state: SessionState {
                loaded_text: None,
                text_path: None,
                selection: Selection {
                    mode: VoiceMode::default(),
                    voice1: None,
                    voice2: None,
                    ratio: config.default_ratio,
                },
                output_name: "output".to_string(),
                phase: SessionPhase::Idle,
                last_error: None,
                last_result: None,
            },
            coordinator,
            outcome_rx,
            backend,
            available,
            config,
            event_tx,
        };
        (session, event_rx)
    }

    /// Read-only view of the session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current session phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    /// The read-only voice catalog captured at construction.
    #[must_use]
    pub const fn available_voices(&self) -> &HashSet<VoiceId> {
        &self.available
    }

    // ── Imperative calls ───────────────────────────────────────────

    /// Load and validate a text file.
    ///
    /// On success the text is cached, a [`SessionEvent::TextLoaded`] is
    /// emitted, and the output filename suggestion is refreshed from the
    /// input stem and current selection.
    pub fn load_text(&mut self, path: &Path) -> Result<(), BlendError> {
        self.ensure_not_generating()?;

        let text = match validate::validate_text_source(path) {
            Ok(text) => text,
            Err(e) => return Err(self.record(e)),
        };

        let chars = text.chars().count();
        tracing::info!(path = %path.display(), chars, "Text file loaded");

        self.state.loaded_text = Some(text);
        self.state.text_path = Some(path.to_path_buf());
        self.state.last_error = None;
        self.emit(SessionEvent::TextLoaded {
            path: path.to_path_buf(),
            chars,
        });
        self.refresh_output_suggestion();
        Ok(())
    }

    /// Update the voice selection.
    ///
    /// Picked voices must belong to the catalog and, in dual mode, the
    /// ratio must be in range; unpicked voices stay `None` until the final
    /// validation at `start_generation`.
    pub fn set_selection(
        &mut self,
        mode: VoiceMode,
        voice1: Option<VoiceId>,
        voice2: Option<VoiceId>,
        ratio: f32,
    ) -> Result<(), BlendError> {
        self.ensure_not_generating()?;

        for voice in [&voice1, &voice2].into_iter().flatten() {
            if !self.available.contains(voice) {
                return Err(self.record(BlendError::UnknownVoice(voice.as_str().to_string())));
            }
        }
        if mode == VoiceMode::Dual {
            if let Err(e) = spec::BlendRatio::new(ratio) {
                return Err(self.record(e));
            }
        }

        tracing::debug!(?mode, voice1 = ?voice1, voice2 = ?voice2, ratio, "Selection changed");
        self.state.selection = Selection {
            mode,
            voice1,
            voice2,
            ratio,
        };
        self.state.last_error = None;
        self.refresh_output_suggestion();
        Ok(())
    }

    /// Set the bare output filename.
    ///
    /// The name is validated (and the output directory created) up front so
    /// the user learns about bad names before pressing generate; the stored
    /// value is the bare stem without the audio extension.
    pub fn set_output_filename(&mut self, name: &str) -> Result<(), BlendError> {
        self.ensure_not_generating()?;

        let resolved = match validate::validate_output_filename(name, &self.config.output_dir) {
            Ok(path) => path,
            Err(e) => return Err(self.record(e)),
        };

        // Store the validated stem; the full path is rebuilt at build_spec time.
        let stem = resolved
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output")
            .to_string();
        tracing::debug!(name = %stem, "Output filename changed");
        self.state.output_name = stem;
        self.state.last_error = None;
        Ok(())
    }

    /// Validate the current inputs and start a generation.
    ///
    /// Validation failures leave the phase `Idle` (no generation starts);
    /// a concurrent in-flight generation is refused with `AlreadyRunning`
    /// and left unaffected. On success the phase moves to `Generating` and
    /// the generation id is returned.
    pub fn start_generation(&mut self) -> Result<u64, BlendError> {
        use crate::coordinator::GenerationPhase;

        if self.coordinator.phase() != GenerationPhase::Idle {
            return Err(self.record(BlendError::AlreadyRunning));
        }

        self.set_phase(SessionPhase::Validating);

        let built = self.build_current_spec();
        let spec = match built {
            Ok(spec) => spec,
            Err(e) => {
                // Validation failed: no generation starts, phase returns to Idle.
                self.set_phase(SessionPhase::Idle);
                return Err(self.record(e));
            }
        };

        match self.coordinator.start(spec, Arc::clone(&self.backend)) {
            Ok(id) => {
                self.set_phase(SessionPhase::Generating);
                Ok(id)
            }
            Err(e) => {
                self.set_phase(SessionPhase::Idle);
                Err(self.record(e))
            }
        }
    }

    /// Acknowledge a finished generation, returning the session to `Idle`.
    ///
    /// Clears `last_result`; prior selections stay intact. A no-op unless
    /// the phase is `Succeeded` or `Failed`.
    pub fn acknowledge(&mut self) {
        if matches!(self.state.phase, SessionPhase::Succeeded | SessionPhase::Failed) {
            self.coordinator.acknowledge();
            self.state.last_result = None;
            self.set_phase(SessionPhase::Idle);
        }
    }

    // ── Completion observation ─────────────────────────────────────

    /// Wait for the in-flight generation to finish and apply its outcome.
    ///
    /// Yields until the worker posts its message; the interaction context
    /// is suspended, not blocked. Returns the new phase, or `None` if the
    /// outcome channel closed or the message was stale.
    pub async fn await_completion(&mut self) -> Option<SessionPhase> {
        let outcome = self.outcome_rx.recv().await?;
        self.apply_outcome(outcome)
    }

    /// Apply a completion outcome if one is ready, without waiting.
    ///
    /// Suitable for a presentation layer that polls from a redraw loop.
    pub fn try_poll_completion(&mut self) -> Option<SessionPhase> {
        let outcome = self.outcome_rx.try_recv().ok()?;
        self.apply_outcome(outcome)
    }

    // ── Internal helpers ───────────────────────────────────────────

    fn apply_outcome(&mut self, outcome: GenerationOutcome) -> Option<SessionPhase> {
        match self.coordinator.complete(outcome)? {
            Ok(result) => {
                self.state.last_result = Some(result.clone());
                self.state.last_error = None;
                self.emit(SessionEvent::Completed(result));
                self.set_phase(SessionPhase::Succeeded);
            }
            Err(e) => {
                self.state.last_error = Some(e.kind());
                self.emit(SessionEvent::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                self.set_phase(SessionPhase::Failed);
            }
        }
        Some(self.state.phase)
    }

    fn build_current_spec(&self) -> Result<crate::spec::BlendSpec, BlendError> {
        let text_path = self
            .state
            .text_path
            .clone()
            .ok_or(BlendError::EmptyInput)?;
        let raw = RawInputs {
            text_path,
            mode: self.state.selection.mode,
            voice1: self.state.selection.voice1.clone(),
            voice2: self.state.selection.voice2.clone(),
            ratio: self.state.selection.ratio,
            output_name: self.state.output_name.clone(),
        };
        spec::build_spec(&raw, &self.available, &self.config.output_dir)
    }

    /// Recompute the smart output filename from the input stem and the
    /// current selection, as the original app does on every input event.
    fn refresh_output_suggestion(&mut self) {
        let Some(stem) = self
            .state
            .text_path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
        else {
            return;
        };
        self.state.output_name = validate::suggest_output_filename(
            stem,
            self.state.selection.mode,
            self.state.selection.voice1.as_ref(),
            self.state.selection.voice2.as_ref(),
            self.state.selection.ratio,
        );
    }

    fn ensure_not_generating(&mut self) -> Result<(), BlendError> {
        if matches!(
            self.state.phase,
            SessionPhase::Generating | SessionPhase::Validating
        ) {
            return Err(self.record(BlendError::AlreadyRunning));
        }
        Ok(())
    }

    /// Record an error in session state, emit it, and hand it back.
    fn record(&mut self, e: BlendError) -> BlendError {
        self.state.last_error = Some(e.kind());
        self.emit(SessionEvent::Failed {
            kind: e.kind(),
            message: e.to_string(),
        });
        e
    }

    /// Transition phase and emit a change event.
    fn set_phase(&mut self, phase: SessionPhase) {
        if self.state.phase != phase {
            tracing::debug!(old = ?self.state.phase, new = ?phase, "Session phase transition");
            self.state.phase = phase;
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    /// Emit a session event (best-effort; a dropped receiver is logged).
    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("Session event receiver dropped");
        }
    }
}
