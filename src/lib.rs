//! voiceblend: voice-blend speech generation core.
//!
//! Narrates a text file with one Kokoro voice or a weighted blend of two,
//! writing a playable WAV file. The crate is the *core* behind an
//! interactive front-end: it owns validation, the blend arithmetic, and the
//! run/observe/acknowledge state machine, and stays responsive by running
//! synthesis off the interaction context.
//!
//! ```text
//!   raw UI events → validate → BlendSpec → GenerationCoordinator
//!        → VoiceMixer → SynthesisBackend → WAV file → SessionEvent
//! ```
//!
//! A presentation layer binds to [`BlendSession`]: it issues the imperative
//! calls (`load_text`, `set_selection`, `set_output_filename`,
//! `start_generation`, `acknowledge`) and consumes [`SessionEvent`]s from
//! the returned channel. The synthesis engine is injected behind the
//! [`SynthesisBackend`] trait.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mixer;
pub mod models;
pub mod session;
pub mod spec;
pub mod validate;
pub mod wav;

// Re-export key types for convenience
pub use backend::{SynthesisBackend, TtsAudio, VoiceEmbedding, VoiceId, VoiceInfo};
pub use config::BlendConfig;
pub use coordinator::{GenerationCoordinator, GenerationPhase, GenerationResult};
pub use error::{BlendError, ErrorKind};
pub use session::{BlendSession, SessionEvent, SessionPhase, SessionState};
pub use spec::{BlendRatio, BlendSpec, RawInputs, VoiceMode, VoiceSelection, build_spec};
