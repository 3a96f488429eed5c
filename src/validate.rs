//! Pure validation rules for raw user input.
//!
//! Each rule is total: malformed input comes back as a typed
//! [`BlendError`], never a panic. The rules are composed in order by
//! [`crate::spec::build_spec`], which is the only way a
//! [`BlendSpec`](crate::spec::BlendSpec) comes into existence.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::VoiceId;
use crate::config::AUDIO_EXTENSION;
use crate::error::BlendError;
use crate::spec::{BlendRatio, VoiceMode};

/// Characters rejected in a bare output filename.
///
/// Path separators and NUL would escape the output directory; the rest are
/// reserved on common filesystems.
const INVALID_FILENAME_CHARS: [char; 10] = ['/', '\\', '\0', ':', '*', '?', '"', '<', '>', '|'];

/// Validate a text source file and return its contents.
///
/// The path must exist, be a regular file, be readable, and decode to
/// non-empty UTF-8 text.
pub fn validate_text_source(path: &Path) -> Result<String, BlendError> {
    if !path.exists() {
        return Err(BlendError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(BlendError::NotReadable(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|_| BlendError::NotReadable(path.to_path_buf()))?;
    let text =
        String::from_utf8(bytes).map_err(|_| BlendError::NotReadable(path.to_path_buf()))?;
    if text.trim().is_empty() {
        return Err(BlendError::EmptyInput);
    }
    Ok(text)
}

/// Validate the voice selection against the backend's loaded voice set.
///
/// `voice1` is always required; `voice2` is required iff `mode` is
/// [`VoiceMode::Dual`]. Selecting the same voice twice is permitted (a
/// degenerate but valid blend).
pub fn validate_voice_selection(
    mode: VoiceMode,
    voice1: &VoiceId,
    voice2: Option<&VoiceId>,
    available: &HashSet<VoiceId>,
) -> Result<(), BlendError> {
    if !available.contains(voice1) {
        return Err(BlendError::UnknownVoice(voice1.as_str().to_string()));
    }
    if mode == VoiceMode::Dual {
        let voice2 = voice2.ok_or(BlendError::MissingVoice2)?;
        if !available.contains(voice2) {
            return Err(BlendError::UnknownVoice(voice2.as_str().to_string()));
        }
    }
    Ok(())
}

/// Validate the blend ratio for the given mode.
///
/// Returns `Ok(None)` in single-voice mode, where the ratio is ignored
/// (implicitly 1.0).
pub fn validate_ratio(mode: VoiceMode, ratio: f32) -> Result<Option<BlendRatio>, BlendError> {
    match mode {
        VoiceMode::Single => Ok(None),
        VoiceMode::Dual => BlendRatio::new(ratio).map(Some),
    }
}

/// Validate a bare output filename and resolve it against `output_dir`.
///
/// Rejects empty names and names containing path separators, NUL, or
/// reserved characters; never silently sanitizes. Appends the canonical
/// audio extension if absent (a trailing `.wav` is not doubled). Creates
/// `output_dir` if it does not exist.
pub fn validate_output_filename(name: &str, output_dir: &Path) -> Result<PathBuf, BlendError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BlendError::EmptyName);
    }
    if name.contains(INVALID_FILENAME_CHARS) {
        return Err(BlendError::InvalidCharacters(name.to_string()));
    }
    let base = name.strip_suffix(&format!(".{AUDIO_EXTENSION}")).unwrap_or(name);
    if base.is_empty() {
        return Err(BlendError::EmptyName);
    }
    fs::create_dir_all(output_dir).map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;
    Ok(output_dir.join(format!("{base}.{AUDIO_EXTENSION}")))
}

/// Suggest an output filename from the input file stem and current selection.
///
/// Dual mode with both voices picked yields `{stem}_{voice1}_{voice2}_{pct}`
/// where `pct` is voice 1's percentage; single mode yields `{stem}_{voice}`.
/// Falls back to the bare stem while no voice is selected.
#[must_use]
pub fn suggest_output_filename(
    stem: &str,
    mode: VoiceMode,
    voice1: Option<&VoiceId>,
    voice2: Option<&VoiceId>,
    ratio: f32,
) -> String {
    match (mode, voice1, voice2) {
        (VoiceMode::Dual, Some(v1), Some(v2)) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pct = (ratio.clamp(0.0, 1.0) * 100.0).round() as u32;
            format!("{stem}_{v1}_{v2}_{pct}")
        }
        (_, Some(v1), _) => format!("{stem}_{v1}"),
        _ => stem.to_string(),
    }
}

/// Whether a generation at `path` would overwrite an existing file.
///
/// Overwriting is allowed by default; a presentation layer that wants an
/// explicit confirmation calls this before `start_generation`.
#[must_use]
pub fn would_overwrite(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(ids: &[&str]) -> HashSet<VoiceId> {
        ids.iter().map(|id| VoiceId::from(*id)).collect()
    }

    #[test]
    fn text_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_text_source(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, BlendError::FileNotFound(_)));
    }

    #[test]
    fn text_source_directory_is_not_readable() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_text_source(dir.path()).unwrap_err();
        assert!(matches!(err, BlendError::NotReadable(_)));
    }

    #[test]
    fn text_source_rejects_whitespace_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "  \n\t ").unwrap();
        let err = validate_text_source(&path).unwrap_err();
        assert!(matches!(err, BlendError::EmptyInput));
    }

    #[test]
    fn text_source_rejects_non_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let err = validate_text_source(&path).unwrap_err();
        assert!(matches!(err, BlendError::NotReadable(_)));
    }

    #[test]
    fn text_source_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "Hello world").unwrap();
        assert_eq!(validate_text_source(&path).unwrap(), "Hello world");
    }

    #[test]
    fn voice_selection_unknown_voice1() {
        let available = catalog(&["am_adam"]);
        let err = validate_voice_selection(
            VoiceMode::Single,
            &VoiceId::from("af_ghost"),
            None,
            &available,
        )
        .unwrap_err();
        assert!(matches!(err, BlendError::UnknownVoice(v) if v == "af_ghost"));
    }

    #[test]
    fn voice_selection_dual_requires_voice2() {
        let available = catalog(&["am_adam", "af_bella"]);
        let err = validate_voice_selection(
            VoiceMode::Dual,
            &VoiceId::from("am_adam"),
            None,
            &available,
        )
        .unwrap_err();
        assert!(matches!(err, BlendError::MissingVoice2));
    }

    #[test]
    fn voice_selection_same_voice_twice_is_valid() {
        let available = catalog(&["am_adam"]);
        let v = VoiceId::from("am_adam");
        assert!(validate_voice_selection(VoiceMode::Dual, &v, Some(&v), &available).is_ok());
    }

    #[test]
    fn ratio_ignored_in_single_mode() {
        assert!(validate_ratio(VoiceMode::Single, 7.0).unwrap().is_none());
    }

    #[test]
    fn ratio_bounds_enforced_in_dual_mode() {
        assert!(validate_ratio(VoiceMode::Dual, 0.0).unwrap().is_some());
        assert!(validate_ratio(VoiceMode::Dual, 1.0).unwrap().is_some());
        let err = validate_ratio(VoiceMode::Dual, 1.5).unwrap_err();
        assert!(matches!(err, BlendError::RatioOutOfRange(_)));
    }

    #[test]
    fn filename_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = validate_output_filename("episode1", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("episode1.wav"));
    }

    #[test]
    fn filename_extension_round_trips_without_doubling() {
        let dir = tempfile::tempdir().unwrap();
        let bare = validate_output_filename("episode1", dir.path()).unwrap();
        let with_ext = validate_output_filename("episode1.wav", dir.path()).unwrap();
        assert_eq!(bare, with_ext);
    }

    #[test]
    fn filename_rejects_invalid_characters() {
        let dir = tempfile::tempdir().unwrap();
        for bad in ["a/b", "a\\b", "a\0b", "a:b", "what?"] {
            let err = validate_output_filename(bad, dir.path()).unwrap_err();
            assert!(
                matches!(err, BlendError::InvalidCharacters(_)),
                "expected InvalidCharacters for {bad:?}"
            );
        }
    }

    #[test]
    fn filename_rejects_empty_and_bare_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_output_filename("", dir.path()).unwrap_err(),
            BlendError::EmptyName
        ));
        assert!(matches!(
            validate_output_filename("  ", dir.path()).unwrap_err(),
            BlendError::EmptyName
        ));
        assert!(matches!(
            validate_output_filename(".wav", dir.path()).unwrap_err(),
            BlendError::EmptyName
        ));
    }

    #[test]
    fn filename_creates_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("data");
        assert!(!out.exists());
        validate_output_filename("mix", &out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn overwrite_check_reports_existing_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episode1.wav");
        assert!(!would_overwrite(&path));
        std::fs::write(&path, b"riff").unwrap();
        assert!(would_overwrite(&path));
    }

    #[test]
    fn suggested_filename_includes_voices_and_percentage() {
        let v1 = VoiceId::from("am_adam");
        let v2 = VoiceId::from("af_bella");
        let name =
            suggest_output_filename("intro", VoiceMode::Dual, Some(&v1), Some(&v2), 0.7);
        assert_eq!(name, "intro_am_adam_af_bella_70");

        let single = suggest_output_filename("intro", VoiceMode::Single, Some(&v1), None, 0.7);
        assert_eq!(single, "intro_am_adam");

        let bare = suggest_output_filename("intro", VoiceMode::Dual, None, None, 0.5);
        assert_eq!(bare, "intro");
    }
}
