//! WAV output: writes synthesized audio as a playable 16-bit PCM file.

use std::path::Path;

use crate::backend::TtsAudio;
use crate::error::BlendError;

/// Write `audio` to `path` as mono 16-bit PCM WAV, overwriting any existing
/// file. Returns the size of the written file in bytes.
pub fn write_wav(path: &Path, audio: &TtsAudio) -> Result<u64, BlendError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| BlendError::IoWriteFailed(format!("{}: {e}", path.display())))?;

    for sample in &audio.samples {
        #[allow(clippy::cast_possible_truncation)]
        let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(scaled)
            .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;

    let byte_size = std::fs::metadata(path)
        .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?
        .len();

    tracing::debug!(
        path = %path.display(),
        samples = audio.samples.len(),
        byte_size,
        "Wrote waveform file"
    );

    Ok(byte_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_file_reads_back_with_matching_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let audio = TtsAudio::from_samples(vec![0.0, 0.5, -0.5, 1.0, -1.0], 24_000);

        let byte_size = write_wav(&path, &audio).unwrap();
        assert!(byte_size > 44); // larger than a bare RIFF header

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 5);
    }

    #[test]
    fn out_of_range_samples_are_clamped_not_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        let audio = TtsAudio::from_samples(vec![2.0, -2.0], 24_000);
        write_wav(&path, &audio).unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .samples::<i16>()
            .map(Result::unwrap)
            .collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn unwritable_path_is_an_io_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("x.wav");
        let audio = TtsAudio::from_samples(vec![0.0], 24_000);
        let err = write_wav(&path, &audio).unwrap_err();
        assert!(matches!(err, BlendError::IoWriteFailed(_)));
    }
}
