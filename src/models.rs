//! Model file catalog and downloader for the Kokoro v1.0 backend.
//!
//! A concrete Kokoro backend needs two files: the ONNX model and the packed
//! voice styles. Both ship as release assets of the
//! [`kokoro-onnx`](https://github.com/thewh1teagle/kokoro-onnx) project and
//! are fetched here on first use.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::BlendError;

const KOKORO_RELEASE_BASE: &str =
    "https://github.com/thewh1teagle/kokoro-onnx/releases/download/model-files-v1.0";

/// Filename of the Kokoro ONNX model.
pub const KOKORO_MODEL_FILENAME: &str = "kokoro-v1.0.onnx";

/// Filename of the packed voice styles.
pub const KOKORO_VOICES_FILENAME: &str = "voices-v1.0.bin";

/// One downloadable model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelFileInfo {
    /// Filename on disk.
    pub filename: String,

    /// Direct download URL.
    pub url: String,

    /// Approximate download size in bytes.
    pub size_bytes: u64,

    /// Approximate size as human-readable string.
    pub size_display: String,
}

/// The model files required by the Kokoro backend.
#[must_use]
pub fn model_files() -> Vec<ModelFileInfo> {
    vec![
        ModelFileInfo {
            filename: KOKORO_MODEL_FILENAME.to_string(),
            url: format!("{KOKORO_RELEASE_BASE}/{KOKORO_MODEL_FILENAME}"),
            size_bytes: 326_000_000,
            size_display: "~311 MB".to_string(),
        },
        ModelFileInfo {
            filename: KOKORO_VOICES_FILENAME.to_string(),
            url: format!("{KOKORO_RELEASE_BASE}/{KOKORO_VOICES_FILENAME}"),
            size_bytes: 27_900_000,
            size_display: "~27 MB".to_string(),
        },
    ]
}

/// Path of the ONNX model inside `voices_dir`.
#[must_use]
pub fn model_path(voices_dir: &Path) -> PathBuf {
    voices_dir.join(KOKORO_MODEL_FILENAME)
}

/// Path of the voice styles file inside `voices_dir`.
#[must_use]
pub fn voices_path(voices_dir: &Path) -> PathBuf {
    voices_dir.join(KOKORO_VOICES_FILENAME)
}

/// Whether both model files are already on disk.
#[must_use]
pub fn is_downloaded(voices_dir: &Path) -> bool {
    model_path(voices_dir).exists() && voices_path(voices_dir).exists()
}

/// Download a single model file to `dest`.
///
/// Creates parent directories as needed. The body is streamed to disk chunk
/// by chunk rather than buffered (the ONNX model alone is ~311 MB), and the
/// callback receives `(bytes_downloaded, total_bytes)` after every chunk so
/// a progress bar advances while the transfer is in flight.
pub async fn download_model_file(
    url: &str,
    dest: &Path,
    on_progress: impl Fn(u64, u64),
) -> Result<(), BlendError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;
    }

    tracing::info!(url, dest = %dest.display(), "Downloading model file");

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| BlendError::DownloadFailed {
            name: url.to_string(),
            source: e.into(),
        })?;

    if !response.status().is_success() {
        return Err(BlendError::DownloadFailed {
            name: url.to_string(),
            source: anyhow::anyhow!("HTTP {}", response.status()),
        });
    }

    let total_size = response.content_length().unwrap_or(0);

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BlendError::DownloadFailed {
            name: url.to_string(),
            source: e.into(),
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;
        downloaded += chunk.len() as u64;
        // A missing or lying Content-Length never makes progress run backwards.
        on_progress(downloaded, total_size.max(downloaded));
    }

    file.flush()
        .await
        .map_err(|e| BlendError::IoWriteFailed(e.to_string()))?;

    tracing::info!(
        size_mb = downloaded / 1_048_576,
        dest = %dest.display(),
        "Model file download complete"
    );

    Ok(())
}

/// Download whichever model files are missing from `voices_dir`.
///
/// Returns `(model_path, voices_path)`.
pub async fn ensure_model_files(
    voices_dir: &Path,
    on_progress: impl Fn(u64, u64) + Clone,
) -> Result<(PathBuf, PathBuf), BlendError> {
    let model = model_path(voices_dir);
    let voices = voices_path(voices_dir);

    for info in model_files() {
        let dest = voices_dir.join(&info.filename);
        if dest.exists() {
            tracing::debug!(path = %dest.display(), "Model file already downloaded");
        } else {
            download_model_file(&info.url, &dest, on_progress.clone()).await?;
        }
    }

    Ok((model, voices))
}
