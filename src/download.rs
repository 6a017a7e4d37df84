// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

//! Model artifact downloading utilities.
//!
//! Fetches the default pose classifier from the PoseFlow assets release
//! when it is not found locally. Downloads stream to a `.part` temp file
//! and are moved into place atomically, so an interrupted fetch never
//! leaves a corrupt artifact behind.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ClassifyError, Result};

/// Default pose classifier artifact name.
pub const DEFAULT_MODEL: &str = "poseflow-classifier.onnx";

/// URL for downloading the default pose classifier.
const DEFAULT_MODEL_URL: &str =
    "https://github.com/poseflow/assets/releases/download/v0.1.0/poseflow-classifier.onnx";

/// Connection timeout in seconds.
const CONNECT_TIMEOUT: u64 = 30;

/// Read timeout in seconds.
const READ_TIMEOUT: u64 = 300;

/// Download a file from URL to the specified path.
fn download_file(url: &str, dest: &Path) -> Result<()> {
    let config = ureq::Agent::config_builder()
        .timeout_connect(Some(Duration::from_secs(CONNECT_TIMEOUT)))
        .timeout_recv_body(Some(Duration::from_secs(READ_TIMEOUT)))
        .build();
    let agent = ureq::Agent::new_with_config(config);

    eprintln!("Downloading {url} to '{}'...", dest.display());

    let response = agent.get(url).call().map_err(|e| {
        let msg = match &e {
            ureq::Error::Timeout(_) => format!("Connection timed out while downloading {url}"),
            ureq::Error::Io(io_err) => format!("Network error downloading {url}: {io_err}"),
            _ => format!("Failed to download {url}: {e}"),
        };
        ClassifyError::ModelLoadError(msg)
    })?;

    // Stream to a temp file next to the destination so the final rename
    // stays on one filesystem and is atomic.
    let temp_path = dest.with_extension("part");
    let _ = fs::remove_file(&temp_path);

    let temp_file = File::create(&temp_path).map_err(|e| {
        ClassifyError::ModelLoadError(format!(
            "Failed to create temp file {}: {e}",
            temp_path.display()
        ))
    })?;
    let mut writer = BufWriter::new(temp_file);

    let mut reader = response.into_body().into_reader();
    let mut buffer = [0u8; 65536];
    let mut downloaded: u64 = 0;

    let stream_result: Result<()> = (|| {
        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|e| {
                ClassifyError::ModelLoadError(format!("Failed to read from network: {e}"))
            })?;
            if bytes_read == 0 {
                break;
            }
            writer.write_all(&buffer[..bytes_read]).map_err(|e| {
                ClassifyError::ModelLoadError(format!("Failed to write to temp file: {e}"))
            })?;
            downloaded += bytes_read as u64;
        }
        writer.flush().map_err(|e| {
            ClassifyError::ModelLoadError(format!("Failed to flush temp file: {e}"))
        })
    })();

    if let Err(e) = stream_result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, dest).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        ClassifyError::ModelLoadError(format!(
            "Failed to move downloaded file to {}: {e}",
            dest.display()
        ))
    })?;

    eprintln!("Downloaded {} ({downloaded} bytes)", dest.display());
    Ok(())
}

/// Attempt to download a model if it matches a known downloadable artifact.
///
/// Currently only `poseflow-classifier.onnx` (the default classifier) is
/// auto-downloadable; custom artifacts must be supplied by the caller.
/// Downloads to the directory named in `model_path`.
///
/// # Errors
///
/// Returns [`ClassifyError::ModelLoadError`] if the artifact is unknown or
/// the download fails.
pub fn try_download_model<P: AsRef<Path>>(model_path: P) -> Result<PathBuf> {
    let path = model_path.as_ref();
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let url = match filename {
        DEFAULT_MODEL => DEFAULT_MODEL_URL,
        _ => {
            return Err(ClassifyError::ModelLoadError(format!(
                "Model file not found: {}. Auto-download is only supported for {DEFAULT_MODEL}",
                path.display(),
            )));
        }
    };

    let dest_path = path.to_path_buf();
    download_file(url, &dest_path)?;
    Ok(dest_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_model_returns_error() {
        let result = try_download_model("unknown_model.onnx");
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Auto-download is only supported"));
    }
}
