/*!
 * Concatenation of rendered videos with ffmpeg's concat demuxer.
 */

use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::RenderError;

use super::run_command;

/// Default concatenation program.
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

/// Default timeout for one concatenation.
pub const DEFAULT_CONCAT_TIMEOUT_SECS: u64 = 600;

/// Joins videos into one file without re-encoding.
#[derive(Debug, Clone)]
pub struct VideoConcatenator {
    program: String,
    timeout_secs: u64,
}

impl Default for VideoConcatenator {
    fn default() -> Self {
        Self {
            program: DEFAULT_FFMPEG.to_string(),
            timeout_secs: DEFAULT_CONCAT_TIMEOUT_SECS,
        }
    }
}

impl VideoConcatenator {
    /// Use another ffmpeg binary.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Use another timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Concatenate `videos` in order into `output`.
    ///
    /// Returns `Ok(None)` without running anything when there is nothing to
    /// merge. The list file is removed whether ffmpeg succeeds or not.
    pub async fn merge(&self, videos: &[PathBuf], output: &Path) -> Result<Option<PathBuf>, RenderError> {
        if videos.is_empty() {
            info!("No videos to merge");
            return Ok(None);
        }

        let mut list_file = tempfile::Builder::new()
            .prefix("concat-")
            .suffix(".txt")
            .tempfile()?;
        list_file.write_all(concat_list(videos)?.as_bytes())?;
        list_file.flush()?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args: Vec<String> = vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "panic".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_file.path().to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ];

        // list_file is deleted on drop, on both paths
        run_command(&self.program, &args, None, self.timeout_secs).await?;

        info!("Merged {} videos into {}", videos.len(), output.display());
        Ok(Some(output.to_path_buf()))
    }
}

/// Concatenate `videos` with the default ffmpeg settings.
pub async fn merge_videos(videos: &[PathBuf], output: &Path) -> Result<Option<PathBuf>, RenderError> {
    VideoConcatenator::default().merge(videos, output).await
}

/// The concat demuxer list: one `file '<absolute path>'` line per video.
pub fn concat_list(videos: &[PathBuf]) -> Result<String, RenderError> {
    let mut list = String::new();

    for video in videos {
        let absolute = std::path::absolute(video)?;
        // Single quotes are closed, escaped, and reopened
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }

    Ok(list)
}
