/*!
 * Rendering of generated scenes to video.
 *
 * This module contains:
 * - `Renderer`: uploads a script to a workspace and renders one scene at a time
 * - `local`: a renderer running the render command in a local directory
 * - `concat`: concatenation of rendered videos with ffmpeg
 */

use async_trait::async_trait;
use chrono::Local;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::RenderError;
use crate::file_utils::FileManager;

pub mod concat;
pub mod local;

pub use concat::{merge_videos, VideoConcatenator};
pub use local::LocalRenderer;

/// A script placed inside a render workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteScript {
    /// Location of the script inside the workspace
    pub path: PathBuf,

    /// File stem, which names the media output directory
    pub stem: String,
}

impl RemoteScript {
    /// Describe a script at `path`.
    pub fn new(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, stem }
    }
}

/// A place where scenes can be rendered.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Copy a local script into the workspace.
    async fn upload(&self, local_script: &Path) -> Result<RemoteScript, RenderError>;

    /// Render one scene of an uploaded script and return the video bytes.
    async fn render_scene(&self, script: &RemoteScript, scene: &str) -> Result<Vec<u8>, RenderError>;
}

/// Render every scene in order and save the videos in `videos_dir`.
///
/// Videos are named `<Scene>-<YYYYmmdd_HHMMSS>.mp4`. The first failure stops
/// the run.
pub async fn render_scenes<R: Renderer + ?Sized>(
    renderer: &R,
    script: &Path,
    scenes: &[String],
    videos_dir: &Path,
) -> Result<Vec<PathBuf>, RenderError> {
    let remote = renderer.upload(script).await?;
    tokio::fs::create_dir_all(videos_dir).await?;

    let mut videos = Vec::with_capacity(scenes.len());
    for (index, scene) in scenes.iter().enumerate() {
        info!("Processing {} scene...", scene);
        let video = renderer.render_scene(&remote, scene).await?;

        let path = videos_dir.join(FileManager::timestamped_name(scene, "mp4", Local::now()));
        tokio::fs::write(&path, &video).await?;

        info!("Video for {}/{} scenes generated", index + 1, scenes.len());
        videos.push(path);
    }

    Ok(videos)
}

/// Run a program to completion, failing on timeout or non-zero exit.
pub(crate) async fn run_command(
    program: &str,
    args: &[String],
    working_dir: Option<&Path>,
    timeout_secs: u64,
) -> Result<Output, RenderError> {
    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    debug!("Running: {}", command_line);

    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }

    let output_future = command.output();
    let output = tokio::select! {
        result = output_future => {
            result.map_err(|e| RenderError::SpawnFailed {
                command: command_line.clone(),
                message: e.to_string(),
            })?
        },
        _ = tokio::time::sleep(Duration::from_secs(timeout_secs)) => {
            return Err(RenderError::Timeout { command: command_line, seconds: timeout_secs });
        }
    };

    if !output.status.success() {
        return Err(RenderError::CommandFailed {
            command: command_line,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}
