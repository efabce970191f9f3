/*!
 * Renderer running the render command in a local workspace directory.
 */

use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};

use crate::errors::RenderError;

use super::{run_command, RemoteScript, Renderer};

/// Default render command.
pub const DEFAULT_RENDER_COMMAND: &str = "manim";

/// Default quality directory of the render output.
pub const DEFAULT_QUALITY: &str = "1080p60";

/// Default per-scene timeout in seconds.
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 600;

/// Renders scenes with a locally installed command.
#[derive(Debug, Clone)]
pub struct LocalRenderer {
    workspace: PathBuf,
    command: String,
    quality: String,
    timeout_secs: u64,
}

impl LocalRenderer {
    /// Renderer using `workspace` with default command, quality, and timeout.
    pub fn new<P: AsRef<Path>>(workspace: P) -> Self {
        Self {
            workspace: workspace.as_ref().to_path_buf(),
            command: DEFAULT_RENDER_COMMAND.to_string(),
            quality: DEFAULT_QUALITY.to_string(),
            timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
        }
    }

    /// Use another command line; extra words become leading arguments.
    pub fn with_command(mut self, command: &str) -> Self {
        self.command = command.to_string();
        self
    }

    /// Use another quality directory.
    pub fn with_quality(mut self, quality: &str) -> Self {
        self.quality = quality.to_string();
        self
    }

    /// Use another timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// The workspace directory.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Where the render command leaves the video of `scene`.
    pub fn video_path(&self, script: &RemoteScript, scene: &str) -> PathBuf {
        self.workspace
            .join("media")
            .join("videos")
            .join(&script.stem)
            .join(&self.quality)
            .join(format!("{}.mp4", scene))
    }
}

#[async_trait]
impl Renderer for LocalRenderer {
    async fn upload(&self, local_script: &Path) -> Result<RemoteScript, RenderError> {
        tokio::fs::create_dir_all(&self.workspace).await?;

        let file_name = local_script.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{:?} does not name a file", local_script),
            )
        })?;
        let target = self.workspace.join(file_name);

        // Scripts already in the workspace are used in place
        let source = tokio::fs::canonicalize(local_script).await?;
        let in_place = tokio::fs::canonicalize(&self.workspace).await?.join(file_name);
        if source != in_place {
            tokio::fs::copy(&source, &target).await?;
        }

        debug!("Uploaded {:?} to {:?}", local_script, target);
        Ok(RemoteScript::new(target))
    }

    async fn render_scene(&self, script: &RemoteScript, scene: &str) -> Result<Vec<u8>, RenderError> {
        let mut words = self.command.split_whitespace();
        let program = words.next().unwrap_or(DEFAULT_RENDER_COMMAND);

        let mut args: Vec<String> = words.map(str::to_string).collect();
        // The command runs inside the workspace, so the bare file name resolves
        let script_name = script.path.file_name().unwrap_or(script.path.as_os_str());
        args.push(script_name.to_string_lossy().to_string());
        args.push(scene.to_string());

        run_command(program, &args, Some(&self.workspace), self.timeout_secs).await?;

        let video = self.video_path(script, scene);
        if !video.is_file() {
            return Err(RenderError::MissingOutput(video.display().to_string()));
        }

        Ok(tokio::fs::read(&video).await?)
    }
}
