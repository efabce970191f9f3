/*!
 * Integration tests for rendering and video merging
 */

use anyhow::Result;
use std::path::{Path, PathBuf};

use manimgen::errors::RenderError;
use manimgen::render::{LocalRenderer, Renderer, VideoConcatenator, merge_videos, render_scenes};
use crate::common;

#[tokio::test]
async fn test_mergeVideos_withNoVideos_shouldReturnNone() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().join("merged.mp4");

    assert!(merge_videos(&[], &output).await?.is_none());
    assert!(!output.exists());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_merge_withFailingProgram_shouldReturnCommandFailed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let video = common::create_test_file(temp_dir.path(), "a.mp4", "x")?;

    let result = VideoConcatenator::default()
        .with_program("false")
        .merge(&[video], &temp_dir.path().join("merged.mp4"))
        .await;

    assert!(matches!(result, Err(RenderError::CommandFailed { .. })));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_renderScenes_withLocalRenderer_shouldCopyVideosOut() -> Result<()> {
    common::init_logging();
    let source_dir = common::create_temp_dir()?;
    let workspace = common::create_temp_dir()?;
    let videos_dir = source_dir.path().join("videos");

    let script = common::create_test_file(
        source_dir.path(),
        "code.py",
        "from manim import *\n\nclass Intro(Scene):\n    pass\n\nclass Outro(Scene):\n    pass\n",
    )?;

    // `true` stands in for the render command; the videos are laid out beforehand
    let renderer = LocalRenderer::new(workspace.path()).with_command("true").with_quality("480p15");
    for scene in ["Intro", "Outro"] {
        let video = workspace.path().join("media/videos/code/480p15").join(format!("{}.mp4", scene));
        std::fs::create_dir_all(video.parent().unwrap())?;
        std::fs::write(&video, scene)?;
    }

    let scenes = vec!["Intro".to_string(), "Outro".to_string()];
    let videos = render_scenes(&renderer, &script, &scenes, &videos_dir).await?;

    assert_eq!(videos.len(), 2);
    assert!(videos.iter().all(|v| v.starts_with(&videos_dir)));
    assert_eq!(std::fs::read_to_string(&videos[0])?, "Intro");
    assert_eq!(std::fs::read_to_string(&videos[1])?, "Outro");
    assert!(workspace.path().join("code.py").exists());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_renderScenes_withMissingVideo_shouldStopAtFirstFailure() -> Result<()> {
    let source_dir = common::create_temp_dir()?;
    let workspace = common::create_temp_dir()?;
    let script = common::create_test_file(source_dir.path(), "code.py", "class Intro(Scene): pass")?;

    let renderer = LocalRenderer::new(workspace.path()).with_command("true");
    let scenes = vec!["Intro".to_string()];

    let result = render_scenes(&renderer, &script, &scenes, &source_dir.path().join("videos")).await;

    assert!(matches!(result, Err(RenderError::MissingOutput(_))));
    Ok(())
}

#[tokio::test]
async fn test_upload_withMissingScript_shouldReturnIoError() {
    let workspace = tempfile::tempdir().unwrap();
    let renderer = LocalRenderer::new(workspace.path());

    let result = renderer.upload(Path::new("does/not/exist.py")).await;

    assert!(matches!(result, Err(RenderError::Io(_))));
}

#[test]
fn test_localRenderer_workspace_shouldBeKept() {
    let renderer = LocalRenderer::new(PathBuf::from("render_workspace"));

    assert_eq!(renderer.workspace(), Path::new("render_workspace"));
}
