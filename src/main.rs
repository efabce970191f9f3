// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use manimgen::animation::generator::class_names;
use manimgen::animation::pipeline::PipelinePhase;
use manimgen::animation::{
    AnimationPipeline, GenerationRequest, Generator, PipelineProgress, SourceDocument,
};
use manimgen::app_config::{self, Config, LlmProvider};
use manimgen::file_utils::FileManager;
use manimgen::providers::LlmClient;
use manimgen::providers::anthropic::Anthropic;
use manimgen::render::{LocalRenderer, merge_videos, render_scenes};

/// Name of the merged video written by `merge-videos` by default
const MERGED_VIDEO_NAME: &str = "merged_video.mp4";

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Turn a document into per-section scene scripts and one combined file
    Pipeline(PipelineArgs),

    /// Generate a complete program from a single query
    Generate(GenerateArgs),

    /// Render the scenes of a script and save the videos
    Render(RenderArgs),

    /// Concatenate every .mp4 in a directory into one video
    MergeVideos(MergeVideosArgs),

    /// Generate shell completions for manimgen
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PipelineArgs {
    /// Source document, a PDF or a plain-text file
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,

    /// Directory the scripts and JSON artifacts are written to
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// What the animation should show
    #[arg(short, long)]
    query: String,

    /// PDF attached as context
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Name the main scene must have
    #[arg(long)]
    scene_name: Option<String>,

    /// Where the generated program is saved
    #[arg(short, long, default_value = "code.py")]
    output: PathBuf,

    /// Render every scene of the generated program
    #[arg(short, long)]
    render: bool,

    /// Directory rendered videos are saved to
    #[arg(long)]
    videos_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Script to render
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Scenes to render, all declared classes when omitted
    #[arg(short, long = "scene")]
    scenes: Vec<String>,

    /// Directory rendered videos are saved to
    #[arg(long)]
    videos_dir: Option<PathBuf>,

    /// Also concatenate the rendered videos into this file
    #[arg(long, value_name = "OUTPUT")]
    merge: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct MergeVideosArgs {
    /// Directory holding the videos
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Merged video path, defaults to merged_video.mp4 inside DIR
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// manimgen - Manim animations generated by language models
///
/// Splits teaching material into sections, plans an animation for each one
/// and asks a model for the Manim code, or generates a whole program from a
/// single query.
#[derive(Parser, Debug)]
#[command(name = "manimgen")]
#[command(version)]
#[command(about = "LLM-driven Manim code generation")]
#[command(long_about = "manimgen turns documents and queries into Manim scene code using a language model.

EXAMPLES:
    manimgen pipeline paper.pdf out/                   # Section pipeline over a PDF
    manimgen generate -q \"Explain the mean\"            # Single program into code.py
    manimgen generate -q \"Gradient descent\" --render   # Generate, then render every scene
    manimgen render code.py -s Intro -s Outro          # Render chosen scenes
    manimgen merge-videos videos/                      # Concatenate rendered videos
    manimgen completions bash > manimgen.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The API key may also come from ANTHROPIC_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Model name used by every generation stage
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Provider API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; log::max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "manimgen", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Pipeline(args) => run_pipeline(&config, args).await,
        Commands::Generate(args) => run_generate(&config, args).await,
        Commands::Render(args) => run_render(&config, args).await,
        Commands::MergeVideos(args) => run_merge_videos(args).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration and apply command line overrides.
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(model) = &options.model {
        config.override_model(model);
    }

    if let Some(api_key) = options.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.provider.api_key = api_key.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

/// Build the client for the configured provider, validating the config first.
fn build_client(config: &Config) -> Result<Arc<dyn LlmClient>> {
    config.validate().context("Configuration validation failed")?;

    let client: Arc<dyn LlmClient> = match config.provider.provider_type {
        LlmProvider::Anthropic => Arc::new(Anthropic::with_timeout(
            config.provider.api_key.clone(),
            config.provider.endpoint.clone(),
            config.provider.timeout_secs,
        )),
    };

    info!("Using {} provider", config.provider.provider_type.display_name());
    Ok(client)
}

fn local_renderer(config: &Config) -> LocalRenderer {
    LocalRenderer::new(&config.render.workspace_dir)
        .with_command(&config.render.command)
        .with_quality(&config.render.quality)
        .with_timeout(config.render.timeout_secs)
}

fn videos_dir(config: &Config, requested: Option<PathBuf>) -> PathBuf {
    requested.unwrap_or_else(|| PathBuf::from(&config.render.videos_dir))
}

// @creates: Progress bar in the house style
fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    bar.set_style(style);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

async fn run_pipeline(config: &Config, args: PipelineArgs) -> Result<()> {
    if !FileManager::file_exists(&args.document) {
        return Err(anyhow!("Document does not exist: {:?}", args.document));
    }

    let client = build_client(config)?;
    let document = SourceDocument::from_path(&args.document)?;
    let pipeline = AnimationPipeline::new(client, config.pipeline_config());

    let bar = progress_bar();
    let bar_handle = bar.clone();
    let callback: Box<dyn Fn(PipelineProgress) + Send> = Box::new(move |progress: PipelineProgress| {
        if progress.phase == PipelinePhase::Generation {
            bar_handle.set_length(progress.total_sections as u64);
            bar_handle.set_position(progress.sections_processed as u64);
        }
        bar_handle.set_message(progress.status);
    });

    let result = pipeline.run(&document, &args.output_dir, Some(callback)).await;
    bar.finish_and_clear();
    let report = result?;

    if report.is_aborted() {
        error!("{}", report.summary());
        return Err(anyhow!(
            "Pipeline aborted: {}",
            report.abort_reason.unwrap_or_default()
        ));
    }

    for skipped in &report.skipped_sections {
        warn!("Skipped section {} ({}): {}", skipped.id, skipped.title, skipped.reason);
    }
    if let Some(combined) = &report.combined_file {
        info!("Combined animation written to {}", combined.display());
    }
    info!("{}", report.summary());

    Ok(())
}

async fn run_generate(config: &Config, args: GenerateArgs) -> Result<()> {
    let client = build_client(config)?;
    let generator = Generator::new(client, config.generator_model(), config.generator.max_tokens);

    let mut request = GenerationRequest::new(&args.query);
    if let Some(pdf) = &args.pdf {
        request = request.with_pdf(SourceDocument::from_path(pdf)?);
    }
    if let Some(scene_name) = &args.scene_name {
        request = request.with_scene_name(scene_name);
    }

    let program = generator.generate_to_file(&request, &args.output).await?;
    info!("Scenes: {}", program.class_names.join(", "));

    if !args.render {
        return Ok(());
    }

    if program.class_names.is_empty() {
        warn!("Generated program declares no classes, nothing to render");
        return Ok(());
    }

    let renderer = local_renderer(config);
    let videos = render_scenes(
        &renderer,
        &args.output,
        &program.class_names,
        &videos_dir(config, args.videos_dir),
    )
    .await?;

    info!("Rendered {} videos", videos.len());
    Ok(())
}

async fn run_render(config: &Config, args: RenderArgs) -> Result<()> {
    let scenes = if args.scenes.is_empty() {
        class_names(&FileManager::read_to_string(&args.script)?)
    } else {
        args.scenes
    };

    if scenes.is_empty() {
        return Err(anyhow!("No scenes found in {:?}", args.script));
    }

    let renderer = local_renderer(config);
    let videos = render_scenes(&renderer, &args.script, &scenes, &videos_dir(config, args.videos_dir)).await?;
    info!("Rendered {} videos", videos.len());

    if let Some(output) = args.merge {
        if let Some(merged) = merge_videos(&videos, &output).await? {
            info!("Merged video saved to {}", merged.display());
        }
    }

    Ok(())
}

async fn run_merge_videos(args: MergeVideosArgs) -> Result<()> {
    let output = args.output.unwrap_or_else(|| args.dir.join(MERGED_VIDEO_NAME));

    let videos: Vec<PathBuf> = FileManager::find_files(&args.dir, "mp4")?
        .into_iter()
        .filter(|video| *video != output)
        .collect();

    match merge_videos(&videos, &output).await? {
        Some(merged) => info!("Merged {} videos into {}", videos.len(), merged.display()),
        None => warn!("No videos found in {:?}", args.dir),
    }

    Ok(())
}
