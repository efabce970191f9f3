/*!
 * # manimgen - Manim animation generation with language models
 *
 * A Rust library that turns teaching material into Manim scene code.
 *
 * ## Features
 *
 * - Split a PDF into sections, plan an animation per section, generate
 *   scene code per plan and merge everything into one file
 * - Generate a whole program from a single free-text query
 * - Render scenes with a local `manim` install and concatenate the videos
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `animation`: Generation logic:
 *   - `animation::pipeline`: The section pipeline and its orchestrator
 *   - `animation::merge`: Merging of generated scene code
 *   - `animation::generator`: Single-prompt generation
 * - `render`: Rendering and video concatenation
 * - `file_utils`: File system operations
 * - `providers`: Client implementations for language-model providers:
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod animation;
pub mod app_config;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod render;

// Re-export main types for easier usage
pub use animation::{AnimationPipeline, CodeMerger, Generator, PipelineConfig};
pub use app_config::Config;
pub use errors::{AppError, ExtractionError, ProviderError, RenderError, StageError};
