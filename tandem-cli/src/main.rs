// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Tandem CLI - resilient content generation from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Sign in to both backends
//! tandem login gemini
//! tandem login openai
//!
//! # Show which backends are ready
//! tandem status
//!
//! # Generate text (falls back automatically if configured)
//! tandem generate "Explain SSE in one sentence"
//!
//! # Stream the response
//! tandem generate --stream "Write a haiku"
//!
//! # Token counts and embeddings
//! tandem count-tokens "How long is this?"
//! tandem embed "vectorize me" --format json
//! ```

mod commands;
mod context;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tandem_fetch::{AuthError, GenerateError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, backends, generate, status};

// ============================================================================
// CLI Definition
// ============================================================================

/// Tandem CLI - resilient dual-backend content generation.
#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Resilient dual-backend content generation CLI")]
#[command(long_about = r#"
Tandem sends generation requests to a primary backend, retrying with
exponential backoff and failing over to a secondary backend.

Supported backends:
  • Google Gemini (gemini)
  • OpenAI-compatible (openai)

Examples:
  tandem login gemini              # Browser sign-in
  tandem status                    # Backend availability
  tandem generate "Hello"          # One-shot generation
  tandem generate --stream "Hi"    # Streamed generation
  tandem --backend openai embed x  # Override the primary backend
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'status'.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file (defaults to the config directory's settings.json).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Primary backend for this run, overriding settings.
    #[arg(long, short, global = true)]
    pub backend: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show executor configuration and backend availability.
    #[command(visible_alias = "s")]
    Status,

    /// List supported backends and sign-in state.
    #[command(visible_alias = "b")]
    Backends,

    /// Sign in through the browser.
    Login(auth::LoginArgs),

    /// Delete cached credentials.
    Logout(auth::AuthArgs),

    /// Show the signed-in identity.
    Whoami(auth::AuthArgs),

    /// Generate content.
    #[command(visible_alias = "g")]
    Generate(generate::GenerateArgs),

    /// Count tokens in a text.
    CountTokens(generate::TextArgs),

    /// Embed a text.
    Embed(generate::TextArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Not signed in, or the session could not be refreshed.
    AuthRequired = 2,
    /// Every configured backend failed.
    BackendFailed = 3,
    /// Timeout.
    Timeout = 4,
}

impl ExitCode {
    /// Classifies a command failure.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<GenerateError>() {
            return Self::for_generate_error(e);
        }
        if let Some(e) = err.downcast_ref::<AuthError>() {
            return Self::for_auth_error(e);
        }
        Self::Error
    }

    fn for_generate_error(err: &GenerateError) -> Self {
        match err {
            GenerateError::Auth(e) => Self::for_auth_error(e),
            GenerateError::Timeout(_) => Self::Timeout,
            GenerateError::Backend { .. }
            | GenerateError::InvalidResponse(_)
            | GenerateError::NoGeneratorAvailable
            | GenerateError::AllBackendsFailed { .. } => Self::BackendFailed,
            _ => Self::Error,
        }
    }

    fn for_auth_error(err: &AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(_)
            | AuthError::RefreshFailed(_)
            | AuthError::Unauthorized(_) => Self::AuthRequired,
            AuthError::Timeout(_) => Self::Timeout,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let default = if verbose { "tandem=debug,info" } else { "tandem=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Status) | None => status::run(&cli).await,
        Some(Commands::Backends) => backends::run(&cli).await,
        Some(Commands::Login(args)) => auth::login(args, &cli).await,
        Some(Commands::Logout(args)) => auth::logout(args, &cli).await,
        Some(Commands::Whoami(args)) => auth::whoami(args, &cli).await,
        Some(Commands::Generate(args)) => generate::run(args, &cli).await,
        Some(Commands::CountTokens(args)) => generate::count_tokens(args, &cli).await,
        Some(Commands::Embed(args)) => generate::embed(args, &cli).await,
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(code as i32);
}

// ============================================================================
// Tests
// ============================================================================
