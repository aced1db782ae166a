//! Generate, count-tokens, and embed commands.

use anyhow::{Result, bail};
use clap::Args;
use futures::StreamExt;
use std::io::Write;
use tandem_core::{
    Content, CountTokensRequest, EmbedContentRequest, GenerateContentRequest, GenerationConfig,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the generate command.
#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Prompt text. Reads stdin when empty or "-".
    pub prompt: Vec<String>,

    /// Model (defaults to the primary backend's model).
    #[arg(long, short)]
    pub model: Option<String>,

    /// System instruction.
    #[arg(long)]
    pub system: Option<String>,

    /// Stream the response as it is generated.
    #[arg(long)]
    pub stream: bool,

    /// Sampling temperature.
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

/// Arguments for commands that take a single text.
#[derive(Args, Default)]
pub struct TextArgs {
    /// Input text. Reads stdin when empty or "-".
    pub text: Vec<String>,

    /// Model (defaults to the primary backend's model).
    #[arg(long, short)]
    pub model: Option<String>,
}

/// Joins positional words, or reads stdin for none or "-".
async fn read_input(words: &[String]) -> Result<String> {
    let text = if words.is_empty() || words == ["-"] {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await?;
        buf
    } else {
        words.join(" ")
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        bail!("No input text");
    }
    Ok(text)
}

fn build_request(args: &GenerateArgs, model: String, prompt: String) -> GenerateContentRequest {
    let mut request = GenerateContentRequest::prompt(model, prompt);
    if let Some(system) = &args.system {
        request = request.with_system_instruction(system.clone());
    }
    if args.temperature.is_some() || args.max_tokens.is_some() {
        request = request.with_generation_config(GenerationConfig {
            temperature: args.temperature,
            max_output_tokens: args.max_tokens,
            ..Default::default()
        });
    }
    request
}

/// Runs the generate command.
pub async fn run(args: &GenerateArgs, cli: &Cli) -> Result<()> {
    let prompt = read_input(&args.prompt).await?;
    let ctx = AppContext::load(cli).await?;
    let model = match &args.model {
        Some(model) => model.clone(),
        None => ctx.factory.model_for(ctx.primary())?,
    };
    let executor = ctx.executor().await?;
    let request = build_request(args, model, prompt);

    info!(model = %request.model, stream = args.stream, "Generating");

    if args.stream {
        let mut stream = executor.generate_content_stream(&request).await?;
        let mut stdout = std::io::stdout();
        let mut fragments = 0usize;

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            fragments += 1;
            match cli.format {
                // One JSON document per line.
                OutputFormat::Json => {
                    writeln!(stdout, "{}", JsonFormatter::new(false).format(&fragment)?)?;
                }
                OutputFormat::Text => {
                    if let Some(text) = fragment.text() {
                        write!(stdout, "{text}")?;
                    }
                }
            }
            stdout.flush()?;
        }

        if cli.format == OutputFormat::Text {
            writeln!(stdout)?;
        }
        debug!(fragments, "Stream finished");
        return Ok(());
    }

    let response = executor.generate_content(&request).await?;
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if cli.quiet {
                println!("{}", response.text().unwrap_or_default());
            } else {
                println!("{}", formatter.format_response(&response));
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&response)?);
        }
    }

    Ok(())
}

/// Runs the count-tokens command.
pub async fn count_tokens(args: &TextArgs, cli: &Cli) -> Result<()> {
    let text = read_input(&args.text).await?;
    let ctx = AppContext::load(cli).await?;
    let model = match &args.model {
        Some(model) => model.clone(),
        None => ctx.factory.model_for(ctx.primary())?,
    };
    let executor = ctx.executor().await?;

    let response = executor
        .count_tokens(&CountTokensRequest::new(model, vec![Content::user(text)]))
        .await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_count(response.total_tokens));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&response)?);
        }
    }

    Ok(())
}

/// Runs the embed command.
pub async fn embed(args: &TextArgs, cli: &Cli) -> Result<()> {
    let text = read_input(&args.text).await?;
    let ctx = AppContext::load(cli).await?;
    let model = match &args.model {
        Some(model) => model.clone(),
        None => ctx.factory.embedding_model_for(ctx.primary())?,
    };
    let executor = ctx.executor().await?;

    let response = executor
        .embed_content(&EmbedContentRequest::new(model, Content::user(text)))
        .await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_embedding(&response));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&response)?);
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
