use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use scrape_agent::config::{
    AgentConfig, CleanerConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, FetchConfig, ModelConfig,
    RenderConfig,
};
use scrape_agent::{Pipeline, PipelineConfig, ScrapeOutcome};

/// Ask a language model to scrape the web for you.
#[derive(Debug, Parser)]
#[command(name = "scrape-agent", version, about)]
struct Cli {
    /// What you want to find out, in plain language.
    query: String,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    /// OpenAI-compatible chat-completions URL.
    #[arg(long, env = "SCRAPE_AGENT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[arg(long, env = "SCRAPE_AGENT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Model decisions allowed before giving up.
    #[arg(long, default_value_t = AgentConfig::default().max_steps)]
    max_steps: usize,

    /// Characters of cleaned page text kept per fetch/render.
    #[arg(long, default_value_t = CleanerConfig::default().max_chars)]
    max_chars: usize,

    /// Extra attempts for transient fetch failures.
    #[arg(long, default_value_t = 0)]
    fetch_retries: u32,

    /// Show the browser window when rendering.
    #[arg(long)]
    headed: bool,

    /// Launch Chrome without its sandbox (needed when running as root).
    #[arg(long)]
    no_sandbox: bool,

    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Print only the raw answer, skip the formatting pass.
    #[arg(long)]
    no_format: bool,

    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,

    /// Debug logging for the agent.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,scrape_agent=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    if cli.max_steps == 0 {
        bail!("--max-steps must be at least 1");
    }
    Ok(PipelineConfig {
        model: ModelConfig {
            endpoint: cli.endpoint.clone(),
            model: cli.model.clone(),
            ..ModelConfig::new(cli.api_key.clone())
        },
        fetch: FetchConfig {
            retries: cli.fetch_retries,
            ..FetchConfig::default()
        },
        render: RenderConfig {
            headless: !cli.headed,
            sandbox: !cli.no_sandbox,
            chrome_path: cli.chrome_path.clone(),
            ..RenderConfig::default()
        },
        cleaner: CleanerConfig {
            max_chars: cli.max_chars,
        },
        agent: AgentConfig {
            max_steps: cli.max_steps,
        },
        format_output: !cli.no_format,
    })
}

fn print_outcome(outcome: &ScrapeOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    match outcome {
        ScrapeOutcome::Answer {
            raw_data,
            formatted,
            format_error,
        } => {
            println!("Raw data:\n{raw_data}");
            if let Some(formatted) = formatted {
                println!("\nFormatted:\n{formatted}");
            }
            if let Some(err) = format_error {
                eprintln!("\nFormatting failed: {err}");
            }
        }
        ScrapeOutcome::Failed { error } => eprintln!("{error}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let pipeline = Pipeline::from_config(build_config(&cli)?)?;
    let outcome = pipeline.run(&cli.query).await;
    print_outcome(&outcome, cli.json)?;

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
