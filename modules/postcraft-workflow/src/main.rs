use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use postcraft_common::{Config, ContentPlan};
use postcraft_workflow::report::render_text_report;
use postcraft_workflow::{Workflow, WorkflowDeps};

#[derive(Parser)]
#[command(name = "postcraft", about = "Turn long-form text into reviewed social media posts")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a content plan from source text
    Plan {
        /// Source text file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Topic hint passed to drafting and scheduling
        #[arg(short, long)]
        topic: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("postcraft=info".parse()?)
        .add_directive("ai_client=info".parse()?);
    // Logs go to stderr so stdout carries only the plan.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    Ok(())
}

fn read_source(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading source text from stdin")?;
            Ok(text)
        }
    }
}

async fn plan(input: Option<PathBuf>, topic: Option<String>, format: OutputFormat) -> Result<()> {
    let config = Config::from_env()?;
    let workflow = Workflow::new(WorkflowDeps::from_config(config)?);

    let text = read_source(input.as_deref())?;
    let state = workflow.run(&text, topic.as_deref()).await?;
    info!(
        posts = state.drafts.len(),
        warnings = state.errors().len(),
        "Content plan ready"
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ContentPlan::from(state))?);
        }
        OutputFormat::Text => print!("{}", render_text_report(&state)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    info!("postcraft starting");
    match cli.command {
        Commands::Plan {
            input,
            topic,
            format,
        } => plan(input, topic, format).await,
    }
}
