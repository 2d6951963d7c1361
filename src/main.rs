use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use triage::cmd::config::{self as config_cmd, ConfigArgs};
use triage::cmd::ticket::{self as ticket_cmd, TicketArgs, TicketOutput};
use triage::cmd::{classify as classify_cmd, stats as stats_cmd};
use triage::config::AppConfig;
use triage::context::AppContext;
use triage::error::AppResult;
use triage::infra::llm::HuggingFaceClient;
use triage::infra::ticket_file::JsonTicketStore;

#[derive(Parser)]
#[command(name = "triage", author, version, about = "Support ticket triage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest a category and priority for a ticket description.
    Classify {
        /// Ticket description, at least 10 characters.
        description: String,
    },
    /// Summarize ticket volume and breakdowns.
    Stats,
    /// Create, list and update tickets.
    Ticket(TicketArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Classify { description } => {
            let language_model = build_language_model(&AppConfig::load()?);
            print_json(&classify_cmd::run(&language_model, &description).await?)
        }
        Commands::Stats => {
            let context = build_context()?;
            print_json(&stats_cmd::run(&context).await?)
        }
        Commands::Ticket(args) => {
            let context = build_context()?;
            match ticket_cmd::run(&context, args.command).await? {
                TicketOutput::One(ticket) => print_json(&ticket),
                TicketOutput::Many(tickets) => print_json(&tickets),
            }
        }
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    let language_model = Arc::new(build_language_model(&config));
    let tickets = Arc::new(JsonTicketStore::load(config.tickets_file, config.utc_offset)?);

    Ok(AppContext::new(tickets, language_model))
}

fn build_language_model(config: &AppConfig) -> HuggingFaceClient {
    if config.api_key.is_none() {
        warn!("Hugging Face API key not configured; classification will return defaults.");
    }

    HuggingFaceClient::new(
        config.inference_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    )
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
