use anyhow::Context;
use clap::{Parser, Subcommand};
use content_studio::adk::agent::AgentEvent;
use content_studio::adk::model::gemini::GeminiModel;
use content_studio::adk::state::StateKey;
use content_studio::studio::analysis;
use content_studio::studio::config::StudioConfig;
use content_studio::studio::pipeline::{ContentBrief, Studio};
use content_studio::studio::server::{self, AppState};
use dotenv::dotenv;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "STUDIO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the full content pipeline for a brief
    Create {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        audience: String,
        #[arg(long)]
        tone: String,
        /// Comma-separated SEO keywords
        #[arg(long)]
        keywords: String,
    },
    /// Ask the analyzer agent to review a text snippet
    Analyze {
        #[arg(short, long)]
        text: String,
    },
    /// Send a free-form request to the orchestrator
    Chat {
        #[arg(short, long)]
        prompt: String,
    },
    /// Compute text metrics locally, without a model
    Inspect {
        #[arg(short, long)]
        text: String,
        /// Number of hashtags to generate
        #[arg(long, default_value_t = 5)]
        hashtags: usize,
    },
}

fn build_studio(config: StudioConfig) -> anyhow::Result<Studio> {
    let model = GeminiModel::new(config.model_name.clone()).context("cannot create model")?;
    Ok(Studio::new(Arc::new(model), config)?)
}

/// Print agent progress to stderr until the sender side closes
fn spawn_progress_printer() -> (mpsc::Sender<AgentEvent>, tokio::task::JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<AgentEvent>(100);
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("[{}] {}: {}", event.author(), event.kind(), event.preview(120));
        }
    });
    (tx, handle)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = StudioConfig::resolve(args.config.as_deref())?;

    match args.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }

            let studio = match build_studio(config.clone()) {
                Ok(studio) => Some(Arc::new(studio)),
                Err(e) => {
                    log::warn!("{:#}. The server will start but API calls will fail.", e);
                    None
                }
            };

            server::serve(AppState::new(studio, config)).await?;
        }
        Commands::Create {
            topic,
            audience,
            tone,
            keywords,
        } => {
            let studio = build_studio(config)?;
            let brief = ContentBrief {
                topic,
                target_audience: audience,
                tone,
                keywords,
            };

            let session = studio.open_session(None).await;
            let (tx, printer) = spawn_progress_printer();
            let output = studio.create_content(&session.id, &brief, Some(tx)).await;
            printer.await?;
            let output = output?;

            let package = output
                .state
                .get(StateKey::FinalContentPackage)
                .unwrap_or(output.text.as_str());
            println!("{}", package);
        }
        Commands::Analyze { text } => {
            let studio = build_studio(config)?;
            let report = studio.analyze_text(&text).await?;
            println!("{}", report);
        }
        Commands::Chat { prompt } => {
            let studio = build_studio(config)?;
            let (tx, printer) = spawn_progress_printer();
            let response = studio.chat(&prompt, Some(tx)).await;
            printer.await?;
            println!("{}", response?);
        }
        Commands::Inspect { text, hashtags } => {
            let report = json!({
                "word_count": analysis::count_words(&text),
                "readability": analysis::calculate_readability_score(&text),
                "hashtags": analysis::generate_hashtags(&text, hashtags),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
