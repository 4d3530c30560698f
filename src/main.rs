use clap::{Parser, Subcommand};
use ragchat::Result;
use ragchat::app::AppContext;
use ragchat::config::Config;
use ragchat::ingest::IngestInput;
use ragchat::server;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragchat")]
#[command(about = "A minimal retrieval-augmented chatbot backed by a local Ollama instance")]
#[command(version)]
struct Cli {
    /// Base directory for config and the vector store
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI
    Serve,
    /// Ask a single question from the terminal
    Ask {
        /// The question to answer
        question: String,
    },
    /// Ingest local text files into the vector store
    Ingest {
        /// Files to ingest
        files: Vec<PathBuf>,
    },
    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.base_dir)?;

    match cli.command {
        Commands::Serve => {
            let app = AppContext::bootstrap(config).await?;
            server::serve(app).await?;
        }
        Commands::Ask { question } => {
            let app = AppContext::bootstrap(config).await?;
            let outcome = app.ask(&question).await;
            println!("{}", outcome.answer.text);
            if !outcome.answer.sources.is_empty() {
                println!("\nSources: {}", outcome.answer.sources.join(", "));
            }
        }
        Commands::Ingest { files } => {
            let app = AppContext::bootstrap(config).await?;
            let mut inputs = Vec::with_capacity(files.len());
            for file in &files {
                let label = file
                    .file_name()
                    .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().into_owned());
                inputs.push(IngestInput::new(label, std::fs::read(file)?));
            }
            let report = app.ingest(inputs).await;
            for item in &report.items {
                match &item.error {
                    None => println!("{}: {} segments", item.label, item.segments_added),
                    Some(error) => println!("{}: FAILED ({})", item.label, error),
                }
            }
            println!("Total segments added: {}", report.segments_added);
        }
        Commands::Config => {
            let toml = toml::to_string_pretty(&config)
                .map_err(|e| ragchat::ChatError::Config(e.to_string()))?;
            println!("{}", toml);
        }
    }

    Ok(())
}
