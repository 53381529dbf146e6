//! pantai_chat CLI - main entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pantai_chat::config::Config;
use pantai_chat::corpus::Corpus;
use pantai_chat::ui::App;

#[derive(Parser)]
#[command(name = "pantai_chat")]
#[command(about = "Beach tourism comment explorer with a Gemini RAG chatbot", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.yml
    #[arg(long, env = "PANTAI_CONFIG", default_value = "config.yml")]
    config: PathBuf,

    /// Override the corpus CSV path from the config
    #[arg(long)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu with home, statistics and chatbot views (default)
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question, e.g. "Apa topik sentimen positif tentang Pantai Mutun?"
        question: String,
    },

    /// Print corpus statistics and exit
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config);
    if let Some(data) = cli.data {
        config.data_path = data.display().to_string();
    }
    config.validate().context("invalid configuration")?;

    let data_path = PathBuf::from(&config.data_path);
    let corpus = Corpus::load(&data_path, &config)
        .with_context(|| format!("cannot load corpus from {}", data_path.display()))?;

    let mut app = App::new(Arc::new(config), Arc::new(corpus));

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => app.run().await?,
        Commands::Ask { question } => {
            let answer = app.ask_once(&question).await?;
            println!("{}", answer);
        }
        Commands::Stats => print!("{}", app.stats_table()),
    }

    Ok(())
}
