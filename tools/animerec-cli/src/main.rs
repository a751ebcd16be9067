//! Animerec command-line tool
//!
//! Builds the vector store from the anime catalog CSV and answers
//! recommendation queries against it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use animerec::vecdb::{DEFAULT_MODEL_DIR, MiniLmEmbedder, StoreConfig, VectorStore};
use animerec::{LlmConfig, OpenAiClient, Recommender};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Default persist directory
fn default_persist_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("animerec")
        .join("chroma_db")
}

/// Whether an environment-style flag value means "on".
fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "animerec")]
#[command(about = "Anime recommendations from a local vector store and an LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vector store directory
    #[arg(short = 'd', long, env = "ANIMEREC_PERSIST_DIR")]
    persist_dir: Option<PathBuf>,

    /// Sentence-transformer model directory
    #[arg(short = 'e', long, env = "ANIMEREC_EMBEDDING_MODEL", default_value = DEFAULT_MODEL_DIR)]
    embedding_model: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat model name
    #[arg(short, long, env = "MODEL_NAME", default_value = animerec::llm::DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API root
    #[arg(long, env = "OPENAI_BASE_URL", default_value = animerec::llm::DEFAULT_BASE_URL)]
    base_url: String,

    /// Neighbors retrieved per query
    #[arg(short = 'k', long, default_value_t = animerec::core::DEFAULT_TOP_K)]
    top_k: usize,

    /// LLM request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Log to a daily file instead of stderr (true/1/yes)
    #[arg(long, env = "LOG_TO_FILE", default_value = "true")]
    log_to_file: String,

    /// Directory for log files
    #[arg(long, env = "ANIMEREC_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or rebuild) the vector store from a CSV file
    Build {
        /// Anime catalog CSV with a header row
        #[arg(short, long)]
        csv: PathBuf,
    },
    /// Ask for a recommendation
    Recommend {
        /// Free-text request
        query: String,
    },
    /// Show the context that would be sent to the LLM
    Context {
        /// Free-text request
        query: String,

        /// Print blocks, thresholds and the full prompt as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(to_file: bool, log_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("log")
            .filename_suffix("log")
            .build(log_dir)
            .context("Failed to open log file")?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(None)
    }
}

fn open_store(cli: &Cli) -> Result<VectorStore<MiniLmEmbedder>> {
    let persist_dir = cli.persist_dir.clone().unwrap_or_else(default_persist_dir);
    let embedder = MiniLmEmbedder::load(&cli.embedding_model).with_context(|| {
        format!(
            "Failed to load embedding model from {}",
            cli.embedding_model.display()
        )
    })?;
    VectorStore::open(&persist_dir, embedder, StoreConfig::default())
        .with_context(|| format!("Failed to open vector store at {}", persist_dir.display()))
}

fn llm_config(cli: &Cli) -> LlmConfig {
    LlmConfig::new(cli.api_key.clone().unwrap_or_default())
        .with_model(cli.model.clone())
        .with_base_url(cli.base_url.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs))
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Build { csv } => {
            info!(csv = %csv.display(), "Building vector store...");
            let store = open_store(cli)?;
            let chunks = store
                .build_from_csv(csv)
                .with_context(|| format!("Failed to build vector store from {}", csv.display()))?;
            info!(chunks, "Vector store built successfully");
            println!("Indexed {chunks} chunks into {:?}", store.config().collection);
        }
        Commands::Recommend { query } => {
            let client = OpenAiClient::new(llm_config(cli)).context("Failed to create LLM client")?;
            info!("Initializing recommendation pipeline");
            let recommender = Recommender::new(open_store(cli)?, client).with_top_k(cli.top_k);
            let text = recommender
                .recommend(query)
                .context("Error while getting recommendation")?;
            println!("{text}");
        }
        Commands::Context { query, json } => {
            let recommender = Recommender::new(open_store(cli)?, ()).with_top_k(cli.top_k);
            let prepared = recommender
                .prepare(query)
                .context("Error while selecting context")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&prepared)?);
            } else {
                println!("{}", prepared.context);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_logging(is_truthy(&cli.log_to_file), &cli.log_dir)?;

    run(&cli)
}
