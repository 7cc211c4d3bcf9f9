use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumos_memory::document::{ChunkerConfig, EmbedFn, IngestionPipeline, TextChunker, TextLoader};
use lumos_memory::{DocumentLoader, DocumentStore, InMemoryVectorStore};

mod config;

use config::Config;

/// Dimensionality of the built-in feature-hashing embedding.
const EMBED_DIM: usize = 256;
const COLLECTION: &str = "lumos";

#[derive(Parser)]
#[command(name = "lumos", version, about = "Chunk documents and query them by similarity")]
struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "lumos.toml")]
    config: PathBuf,

    /// Override the configured chunk size in characters.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Override the configured chunk overlap in characters.
    #[arg(long)]
    chunk_overlap: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a file into chunks and print them.
    Chunk {
        file: PathBuf,

        /// Emit the chunked document as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Ingest documents and rank their chunks against a query.
    Query {
        query: String,

        /// Files to ingest before searching.
        #[arg(long = "docs", required = true, num_args = 1..)]
        docs: Vec<PathBuf>,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,

        /// Emit results as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Deterministic bag-of-words embedding over hashed word features. Stands in
/// for a model-backed embedder so the binary works offline.
fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBED_DIM];
    for word in text.split_whitespace() {
        let hash = blake3::hash(word.to_lowercase().as_bytes());
        let bytes = hash.as_bytes();
        let slot = usize::from(u16::from_le_bytes([bytes[0], bytes[1]])) % EMBED_DIM;
        vector[slot] += 1.0;
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

fn embed_fn() -> EmbedFn {
    Box::new(|text: &str| {
        let vector = embed(text);
        Box::pin(async move { Ok(vector) })
    })
}

fn chunker_config(config: &Config, cli: &Cli) -> ChunkerConfig {
    ChunkerConfig {
        chunk_size: cli.chunk_size.unwrap_or(config.chunker.chunk_size),
        chunk_overlap: cli.chunk_overlap.unwrap_or(config.chunker.chunk_overlap),
    }
}

async fn chunk_file(chunker: &TextChunker, path: &Path, json: bool) -> anyhow::Result<()> {
    let loader = TextLoader::default();
    let raw = loader
        .load(path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    let document = chunker.chunk_document(&raw.filename, &raw.content);

    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!(
        "{} ({}, id {})",
        document.filename, document.source_type, document.id
    );
    for chunk in &document.chunks {
        let preview: String = chunk.content.chars().take(60).collect();
        println!(
            "  [{}] {} chars: {}",
            chunk.chunk_index,
            chunk.content.chars().count(),
            preview
        );
    }
    Ok(())
}

async fn run_query(
    chunker_cfg: ChunkerConfig,
    query: &str,
    docs: &[PathBuf],
    limit: usize,
    json: bool,
) -> anyhow::Result<()> {
    let pipeline = IngestionPipeline::new(
        TextChunker::new(chunker_cfg),
        Arc::new(DocumentStore::new()),
        Arc::new(InMemoryVectorStore::new()),
        COLLECTION,
        embed_fn(),
    );

    let loader = TextLoader::default();
    for path in docs {
        pipeline
            .load_and_ingest(&loader, path)
            .await
            .with_context(|| format!("ingesting {}", path.display()))?;
    }

    let results = pipeline.search(query, limit, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("no results");
        return Ok(());
    }
    for hit in &results {
        println!(
            "{:.4}  {} #{} ({})",
            hit.score, hit.payload.filename, hit.payload.chunk_index, hit.payload.source_type
        );
        let preview: String = hit.payload.content.chars().take(120).collect();
        println!("        {preview}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let chunker_cfg = chunker_config(&config, &cli);
    tracing::debug!(?chunker_cfg, "resolved chunker configuration");

    match &cli.command {
        Command::Chunk { file, json } => {
            let chunker = TextChunker::new(chunker_cfg);
            chunk_file(&chunker, file, *json).await
        }
        Command::Query {
            query,
            docs,
            limit,
            json,
        } => {
            let limit = limit.unwrap_or(config.search.limit);
            run_query(chunker_cfg, query, docs, limit, *json).await
        }
    }
}
