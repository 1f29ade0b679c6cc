//! ragline CLI - ingest a document and ask questions about it
//!
//! # Commands
//!
//! ```bash
//! # Embed a document (or one text per line with --lines) into the store
//! ragline ingest documents.txt
//!
//! # Interactive question loop; type "stop" to finish
//! ragline ask
//!
//! # One question, full retrieval result as JSON
//! ragline query "what is polymorphism?" --json
//!
//! # Show past questions and answers
//! ragline history
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragline_lib::{
    config::Config,
    embed::{Embedder, MiniLmEmbedder},
    generate::Generator,
    pipeline::{Pipeline, RetrievalResult},
    source::{DocumentSource, LineSource, TextSource},
    store::{SqliteStore, VectorStore},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Input that ends an interactive session, compared case-insensitively.
const STOP_WORD: &str = "stop";

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Ask questions grounded in your own documents")]
#[command(version)]
struct Cli {
    /// SQLite database holding chunks and the query log
    #[arg(long, global = true, env = "RAGLINE_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a file's text and store it
    Ingest {
        /// Input file to ingest
        input: PathBuf,

        /// Treat every distinct non-empty line as its own text
        #[arg(short, long)]
        lines: bool,

        /// Remove previously stored chunks first
        #[arg(long)]
        clear: bool,
    },

    /// Interactive question loop
    Ask {
        /// Number of documents to retrieve per question
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum characters of context handed to the model
        #[arg(long)]
        max_context: Option<usize>,
    },

    /// Answer a single question
    Query {
        /// Question to answer
        text: String,

        /// Number of documents to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Maximum characters of context handed to the model
        #[arg(long)]
        max_context: Option<usize>,

        /// Print the whole retrieval result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove all stored chunks (the query log is kept)
    Clear,

    /// Print the query log
    History,
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let mut store = SqliteStore::open(&config.db_path, config.embedding_dimension)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    store.initialize()?;
    Ok(store)
}

fn load_embedder() -> Result<MiniLmEmbedder> {
    println!("Loading MiniLM model (first run downloads ~90MB)...");
    Ok(MiniLmEmbedder::new()?)
}

fn print_result(out: &mut impl Write, result: &RetrievalResult, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "Response: {}",
        result.generated_response.as_deref().unwrap_or_default()
    )?;
    for doc in &result.retrieved_documents {
        let preview: String = doc.content.chars().take(80).collect();
        let ellipsis = if doc.content.chars().count() > 80 { "..." } else { "" };
        writeln!(
            out,
            "  [{}] {:.4}  {preview}{ellipsis}",
            doc.document_id,
            doc.similarity_score()
        )?;
    }
    Ok(())
}

/// Read questions from `input` until the stop word or end of input.
///
/// A failed question is reported and the loop carries on. Returns the number
/// of questions answered.
fn run_session<E, S, G>(
    pipeline: &mut Pipeline<E, S, G>,
    input: impl BufRead,
    out: &mut impl Write,
    top_k: usize,
    max_context: usize,
) -> Result<usize>
where
    E: Embedder,
    S: VectorStore,
    G: Generator,
{
    let mut lines = input.lines();
    let mut answered = 0;

    loop {
        write!(out, "Enter your query (or type '{STOP_WORD}' to finish): ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = line?;
        let query = query.trim();

        if query.eq_ignore_ascii_case(STOP_WORD) {
            writeln!(out, "Stopping the query input...")?;
            break;
        }
        if query.is_empty() {
            continue;
        }

        match pipeline.answer_query(query, top_k, max_context) {
            Ok(result) => {
                print_result(out, &result, false)?;
                answered += 1;
            }
            Err(e) => {
                warn!(error = %e, "query failed");
                writeln!(out, "Query failed: {e}")?;
            }
        }
    }

    Ok(answered)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Ingest {
            input,
            lines,
            clear,
        } => {
            let texts = if lines {
                LineSource::new(&input).load_texts()?
            } else {
                DocumentSource::new(&input).load_texts()?
            };
            println!("Loaded {} text(s) from '{}'", texts.len(), input.display());

            let mut store = open_store(&config)?;
            if clear {
                store.clear_chunks()?;
                println!("Cleared existing chunks");
            }

            let embedder = load_embedder()?;
            let mut pipeline = Pipeline::without_generator(embedder, store)?;
            let report = pipeline.ingest(&texts)?;
            pipeline.close()?;

            println!(
                "Stored {} chunk(s), skipped {}",
                report.stored.len(),
                report.skipped.len()
            );
            if !report.skipped.is_empty() {
                println!("Skipped ids: {}", report.skipped.join(", "));
            }
        }

        Commands::Ask { top_k, max_context } => {
            let store = open_store(&config)?;
            let generator = config.generator()?;
            let embedder = load_embedder()?;
            let mut pipeline = Pipeline::new(embedder, store, generator)?;

            let session = run_session(
                &mut pipeline,
                io::stdin().lock(),
                &mut io::stdout(),
                top_k.unwrap_or(config.top_k),
                max_context.unwrap_or(config.max_context_chars),
            );
            pipeline.close()?;
            let answered = session?;
            info!(answered, "session finished");
        }

        Commands::Query {
            text,
            top_k,
            max_context,
            json,
        } => {
            let store = open_store(&config)?;
            let generator = config.generator()?;
            let embedder = load_embedder()?;
            let mut pipeline = Pipeline::new(embedder, store, generator)?;

            let result = pipeline.answer_query(
                &text,
                top_k.unwrap_or(config.top_k),
                max_context.unwrap_or(config.max_context_chars),
            );
            pipeline.close()?;
            print_result(&mut io::stdout(), &result?, json)?;
        }

        Commands::Clear => {
            let mut store = open_store(&config)?;
            let removed = store.chunk_count()?;
            store.clear_chunks()?;
            store.close()?;
            println!("Removed {removed} chunk(s)");
        }

        Commands::History => {
            let mut store = open_store(&config)?;
            let log = store.query_log()?;
            store.close()?;

            if log.is_empty() {
                println!("No queries recorded yet");
            }
            for (i, entry) in log.iter().enumerate() {
                println!("#{} Q: {}", i + 1, entry.query);
                println!("   A: {}\n", entry.response);
            }
        }
    }

    Ok(())
}
