use clap::{Parser, Subcommand};
use docrank_core::config;
use docrank_core::{CorpusIterator, HashingTfIdfVectorizer, Ranker, Ranking, VectorizerConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docrank", about = "Hashed TF-IDF document ranker")]
struct Args {
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index from a JSONL corpus and save it
    Fit {
        /// JSONL corpus, one {"id", "text", optional "title"} object per line
        #[arg(long)]
        corpus: PathBuf,

        /// Output index file
        #[arg(long, default_value_os_t = default_index_path())]
        index: PathBuf,

        /// Number of hashed term slots
        #[arg(long, default_value_t = config::DEFAULT_HASH_SIZE)]
        hash_size: u32,

        /// Smallest n-gram order
        #[arg(long, default_value_t = config::DEFAULT_NGRAM_RANGE.0)]
        ngram_min: usize,

        /// Largest n-gram order
        #[arg(long, default_value_t = config::DEFAULT_NGRAM_RANGE.1)]
        ngram_max: usize,

        /// Documents per training batch
        #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Rank indexed documents against a question
    Query {
        /// Index file to load
        #[arg(long, default_value_os_t = default_index_path())]
        index: PathBuf,

        /// Number of documents to return
        #[arg(short, default_value_t = config::DEFAULT_TOP_N)]
        n: usize,

        /// Print one JSON object instead of tab-separated lines
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Question text; multiple words are joined with spaces
        #[arg(required = true)]
        question: Vec<String>,
    },

    /// Print statistics of a saved index
    Inspect {
        /// Index file to load
        #[arg(long, default_value_os_t = default_index_path())]
        index: PathBuf,
    },
}

#[derive(Serialize)]
struct QueryOutput<'a> {
    question: &'a str,
    #[serde(flatten)]
    ranking: &'a Ranking,
}

#[derive(Serialize)]
struct InspectOutput {
    documents: usize,
    hash_size: u32,
    ngram_range: (usize, usize),
    nnz: usize,
}

fn default_index_path() -> PathBuf {
    Path::new(config::DEFAULT_DATA_DIR).join(config::DEFAULT_INDEX_FILE)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::from_default_env()
        .add_directive("docrank_core=info".parse().expect("valid directive literal"))
        .add_directive("docrank_cli=info".parse().expect("valid directive literal"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if args.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match args.command {
        Command::Fit {
            corpus,
            index,
            hash_size,
            ngram_min,
            ngram_max,
            batch_size,
        } => {
            let config = VectorizerConfig {
                index_path: index,
                hash_size,
                ngram_range: (ngram_min, ngram_max),
            };
            if let Err(e) = config.validate() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            fit(config, &corpus, batch_size)
        }
        Command::Query {
            index,
            n,
            json,
            question,
        } => {
            let ranker = open(&index)?;
            let question = question.join(" ");
            let ranking = ranker.rank(&question, n)?;
            if json {
                let output = QueryOutput {
                    question: &question,
                    ranking: &ranking,
                };
                println!("{}", serde_json::to_string(&output)?);
            } else {
                for (doc_id, score) in ranking.iter() {
                    println!("{}\t{:.6}", doc_id, score);
                }
            }
            Ok(())
        }
        Command::Inspect { index } => {
            let ranker = open(&index)?;
            let output = InspectOutput {
                documents: ranker.num_docs().unwrap_or(0),
                hash_size: ranker.hash_size().unwrap_or(0),
                ngram_range: ranker.ngram_range().unwrap_or(config::DEFAULT_NGRAM_RANGE),
                nnz: ranker.nnz().unwrap_or(0),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

fn fit(
    config: VectorizerConfig,
    corpus: &Path,
    batch_size: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let corpus = CorpusIterator::from_jsonl(corpus, batch_size)?;
    let index_path = config.index_path.clone();
    let ranker = Ranker::new(HashingTfIdfVectorizer::new(config)?);
    ranker.fit_batch(&corpus)?;
    ranker.save()?;
    tracing::info!("Fit finished in {:.2}s", start.elapsed().as_secs_f64());
    println!(
        "indexed {} documents into {} (nnz={})",
        corpus.len(),
        index_path.display(),
        ranker.nnz().unwrap_or(0)
    );
    Ok(())
}

/// Loads a saved index, exiting with status 1 if none exists.
fn open(index: &Path) -> Result<Ranker<HashingTfIdfVectorizer>, Box<dyn std::error::Error>> {
    let ranker = Ranker::initialize(HashingTfIdfVectorizer::new(VectorizerConfig::at(index))?)?;
    if !ranker.is_ready() {
        eprintln!("Error: no index found at '{}'", index.display());
        std::process::exit(1);
    }
    Ok(ranker)
}
