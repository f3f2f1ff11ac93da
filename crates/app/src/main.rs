use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use websearch_rag_core::{
    discover_sources, AnswerPipeline, AppConfig, BatchIngestor, CustomSearchClient, DocumentStore,
    HttpPageFetcher, InMemoryDocumentStore, OpenAiGenerator, RagOrchestrator,
    SearchIngestionPipeline,
};

#[derive(Parser)]
#[command(name = "websearch-rag", version)]
struct Cli {
    /// Question to answer; prompted for on stdin when omitted.
    #[arg(long)]
    question: Option<String>,

    /// HTML or text files, or folders of them, loaded into the store before answering.
    #[arg(long)]
    corpus: Vec<PathBuf>,

    /// Maximum number of search results to fetch.
    #[arg(long, default_value = "10")]
    search_top_k: usize,

    /// Number of documents placed in the prompt.
    #[arg(long, default_value = "10")]
    retrieve_top_k: usize,

    /// Chat model name, overriding OPENAI_MODEL.
    #[arg(long)]
    model: Option<String>,

    /// Print the titles and links of the documents the answer was built from.
    #[arg(long, default_value_t = false)]
    show_sources: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(model) = cli.model.clone() {
        config.generator.model = model;
    }

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        model = %config.generator.model,
        "websearch-rag boot"
    );

    let search = CustomSearchClient::with_timeout(config.search.clone(), None, config.http_timeout)?
        .with_top_k(cli.search_top_k);
    let fetcher = HttpPageFetcher::with_timeout(config.http_timeout)?;
    let generator = OpenAiGenerator::with_timeout(config.generator.clone(), config.http_timeout)?;

    let orchestrator = RagOrchestrator::new(
        SearchIngestionPipeline::new(search, fetcher),
        AnswerPipeline::new(generator).with_top_k(cli.retrieve_top_k),
    );

    let mut store = InMemoryDocumentStore::new();
    if !cli.corpus.is_empty() {
        load_corpus(&mut store, &cli.corpus)?;
    }

    let question = match cli.question {
        Some(question) => question,
        None => read_question().await?,
    };

    let outcome = orchestrator.ask(&mut store, question.trim()).await?;

    for skipped in &outcome.ingestion.skipped {
        warn!(source = %skipped.source, reason = %skipped.reason, "skipped search result");
    }

    println!("{}", outcome.answer.text);

    if cli.show_sources {
        for (index, document) in outcome.answer.source_documents.iter().enumerate() {
            let link = document
                .link
                .as_ref()
                .map(|url| url.to_string())
                .unwrap_or_default();
            println!("[{}] {} {}", index + 1, document.title, link);
        }
    }

    Ok(())
}

async fn read_question() -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter your question: ").await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

fn load_corpus(store: &mut InMemoryDocumentStore, corpus: &[PathBuf]) -> anyhow::Result<()> {
    let mut paths = Vec::new();
    for entry in corpus {
        if entry.is_dir() {
            paths.extend(discover_sources(entry)?);
        } else {
            paths.push(entry.clone());
        }
    }

    let report = BatchIngestor::default().ingest_paths(store, &paths)?;
    for skipped in &report.skipped {
        warn!(path = %skipped.source, reason = %skipped.reason, "skipped corpus file");
    }
    info!(
        files = paths.len(),
        chunks = report.written,
        store_size = store.len(),
        "corpus loaded"
    );
    Ok(())
}
