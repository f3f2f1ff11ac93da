pub mod analyzer;
pub mod chunking;
pub mod config;
pub mod converter;
pub mod error;
pub mod fetcher;
pub mod generator;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod search;
pub mod store;
pub mod traits;

#[cfg(test)]
mod test_server;

pub use analyzer::TextAnalyzer;
pub use chunking::{normalize_whitespace, split_by_sentence, ChunkingConfig, DocumentCleaner};
pub use config::{AppConfig, GeneratorConfig, SearchConfiguration};
pub use converter::{HtmlToDocument, TextToDocument};
pub use error::{
    ConfigError, ConvertError, FetchError, GenerationError, IngestError, PipelineError,
    SearchError,
};
pub use fetcher::HttpPageFetcher;
pub use generator::OpenAiGenerator;
pub use ingest::{discover_sources, store_text, BatchIngestor, IngestionReport, RawSource};
pub use models::{
    Answer, Document, FetchReport, FetchedPage, ScoredDocument, SearchOutput, SearchResult,
    SkippedSource,
};
pub use orchestrator::{
    AnswerPipeline, RagOrchestrator, RunOutcome, SearchIngestion, SearchIngestionPipeline,
};
pub use prompt::PromptBuilder;
pub use search::{CustomSearchClient, SearchRequest};
pub use store::{Bm25Params, InMemoryDocumentStore};
pub use traits::{DocumentStore, Generator, PageFetcher, WebSearch};
