use crate::converter::HtmlToDocument;
use crate::prompt::PromptBuilder;
use crate::traits::{DocumentStore, Generator, PageFetcher, WebSearch};
use crate::{Answer, Document, GenerationError, PipelineError, SearchError, SkippedSource};
use tracing::{debug, info};

pub const DEFAULT_RETRIEVAL_TOP_K: usize = 10;

/// Output of [`SearchIngestionPipeline::run`].
///
/// `documents` are the fetched-and-converted pages; `snippet_documents` are
/// built from the search result snippets and are not written to the store.
#[derive(Debug, Default)]
pub struct SearchIngestion {
    pub documents: Vec<Document>,
    pub snippet_documents: Vec<Document>,
    pub skipped: Vec<SkippedSource>,
}

pub struct SearchIngestionPipeline<S, F>
where
    S: WebSearch,
    F: PageFetcher,
{
    search: S,
    fetcher: F,
    converter: HtmlToDocument,
}

impl<S, F> SearchIngestionPipeline<S, F>
where
    S: WebSearch,
    F: PageFetcher,
{
    pub fn new(search: S, fetcher: F) -> Self {
        Self {
            search,
            fetcher,
            converter: HtmlToDocument,
        }
    }

    pub async fn run(&self, query: &str) -> Result<SearchIngestion, SearchError> {
        let output = self.search.search(query).await?;
        let links = output.links();
        info!(query, links = links.len(), "search returned links");

        let fetched = self.fetcher.fetch(&links).await;
        let (documents, converted_skips) = self.converter.convert_pages(&fetched.pages);

        let mut skipped = fetched.skipped;
        skipped.extend(converted_skips);

        info!(
            fetched = fetched.pages.len(),
            documents = documents.len(),
            skipped = skipped.len(),
            "search ingestion finished"
        );

        Ok(SearchIngestion {
            documents,
            snippet_documents: output.documents(),
            skipped,
        })
    }
}

pub struct AnswerPipeline<G>
where
    G: Generator,
{
    generator: G,
    prompt: PromptBuilder,
    top_k: usize,
}

impl<G> AnswerPipeline<G>
where
    G: Generator,
{
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            prompt: PromptBuilder::default(),
            top_k: DEFAULT_RETRIEVAL_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub async fn run<D: DocumentStore>(
        &self,
        store: &D,
        query: &str,
    ) -> Result<Answer, GenerationError> {
        let documents = store.retrieve(query, self.top_k);
        debug!(query, retrieved = documents.len(), "documents retrieved");

        let prompt = self.prompt.build(&documents, query);
        let reply = self.generator.generate(&prompt).await?;

        Ok(Answer {
            text: reply,
            query: query.to_string(),
            source_documents: documents,
        })
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub answer: Answer,
    pub ingestion: SearchIngestion,
}

/// One question per run: search, ingest into the caller's store, answer.
pub struct RagOrchestrator<S, F, G>
where
    S: WebSearch,
    F: PageFetcher,
    G: Generator,
{
    ingestion: SearchIngestionPipeline<S, F>,
    answering: AnswerPipeline<G>,
}

impl<S, F, G> RagOrchestrator<S, F, G>
where
    S: WebSearch,
    F: PageFetcher,
    G: Generator,
{
    pub fn new(ingestion: SearchIngestionPipeline<S, F>, answering: AnswerPipeline<G>) -> Self {
        Self {
            ingestion,
            answering,
        }
    }

    pub async fn ask<D: DocumentStore>(
        &self,
        store: &mut D,
        question: &str,
    ) -> Result<RunOutcome, PipelineError> {
        let ingestion = self.ingestion.run(question).await?;
        let written = store.write(ingestion.documents.clone());
        info!(
            written,
            unused_snippets = ingestion.snippet_documents.len(),
            store_size = store.len(),
            "page documents stored"
        );

        let answer = self.answering.run(&*store, question).await?;
        Ok(RunOutcome { answer, ingestion })
    }
}
