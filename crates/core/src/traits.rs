use crate::{
    Document, FetchError, FetchReport, FetchedPage, GenerationError, ScoredDocument, SearchError,
    SearchOutput, SkippedSource,
};
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchOutput, SearchError>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError>;

    /// Fetches every url in order. Failures are recorded and skipped.
    async fn fetch(&self, urls: &[Url]) -> FetchReport {
        let mut report = FetchReport::default();
        for url in urls {
            match self.fetch_page(url).await {
                Ok(page) => report.pages.push(page),
                Err(error) => {
                    tracing::warn!(url = %url, reason = %error, "skipping page");
                    report.skipped.push(SkippedSource::new(url.as_str(), error));
                }
            }
        }
        report
    }
}

#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

pub trait DocumentStore {
    /// Appends documents, returning how many were stored.
    fn write(&mut self, documents: Vec<Document>) -> usize;

    fn retrieve_scored(&self, query: &str, top_k: usize) -> Vec<ScoredDocument>;

    fn retrieve(&self, query: &str, top_k: usize) -> Vec<Document> {
        self.retrieve_scored(query, top_k)
            .into_iter()
            .map(|scored| scored.document)
            .collect()
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
