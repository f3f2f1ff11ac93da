use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// One organic hit returned by the search API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: Url,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub link: Option<Url>,
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>, link: Option<Url>) -> Self {
        let title = title.into();
        let content = content.into();
        let id = make_document_id(&title, link.as_ref(), &content);
        Self {
            id,
            title,
            content,
            link,
        }
    }

    pub fn from_text(content: impl Into<String>) -> Self {
        Self::new(String::new(), content, None)
    }
}

impl From<&SearchResult> for Document {
    fn from(result: &SearchResult) -> Self {
        Document::new(
            result.title.clone(),
            result.snippet.clone(),
            Some(result.link.clone()),
        )
    }
}

fn make_document_id(title: &str, link: Option<&Url>, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update([0u8]);
    if let Some(link) = link {
        hasher.update(link.as_str().as_bytes());
    }
    hasher.update([0u8]);
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Search results for a single query, in API relevance order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutput {
    pub results: Vec<SearchResult>,
}

impl SearchOutput {
    /// Snippet documents, element-wise aligned with [`SearchOutput::links`].
    pub fn documents(&self) -> Vec<Document> {
        self.results.iter().map(Document::from).collect()
    }

    pub fn links(&self) -> Vec<Url> {
        self.results.iter().map(|result| result.link.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub content: String,
    pub content_type: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// A source that was dropped from a best-effort batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSource {
    pub source: String,
    pub reason: String,
}

impl SkippedSource {
    pub fn new(source: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            source: source.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub pages: Vec<FetchedPage>,
    pub skipped: Vec<SkippedSource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub query: String,
    pub source_documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_content_derived() {
        let link = Url::parse("http://example.com/paris").ok();
        let first = Document::new("Paris", "Paris is the capital of France.", link.clone());
        let second = Document::new("Paris", "Paris is the capital of France.", link);
        let other = Document::new("Paris", "Lyon is not the capital.", None);

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other.id);
    }

    #[test]
    fn search_output_documents_and_links_are_aligned() {
        let output = SearchOutput {
            results: vec![
                SearchResult {
                    title: "One".to_string(),
                    snippet: "first".to_string(),
                    link: Url::parse("http://example.com/1").unwrap(),
                },
                SearchResult {
                    title: "Two".to_string(),
                    snippet: "second".to_string(),
                    link: Url::parse("http://example.com/2").unwrap(),
                },
            ],
        };

        let documents = output.documents();
        let links = output.links();
        assert_eq!(documents.len(), links.len());
        for (document, link) in documents.iter().zip(links.iter()) {
            assert_eq!(document.link.as_ref(), Some(link));
        }
        assert_eq!(documents[1].content, "second");
    }
}
