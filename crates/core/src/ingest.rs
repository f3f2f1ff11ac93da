use crate::chunking::{split_by_sentence, ChunkingConfig, DocumentCleaner};
use crate::converter::{HtmlToDocument, TextToDocument};
use crate::traits::{DocumentStore, PageFetcher};
use crate::{ConvertError, Document, IngestError, SkippedSource};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;
use walkdir::WalkDir;

/// Raw material for batch ingestion.
#[derive(Debug, Clone)]
pub enum RawSource {
    HtmlFile(PathBuf),
    TextFile(PathBuf),
    Html(String),
    Text(String),
}

impl RawSource {
    /// Picks the converter from the file extension; anything that is not
    /// `.html`/`.htm` is read as plain text.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
        if is_html {
            RawSource::HtmlFile(path)
        } else {
            RawSource::TextFile(path)
        }
    }

    fn label(&self) -> String {
        match self {
            RawSource::HtmlFile(path) | RawSource::TextFile(path) => path.display().to_string(),
            RawSource::Html(_) => "inline html".to_string(),
            RawSource::Text(_) => "inline text".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IngestionReport {
    pub written: usize,
    pub skipped: Vec<SkippedSource>,
}

/// Converts, cleans and splits sources before writing the chunks to a store.
#[derive(Debug, Clone, Default)]
pub struct BatchIngestor {
    html: HtmlToDocument,
    text: TextToDocument,
    cleaner: DocumentCleaner,
    chunking: ChunkingConfig,
}

impl BatchIngestor {
    pub fn new(chunking: ChunkingConfig) -> Result<Self, IngestError> {
        chunking.validate()?;
        Ok(Self {
            chunking,
            ..Self::default()
        })
    }

    pub fn ingest_sources<S: DocumentStore>(
        &self,
        store: &mut S,
        sources: &[RawSource],
    ) -> Result<IngestionReport, IngestError> {
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for source in sources {
            match self.convert(source) {
                Ok(document) => documents.push(document),
                Err(error) => {
                    warn!(source = %source.label(), reason = %error, "skipping source");
                    skipped.push(SkippedSource::new(source.label(), error));
                }
            }
        }

        let mut report = self.write_chunks(store, documents)?;
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    pub fn ingest_paths<S: DocumentStore>(
        &self,
        store: &mut S,
        paths: &[PathBuf],
    ) -> Result<IngestionReport, IngestError> {
        let sources: Vec<RawSource> = paths.iter().cloned().map(RawSource::from_path).collect();
        self.ingest_sources(store, &sources)
    }

    /// Fetches each url and ingests the pages that could be read.
    pub async fn ingest_urls<S, F>(
        &self,
        store: &mut S,
        fetcher: &F,
        urls: &[Url],
    ) -> Result<IngestionReport, IngestError>
    where
        S: DocumentStore,
        F: PageFetcher,
    {
        let fetched = fetcher.fetch(urls).await;
        let (documents, mut skipped) = self.html.convert_pages(&fetched.pages);

        let mut report = self.write_chunks(store, documents)?;
        let mut all_skipped = fetched.skipped;
        all_skipped.append(&mut skipped);
        all_skipped.append(&mut report.skipped);
        report.skipped = all_skipped;
        Ok(report)
    }

    fn convert(&self, source: &RawSource) -> Result<Document, ConvertError> {
        match source {
            RawSource::HtmlFile(path) => self.html.convert_file(path),
            RawSource::TextFile(path) => self.text.convert_file(path),
            RawSource::Html(html) => self.html.convert(html, None),
            RawSource::Text(text) => self.text.convert(text, None),
        }
    }

    fn write_chunks<S: DocumentStore>(
        &self,
        store: &mut S,
        documents: Vec<Document>,
    ) -> Result<IngestionReport, IngestError> {
        let mut chunks = Vec::new();
        let mut skipped = Vec::new();

        for document in documents {
            let Some(cleaned) = self.cleaner.clean(&document) else {
                skipped.push(SkippedSource::new(
                    describe(&document),
                    "no content left after cleaning",
                ));
                continue;
            };
            chunks.extend(split_by_sentence(&cleaned, self.chunking)?);
        }

        let written = store.write(chunks);
        info!(written, skipped = skipped.len(), "batch ingestion finished");
        Ok(IngestionReport { written, skipped })
    }
}

/// Writes `text` as a single document, without cleaning or splitting.
pub fn store_text<S: DocumentStore>(store: &mut S, text: &str) -> usize {
    store.write(vec![Document::from_text(text)])
}

/// Recursively lists `.html`, `.htm` and `.txt` files under `folder`, sorted.
pub fn discover_sources(folder: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let supported = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ["html", "htm", "txt"]
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });

        if supported {
            files.push(entry.path().to_path_buf());
        }
    }

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(format!(
            "no html or text files found in {}",
            folder.display()
        )));
    }

    files.sort_unstable();
    Ok(files)
}

fn describe(document: &Document) -> String {
    match (&document.link, document.title.is_empty()) {
        (Some(link), _) => link.to_string(),
        (None, false) => document.title.clone(),
        (None, true) => document.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use crate::{FetchError, FetchedPage};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    const SEVEN_SENTENCES: &str = "One is first. Two follows. Three is here. Four too. \
        Five ends a chunk. Six starts another. Seven closes it.";

    #[test]
    fn text_ingestion_is_not_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let ingestor = BatchIngestor::default();
        let mut store = InMemoryDocumentStore::new();
        let sources = vec![RawSource::Text(SEVEN_SENTENCES.to_string())];

        let first = ingestor.ingest_sources(&mut store, &sources)?;
        assert_eq!(first.written, 2);
        assert_eq!(store.len(), 2);

        let second = ingestor.ingest_sources(&mut store, &sources)?;
        assert_eq!(second.written, 2);
        assert_eq!(store.len(), 4);
        Ok(())
    }

    #[test]
    fn files_are_converted_by_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let html_path = dir.path().join("paris.html");
        let text_path = dir.path().join("notes.txt");
        fs::write(
            &html_path,
            "<html><title>Paris</title><body><p>Paris is the capital of France.</p>\
             <script>var tracking = true;</script></body></html>",
        )?;
        fs::write(&text_path, "Lyon is a city.\n\n   It is in France.")?;

        let ingestor = BatchIngestor::default();
        let mut store = InMemoryDocumentStore::new();
        let report = ingestor.ingest_paths(&mut store, &[html_path, text_path])?;

        assert_eq!(report.written, 2);
        assert!(report.skipped.is_empty());
        let documents: Vec<_> = store.documents().collect();
        assert_eq!(documents[0].title, "Paris");
        assert_eq!(documents[0].content, "Paris is the capital of France.");
        assert_eq!(documents[1].title, "notes.txt");
        assert_eq!(documents[1].content, "Lyon is a city. It is in France.");
        Ok(())
    }

    #[test]
    fn unreadable_sources_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let empty_html = dir.path().join("empty.html");
        fs::write(&empty_html, "<html><style>p {}</style></html>")?;
        let missing = dir.path().join("missing.txt");

        let ingestor = BatchIngestor::default();
        let mut store = InMemoryDocumentStore::new();
        let report = ingestor.ingest_sources(
            &mut store,
            &[
                RawSource::HtmlFile(empty_html),
                RawSource::TextFile(missing),
                RawSource::Html("<p>Still works.</p>".to_string()),
            ],
        )?;

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].source.ends_with("empty.html"));
        assert!(report.skipped[1].source.ends_with("missing.txt"));
        Ok(())
    }

    #[test]
    fn store_text_writes_one_unsplit_document() {
        let mut store = InMemoryDocumentStore::new();
        assert_eq!(store_text(&mut store, SEVEN_SENTENCES), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.documents().next().map(|doc| doc.content.as_str()),
            Some(SEVEN_SENTENCES)
        );
    }

    #[test]
    fn discover_sources_is_recursive_and_filtered() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.html")).and_then(|mut file| file.write_all(b"<p>a</p>"))?;
        File::create(nested.join("b.TXT")).and_then(|mut file| file.write_all(b"b"))?;
        File::create(base.join("c.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4"))?;

        let files = discover_sources(base)?;
        assert_eq!(files.len(), 2);
        assert!(matches!(
            RawSource::from_path(&files[0]),
            RawSource::HtmlFile(_)
        ));
        Ok(())
    }

    #[test]
    fn discover_sources_fails_on_empty_folders() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(matches!(
            discover_sources(dir.path()),
            Err(IngestError::InvalidArgument(_))
        ));
        Ok(())
    }

    struct StaticFetcher;

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_page(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            if url.path() == "/gone" {
                return Err(FetchError::Status(410));
            }
            Ok(FetchedPage {
                url: url.clone(),
                content: format!("<title>Page</title><p>{SEVEN_SENTENCES}</p>"),
                content_type: Some("text/html".to_string()),
                fetched_at: Utc::now(),
            })
        }
    }

    #[tokio::test]
    async fn urls_are_fetched_converted_and_split() -> Result<(), Box<dyn std::error::Error>> {
        let urls = vec![
            Url::parse("http://example.com/ok")?,
            Url::parse("http://example.com/gone")?,
        ];
        let ingestor = BatchIngestor::new(ChunkingConfig::default())?;
        let mut store = InMemoryDocumentStore::new();

        let report = ingestor
            .ingest_urls(&mut store, &StaticFetcher, &urls)
            .await?;

        assert_eq!(report.written, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].source, "http://example.com/gone");
        assert!(store.documents().all(|doc| doc.title == "Page"));
        Ok(())
    }
}
