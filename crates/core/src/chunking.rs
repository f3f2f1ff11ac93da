use crate::error::IngestError;
use crate::Document;

pub const DEFAULT_SENTENCES_PER_CHUNK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub sentences_per_chunk: usize,
    pub overlap_sentences: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            sentences_per_chunk: DEFAULT_SENTENCES_PER_CHUNK,
            overlap_sentences: 0,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.sentences_per_chunk == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "sentences_per_chunk must be greater than zero".to_string(),
            ));
        }
        if self.overlap_sentences >= self.sentences_per_chunk {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap_sentences ({}) must be smaller than sentences_per_chunk ({})",
                self.overlap_sentences, self.sentences_per_chunk
            )));
        }
        Ok(())
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes whitespace and drops documents that end up empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCleaner;

impl DocumentCleaner {
    pub fn clean(&self, document: &Document) -> Option<Document> {
        let content = normalize_whitespace(&document.content);
        if content.is_empty() {
            return None;
        }
        Some(Document::new(
            document.title.clone(),
            content,
            document.link.clone(),
        ))
    }
}

/// Splits text into sentences. A sentence ends at `.`, `!` or `?` followed by
/// whitespace or the end of the text; the terminator stays with the sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        let terminal = matches!(ch, '.' | '!' | '?');
        let boundary = match chars.peek() {
            None => true,
            Some(next) => terminal && next.is_whitespace(),
        };
        if terminal && boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Splits a document into chunks of `sentences_per_chunk` sentences. Chunks
/// keep the parent's title and link.
pub fn split_by_sentence(
    document: &Document,
    config: ChunkingConfig,
) -> Result<Vec<Document>, IngestError> {
    config.validate()?;

    let sentences = split_sentences(&document.content);
    let step = config.sentences_per_chunk - config.overlap_sentences;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < sentences.len() {
        let end = (start + config.sentences_per_chunk).min(sentences.len());
        let content = sentences[start..end].join(" ");
        chunks.push(Document::new(
            document.title.clone(),
            content,
            document.link.clone(),
        ));
        if end == sentences.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
