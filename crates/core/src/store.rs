use crate::analyzer::TextAnalyzer;
use crate::traits::DocumentStore;
use crate::{Document, ScoredDocument};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

struct IndexedDocument {
    document: Document,
    term_freqs: HashMap<String, usize>,
    length: usize,
}

/// Append-only, process-local document store ranked with Okapi BM25.
pub struct InMemoryDocumentStore {
    documents: Vec<IndexedDocument>,
    doc_freqs: HashMap<String, usize>,
    total_length: usize,
    analyzer: TextAnalyzer,
    params: Bm25Params,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_params(TextAnalyzer::english(), Bm25Params::default())
    }

    pub fn with_params(analyzer: TextAnalyzer, params: Bm25Params) -> Self {
        Self {
            documents: Vec::new(),
            doc_freqs: HashMap::new(),
            total_length: 0,
            analyzer,
            params,
        }
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter().map(|indexed| &indexed.document)
    }

    fn average_length(&self) -> f64 {
        if self.documents.is_empty() {
            0.0
        } else {
            self.total_length as f64 / self.documents.len() as f64
        }
    }

    fn idf(&self, term: &str) -> f64 {
        let total = self.documents.len() as f64;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
        ((total - df + 0.5) / (df + 0.5) + 1.0).ln()
    }

    fn score(&self, indexed: &IndexedDocument, query_terms: &[(String, f64)], avgdl: f64) -> f64 {
        let Bm25Params { k1, b } = self.params;
        let length_norm = if avgdl > 0.0 {
            indexed.length as f64 / avgdl
        } else {
            0.0
        };

        query_terms
            .iter()
            .map(|(term, idf)| {
                let tf = indexed.term_freqs.get(term).copied().unwrap_or(0) as f64;
                if tf == 0.0 {
                    return 0.0;
                }
                idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * length_norm))
            })
            .sum()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn write(&mut self, documents: Vec<Document>) -> usize {
        let mut written = 0;
        for document in documents {
            if document.content.trim().is_empty() {
                warn!(id = %document.id, title = %document.title, "refusing document with empty content");
                continue;
            }

            let terms = self.analyzer.analyze(&document.content);
            let mut term_freqs: HashMap<String, usize> = HashMap::new();
            for term in terms.iter() {
                *term_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            for term in term_freqs.keys() {
                *self.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }

            self.total_length += terms.len();
            self.documents.push(IndexedDocument {
                document,
                term_freqs,
                length: terms.len(),
            });
            written += 1;
        }
        debug!(written, total = self.documents.len(), "documents written");
        written
    }

    fn retrieve_scored(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        let mut query_terms: Vec<(String, f64)> = Vec::new();
        for term in self.analyzer.analyze(query) {
            if !query_terms.iter().any(|(seen, _)| *seen == term) {
                let idf = self.idf(&term);
                query_terms.push((term, idf));
            }
        }
        if query_terms.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let avgdl = self.average_length();
        let mut scored: Vec<(usize, f64)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, indexed)| (position, self.score(indexed, &query_terms, avgdl)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|left, right| right.1.total_cmp(&left.1));

        scored
            .into_iter()
            .take(top_k)
            .map(|(position, score)| ScoredDocument {
                document: self.documents[position].document.clone(),
                score,
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.documents.len()
    }
}
