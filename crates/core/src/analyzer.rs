use porter_stemmer::stem;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn get_stop_words() -> &'static HashSet<String> {
    STOP_WORDS.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .map(|x| x.to_string())
            .collect()
    })
}

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

/// A token filter receives the token stream and may remove or rewrite tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<String>) -> Vec<String>;
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens.into_iter().map(|t| t.to_lowercase()).collect()
    }
}

pub struct MinLengthTokenFilter {
    min_chars: usize,
}

impl MinLengthTokenFilter {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

impl TokenFilter for MinLengthTokenFilter {
    fn filter(&self, mut tokens: Vec<String>) -> Vec<String> {
        tokens.retain(|t| t.chars().count() >= self.min_chars);
        tokens
    }
}

/// Expects lowercase input.
pub struct StopWordTokenFilter;

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<String>) -> Vec<String> {
        let stop_words = get_stop_words();
        tokens.retain(|w| !stop_words.contains(w));
        tokens
    }
}

/// Stems ASCII terms only; other scripts pass through unchanged.
pub struct PorterStemmerTokenFilter;

impl TokenFilter for PorterStemmerTokenFilter {
    fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .map(|w| {
                if w.bytes().all(|b| b.is_ascii_alphabetic()) {
                    stem(&w)
                } else {
                    w
                }
            })
            .collect()
    }
}

/// Tokenizer plus filter chain, shared by indexing and querying.
pub struct TextAnalyzer {
    token_filters: Vec<Box<dyn TokenFilter>>,
}

impl TextAnalyzer {
    pub fn new(token_filters: Vec<Box<dyn TokenFilter>>) -> Self {
        Self { token_filters }
    }

    pub fn english() -> Self {
        Self::new(vec![
            Box::new(LowerCaseTokenFilter),
            Box::new(MinLengthTokenFilter::new(2)),
            Box::new(StopWordTokenFilter),
            Box::new(PorterStemmerTokenFilter),
        ])
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        word_re()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn analyze(&self, text: &str) -> Vec<String> {
        let mut tokens = self.tokenize(text);
        for filter in &self.token_filters {
            tokens = filter.filter(tokens);
        }
        tokens
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::english()
    }
}
