use crate::chunking::normalize_whitespace;
use crate::{ConvertError, Document, FetchedPage, SkippedSource};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use tracing::warn;
use url::Url;

const SKIPPED_ELEMENTS: [&str; 6] = ["script", "style", "noscript", "template", "head", "svg"];

/// Strips markup from HTML pages and turns them into documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlToDocument;

impl HtmlToDocument {
    pub fn convert(&self, html: &str, source: Option<&Url>) -> Result<Document, ConvertError> {
        let parsed = Html::parse_document(html);
        let content = extract_text(&parsed);

        if content.is_empty() {
            let origin = source
                .map(|url| url.to_string())
                .unwrap_or_else(|| "inline html".to_string());
            return Err(ConvertError::EmptyContent(origin));
        }

        let title = extract_title(&parsed)
            .or_else(|| source.and_then(title_from_url))
            .unwrap_or_default();

        Ok(Document::new(title, content, source.cloned()))
    }

    /// Converts fetched pages, skipping the ones without readable text.
    pub fn convert_pages(&self, pages: &[FetchedPage]) -> (Vec<Document>, Vec<SkippedSource>) {
        let mut documents = Vec::new();
        let mut skipped = Vec::new();

        for page in pages {
            match self.convert(&page.content, Some(&page.url)) {
                Ok(document) => documents.push(document),
                Err(error) => {
                    warn!(url = %page.url, reason = %error, "skipping page conversion");
                    skipped.push(SkippedSource::new(page.url.as_str(), error));
                }
            }
        }

        (documents, skipped)
    }

    pub fn convert_file(&self, path: &Path) -> Result<Document, ConvertError> {
        let html = std::fs::read_to_string(path)?;
        let document = self.convert(&html, None)?;
        if document.title.is_empty() {
            return Ok(Document::new(file_title(path), document.content, None));
        }
        Ok(document)
    }
}

/// Plain text sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextToDocument;

impl TextToDocument {
    pub fn convert(&self, text: &str, title: Option<&str>) -> Result<Document, ConvertError> {
        if text.trim().is_empty() {
            return Err(ConvertError::EmptyContent(
                title.unwrap_or("inline text").to_string(),
            ));
        }
        Ok(Document::new(title.unwrap_or_default(), text, None))
    }

    pub fn convert_file(&self, path: &Path) -> Result<Document, ConvertError> {
        let text = std::fs::read_to_string(path)?;
        self.convert(&text, Some(&file_title(path)))
    }
}

fn extract_text(parsed: &Html) -> String {
    let mut raw = String::new();
    collect_text(parsed.root_element(), &mut raw);

    raw.lines()
        .map(normalize_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let s = text.trim();
            if s.is_empty() {
                continue;
            }
            if !out.is_empty() && !out.ends_with(char::is_whitespace) {
                out.push(' ');
            }
            out.push_str(s);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            let block = is_block_like(name);
            if block && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            collect_text(child_element, out);
            if block && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }
}

fn is_block_like(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "main"
            | "aside"
            | "header"
            | "footer"
            | "nav"
            | "li"
            | "ul"
            | "ol"
            | "table"
            | "tr"
            | "br"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "blockquote"
            | "pre"
    )
}

fn extract_title(parsed: &Html) -> Option<String> {
    ["title", "h1", "h2", "h3"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        parsed
            .select(&selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn title_from_url(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).last())
        .map(|segment| segment.to_string())
        .or_else(|| url.host_str().map(|host| host.to_string()))
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
