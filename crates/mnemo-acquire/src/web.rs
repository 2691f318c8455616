//! Web page acquisition strategies.
//!
//! Strategy 1 fetches static markup and extracts text from semantic content
//! containers, falling back to all paragraph-like elements when no container
//! is present. Strategy 2 delegates to a rendering-capable reader service
//! that executes client-side scripts and returns plain text, truncated to
//! bound downstream generation cost.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use mnemo_core::defaults::{
    ACQUIRE_USER_AGENT, CONTAINER_ELEMENT_MIN_LENGTH, PARAGRAPH_MIN_LENGTH,
};
use mnemo_core::{Error, Result};

use crate::strategy::TextSource;

/// Semantic containers tried in order; the first present on the page wins.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role='main']",
    "main",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".content",
];

/// Direct fetch-and-parse of static markup.
pub struct StaticPage<'a> {
    client: &'a Client,
    url: &'a str,
}

impl<'a> StaticPage<'a> {
    pub fn new(client: &'a Client, url: &'a str) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl TextSource for StaticPage<'_> {
    fn name(&self) -> &str {
        "static_page"
    }

    async fn try_acquire(&self, _cancel: &CancellationToken) -> Result<String> {
        let response = self
            .client
            .get(self.url)
            .header("User-Agent", ACQUIRE_USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: format!("fetching {}", self.url),
            });
        }

        let body = response.text().await?;
        Ok(extract_page_text(&body))
    }
}

/// Extract readable text from static HTML.
///
/// Scoped to the first matching content container; boilerplate never makes
/// it in because only p/h1/h2/h3/li descendants of that container are read.
/// Pages without a recognizable container fall back to every `body p`.
fn extract_page_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let element_selector = Selector::parse("p, h1, h2, h3, li").unwrap();

    let mut out = String::new();

    for selector_str in CONTENT_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(container) = doc.select(&selector).next() {
            debug!(selector = selector_str, "Found content container");
            for element in container.select(&element_selector) {
                let text = collapse_whitespace(&element.text().collect::<String>());
                if text.len() > CONTAINER_ELEMENT_MIN_LENGTH {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
            }
            break;
        }
    }

    if out.is_empty() {
        let paragraph_selector = Selector::parse("body p").unwrap();
        for element in doc.select(&paragraph_selector) {
            let text = collapse_whitespace(&element.text().collect::<String>());
            if text.len() > PARAGRAPH_MIN_LENGTH {
                out.push_str(&text);
                out.push_str("\n\n");
            }
        }
    }

    out.trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rendering reader service fallback for script-heavy pages.
pub struct RenderingReader<'a> {
    client: &'a Client,
    base_url: &'a str,
    url: &'a str,
    max_length: usize,
}

impl<'a> RenderingReader<'a> {
    pub fn new(client: &'a Client, base_url: &'a str, url: &'a str, max_length: usize) -> Self {
        Self {
            client,
            base_url,
            url,
            max_length,
        }
    }
}

#[async_trait]
impl TextSource for RenderingReader<'_> {
    fn name(&self) -> &str {
        "rendering_reader"
    }

    async fn try_acquire(&self, _cancel: &CancellationToken) -> Result<String> {
        let reader_url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.url);
        debug!(url = %reader_url, "Fetching via rendering reader");

        let response = self
            .client
            .get(&reader_url)
            .header("Accept", "text/plain")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: "rendering reader".to_string(),
            });
        }

        let mut content = response.text().await?;
        if content.len() > self.max_length {
            let mut cut = self.max_length;
            while !content.is_char_boundary(cut) {
                cut -= 1;
            }
            debug!(from = content.len(), to = cut, "Truncating reader content");
            content.truncate(cut);
        }

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_from_article_container() {
        let html = r#"
            <html><body>
              <nav><p>Home | About | Contact and other navigation junk</p></nav>
              <article>
                <h1>The Thermodynamics of Coffee</h1>
                <p>Coffee cools because heat flows from hot regions to cold ones.</p>
                <li>Entropy always increases in an isolated system over time.</li>
              </article>
              <footer><p>Copyright notice and legal boilerplate goes down here.</p></footer>
            </body></html>
        "#;
        let text = extract_page_text(html);
        assert!(text.contains("Thermodynamics of Coffee"));
        assert!(text.contains("heat flows"));
        assert!(text.contains("Entropy always increases"));
        assert!(!text.contains("navigation junk"));
        assert!(!text.contains("Copyright notice"));
    }

    #[test]
    fn test_skips_short_container_elements() {
        let html = r#"
            <article>
              <p>Ok</p>
              <p>This paragraph is comfortably longer than the element minimum.</p>
            </article>
        "#;
        let text = extract_page_text(html);
        assert!(!text.contains("Ok"));
        assert!(text.contains("comfortably longer"));
    }

    #[test]
    fn test_falls_back_to_body_paragraphs() {
        let html = r#"
            <html><body>
              <div>
                <p>No semantic container wraps this page's prose at all, sadly.</p>
                <p>tiny</p>
              </div>
            </body></html>
        "#;
        let text = extract_page_text(html);
        assert!(text.contains("No semantic container"));
        assert!(!text.contains("tiny"));
    }

    #[test]
    fn test_empty_container_falls_back_to_paragraphs() {
        let html = r#"
            <html><body>
              <main><span>inline only</span></main>
              <p>Paragraph text outside the container that is long enough to keep.</p>
            </body></html>
        "#;
        let text = extract_page_text(html);
        assert!(text.contains("outside the container"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  a\n  b\t c  "),
            "a b c"
        );
    }

    #[test]
    fn test_no_content_yields_empty() {
        assert_eq!(extract_page_text("<html><body></body></html>"), "");
    }
}
