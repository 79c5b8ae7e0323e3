//! CSS-selector based extraction
//!
//! Each element matching the container selector becomes at most one record.
//! Within a container, the first match of each field selector is used:
//! text content for title, description and price; `href` then `src` for the
//! link and image fields.

use crate::extract::{Extractor, Record};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use url::Url;

/// CSS selectors used by `SelectorExtractor`
///
/// An empty selector disables its field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub container: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub price: String,
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: "article, .item, .product, .post".to_string(),
            title: "h1, h2, h3, .title, .name".to_string(),
            description: "p, .description, .summary".to_string(),
            url: "a".to_string(),
            price: ".price, .cost".to_string(),
            image: "img".to_string(),
        }
    }
}

/// Compiled field selectors; `None` means the field is skipped
#[derive(Debug)]
struct FieldSelectors {
    title: Option<Selector>,
    description: Option<Selector>,
    url: Option<Selector>,
    price: Option<Selector>,
    image: Option<Selector>,
}

/// Extractor driven by a `SelectorConfig`
#[derive(Debug)]
pub struct SelectorExtractor {
    config: SelectorConfig,
    container: Option<Selector>,
    fields: FieldSelectors,
}

/// Compiles a selector, logging a warning if it is invalid
fn compile(field: &str, selector: &str) -> Option<Selector> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::warn!("Invalid {} selector '{}': {:?}", field, selector, e);
            None
        }
    }
}

impl SelectorExtractor {
    pub fn new(config: SelectorConfig) -> Self {
        let container = compile("container", &config.container);
        let fields = FieldSelectors {
            title: compile("title", &config.title),
            description: compile("description", &config.description),
            url: compile("url", &config.url),
            price: compile("price", &config.price),
            image: compile("image", &config.image),
        };

        Self {
            config,
            container,
            fields,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn extract_container(&self, container: ElementRef<'_>, base_url: &Url) -> Option<Record> {
        let record = Record {
            title: first_text(container, self.fields.title.as_ref()),
            description: first_text(container, self.fields.description.as_ref()),
            url: first_link(container, self.fields.url.as_ref(), base_url),
            price: first_text(container, self.fields.price.as_ref()),
            image_url: first_link(container, self.fields.image.as_ref(), base_url),
        };

        record.is_meaningful().then_some(record)
    }
}

impl Default for SelectorExtractor {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, base_url: &Url) -> Vec<Record> {
        let Some(container_selector) = self.container.as_ref() else {
            return Vec::new();
        };

        let document = Html::parse_document(html);
        let containers: Vec<ElementRef<'_>> = document.select(container_selector).collect();

        if containers.is_empty() {
            tracing::warn!(
                "No containers found with selector '{}' on {}",
                self.config.container,
                base_url
            );
            return Vec::new();
        }

        tracing::debug!(
            "Found {} containers with selector '{}'",
            containers.len(),
            self.config.container
        );

        containers
            .into_iter()
            .filter_map(|container| self.extract_container(container, base_url))
            .collect()
    }
}

/// Text of the first match, trimmed with inner whitespace collapsed
fn first_text(container: ElementRef<'_>, selector: Option<&Selector>) -> Option<String> {
    let element = container.select(selector?).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    (!normalized.is_empty()).then_some(normalized)
}

/// `href` (or else `src`) of the first match, resolved against the page URL
fn first_link(container: ElementRef<'_>, selector: Option<&Selector>, base_url: &Url) -> Option<String> {
    let element = container.select(selector?).next()?;
    let value = element.value();

    let raw = value
        .attr("href")
        .filter(|href| !href.trim().is_empty())
        .or_else(|| value.attr("src"))?;

    resolve_link(raw, base_url)
}

/// Resolves a link to an absolute HTTP(S) URL
///
/// Returns None if the link should be dropped:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// # Example
///
/// ```
/// use polite_scraper::extract::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/shop/").unwrap();
/// assert_eq!(resolve_link("item/1", &base).as_deref(), Some("https://example.com/shop/item/1"));
/// assert_eq!(resolve_link("mailto:a@b.c", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!("Invalid URL format '{}': {}", href, e);
            None
        }
    }
}
