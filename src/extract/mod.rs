//! Record extraction from fetched HTML
//!
//! The orchestrator hands every successfully fetched body to an `Extractor`.
//! Extraction is pure: no network access, and malformed markup yields partial
//! or empty results rather than errors.

mod selectors;

pub use selectors::{resolve_link, SelectorConfig, SelectorExtractor};

use serde::{Deserialize, Serialize};
use url::Url;

/// One extracted item
///
/// Field order is the column order of tabular output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub price: Option<String>,
    pub image_url: Option<String>,
}

impl Record {
    /// Returns true if the record carries enough data to be kept
    pub fn is_meaningful(&self) -> bool {
        self.title.is_some() || self.url.is_some()
    }
}

/// Turns a fetched HTML page into records
pub trait Extractor: Send + Sync {
    /// Extracts records from `html`, resolving links against `base_url`
    fn extract(&self, html: &str, base_url: &Url) -> Vec<Record>;
}
