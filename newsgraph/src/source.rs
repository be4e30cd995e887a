//! Article table ingest.
//!
//! Articles arrive as a CSV table (`id, url, title, pubDate, category,
//! content`) produced by the scraping layer. Rows without usable content
//! are skipped with a warning carrying the row identifier; a broken row
//! never aborts the corpus.

use std::path::Path;

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};

use newsgraph_core::ArticleId;

use crate::error::Result;

/// One source article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Table-assigned identifier.
    pub id: ArticleId,
    /// Source URL.
    pub url: String,
    /// Headline.
    pub title: String,
    /// Publication date, when the source provided a parseable one.
    #[serde(rename = "pubDate")]
    pub pub_date: Option<NaiveDate>,
    /// Feed category.
    pub category: Option<String>,
    /// Article body text.
    pub content: String,
}

impl Article {
    /// Create an article with just an id and content, for tests and
    /// synthetic corpora.
    #[must_use]
    pub fn new(id: ArticleId, content: impl Into<String>) -> Self {
        Self {
            id,
            url: String::new(),
            title: String::new(),
            pub_date: None,
            category: None,
            content: content.into(),
        }
    }
}

/// Raw CSV row; every field optional so one malformed row degrades to a
/// warning instead of failing the whole read.
#[derive(Debug, Deserialize)]
struct RawArticle {
    id: Option<ArticleId>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "pubDate", alias = "pub_date", default)]
    pub_date: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Read the article table from a CSV file.
///
/// Rows missing an id or content are skipped with a warning. An unparseable
/// publication date degrades to `None`. Only an unreadable file or a broken
/// CSV structure is an error.
pub fn read_articles(path: impl AsRef<Path>) -> Result<Vec<Article>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let mut articles = Vec::new();
    for (row, record) in reader.deserialize::<RawArticle>().enumerate() {
        let line = row + 2; // header is line 1
        let raw = match record {
            Ok(raw) => raw,
            Err(err) => {
                warn!("skipping unreadable article row at line {line}: {err}");
                continue;
            }
        };
        let Some(id) = raw.id else {
            warn!("skipping article row at line {line}: missing id");
            continue;
        };
        let content = raw.content.unwrap_or_default();
        if content.trim().is_empty() {
            warn!("skipping article {id}: missing or empty content");
            continue;
        }
        let pub_date = raw.pub_date.as_deref().and_then(|s| parse_pub_date(id, s));
        articles.push(Article {
            id,
            url: raw.url.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            pub_date,
            category: raw.category,
            content,
        });
    }
    Ok(articles)
}

fn parse_pub_date(id: ArticleId, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!("article {id}: unparseable pubDate {raw:?}: {err}");
            None
        }
    }
}
