//! HTTP upload adapter.
//!
//! Pushes articles, nodes, and edges as JSON to the graph API, renaming
//! fields to the server schema (`entity` → `name`, `from` → `source`,
//! `to` → `target`, `weight` → `size`, `article_ids` → `articles`).
//! Articles and edges go up in fixed-size chunks. Non-2xx responses and
//! transport errors are retried under an injected [`RetryPolicy`];
//! exhausting the policy fails the chunk.

use std::time::Duration;

use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use newsgraph_core::{Entity, Link};

use crate::error::{Error, Result};
use crate::source::Article;

/// Articles per POST.
pub const ARTICLE_CHUNK: usize = 10;
/// Edges per POST.
pub const EDGE_CHUNK: usize = 20;

/// Bounded retry: a fixed number of attempts with a fixed delay between
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Blocking uploader for one API base URL.
#[derive(Debug)]
pub struct Uploader {
    client: reqwest::blocking::Client,
    base_url: String,
    policy: RetryPolicy,
}

#[derive(Serialize)]
struct ArticlePayload<'a> {
    url: &'a str,
    title: &'a str,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    category: Option<&'a str>,
    content: &'a str,
}

#[derive(Serialize)]
struct NodePayload<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    entity_type: &'a str,
    cluster: i64,
    score: f64,
}

#[derive(Serialize)]
struct EdgePayload {
    source: Uuid,
    target: Uuid,
    size: u64,
    articles: Vec<String>,
}

impl Uploader {
    /// Create an uploader with the default retry policy.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::blocking::Client::new(),
            base_url,
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload the article table in chunks of [`ARTICLE_CHUNK`].
    pub fn upload_articles(&self, articles: &[Article]) -> Result<()> {
        let url = format!("{}/article", self.base_url);
        for chunk in articles.chunks(ARTICLE_CHUNK) {
            let payload: Vec<ArticlePayload<'_>> = chunk.iter().map(article_payload).collect();
            self.post_with_retry(&url, &payload)?;
        }
        info!("uploaded {} articles", articles.len());
        Ok(())
    }

    /// Upload the node table in one POST.
    pub fn upload_nodes(&self, entities: &[Entity]) -> Result<()> {
        let url = format!("{}/node", self.base_url);
        let payload: Vec<NodePayload<'_>> = entities.iter().map(node_payload).collect();
        self.post_with_retry(&url, &payload)?;
        info!("uploaded {} nodes", entities.len());
        Ok(())
    }

    /// Upload the link table in chunks of [`EDGE_CHUNK`].
    pub fn upload_edges(&self, links: &[Link]) -> Result<()> {
        let url = format!("{}/edge", self.base_url);
        for chunk in links.chunks(EDGE_CHUNK) {
            let payload: Vec<EdgePayload> = chunk.iter().map(edge_payload).collect();
            self.post_with_retry(&url, &payload)?;
        }
        info!("uploaded {} edges", links.len());
        Ok(())
    }

    fn post_with_retry<P: Serialize>(&self, url: &str, payload: &P) -> Result<()> {
        let mut last_failure = String::new();
        for attempt in 1..=self.policy.max_attempts {
            match self.client.post(url).json(payload).send() {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().unwrap_or_default();
                    last_failure = format!("{status}: {body}");
                    warn!("POST {url} attempt {attempt} failed with {status}");
                }
                Err(err) => {
                    last_failure = err.to_string();
                    warn!("POST {url} attempt {attempt} failed: {err}");
                }
            }
            if attempt < self.policy.max_attempts {
                std::thread::sleep(self.policy.delay);
            }
        }
        Err(Error::Upload {
            attempts: self.policy.max_attempts,
            message: last_failure,
        })
    }
}

fn article_payload(article: &Article) -> ArticlePayload<'_> {
    ArticlePayload {
        url: &article.url,
        title: &article.title,
        pub_date: article.pub_date.map(|d| d.format("%Y-%m-%d").to_string()),
        category: article.category.as_deref(),
        content: &article.content,
    }
}

fn node_payload(entity: &Entity) -> NodePayload<'_> {
    NodePayload {
        name: &entity.text,
        entity_type: entity.entity_type.as_label(),
        cluster: entity.cluster,
        score: entity.score,
    }
}

fn edge_payload(link: &Link) -> EdgePayload {
    EdgePayload {
        source: link.from,
        target: link.to,
        size: link.weight,
        articles: link.article_ids.iter().map(|id| id.to_string()).collect(),
    }
}
