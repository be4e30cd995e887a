//! # newsgraph
//!
//! Entity co-occurrence analytics for news corpora.
//!
//! The pipeline turns an article table into an enriched entity table in
//! six steps:
//!
//! ```text
//! articles → tagger (BIO tokens) → span merger → entity registry
//!          → link aggregation → weight filter → clique percolation
//!          → eigenvector centrality → merge-back → ner.csv / link.csv
//! ```
//!
//! The NER model is a collaborator behind the [`tagger::Tagger`] trait;
//! scraping and visualization layout stay outside this crate. See
//! [`pipeline::run`] for the full chain and [`pipeline::analyze`] for the
//! graph analytics half on its own.
//!
//! ```no_run
//! use newsgraph::pipeline;
//! use newsgraph::source::read_articles;
//! use newsgraph::tagger::HeuristicTagger;
//! use newsgraph::PipelineConfig;
//!
//! # fn main() -> newsgraph::Result<()> {
//! let articles = read_articles("data/articles.csv")?;
//! let config = PipelineConfig::default();
//! let output = pipeline::run(&HeuristicTagger::new(), &articles, &config)?;
//! newsgraph::export::write_entities("data/ner.csv", &output.entities)?;
//! newsgraph::export::write_links("data/link.csv", &output.links)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod centrality;
pub mod community;
pub mod cooccur;
pub mod error;
pub mod export;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod source;
pub mod tagger;
pub mod upload;

pub use error::{Error, Result};
pub use pipeline::{PipelineOutput, RunMetadata};
pub use source::Article;
pub use tagger::{HeuristicTagger, MockTagger, Tagger};

// Re-export the core data model so binaries only need one dependency.
pub use newsgraph_core::{
    CentralityMode, CooccurGraph, Entity, EntityRegistry, EntityType, Link, PipelineConfig,
};
