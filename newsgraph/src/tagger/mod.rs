//! NER collaborator interface.
//!
//! The pipeline treats the tagger as a black-box token classifier: one call
//! per sentence, one BIO-tagged [`Token`] per word. Backends implement
//! [`Tagger`]; the capitalization heuristic in [`heuristic`] keeps the
//! binary usable without an external model, and [`MockTagger`] scripts
//! exact outputs for tests.

pub mod heuristic;

use std::collections::{HashMap, HashSet};

use newsgraph_core::Token;

use crate::error::{Error, Result};

pub use heuristic::HeuristicTagger;

/// Trait for NER tagger backends.
pub trait Tagger: Send + Sync {
    /// Tag one sentence, returning one token per word in input order.
    ///
    /// A failure is per-sentence: the caller logs it and continues with the
    /// next sentence rather than aborting the document.
    fn tag(&self, sentence: &str) -> Result<Vec<Token>>;

    /// Backend name for logs.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// Scripted tagger for tests.
///
/// Sentences registered with [`MockTagger::with_sentence`] return their
/// script; sentences registered with [`MockTagger::failing_on`] return a
/// tagging error; everything else tags every whitespace-separated word `O`.
#[derive(Debug, Clone, Default)]
pub struct MockTagger {
    scripts: HashMap<String, Vec<(String, String)>>,
    failures: HashSet<String>,
}

impl MockTagger {
    /// Create a mock with no scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a sentence as `(word, raw_label)` pairs.
    #[must_use]
    pub fn with_sentence<W, L>(
        mut self,
        sentence: impl Into<String>,
        tokens: impl IntoIterator<Item = (W, L)>,
    ) -> Self
    where
        W: Into<String>,
        L: Into<String>,
    {
        self.scripts.insert(
            sentence.into(),
            tokens
                .into_iter()
                .map(|(w, l)| (w.into(), l.into()))
                .collect(),
        );
        self
    }

    /// Make a sentence fail with a tagging error.
    #[must_use]
    pub fn failing_on(mut self, sentence: impl Into<String>) -> Self {
        self.failures.insert(sentence.into());
        self
    }
}

impl Tagger for MockTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<Token>> {
        if self.failures.contains(sentence) {
            return Err(Error::tagging(format!(
                "mock failure for sentence {sentence:?}"
            )));
        }
        if let Some(script) = self.scripts.get(sentence) {
            return Ok(script
                .iter()
                .map(|(word, label)| Token::new(word.clone(), label))
                .collect());
        }
        Ok(sentence
            .split_whitespace()
            .map(|word| Token::new(word, "O"))
            .collect())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
