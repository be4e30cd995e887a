//! Capitalization-heuristic fallback tagger.
//!
//! Zero-dependency backend so the pipeline runs end to end without an
//! external model. Runs of capitalized words become entity spans; an
//! organization suffix anywhere in the run tags the whole run `ORG`,
//! otherwise it defaults to `PER`. Precision is what a capitalization
//! heuristic buys and no more.

use newsgraph_core::Token;

use super::Tagger;
use crate::error::Result;

// High-precision patterns, kept small on purpose.
const ORG_SUFFIX: &[&str] = &[
    "inc.",
    "inc",
    "corp.",
    "corp",
    "ltd.",
    "ltd",
    "llc",
    "co.",
    "plc",
    "gmbh",
    "group",
    "bank",
    "agency",
    "foundation",
    "institute",
    "university",
    "company",
    "corporation",
    "holdings",
];

const PERSON_PREFIX: &[&str] = &[
    "mr.", "mr", "ms.", "ms", "mrs.", "mrs", "dr.", "dr", "prof.", "prof",
];

// Words that commonly start sentences capitalized without being entities.
const COMMON_SENTENCE_STARTERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "it", "he", "she", "we", "they", "in",
    "on", "at", "to", "for", "from", "by", "with", "and", "but", "or", "so", "if", "when",
    "after", "before", "today", "yesterday", "tomorrow",
];

/// Heuristic BIO tagger driven by capitalization runs.
#[derive(Debug, Clone, Default)]
pub struct HeuristicTagger;

impl HeuristicTagger {
    /// Create a heuristic tagger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Tagger for HeuristicTagger {
    fn tag(&self, sentence: &str) -> Result<Vec<Token>> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let mut labels = vec![None::<String>; words.len()];

        let mut i = 0;
        while i < words.len() {
            if !is_candidate(words[i], i == 0) {
                i += 1;
                continue;
            }
            let start = i;
            while i < words.len() && is_candidate(words[i], false) {
                i += 1;
            }
            let run = &words[start..i];
            let ty = classify_run(run, start, &words);
            for (offset, label) in labels[start..i].iter_mut().enumerate() {
                let prefix = if offset == 0 { "B" } else { "I" };
                *label = Some(format!("{prefix}-{ty}"));
            }
        }

        Ok(words
            .iter()
            .zip(labels)
            .map(|(word, label)| Token::new(*word, label.as_deref().unwrap_or("O")))
            .collect())
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// A word joins a capitalization run when its first alphabetic character is
/// uppercase. Sentence starters from the common-word list are skipped at
/// position 0, where capitalization carries no signal.
fn is_candidate(word: &str, sentence_start: bool) -> bool {
    let core = word.trim_matches(|c: char| !c.is_alphanumeric());
    let Some(first) = core.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    if sentence_start && COMMON_SENTENCE_STARTERS.contains(&core.to_lowercase().as_str()) {
        return false;
    }
    true
}

fn classify_run(run: &[&str], start: usize, words: &[&str]) -> &'static str {
    // A person title before the run outranks any org suffix inside it.
    if start > 0 {
        let prev = words[start - 1].to_lowercase();
        if PERSON_PREFIX.contains(&prev.as_str()) {
            return "PER";
        }
    }
    if run
        .iter()
        .any(|w| ORG_SUFFIX.contains(&w.to_lowercase().as_str()))
    {
        return "ORG";
    }
    "PER"
}
