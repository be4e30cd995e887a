//! BIO span merging.
//!
//! Decoded tags drive a small state machine: a buffer of words and the type
//! it is being collected under. `B-` and type changes cut the buffer, `I-`
//! of the same type extends it, anything outside the accepted type set
//! flushes it. A finalized multi-word span poisons its fragments (each word
//! and each adjacent word pair) for the rest of the sentence, so "Văn"
//! cannot resurface as its own entity after "Nguyễn Văn A" was merged.

use std::collections::{BTreeSet, HashSet};

use newsgraph_core::{EntitySpan, EntityType, Token};

/// Merge one sentence's token stream into entity spans, in token order.
#[must_use]
pub fn merge_sentence(tokens: &[Token], accepted: &BTreeSet<EntityType>) -> Vec<EntitySpan> {
    let mut merger = SpanMerger::new(accepted);
    for token in tokens {
        merger.push(token);
    }
    merger.finish()
}

struct SpanMerger<'a> {
    accepted: &'a BTreeSet<EntityType>,
    buffer: Vec<String>,
    current_type: Option<EntityType>,
    excluded: HashSet<String>,
    spans: Vec<EntitySpan>,
}

impl<'a> SpanMerger<'a> {
    fn new(accepted: &'a BTreeSet<EntityType>) -> Self {
        Self {
            accepted,
            buffer: Vec::new(),
            current_type: None,
            excluded: HashSet::new(),
            spans: Vec::new(),
        }
    }

    fn push(&mut self, token: &Token) {
        match token.tag.entity_type() {
            Some(ty) if self.accepted.contains(ty) => {
                if token.tag.is_begin() || self.current_type.as_ref() != Some(ty) {
                    self.finalize_buffer();
                    self.current_type = Some(ty.clone());
                }
                self.buffer.push(token.word.clone());
            }
            // `O`, or a type outside the accepted set: cut the span here.
            _ => self.finalize_buffer(),
        }
    }

    fn finish(mut self) -> Vec<EntitySpan> {
        self.finalize_buffer();
        self.spans
    }

    fn finalize_buffer(&mut self) {
        let Some(entity_type) = self.current_type.take() else {
            self.buffer.clear();
            return;
        };
        let words = std::mem::take(&mut self.buffer);
        if words.is_empty() {
            return;
        }
        let text = words.join(" ");

        if accept_span(&text) && !self.excluded.contains(&text) {
            self.spans.push(EntitySpan::new(text, entity_type));
        }
        if words.len() > 1 {
            self.record_fragments(&words);
        }
    }

    /// Poison each word and each adjacent word pair of a merged multi-word
    /// span for the rest of the sentence.
    fn record_fragments(&mut self, words: &[String]) {
        for word in words {
            self.excluded.insert(word.clone());
        }
        for pair in words.windows(2) {
            self.excluded.insert(pair.join(" "));
        }
    }
}

/// Span rejection rules: the first character must be alphanumeric and the
/// text must be longer than one character.
fn accept_span(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    first.is_alphanumeric() && text.chars().count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(types: &[EntityType]) -> BTreeSet<EntityType> {
        types.iter().cloned().collect()
    }

    fn tokens(pairs: &[(&str, &str)]) -> Vec<Token> {
        pairs.iter().map(|(w, l)| Token::new(*w, l)).collect()
    }

    #[test]
    fn merges_bio_run_and_filters_types() {
        let sentence = tokens(&[
            ("Nguyễn", "B-PER"),
            ("Văn", "I-PER"),
            ("A", "I-PER"),
            ("đến", "O"),
            ("Hà", "B-LOC"),
            ("Nội", "I-LOC"),
        ]);
        let spans = merge_sentence(&sentence, &accepted(&[EntityType::Person]));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Nguyễn Văn A");
        assert_eq!(spans[0].entity_type, EntityType::Person);
    }

    #[test]
    fn begin_tag_cuts_previous_span() {
        let sentence = tokens(&[("Hoa", "B-PER"), ("Lan", "B-PER"), ("Anh", "I-PER")]);
        let spans = merge_sentence(&sentence, &accepted(&[EntityType::Person]));
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Hoa", "Lan Anh"]);
    }

    #[test]
    fn type_change_without_begin_cuts_span() {
        let sentence = tokens(&[("VTV", "I-ORG"), ("Trang", "I-PER"), ("Anh", "I-PER")]);
        let spans = merge_sentence(
            &sentence,
            &accepted(&[EntityType::Person, EntityType::Organization]),
        );
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["VTV", "Trang Anh"]);
    }

    #[test]
    fn fragments_of_merged_span_are_excluded() {
        let sentence = tokens(&[
            ("Nguyễn", "B-PER"),
            ("Văn", "I-PER"),
            ("A", "I-PER"),
            ("gặp", "O"),
            ("Văn", "B-PER"),
            ("Nguyễn", "B-PER"),
            ("Văn", "I-PER"),
        ]);
        let spans = merge_sentence(&sentence, &accepted(&[EntityType::Person]));
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        // "Văn" and "Nguyễn Văn" are fragments of "Nguyễn Văn A"
        assert_eq!(texts, ["Nguyễn Văn A"]);
    }

    #[test]
    fn short_and_non_alphanumeric_spans_are_rejected() {
        let sentence = tokens(&[
            ("A", "B-PER"),
            ("rồi", "O"),
            ("(Reuters", "B-ORG"),
            ("x", "B-PER"),
        ]);
        let spans = merge_sentence(
            &sentence,
            &accepted(&[EntityType::Person, EntityType::Organization]),
        );
        assert!(spans.is_empty());
    }

    #[test]
    fn unaccepted_type_cuts_accepted_run() {
        // LOC in the middle must flush the PER buffer.
        let sentence = tokens(&[
            ("Hoa", "B-PER"),
            ("Mai", "I-PER"),
            ("Nội", "I-LOC"),
            ("Bài", "I-LOC"),
        ]);
        let spans = merge_sentence(&sentence, &accepted(&[EntityType::Person]));
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Hoa Mai"]);
    }

    #[test]
    fn output_preserves_token_order() {
        let sentence = tokens(&[
            ("Apple", "B-ORG"),
            ("và", "O"),
            ("Samsung", "B-ORG"),
            ("cùng", "O"),
            ("Sony", "B-ORG"),
        ]);
        let spans = merge_sentence(&sentence, &accepted(&[EntityType::Organization]));
        let texts: Vec<_> = spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Apple", "Samsung", "Sony"]);
    }
}
