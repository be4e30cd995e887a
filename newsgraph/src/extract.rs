//! Per-document entity extraction and the corpus-wide merge.
//!
//! Documents are independent, so extraction fans out with rayon; the
//! corpus-wide registry is then built by a single writer folding the
//! per-document results in article order, which keeps the
//! first-occurrence type policy deterministic regardless of thread
//! scheduling.

use std::collections::HashSet;

use log::{debug, warn};
use rayon::prelude::*;

use newsgraph_core::{ArticleId, EntityRegistry, EntitySpan, PipelineConfig};

use crate::merge::merge_sentence;
use crate::source::Article;
use crate::tagger::Tagger;

/// Deduplicated entity spans of one document, in first-occurrence order.
#[derive(Debug, Clone)]
pub struct DocumentEntities {
    /// Source article id.
    pub article_id: ArticleId,
    /// One span per distinct text, type from first occurrence.
    pub spans: Vec<EntitySpan>,
}

/// Normalize article text: line breaks and tabs become spaces, runs of
/// whitespace collapse to one space.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split article content into tagger-sized sentences: paragraphs separated
/// by blank lines, each normalized with [`clean_text`].
#[must_use]
pub fn split_sentences(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract one document's deduplicated entity spans.
///
/// A tagging failure costs the sentence, not the document: the sentence is
/// logged and skipped.
pub fn extract_document<T: Tagger + ?Sized>(
    tagger: &T,
    article: &Article,
    config: &PipelineConfig,
) -> DocumentEntities {
    let mut spans = Vec::new();
    let mut seen = HashSet::new();
    for sentence in split_sentences(&article.content) {
        let tokens = match tagger.tag(&sentence) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(
                    "article {}: tagger {} failed on sentence, skipping: {err}",
                    article.id,
                    tagger.name()
                );
                continue;
            }
        };
        for span in merge_sentence(&tokens, &config.accepted_entity_types) {
            if seen.insert(span.text.clone()) {
                spans.push(span);
            }
        }
    }
    debug!("article {}: {} distinct entities", article.id, spans.len());
    DocumentEntities {
        article_id: article.id,
        spans,
    }
}

/// Extract every document in parallel, then merge into the corpus registry.
///
/// The parallel phase only produces per-document results; the registry is
/// filled sequentially in article order, so the output is identical with
/// and without parallelism.
pub fn extract_corpus<T: Tagger + Sync + ?Sized>(
    tagger: &T,
    articles: &[Article],
    config: &PipelineConfig,
) -> (EntityRegistry, Vec<DocumentEntities>) {
    let documents: Vec<DocumentEntities> = articles
        .par_iter()
        .map(|article| extract_document(tagger, article, config))
        .collect();

    let mut registry = EntityRegistry::new();
    for doc in &documents {
        for span in &doc.spans {
            registry.register(span);
        }
    }
    (registry, documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::MockTagger;
    use newsgraph_core::EntityType;

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("a\tb\r\nc   d"), "a b c d");
        assert_eq!(clean_text("  \n "), "");
    }

    #[test]
    fn sentences_are_blank_line_paragraphs() {
        let content = "Đoạn một\ncùng dòng.\n\nĐoạn   hai.\n\n\n\nĐoạn ba.";
        assert_eq!(
            split_sentences(content),
            ["Đoạn một cùng dòng.", "Đoạn hai.", "Đoạn ba."]
        );
    }

    #[test]
    fn document_spans_are_deduplicated_in_order() {
        let tagger = MockTagger::new()
            .with_sentence("Apple kiện Samsung", [
                ("Apple", "B-ORG"),
                ("kiện", "O"),
                ("Samsung", "B-ORG"),
            ])
            .with_sentence("Samsung phản hồi", [
                ("Samsung", "B-ORG"),
                ("phản", "O"),
                ("hồi", "O"),
            ]);
        let article = Article::new(1, "Apple kiện Samsung\n\nSamsung phản hồi");
        let doc = extract_document(&tagger, &article, &PipelineConfig::default());
        let texts: Vec<_> = doc.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["Apple", "Samsung"]);
    }

    #[test]
    fn tagging_failure_skips_sentence_only() {
        let tagger = MockTagger::new()
            .failing_on("hỏng hoàn toàn")
            .with_sentence("VinFast mở nhà máy", [
                ("VinFast", "B-ORG"),
                ("mở", "O"),
                ("nhà", "O"),
                ("máy", "O"),
            ]);
        let article = Article::new(9, "hỏng hoàn toàn\n\nVinFast mở nhà máy");
        let doc = extract_document(&tagger, &article, &PipelineConfig::default());
        assert_eq!(doc.spans.len(), 1);
        assert_eq!(doc.spans[0].text, "VinFast");
    }

    #[test]
    fn corpus_merge_is_article_ordered() {
        let tagger = MockTagger::new()
            .with_sentence("Apple ra mắt", [("Apple", "B-ORG"), ("ra", "O"), ("mắt", "O")])
            .with_sentence("Apple bị kiện", [("Apple", "B-PER"), ("bị", "O"), ("kiện", "O")]);
        let articles = vec![
            Article::new(1, "Apple ra mắt"),
            Article::new(2, "Apple bị kiện"),
        ];
        let (registry, documents) =
            extract_corpus(&tagger, &articles, &PipelineConfig::default());
        assert_eq!(registry.len(), 1);
        // First occurrence (article 1, ORG) wins the type.
        assert_eq!(
            registry.get("Apple").unwrap().entity_type,
            EntityType::Organization
        );
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].article_id, 1);
    }
}
