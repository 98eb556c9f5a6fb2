//! Property-based tests for the content chunker.

use proptest::prelude::*;

use operant::domain::models::{ChunkerConfig, ContainerSection, LeafSection};
use operant::services::ContentChunker;

fn chunker(max: usize, overlap: usize) -> ContentChunker {
    ContentChunker::with_config(ChunkerConfig {
        max_chunk_size: max,
        overlap_size: overlap,
        // min == max so grouping always kicks in once the budget is hit.
        min_chunk_size: max,
    })
    .unwrap()
}

fn doc(text: &str) -> ContainerSection {
    ContainerSection::new("doc", "Doc").with_leaf(LeafSection::new("leaf", "", text))
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

proptest! {
    /// Every produced chunk stays within the size budget; individual
    /// words here are short enough that no atomic unit exceeds it.
    #[test]
    fn chunks_respect_the_size_bound(
        words in prop::collection::vec("[a-z]{1,10}", 1..200),
    ) {
        let text = words.join(" ");
        let chunks = chunker(120, 20).chunk_container(&doc(&text));

        for chunk in &chunks {
            prop_assert!(
                chunk.text.len() <= 120,
                "chunk of {} chars exceeds the budget",
                chunk.text.len()
            );
        }
    }

    /// No leaf content is silently dropped: every sentence of the input
    /// appears intact in at least one chunk.
    #[test]
    fn no_content_is_dropped(
        sentences in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,6}\\.", 1..40),
    ) {
        let text = sentences.join(" ");
        let chunks = chunker(120, 20).chunk_container(&doc(&text));
        let corpus: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        for sentence in &sentences {
            prop_assert!(
                corpus.contains(sentence.as_str()),
                "sentence '{sentence}' was dropped"
            );
        }
    }

    /// With overlap disabled, concatenating the chunks reconstructs the
    /// original text modulo whitespace.
    #[test]
    fn zero_overlap_concatenation_reconstructs_the_text(
        sentences in prop::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,6}\\.", 1..30),
    ) {
        let text = sentences.join(" ");
        let chunks = chunker(100, 0).chunk_container(&doc(&text));
        let corpus: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        prop_assert_eq!(normalize(&corpus), normalize(&text));
    }

    /// Chunking is deterministic apart from generated ids.
    #[test]
    fn chunking_is_deterministic(
        words in prop::collection::vec("[a-z]{1,10}", 1..120),
    ) {
        let text = words.join(" ");
        let c = chunker(100, 25);
        let first: Vec<String> = c
            .chunk_container(&doc(&text))
            .into_iter()
            .map(|chunk| chunk.text)
            .collect();
        let second: Vec<String> = c
            .chunk_container(&doc(&text))
            .into_iter()
            .map(|chunk| chunk.text)
            .collect();
        prop_assert_eq!(first, second);
    }
}
