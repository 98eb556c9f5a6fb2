//! Content chunker: section trees in, bounded overlapping chunks out.
//!
//! Chunking is deterministic and order-preserving: leaves are collected
//! depth-first, grouped greedily while they fit the size budget, and an
//! oversized leaf is split alone: first on paragraph boundaries, then on
//! sentence boundaries, with raw character count as a last resort.
//! Split chunks after the first carry an overlap prefix taken from the
//! tail of the previous chunk, trimmed to a sentence or word boundary.
//!
//! `min_chunk_size` is the threshold for whether multi-leaf splitting is
//! worthwhile at all: a container whose total content stays at or under
//! it becomes a single chunk. It is not a floor on produced chunk sizes.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::models::{Chunk, ChunkerConfig, ContainerSection, LeafSection};

/// Separator cost between leaves combined into one chunk (blank line).
const LEAF_SEPARATOR_LEN: usize = 2;

/// Splits hierarchical documents into retrievable chunks.
#[derive(Debug, Clone, Default)]
pub struct ContentChunker {
    config: ChunkerConfig,
}

impl ContentChunker {
    /// Create a chunker with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chunker with custom limits.
    pub fn with_config(config: ChunkerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid chunker config: {e}"))?;
        Ok(Self { config })
    }

    /// Chunk every leaf under the container, depth-first.
    pub fn chunk_container(&self, container: &ContainerSection) -> Vec<Chunk> {
        let leaves = container.leaves();
        if leaves.is_empty() {
            return Vec::new();
        }

        let total: usize = leaves.iter().map(|l| l.content_len()).sum();

        // Small containers, and containers where splitting is not
        // worthwhile, become a single combined chunk.
        if total <= self.config.max_chunk_size || total <= self.config.min_chunk_size {
            let indexed: Vec<(usize, &LeafSection)> = leaves.into_iter().enumerate().collect();
            return self.combined_chunk(container, &indexed, 0, 1).into_iter().collect();
        }

        let mut chunks = Vec::new();
        for group in self.group_leaves(&leaves) {
            match group.as_slice() {
                [(_, leaf)] if leaf.content_len() > self.config.max_chunk_size => {
                    chunks.extend(self.split_leaf(container, leaf));
                }
                _ => {
                    chunks.extend(self.combined_chunk(container, &group, 0, 1));
                }
            }
        }
        chunks
    }

    /// Greedily group consecutive leaves while they fit the budget. A
    /// leaf that alone exceeds the budget gets its own group.
    fn group_leaves<'a>(
        &self,
        leaves: &[&'a LeafSection],
    ) -> Vec<Vec<(usize, &'a LeafSection)>> {
        let max = self.config.max_chunk_size;
        let mut groups: Vec<Vec<(usize, &LeafSection)>> = Vec::new();
        let mut current: Vec<(usize, &LeafSection)> = Vec::new();
        let mut current_size = 0usize;

        for (index, leaf) in leaves.iter().enumerate() {
            let len = leaf.content_len();

            if len > max {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                    current_size = 0;
                }
                groups.push(vec![(index, leaf)]);
                continue;
            }

            let sep = if current.is_empty() { 0 } else { LEAF_SEPARATOR_LEN };
            if current_size + len + sep <= max {
                current.push((index, leaf));
                current_size += len + sep;
            } else {
                groups.push(std::mem::take(&mut current));
                current.push((index, leaf));
                current_size = len;
            }
        }
        if !current.is_empty() {
            groups.push(current);
        }
        groups
    }

    /// One chunk combining a run of leaves (title and body per leaf,
    /// blank-line separated). Blank leaves are filtered; an all-blank
    /// group produces nothing.
    fn combined_chunk(
        &self,
        container: &ContainerSection,
        leaves: &[(usize, &LeafSection)],
        chunk_index: usize,
        chunk_count: usize,
    ) -> Option<Chunk> {
        let parts: Vec<String> = leaves
            .iter()
            .filter_map(|(_, leaf)| leaf_text(leaf))
            .collect();
        let text = parts.join("\n\n").trim().to_string();
        if text.is_empty() {
            return None;
        }

        let mut metadata = container_metadata(container);
        metadata.insert(
            "sections".to_string(),
            Value::Array(
                leaves
                    .iter()
                    .map(|(index, leaf)| {
                        json!({ "id": leaf.id, "title": leaf.title, "index": index })
                    })
                    .collect(),
            ),
        );
        metadata.insert("chunk_index".to_string(), json!(chunk_index));
        metadata.insert("chunk_count".to_string(), json!(chunk_count));

        Some(
            Chunk::new(Uuid::new_v4().to_string(), text)
                .with_parent(container.id.clone())
                .with_metadata(metadata),
        )
    }

    /// Split one oversized leaf into bounded chunks with overlap.
    fn split_leaf(&self, container: &ContainerSection, leaf: &LeafSection) -> Vec<Chunk> {
        let pieces = self.split_pieces(&leaf.text);
        let texts = self.assemble(pieces);
        let count = texts.len();

        texts
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(index, text)| {
                let mut metadata = container_metadata(container);
                for (key, value) in &leaf.metadata {
                    metadata.insert(key.clone(), value.clone());
                }
                metadata.insert("section_id".to_string(), json!(leaf.id));
                metadata.insert("section_title".to_string(), json!(leaf.title));
                metadata.insert("chunk_index".to_string(), json!(index));
                metadata.insert("chunk_count".to_string(), json!(count));

                Chunk::new(Uuid::new_v4().to_string(), text.trim().to_string())
                    .with_parent(leaf.id.clone())
                    .with_metadata(metadata)
            })
            .collect()
    }

    /// Cut text into pieces no larger than the budget: paragraphs first,
    /// then sentences, then raw characters as an emergency fallback.
    fn split_pieces(&self, text: &str) -> Vec<String> {
        let max = self.config.max_chunk_size;
        let mut pieces = Vec::new();

        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            if paragraph.len() <= max {
                pieces.push(paragraph.to_string());
                continue;
            }
            for sentence in split_sentences(paragraph) {
                if sentence.len() <= max {
                    pieces.push(sentence);
                } else {
                    pieces.extend(hard_split(&sentence, max));
                }
            }
        }
        pieces
    }

    /// Accumulate pieces into chunk texts, prepending the overlap
    /// fragment to every chunk after the first when it fits.
    fn assemble(&self, pieces: Vec<String>) -> Vec<String> {
        let max = self.config.max_chunk_size;
        let mut texts: Vec<String> = Vec::new();
        let mut current = String::new();

        for piece in pieces {
            if current.is_empty() {
                current = piece;
                continue;
            }
            if current.len() + 1 + piece.len() <= max {
                current.push(' ');
                current.push_str(&piece);
            } else {
                let overlap = self.overlap_fragment(&current);
                texts.push(std::mem::take(&mut current));
                if !overlap.is_empty() && overlap.len() + 1 + piece.len() <= max {
                    current = format!("{overlap} {piece}");
                } else {
                    current = piece;
                }
            }
        }
        if !current.is_empty() {
            texts.push(current);
        }
        texts
    }

    /// Tail of the previous chunk, at most `overlap_size` characters,
    /// trimmed forward to a sentence boundary when one is present, a word
    /// boundary otherwise.
    fn overlap_fragment(&self, previous: &str) -> String {
        if self.config.overlap_size == 0 {
            return String::new();
        }
        let tail = last_chars(previous, self.config.overlap_size);
        if tail.len() >= previous.len() {
            // The whole previous chunk would repeat; skip the overlap.
            return String::new();
        }

        if let Some(boundary) = sentence_boundaries(tail).first() {
            return tail[*boundary..].trim().to_string();
        }
        match tail.find(char::is_whitespace) {
            Some(pos) => tail[pos..].trim().to_string(),
            None => tail.trim().to_string(),
        }
    }
}

/// Title and body of one leaf, or nothing when both are blank.
fn leaf_text(leaf: &LeafSection) -> Option<String> {
    let title = leaf.title.trim();
    let body = leaf.text.trim();
    match (title.is_empty(), body.is_empty()) {
        (true, true) => None,
        (false, true) => Some(title.to_string()),
        (true, false) => Some(body.to_string()),
        (false, false) => Some(format!("{title}\n{body}")),
    }
}

fn container_metadata(container: &ContainerSection) -> HashMap<String, Value> {
    let mut metadata: HashMap<String, Value> = container.metadata.clone();
    metadata.insert("container_id".to_string(), json!(container.id));
    metadata.insert("container_title".to_string(), json!(container.title));
    if let Some(uri) = &container.uri {
        metadata.insert("container_uri".to_string(), json!(uri));
    }
    metadata
}

/// Byte offsets just after each sentence end (`.`, `!` or `?` followed by
/// whitespace).
fn sentence_boundaries(text: &str) -> Vec<usize> {
    let mut boundaries = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some((_, next)) = chars.peek() {
                if next.is_whitespace() {
                    boundaries.push(idx + c.len_utf8());
                }
            }
        }
    }
    boundaries
}

/// Split on sentence boundaries, keeping terminators with their sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let boundaries = sentence_boundaries(text);
    if boundaries.is_empty() {
        return vec![text.trim().to_string()];
    }

    let mut sentences = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for boundary in boundaries {
        let sentence = text[start..boundary].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary;
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        sentences.push(last.to_string());
    }
    sentences
}

/// Emergency fallback: split by raw character count.
fn hard_split(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if current.len() + c.len_utf8() > max && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Last `n` characters of `s`, on a char boundary.
fn last_chars(s: &str, n: usize) -> &str {
    let char_count = s.chars().count();
    if char_count <= n {
        return s;
    }
    let skip = char_count - n;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Section;

    fn container(leaves: Vec<LeafSection>) -> ContainerSection {
        let mut c = ContainerSection::new("doc-1", "Guide").with_uri("file:///guide.md");
        for leaf in leaves {
            c = c.with_child(Section::Leaf(leaf));
        }
        c
    }

    fn chunker(max: usize, overlap: usize, min: usize) -> ContentChunker {
        ContentChunker::with_config(ChunkerConfig {
            max_chunk_size: max,
            overlap_size: overlap,
            min_chunk_size: min,
        })
        .unwrap()
    }

    #[test]
    fn small_container_becomes_one_chunk() {
        let doc = container(vec![
            LeafSection::new("s1", "Intro", "Short intro."),
            LeafSection::new("s2", "Body", "Short body."),
        ]);
        let chunks = ContentChunker::new().chunk_container(&doc);

        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert!(chunk.text.contains("Intro"));
        assert!(chunk.text.contains("Short body."));
        assert_eq!(chunk.parent_id.as_deref(), Some("doc-1"));
        assert_eq!(chunk.metadata["container_id"], json!("doc-1"));
        assert_eq!(chunk.metadata["container_uri"], json!("file:///guide.md"));
        assert_eq!(chunk.metadata["sections"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn boundary_scenario_stays_combined_under_min_chunk_size() {
        // Leaves of 100, 200 and 1300 chars: the total exceeds
        // max_chunk_size but not min_chunk_size, so splitting is not
        // worthwhile and one combined chunk comes back.
        let doc = container(vec![
            LeafSection::new("s1", "A", "x".repeat(100)),
            LeafSection::new("s2", "B", "y".repeat(200)),
            LeafSection::new("s3", "C", "z".repeat(1300)),
        ]);
        let chunks = chunker(1500, 200, 2000).chunk_container(&doc);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.len() > 1500);
    }

    #[test]
    fn boundary_scenario_groups_greedily_once_worthwhile() {
        // Same leaves with min_chunk_size == max_chunk_size: grouping
        // kicks in, the first two leaves share a chunk and the third
        // stands alone.
        let doc = container(vec![
            LeafSection::new("s1", "A", "x".repeat(100)),
            LeafSection::new("s2", "B", "y".repeat(200)),
            LeafSection::new("s3", "C", "z".repeat(1300)),
        ]);
        let chunks = chunker(1500, 200, 1500).chunk_container(&doc);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].text.contains('x'));
        assert!(chunks[0].text.contains('y'));
        assert!(!chunks[0].text.contains('z'));
        assert!(chunks[1].text.contains('z'));
    }

    #[test]
    fn oversized_leaf_is_split_on_sentence_boundaries() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let doc = container(vec![LeafSection::new(
            "s1",
            "Long",
            sentence.repeat(20),
        )]);
        let chunks = chunker(200, 50, 200).chunk_container(&doc);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 200, "chunk too large: {}", chunk.text.len());
            assert_eq!(chunk.parent_id.as_deref(), Some("s1"));
        }
        assert_eq!(chunks[0].metadata["chunk_index"], json!(0));
        assert_eq!(
            chunks[0].metadata["chunk_count"],
            json!(chunks.len())
        );
    }

    #[test]
    fn split_chunks_carry_overlap_from_the_previous_chunk() {
        let sentence = "Alpha beta gamma delta epsilon zeta eta theta. ";
        let doc = container(vec![LeafSection::new(
            "s1",
            "Long",
            sentence.repeat(12),
        )]);
        let chunks = chunker(150, 60, 150).chunk_container(&doc);

        assert!(chunks.len() > 1);
        // Every later chunk opens with text that already appeared at the
        // tail of its predecessor.
        for pair in chunks.windows(2) {
            let opening: String = pair[1].text.chars().take(20).collect();
            assert!(
                pair[0].text.contains(opening.trim()),
                "no overlap between consecutive chunks"
            );
        }
    }

    #[test]
    fn blank_leaves_never_produce_chunks() {
        let doc = container(vec![
            LeafSection::new("s1", "", "   "),
            LeafSection::new("s2", "", ""),
        ]);
        let chunks = ContentChunker::new().chunk_container(&doc);
        assert!(chunks.is_empty());
    }

    #[test]
    fn empty_container_produces_nothing() {
        let doc = container(vec![]);
        assert!(ContentChunker::new().chunk_container(&doc).is_empty());
    }

    #[test]
    fn every_leaf_survives_into_some_chunk() {
        let doc = container(vec![
            LeafSection::new("s1", "One", "needle-one ".repeat(30)),
            LeafSection::new("s2", "Two", "needle-two ".repeat(40)),
            LeafSection::new("s3", "Three", "needle-three ".repeat(50)),
        ]);
        let chunks = chunker(300, 50, 300).chunk_container(&doc);

        for needle in ["needle-one", "needle-two", "needle-three"] {
            assert!(
                chunks.iter().any(|c| c.text.contains(needle)),
                "{needle} was dropped"
            );
        }
    }

    #[test]
    fn chunk_ids_are_unique() {
        let doc = container(vec![LeafSection::new(
            "s1",
            "Long",
            "Lorem ipsum dolor sit amet. ".repeat(40),
        )]);
        let chunks = chunker(200, 40, 200).chunk_container(&doc);
        let mut ids: Vec<_> = chunks.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(ContentChunker::with_config(ChunkerConfig {
            max_chunk_size: 0,
            overlap_size: 0,
            min_chunk_size: 0,
        })
        .is_err());
        assert!(ContentChunker::with_config(ChunkerConfig {
            max_chunk_size: 100,
            overlap_size: 100,
            min_chunk_size: 100,
        })
        .is_err());
    }

    #[test]
    fn hard_split_respects_char_boundaries() {
        let text = "éééééééééé";
        let parts = hard_split(text, 4);
        assert!(parts.iter().all(|p| p.len() <= 4));
        assert_eq!(parts.concat(), text);
    }

    #[test]
    fn sentence_splitting_keeps_terminators() {
        let sentences = split_sentences("One. Two! Three? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }
}
