//! Hierarchical document structure consumed by the chunker.
//!
//! A document is a tree: container sections aggregate children, and only
//! leaf sections carry raw text. Chunking walks the tree depth-first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A leaf section: titled raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafSection {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl LeafSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Content length as the chunker accounts it: text plus title plus a
    /// separator character.
    pub fn content_len(&self) -> usize {
        self.text.len() + self.title.len() + 1
    }
}

/// A container section aggregating child sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSection {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub children: Vec<Section>,
}

impl ContainerSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            uri: None,
            metadata: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_child(mut self, child: Section) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_leaf(self, leaf: LeafSection) -> Self {
        self.with_child(Section::Leaf(leaf))
    }

    /// All leaves under this container, depth-first, preserving order.
    pub fn leaves(&self) -> Vec<&LeafSection> {
        let mut out = Vec::new();
        for child in &self.children {
            child.collect_leaves(&mut out);
        }
        out
    }
}

/// Either branch of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Container(ContainerSection),
    Leaf(LeafSection),
}

impl Section {
    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LeafSection>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Container(container) => {
                for child in &container.children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_are_collected_depth_first() {
        let tree = ContainerSection::new("root", "Root")
            .with_leaf(LeafSection::new("a", "A", "first"))
            .with_child(Section::Container(
                ContainerSection::new("mid", "Mid")
                    .with_leaf(LeafSection::new("b", "B", "second"))
                    .with_leaf(LeafSection::new("c", "C", "third")),
            ))
            .with_leaf(LeafSection::new("d", "D", "fourth"));

        let ids: Vec<_> = tree.leaves().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn content_len_counts_title_and_separator() {
        let leaf = LeafSection::new("a", "Title", "body");
        assert_eq!(leaf.content_len(), 4 + 5 + 1);
    }
}
