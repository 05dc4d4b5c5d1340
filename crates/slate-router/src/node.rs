//! Segment trie.
//!
//! Each node stands for one path segment. Literal children are kept sorted
//! for binary search. Placeholder children are keyed by name, so templates
//! that differ only in placeholder naming still report their own names.

use percent_encoding::percent_decode_str;

use crate::method_router::MethodRouter;
use crate::params::Params;
use crate::template::Segment;

/// A node in the segment trie.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The segment this node represents
    pub segment: Segment,

    /// Values registered for the path ending at this node
    pub methods: MethodRouter<T>,

    /// Literal children, sorted by text for binary search
    literal_children: Vec<Node<T>>,

    /// Placeholder children in insertion order
    placeholder_children: Vec<Node<T>>,
}

impl<T> Node<T> {
    fn new(segment: Segment) -> Self {
        Self {
            segment,
            methods: MethodRouter::new(),
            literal_children: Vec::new(),
            placeholder_children: Vec::new(),
        }
    }

    /// Creates a root node for the trie.
    #[must_use]
    pub fn root() -> Self {
        Self::new(Segment::Literal(String::new()))
    }

    /// Returns the node at the end of `segments`, creating missing nodes.
    pub fn descend_or_insert(&mut self, segments: &[Segment]) -> &mut Self {
        let Some((first, rest)) = segments.split_first() else {
            return self;
        };

        let child = match first {
            Segment::Literal(text) => {
                let index = match self
                    .literal_children
                    .binary_search_by(|c| literal_text(c).cmp(text.as_str()))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.literal_children
                            .insert(index, Node::new(first.clone()));
                        index
                    }
                };
                &mut self.literal_children[index]
            }
            Segment::Placeholder(_) => {
                let index = match self
                    .placeholder_children
                    .iter()
                    .position(|c| c.segment == *first)
                {
                    Some(index) => index,
                    None => {
                        self.placeholder_children.push(Node::new(first.clone()));
                        self.placeholder_children.len() - 1
                    }
                };
                &mut self.placeholder_children[index]
            }
        };
        child.descend_or_insert(rest)
    }

    /// Collects every node whose template matches `path`.
    ///
    /// Literal and placeholder branches are both explored, so the result may
    /// hold more than one node. Each match carries its own parameters.
    pub fn match_all<'a>(&'a self, path: &str, out: &mut Vec<(&'a Self, Params)>) {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        self.match_segments(&segments, &mut Params::new(), out);
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[String],
        params: &mut Params,
        out: &mut Vec<(&'a Self, Params)>,
    ) {
        let Some((segment, remaining)) = segments.split_first() else {
            if !self.methods.is_empty() {
                out.push((self, params.clone()));
            }
            return;
        };

        if let Some(child) = self.find_literal_child(segment) {
            child.match_segments(remaining, params, out);
        }

        for child in &self.placeholder_children {
            if let Segment::Placeholder(name) = &child.segment {
                params.push(name.clone(), segment.clone());
                child.match_segments(remaining, params, out);
                params.pop();
            }
        }
    }

    fn find_literal_child(&self, segment: &str) -> Option<&Self> {
        self.literal_children
            .binary_search_by(|c| literal_text(c).cmp(segment))
            .ok()
            .map(|i| &self.literal_children[i])
    }
}

fn literal_text<T>(node: &Node<T>) -> &str {
    match &node.segment {
        Segment::Literal(text) => text,
        Segment::Placeholder(name) => name,
    }
}
