//! Project-wide inheritance edges for number-of-children.
//!
//! Single-file analysis cannot see subclasses declared elsewhere, so NOC is
//! computed from a first pass over every source file. Edges are keyed by
//! simple name: two classes named `Node` in different packages share a count.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::model::SourceModel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeGraph {
    children: HashMap<String, u32>,
    types: usize,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one `child extends parent` edge.
    pub fn add_edge(&mut self, parent: &str) {
        *self.children.entry(parent.to_string()).or_insert(0) += 1;
    }

    /// Record every declared type of a file.
    pub fn add_model(&mut self, model: &SourceModel) {
        for decl in &model.types {
            self.types += 1;
            if let Some(parent) = &decl.superclass {
                self.add_edge(parent);
            }
        }
    }

    pub fn merge(mut self, other: TypeGraph) -> Self {
        self.types += other.types;
        for (parent, count) in other.children {
            *self.children.entry(parent).or_insert(0) += count;
        }
        self
    }

    /// In-degree of `simple_name`.
    pub fn children_of(&self, simple_name: &str) -> u32 {
        self.children.get(simple_name).copied().unwrap_or(0)
    }

    pub fn type_count(&self) -> usize {
        self.types
    }

    pub fn edge_count(&self) -> u32 {
        self.children.values().sum()
    }
}
