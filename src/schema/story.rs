/// The immutable story graph: a dense node arena plus the label table.
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::schema::node::{NextNode, NodeId, StoryNode};

/// A fully parsed dialogue script.
///
/// Built once by `core::parser::parse` and never mutated afterwards,
/// so any number of interactors can share one story read-only. Cycles
/// introduced by `@goto` are plain integer targets into the arena; no
/// node ever owns another.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    nodes: Vec<StoryNode>,
    labels: FxHashMap<String, NextNode>,
}

impl Story {
    pub(crate) fn new(nodes: Vec<StoryNode>, labels: FxHashMap<String, NextNode>) -> Self {
        Self { nodes, labels }
    }

    /// Look up a node by ID.
    ///
    /// Panics on an out-of-range ID. IDs are only ever obtained from
    /// this story, so an invalid one is a programming error rather
    /// than a recoverable failure.
    pub fn node_at(&self, id: NodeId) -> &StoryNode {
        &self.nodes[id.0]
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a label to its registered target, if declared.
    pub fn entry(&self, label: &str) -> Option<NextNode> {
        self.labels.get(label).copied()
    }

    /// The default entry point: the first node in source order, or
    /// `End` for a script with no content nodes.
    pub fn start(&self) -> NextNode {
        if self.nodes.is_empty() {
            NextNode::End
        } else {
            NextNode::Node(NodeId(0))
        }
    }

    /// Iterate over declared label names, in no particular order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }
}
