use serde::{Deserialize, Serialize};

/// Newtype wrapper for story node IDs.
///
/// IDs are dense, zero-based, and assigned in source-line order during
/// parsing. They are the only addressing mechanism the engine exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Where control flows after a node.
///
/// Goto redirects are resolved into this during parsing, so a built
/// story never carries symbolic label references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextNode {
    /// Advance to the node with this ID.
    Node(NodeId),
    /// The story concludes here.
    End,
}

/// One selectable branch of a choice set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// The text shown to the player, in source order.
    pub label: String,
    /// Entry node of the branch. Internal; never exposed by the
    /// traversal API.
    pub target: NextNode,
}

/// One unit of story content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoryNode {
    /// A spoken or narrated line of text.
    Line {
        /// `None` means narration (a `$:` line in the script).
        speaker: Option<String>,
        text: String,
        /// Fall-through successor: the next node in source order by
        /// default, or the goto target when the line was redirected.
        next: NextNode,
    },
    /// A branch point offering player-selectable choices, ordered as
    /// authored.
    ChoiceSet { choices: Vec<Choice> },
}

impl StoryNode {
    pub fn is_choice_set(&self) -> bool {
        matches!(self, StoryNode::ChoiceSet { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_node_narration_has_no_speaker() {
        let node = StoryNode::Line {
            speaker: None,
            text: "The rain kept falling.".to_string(),
            next: NextNode::End,
        };
        assert!(!node.is_choice_set());
        match node {
            StoryNode::Line { speaker, .. } => assert!(speaker.is_none()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn choice_set_detection() {
        let node = StoryNode::ChoiceSet {
            choices: vec![Choice {
                label: "Wave back".to_string(),
                target: NextNode::Node(NodeId(3)),
            }],
        };
        assert!(node.is_choice_set());
    }
}
