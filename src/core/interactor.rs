/// Traversal cursor: walks a story graph one step at a time.
use std::sync::Arc;
use thiserror::Error;

use crate::schema::node::{NextNode, NodeId, StoryNode};
use crate::schema::story::Story;

#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("unknown entry point: {0}")]
    UnknownEntryPoint(String),
    #[error("operation not valid in the current traversal state")]
    InvalidState,
    #[error("choice index {index} out of range (choice count {count})")]
    ChoiceIndexOutOfRange { index: usize, count: usize },
}

/// Where an interactor currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// On a spoken or narrated line; text and speaker are readable.
    AtLine(NodeId),
    /// On a branch point; the choice list is readable.
    AtChoiceSet(NodeId),
    /// Past the final node. Terminal; only re-creation leaves it.
    Ended,
}

/// How a successful step concluded.
///
/// "Moved to a node", "story concluded", and "error" stay three
/// distinct outcomes; they are never folded into one integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved(NodeId),
    Ended,
}

/// A mutable cursor over an immutable story.
///
/// The story is shared read-only, so any number of interactors can
/// walk it at once (parallel playthroughs, undo stacks, previews);
/// all traversal state lives in the cursor itself. A failed call
/// leaves the cursor exactly where it was.
#[derive(Debug, Clone)]
pub struct Interactor {
    story: Arc<Story>,
    state: State,
}

impl Interactor {
    /// Start at the first node in source order, or immediately `Ended`
    /// for an empty story.
    pub fn from_start(story: Arc<Story>) -> Self {
        let state = state_for(&story, story.start());
        Self { story, state }
    }

    /// Start at a declared label.
    pub fn at_label(story: Arc<Story>, label: &str) -> Result<Self, TraversalError> {
        let target = story
            .entry(label)
            .ok_or_else(|| TraversalError::UnknownEntryPoint(label.to_string()))?;
        let state = state_for(&story, target);
        Ok(Self { story, state })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    /// Text of the current line. Only valid in `AtLine`.
    pub fn text(&self) -> Result<&str, TraversalError> {
        match self.current_line()? {
            StoryNode::Line { text, .. } => Ok(text),
            _ => Err(TraversalError::InvalidState),
        }
    }

    /// Speaker of the current line; `None` for narration. Only valid
    /// in `AtLine`.
    pub fn speaker(&self) -> Result<Option<&str>, TraversalError> {
        match self.current_line()? {
            StoryNode::Line { speaker, .. } => Ok(speaker.as_deref()),
            _ => Err(TraversalError::InvalidState),
        }
    }

    /// The selectable choice labels, in authored order. Only valid in
    /// `AtChoiceSet`. Targets stay internal.
    pub fn choices(&self) -> Result<Vec<&str>, TraversalError> {
        let State::AtChoiceSet(id) = self.state else {
            return Err(TraversalError::InvalidState);
        };
        match self.story.node_at(id) {
            StoryNode::ChoiceSet { choices } => {
                Ok(choices.iter().map(|c| c.label.as_str()).collect())
            }
            _ => Err(TraversalError::InvalidState),
        }
    }

    /// Follow the current line's fall-through (or goto-redirected)
    /// edge. Only valid in `AtLine`.
    pub fn advance(&mut self) -> Result<Step, TraversalError> {
        let next = match self.current_line()? {
            StoryNode::Line { next, .. } => *next,
            _ => return Err(TraversalError::InvalidState),
        };
        Ok(self.transition(next))
    }

    /// Jump into the indexed choice's branch. Only valid in
    /// `AtChoiceSet`; an out-of-range index is rejected, never
    /// clamped.
    pub fn select_choice(&mut self, index: usize) -> Result<Step, TraversalError> {
        let State::AtChoiceSet(id) = self.state else {
            return Err(TraversalError::InvalidState);
        };
        let target = match self.story.node_at(id) {
            StoryNode::ChoiceSet { choices } => {
                let choice = choices.get(index).ok_or(
                    TraversalError::ChoiceIndexOutOfRange {
                        index,
                        count: choices.len(),
                    },
                )?;
                choice.target
            }
            _ => return Err(TraversalError::InvalidState),
        };
        Ok(self.transition(target))
    }

    fn current_line(&self) -> Result<&StoryNode, TraversalError> {
        match self.state {
            State::AtLine(id) => Ok(self.story.node_at(id)),
            _ => Err(TraversalError::InvalidState),
        }
    }

    fn transition(&mut self, target: NextNode) -> Step {
        self.state = state_for(&self.story, target);
        match self.state {
            State::Ended => Step::Ended,
            State::AtLine(id) | State::AtChoiceSet(id) => Step::Moved(id),
        }
    }
}

fn state_for(story: &Story, target: NextNode) -> State {
    match target {
        NextNode::End => State::Ended,
        NextNode::Node(id) => {
            if story.node_at(id).is_choice_set() {
                State::AtChoiceSet(id)
            } else {
                State::AtLine(id)
            }
        }
    }
}
