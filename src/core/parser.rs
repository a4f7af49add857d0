/// Graph builder: classified lines in, a resolved `Story` out.
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::lexer::{classify, ClassifiedLine, LineKind};
use crate::schema::node::{Choice, NextNode, NodeId, StoryNode};
use crate::schema::story::Story;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: malformed line")]
    MalformedLine { line: usize },
    #[error("line {line}: reference to undeclared label '{name}'")]
    UnresolvedLabel { name: String, line: usize },
}

/// Parse a full script into a story graph.
///
/// Node IDs are assigned in strict source-line order, so byte-identical
/// input always produces an id-for-id identical graph. Label references
/// (goto targets and entry points) may point forward; they are resolved
/// in a dedicated pass after all lines are consumed, and any name that
/// was never declared fails the whole parse. A failed parse never
/// yields a partial story.
pub fn parse(source: &str) -> Result<Story, ParseError> {
    let mut builder = GraphBuilder::default();
    for (index, raw) in source.lines().enumerate() {
        let line = classify(raw, index + 1)?;
        builder.consume(line)?;
    }
    builder.finish()
}

/// A node's successor while the graph is still under construction.
#[derive(Debug, Clone)]
enum BuildNext {
    /// Not yet settled; becomes the next node created at this level,
    /// or end-of-story if input runs out first.
    Open,
    Node(NodeId),
    /// Symbolic goto target, resolved in the final pass.
    Label { name: String, line: usize },
}

/// A choice's branch entry while under construction.
#[derive(Debug, Clone)]
enum BuildTarget {
    /// Branch body not seen yet; becomes the branch's first node, the
    /// block continuation for an empty body, or end-of-story.
    Pending,
    Node(NodeId),
    Label { name: String, line: usize },
}

#[derive(Debug)]
enum BuildNode {
    Line {
        speaker: Option<String>,
        text: String,
        next: BuildNext,
    },
    ChoiceSet {
        choices: Vec<BuildChoice>,
    },
}

#[derive(Debug)]
struct BuildChoice {
    label: String,
    target: BuildTarget,
}

/// An edge waiting for the node that continues the enclosing block.
#[derive(Debug, Clone, Copy)]
enum Dangling {
    /// A branch-tail line whose fall-through is unsettled.
    LineNext(NodeId),
    /// A choice whose branch body was empty.
    ChoiceTarget { set: NodeId, index: usize },
}

/// A choice set whose branches are still being collected.
#[derive(Debug)]
struct OpenSet {
    node: NodeId,
    /// Indent of this set's `>` markers. Lines indented deeper belong
    /// to the current branch; a `>` at exactly this depth is a sibling
    /// choice; anything else closes the set.
    marker: usize,
    /// Tails of already-finished branches, patched to the node that
    /// follows the whole block.
    tails: Vec<Dangling>,
}

#[derive(Debug, Default)]
struct GraphBuilder {
    nodes: Vec<BuildNode>,
    labels: FxHashMap<String, NextNode>,
    /// Labels declared but not yet bound to a node.
    pending_labels: Vec<String>,
    /// The most recent line node whose fall-through is unsettled.
    open_line: Option<NodeId>,
    /// Edges from closed choice blocks awaiting the continuation node.
    dangling: Vec<Dangling>,
    stack: Vec<OpenSet>,
}

impl GraphBuilder {
    fn consume(&mut self, line: ClassifiedLine) -> Result<(), ParseError> {
        match line.kind {
            LineKind::Blank => Ok(()),
            LineKind::Label(name) => {
                self.pending_labels.push(name);
                Ok(())
            }
            LineKind::Goto(name) => self.attach_goto(name, line.number),
            LineKind::Choice(label) => {
                self.close_blocks(line.indent, true);
                self.add_choice(label, line.indent);
                Ok(())
            }
            LineKind::Narration(text) => {
                self.close_blocks(line.indent, false);
                let id = self.create_node(BuildNode::Line {
                    speaker: None,
                    text,
                    next: BuildNext::Open,
                });
                self.open_line = Some(id);
                Ok(())
            }
            LineKind::Dialogue { speaker, text } => {
                self.close_blocks(line.indent, false);
                let id = self.create_node(BuildNode::Line {
                    speaker: Some(speaker),
                    text,
                    next: BuildNext::Open,
                });
                self.open_line = Some(id);
                Ok(())
            }
        }
    }

    /// Pop every choice set the given line dedents out of, promoting
    /// branch tails so the next created node can close them.
    fn close_blocks(&mut self, indent: usize, is_choice: bool) {
        while let Some(top) = self.stack.pop() {
            let still_inside = indent > top.marker;
            let sibling = is_choice && indent == top.marker;
            if still_inside || sibling {
                // Sibling choices of the open set are handled by
                // add_choice.
                self.stack.push(top);
                break;
            }
            if let Some(id) = self.open_line.take() {
                // Tail of the set's last branch.
                self.dangling.push(Dangling::LineNext(id));
            }
            self.dangling.extend(top.tails);
            if let BuildNode::ChoiceSet { choices } = &self.nodes[top.node.0] {
                for (index, choice) in choices.iter().enumerate() {
                    if matches!(choice.target, BuildTarget::Pending) {
                        self.dangling.push(Dangling::ChoiceTarget {
                            set: top.node,
                            index,
                        });
                    }
                }
            }
        }
    }

    /// Append a node, then settle everything that was waiting for it:
    /// the open line's fall-through, promoted branch tails, the pending
    /// choice whose branch this node opens, and declared labels.
    fn create_node(&mut self, node: BuildNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);

        if let Some(prev) = self.open_line.take() {
            if let BuildNode::Line { next, .. } = &mut self.nodes[prev.0] {
                *next = BuildNext::Node(id);
            }
        }
        let waiting: Vec<Dangling> = self.dangling.drain(..).collect();
        for edge in waiting {
            self.patch(edge, id);
        }
        if let Some(set) = self.stack.last().map(|top| top.node) {
            if let BuildNode::ChoiceSet { choices } = &mut self.nodes[set.0] {
                if let Some(choice) = choices.last_mut() {
                    if matches!(choice.target, BuildTarget::Pending) {
                        choice.target = BuildTarget::Node(id);
                    }
                }
            }
        }
        for name in self.pending_labels.drain(..) {
            self.labels.insert(name, NextNode::Node(id));
        }
        id
    }

    fn patch(&mut self, edge: Dangling, target: NodeId) {
        match edge {
            Dangling::LineNext(id) => {
                if let BuildNode::Line { next, .. } = &mut self.nodes[id.0] {
                    *next = BuildNext::Node(target);
                }
            }
            Dangling::ChoiceTarget { set, index } => {
                if let BuildNode::ChoiceSet { choices } = &mut self.nodes[set.0] {
                    choices[index].target = BuildTarget::Node(target);
                }
            }
        }
    }

    fn add_choice(&mut self, label: String, indent: usize) {
        if let Some(top) = self.stack.last_mut() {
            if top.marker == indent {
                // Sibling choice: the previous branch ends here. Its
                // tail and anything it left dangling wait for the
                // continuation after the whole block.
                if let Some(id) = self.open_line.take() {
                    top.tails.push(Dangling::LineNext(id));
                }
                top.tails.append(&mut self.dangling);
                let set = top.node;
                if let BuildNode::ChoiceSet { choices } = &mut self.nodes[set.0] {
                    choices.push(BuildChoice {
                        label,
                        target: BuildTarget::Pending,
                    });
                }
                return;
            }
        }

        let id = self.create_node(BuildNode::ChoiceSet {
            choices: vec![BuildChoice {
                label,
                target: BuildTarget::Pending,
            }],
        });
        self.stack.push(OpenSet {
            node: id,
            marker: indent,
            tails: Vec::new(),
        });
    }

    /// `@goto` settles the most recently opened node's exit: the open
    /// line's fall-through, or the pending choice when a branch body
    /// opens with the directive.
    fn attach_goto(&mut self, name: String, line: usize) -> Result<(), ParseError> {
        if let Some(id) = self.open_line.take() {
            if let BuildNode::Line { next, .. } = &mut self.nodes[id.0] {
                *next = BuildNext::Label { name, line };
            }
            return Ok(());
        }
        if let Some(set) = self.stack.last().map(|top| top.node) {
            if let BuildNode::ChoiceSet { choices } = &mut self.nodes[set.0] {
                if let Some(choice) = choices.last_mut() {
                    if matches!(choice.target, BuildTarget::Pending) {
                        choice.target = BuildTarget::Label { name, line };
                        return Ok(());
                    }
                }
            }
        }
        Err(ParseError::MalformedLine { line })
    }

    /// Bind leftover labels, then rewrite every symbolic reference to
    /// a concrete target. Unsettled edges mean input ran out, which is
    /// not an error: they become end-of-story.
    fn finish(mut self) -> Result<Story, ParseError> {
        for name in self.pending_labels.drain(..) {
            self.labels.insert(name, NextNode::End);
        }

        let labels = self.labels;
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for build in self.nodes {
            let node = match build {
                BuildNode::Line {
                    speaker,
                    text,
                    next,
                } => StoryNode::Line {
                    speaker,
                    text,
                    next: match next {
                        BuildNext::Open => NextNode::End,
                        BuildNext::Node(id) => NextNode::Node(id),
                        BuildNext::Label { name, line } => resolve(&labels, name, line)?,
                    },
                },
                BuildNode::ChoiceSet { choices } => StoryNode::ChoiceSet {
                    choices: choices
                        .into_iter()
                        .map(|choice| {
                            Ok(Choice {
                                label: choice.label,
                                target: match choice.target {
                                    BuildTarget::Pending => NextNode::End,
                                    BuildTarget::Node(id) => NextNode::Node(id),
                                    BuildTarget::Label { name, line } => {
                                        resolve(&labels, name, line)?
                                    }
                                },
                            })
                        })
                        .collect::<Result<Vec<_>, ParseError>>()?,
                },
            };
            nodes.push(node);
        }

        Ok(Story::new(nodes, labels))
    }
}

fn resolve(
    labels: &FxHashMap<String, NextNode>,
    name: String,
    line: usize,
) -> Result<NextNode, ParseError> {
    labels
        .get(&name)
        .copied()
        .ok_or(ParseError::UnresolvedLabel { name, line })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[hello]
Dude: Hey man how's it going?
$: You notice that the nice man is talking to you
    > Praise him:
        Dude: Damn dude thanks so much for your compliment
    > Call him something bad:
        Dude: Wow you really hurt my feelings
    > Can we start over?:
        Dude: Of course! I'll take this convo back to the start
        @goto hello
$: End of the story";

    fn line_next(story: &Story, id: usize) -> NextNode {
        match story.node_at(NodeId(id)) {
            StoryNode::Line { next, .. } => *next,
            other => panic!("node {} is not a line: {:?}", id, other),
        }
    }

    fn choices(story: &Story, id: usize) -> &[Choice] {
        match story.node_at(NodeId(id)) {
            StoryNode::ChoiceSet { choices } => choices,
            other => panic!("node {} is not a choice set: {:?}", id, other),
        }
    }

    #[test]
    fn sample_script_graph_shape() {
        let story = parse(SAMPLE).unwrap();
        assert_eq!(story.len(), 7);

        assert_eq!(story.entry("hello"), Some(NextNode::Node(NodeId(0))));
        assert_eq!(line_next(&story, 0), NextNode::Node(NodeId(1)));
        // The narration line steps directly into the choice set.
        assert_eq!(line_next(&story, 1), NextNode::Node(NodeId(2)));

        let set = choices(&story, 2);
        assert_eq!(set.len(), 3);
        assert_eq!(set[0].label, "Praise him");
        assert_eq!(set[0].target, NextNode::Node(NodeId(3)));
        assert_eq!(set[1].label, "Call him something bad");
        assert_eq!(set[1].target, NextNode::Node(NodeId(4)));
        assert_eq!(set[2].label, "Can we start over?");
        assert_eq!(set[2].target, NextNode::Node(NodeId(5)));

        // Non-goto branches fall through to the closing narration.
        assert_eq!(line_next(&story, 3), NextNode::Node(NodeId(6)));
        assert_eq!(line_next(&story, 4), NextNode::Node(NodeId(6)));
        // The goto branch loops back to the labelled node.
        assert_eq!(line_next(&story, 5), NextNode::Node(NodeId(0)));
        assert_eq!(line_next(&story, 6), NextNode::End);
    }

    #[test]
    fn branches_without_continuation_end_the_story() {
        let story = parse(
            "[hello]\nDude: Hey\n$: narration\n    > Opt1:\n        Dude: reply1\n    > Opt2:\n        Dude: reply2",
        )
        .unwrap();
        assert_eq!(story.len(), 5);
        assert_eq!(line_next(&story, 3), NextNode::End);
        assert_eq!(line_next(&story, 4), NextNode::End);

        let set = choices(&story, 2);
        assert_eq!(set.len(), 2);
        assert_eq!(set[0].label, "Opt1");
        assert_eq!(set[1].label, "Opt2");
    }

    #[test]
    fn parse_is_deterministic() {
        let first = parse(SAMPLE).unwrap();
        let second = parse(SAMPLE).unwrap();
        assert_eq!(first.len(), second.len());
        for id in 0..first.len() {
            assert_eq!(first.node_at(NodeId(id)), second.node_at(NodeId(id)));
        }
    }

    #[test]
    fn consecutive_labels_alias_one_node() {
        let story = parse("[a]\n[b]\nNarrator: text").unwrap();
        assert_eq!(story.entry("a"), Some(NextNode::Node(NodeId(0))));
        assert_eq!(story.entry("b"), Some(NextNode::Node(NodeId(0))));
    }

    #[test]
    fn label_at_end_of_input_points_at_end() {
        let story = parse("Dude: Bye\n[epilogue]").unwrap();
        assert_eq!(story.entry("epilogue"), Some(NextNode::End));
    }

    #[test]
    fn goto_forward_reference_resolves() {
        let story = parse("Dude: Skip ahead\n@goto later\nDude: Unreached\n[later]\nDude: Here").unwrap();
        assert_eq!(line_next(&story, 0), NextNode::Node(NodeId(2)));
    }

    #[test]
    fn unresolved_label_fails_with_name_and_line() {
        match parse("Dude: Hi\n@goto nowhere") {
            Err(ParseError::UnresolvedLabel { name, line }) => {
                assert_eq!(name, "nowhere");
                assert_eq!(line, 2);
            }
            other => panic!("expected UnresolvedLabel, got {:?}", other),
        }
    }

    #[test]
    fn malformed_line_aborts_parse() {
        match parse("Dude: Hi\nnot a valid line") {
            Err(ParseError::MalformedLine { line }) => assert_eq!(line, 2),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn goto_with_nothing_to_attach_is_malformed() {
        assert!(matches!(
            parse("@goto somewhere"),
            Err(ParseError::MalformedLine { line: 1 })
        ));
    }

    #[test]
    fn goto_opening_a_branch_body_retargets_the_choice() {
        let story = parse("[top]\nDude: Hi\n    > Again:\n        @goto top\n    > Done:\n        Dude: Bye").unwrap();
        let set = choices(&story, 1);
        assert_eq!(set[0].target, NextNode::Node(NodeId(0)));
        assert_eq!(set[1].target, NextNode::Node(NodeId(2)));
    }

    #[test]
    fn empty_choice_body_falls_through_to_continuation() {
        let story = parse("$: pick\n    > Shrug:\n$: after").unwrap();
        let set = choices(&story, 1);
        assert_eq!(set[0].target, NextNode::Node(NodeId(2)));
    }

    #[test]
    fn blank_lines_create_no_nodes() {
        let story = parse("Dude: one\n\n   \nDude: two").unwrap();
        assert_eq!(story.len(), 2);
        assert_eq!(line_next(&story, 0), NextNode::Node(NodeId(1)));
    }

    #[test]
    fn empty_script_parses_to_empty_story() {
        let story = parse("").unwrap();
        assert!(story.is_empty());
        assert_eq!(story.start(), NextNode::End);
    }

    #[test]
    fn nested_choice_sets_resolve_outward() {
        let script = "\
$: outer
    > A:
        $: inner prompt
            > A1:
                Dude: deep
    > B:
        Dude: flat
$: after";
        let story = parse(script).unwrap();
        // outer(0) -> set(1); branch A -> inner prompt(2) -> set(3);
        // A1 -> deep(4); branch B -> flat(5); continuation after(6).
        let outer = choices(&story, 1);
        assert_eq!(outer[0].target, NextNode::Node(NodeId(2)));
        assert_eq!(outer[1].target, NextNode::Node(NodeId(5)));
        let inner = choices(&story, 3);
        assert_eq!(inner[0].target, NextNode::Node(NodeId(4)));
        // Both the deep branch tail and the flat branch tail continue
        // at the node after the whole block.
        assert_eq!(line_next(&story, 4), NextNode::Node(NodeId(6)));
        assert_eq!(line_next(&story, 5), NextNode::Node(NodeId(6)));
        assert_eq!(line_next(&story, 6), NextNode::End);
    }
}
