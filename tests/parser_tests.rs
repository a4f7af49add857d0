/// Parser integration tests: script text to story graph.
use dialogue_engine::core::parser::{parse, ParseError};
use dialogue_engine::schema::node::{NextNode, NodeId, StoryNode};

const BRANCHING_SCRIPT: &str = "\
[hello]
Dude: Hey
$: narration
    > Opt1:
        Dude: reply1
    > Opt2:
        Dude: reply2";

#[test]
fn branching_script_shape() {
    let story = parse(BRANCHING_SCRIPT).unwrap();

    // Two leading line nodes, one choice set, two branch lines.
    assert_eq!(story.len(), 5);
    assert!(matches!(
        story.node_at(NodeId(0)),
        StoryNode::Line { speaker: Some(s), text, .. } if s == "Dude" && text == "Hey"
    ));
    assert!(matches!(
        story.node_at(NodeId(1)),
        StoryNode::Line { speaker: None, text, .. } if text == "narration"
    ));
    match story.node_at(NodeId(2)) {
        StoryNode::ChoiceSet { choices } => {
            assert_eq!(choices.len(), 2);
            assert_eq!(choices[0].label, "Opt1");
            assert_eq!(choices[1].label, "Opt2");
        }
        other => panic!("expected choice set, got {:?}", other),
    }
    assert_eq!(
        story.node_at(NodeId(3)),
        &StoryNode::Line {
            speaker: Some("Dude".to_string()),
            text: "reply1".to_string(),
            next: NextNode::End,
        }
    );

    assert_eq!(story.entry("hello"), Some(NextNode::Node(NodeId(0))));
}

#[test]
fn two_parses_of_identical_input_are_id_for_id_identical() {
    let first = parse(BRANCHING_SCRIPT).unwrap();
    let second = parse(BRANCHING_SCRIPT).unwrap();

    assert_eq!(first.len(), second.len());
    for id in 0..first.len() {
        assert_eq!(first.node_at(NodeId(id)), second.node_at(NodeId(id)));
    }
    let mut first_labels: Vec<&str> = first.labels().collect();
    let mut second_labels: Vec<&str> = second.labels().collect();
    first_labels.sort_unstable();
    second_labels.sort_unstable();
    assert_eq!(first_labels, second_labels);
}

#[test]
fn every_choice_target_resolves_to_a_real_node() {
    let script = "\
[start]
Guide: Pick a door.
    > Left:
        $: A cold draft.
        @goto start
    > Right:
        $: Warm light.
$: You step through.";
    let story = parse(script).unwrap();

    for id in 0..story.len() {
        match story.node_at(NodeId(id)) {
            StoryNode::Line { next, .. } => {
                if let NextNode::Node(n) = next {
                    assert!(n.0 < story.len());
                }
            }
            StoryNode::ChoiceSet { choices } => {
                for choice in choices {
                    if let NextNode::Node(n) = choice.target {
                        assert!(n.0 < story.len());
                    }
                }
            }
        }
    }
}

#[test]
fn undeclared_label_fails_and_builds_no_story() {
    let result = parse("Guide: Hello\n@goto missing_room");
    match result {
        Err(ParseError::UnresolvedLabel { name, line }) => {
            assert_eq!(name, "missing_room");
            assert_eq!(line, 2);
        }
        other => panic!("expected UnresolvedLabel, got {:?}", other),
    }
}

#[test]
fn malformed_line_reports_one_based_number() {
    let script = "Guide: Hello\n$: fine\nthis line has no colon";
    match parse(script) {
        Err(ParseError::MalformedLine { line }) => assert_eq!(line, 3),
        other => panic!("expected MalformedLine, got {:?}", other),
    }
}

#[test]
fn dangling_indentation_at_end_of_input_is_not_an_error() {
    let script = "$: pick\n    > Only option:\n        Dude: trailing branch";
    let story = parse(script).unwrap();
    assert!(matches!(
        story.node_at(NodeId(2)),
        StoryNode::Line { next: NextNode::End, .. }
    ));
}

#[test]
fn ragged_branch_indentation_is_tolerated() {
    // Branch bodies deeper than the marker belong to the branch, even
    // when their depths disagree.
    let script = "\
$: pick
    > A:
        Dude: deep
      Dude: shallower but still inside
$: after";
    let story = parse(script).unwrap();
    match story.node_at(NodeId(1)) {
        StoryNode::ChoiceSet { choices } => {
            assert_eq!(choices[0].target, NextNode::Node(NodeId(2)))
        }
        other => panic!("expected choice set, got {:?}", other),
    }
    assert!(matches!(
        story.node_at(NodeId(2)),
        StoryNode::Line { next: NextNode::Node(NodeId(3)), .. }
    ));
    assert!(matches!(
        story.node_at(NodeId(3)),
        StoryNode::Line { next: NextNode::Node(NodeId(4)), .. }
    ));
}
