/// Parallel demo — many interactors over one shared story.
///
/// One parsed story, three cursors: each explores a different branch
/// of the same choice set, the way a game might preview outcomes or
/// keep an undo stack of playthrough states.
///
/// Run with: cargo run --example parallel
use dialogue_engine::core::interactor::{Interactor, State};
use dialogue_engine::core::parser;
use std::sync::Arc;

const SCRIPT: &str = "\
Guide: Three doors. Pick one.
    > The red door:
        $: Heat rolls out to meet you.
    > The blue door:
        $: A cold draft pulls you in.
    > The plain door:
        $: It opens onto your own hallway.
$: You step through.";

fn main() {
    let story = match parser::parse(SCRIPT) {
        Ok(story) => Arc::new(story),
        Err(e) => {
            eprintln!("parse failed: {}", e);
            return;
        }
    };

    let mut base = Interactor::from_start(story.clone());
    println!("{}", base.text().unwrap_or(""));
    if base.advance().is_err() {
        return;
    }

    let choices: Vec<String> = base
        .choices()
        .unwrap_or_default()
        .into_iter()
        .map(str::to_string)
        .collect();

    for (index, label) in choices.iter().enumerate() {
        // Clone the cursor at the choice set; the original never moves.
        let mut preview = base.clone();
        if preview.select_choice(index).is_err() {
            continue;
        }
        println!("\n[{}]", label);
        while let State::AtLine(_) = preview.state() {
            println!("  {}", preview.text().unwrap_or(""));
            if preview.advance().is_err() {
                break;
            }
        }
    }

    assert!(matches!(base.state(), State::AtChoiceSet(_)));
    println!("\n(base cursor still waiting at the choice set)");
}
