/// Convo demo — walks a small looping conversation.
///
/// A mini script: greeting, narration, a three-way choice, and a
/// branch that loops back to the start via `@goto`.
///
/// Run with: cargo run --example convo
use dialogue_engine::core::interactor::{Interactor, State, Step};
use dialogue_engine::core::parser;
use std::sync::Arc;

const SCRIPT: &str = "\
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

fn main() {
    let story = match parser::parse(SCRIPT) {
        Ok(story) => Arc::new(story),
        Err(e) => {
            eprintln!("parse failed: {}", e);
            return;
        }
    };
    println!("story node count: {}\n", story.len());

    // Take the loop once, then exit through the praise branch.
    let picks = [2usize, 0];
    let mut pick_at = 0;

    let mut cursor = Interactor::from_start(story);
    loop {
        match cursor.state() {
            State::AtLine(id) => {
                let speaker = cursor.speaker().unwrap_or(None);
                let text = cursor.text().unwrap_or("");
                match speaker {
                    Some(name) => println!("{}> {}: {}", id.0, name, text),
                    None => println!("{}> {}", id.0, text),
                }
                if matches!(cursor.advance(), Ok(Step::Ended) | Err(_)) {
                    break;
                }
            }
            State::AtChoiceSet(_) => {
                let choices = cursor.choices().unwrap_or_default();
                for label in &choices {
                    println!("   - {}", label);
                }
                let pick = picks[pick_at % picks.len()];
                pick_at += 1;
                println!("   (choosing option {})", pick);
                if cursor.select_choice(pick).is_err() {
                    break;
                }
            }
            State::Ended => break,
        }
    }

    println!("\n(end of story)");
}
