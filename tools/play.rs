/// Play — interactive console player for dialogue scripts.
///
/// Usage: play <script_file> [--entry <label>]
///
/// Prints each line, prompts for a numbered selection at choice
/// points, and exits when the story ends. Type `quit` at any prompt
/// to stop early.
use dialogue_engine::core::interactor::{Interactor, State, Step};
use dialogue_engine::core::parser;
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: play <script_file> [--entry <label>]");
        return;
    }

    let script_path = &args[1];
    let mut entry = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--entry" && i + 1 < args.len() {
            i += 1;
            entry = Some(args[i].clone());
        }
        i += 1;
    }

    let source = match std::fs::read_to_string(script_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", script_path, e);
            process::exit(1);
        }
    };

    let story = match parser::parse(&source) {
        Ok(story) => Arc::new(story),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let mut cursor = match entry {
        Some(ref label) => match Interactor::at_label(story, label) {
            Ok(cursor) => cursor,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        },
        None => Interactor::from_start(story),
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match cursor.state() {
            State::AtLine(_) => {
                // Both reads are valid here; the guards never fire.
                let speaker = cursor.speaker().unwrap_or(None);
                let text = cursor.text().unwrap_or("");
                match speaker {
                    Some(name) => println!("{}: {}", name, text),
                    None => println!("{}", text),
                }
                match cursor.advance() {
                    Ok(Step::Moved(_)) => {}
                    Ok(Step::Ended) => break,
                    Err(e) => {
                        eprintln!("ERROR: {}", e);
                        process::exit(1);
                    }
                }
            }
            State::AtChoiceSet(_) => {
                let choices = match cursor.choices() {
                    Ok(choices) => choices,
                    Err(e) => {
                        eprintln!("ERROR: {}", e);
                        process::exit(1);
                    }
                };
                for (index, label) in choices.iter().enumerate() {
                    println!("  {}) {}", index + 1, label);
                }
                let count = choices.len();

                let selection = loop {
                    print!("> ");
                    let _ = io::stdout().flush();
                    let input = match lines.next() {
                        Some(Ok(line)) => line,
                        _ => {
                            println!();
                            return;
                        }
                    };
                    let input = input.trim();
                    if input == "quit" {
                        return;
                    }
                    match input.parse::<usize>() {
                        Ok(n) if n >= 1 && n <= count => break n - 1,
                        _ => println!("Pick a number from 1 to {}, or 'quit'.", count),
                    }
                };

                if let Err(e) = cursor.select_choice(selection) {
                    eprintln!("ERROR: {}", e);
                    process::exit(1);
                }
            }
            State::Ended => break,
        }
    }

    println!("(end of story)");
}
