/// Script Linter — validates dialogue scripts and reports graph stats.
///
/// Usage: script_linter <script_file_or_dir> [--dump]
///
/// Parses each script, reports parse errors with line numbers, prints
/// node/label/choice statistics, and warns about nodes no entry point
/// can reach. With --dump, writes each parsed graph as RON next to the
/// script (`<name>.story.ron`).
use dialogue_engine::core::parser;
use dialogue_engine::schema::node::{NextNode, NodeId, StoryNode};
use dialogue_engine::schema::story::Story;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: script_linter <script_file_or_dir> [--dump]");
        process::exit(0);
    }

    let target = Path::new(&args[1]);
    let dump = args.iter().skip(2).any(|a| a == "--dump");

    let mut scripts: Vec<PathBuf> = Vec::new();
    if target.is_file() {
        scripts.push(target.to_path_buf());
    } else if target.is_dir() {
        collect_scripts(target, &mut scripts);
        scripts.sort();
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    if scripts.is_empty() {
        eprintln!("ERROR: No scripts found under '{}'", args[1]);
        process::exit(1);
    }

    let mut failures = 0;
    for path in &scripts {
        if !lint_script(path, dump) {
            failures += 1;
        }
    }

    println!();
    if failures > 0 {
        println!("{}/{} script(s) failed", failures, scripts.len());
        process::exit(1);
    }
    println!("All {} script(s) passed", scripts.len());
}

fn collect_scripts(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_scripts(&path, out);
        } else if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("txt") | Some("hlc")
        ) {
            out.push(path);
        }
    }
}

fn lint_script(path: &Path, dump: bool) -> bool {
    println!("\n=== {} ===", path.display());

    let source = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("ERROR: Failed to read file: {}", e);
            return false;
        }
    };

    let story = match parser::parse(&source) {
        Ok(story) => story,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return false;
        }
    };

    let (choice_sets, choice_total) = choice_stats(&story);
    println!(
        "{} node(s), {} label(s), {} choice set(s), {} choice(s)",
        story.len(),
        story.labels().count(),
        choice_sets,
        choice_total
    );

    for id in unreachable_nodes(&story) {
        println!("WARNING: node {} is unreachable from any entry point", id.0);
    }

    if dump {
        let out_path = path.with_extension("story.ron");
        match ron::ser::to_string_pretty(&story, ron::ser::PrettyConfig::default()) {
            Ok(serialized) => {
                if let Err(e) = std::fs::write(&out_path, serialized) {
                    eprintln!("ERROR: Failed to write '{}': {}", out_path.display(), e);
                    return false;
                }
                println!("Wrote {}", out_path.display());
            }
            Err(e) => {
                eprintln!("ERROR: Failed to serialize story: {}", e);
                return false;
            }
        }
    }

    true
}

fn choice_stats(story: &Story) -> (usize, usize) {
    let mut sets = 0;
    let mut total = 0;
    for id in 0..story.len() {
        if let StoryNode::ChoiceSet { choices } = story.node_at(NodeId(id)) {
            sets += 1;
            total += choices.len();
        }
    }
    (sets, total)
}

/// Nodes not reachable from the default start or any declared label.
fn unreachable_nodes(story: &Story) -> Vec<NodeId> {
    let mut visited = vec![false; story.len()];
    let mut frontier: Vec<NodeId> = Vec::new();

    if let NextNode::Node(id) = story.start() {
        frontier.push(id);
    }
    for label in story.labels() {
        if let Some(NextNode::Node(id)) = story.entry(label) {
            frontier.push(id);
        }
    }

    while let Some(id) = frontier.pop() {
        if visited[id.0] {
            continue;
        }
        visited[id.0] = true;
        match story.node_at(id) {
            StoryNode::Line { next, .. } => {
                if let NextNode::Node(n) = next {
                    frontier.push(*n);
                }
            }
            StoryNode::ChoiceSet { choices } => {
                for choice in choices {
                    if let NextNode::Node(n) = choice.target {
                        frontier.push(n);
                    }
                }
            }
        }
    }

    (0..story.len())
        .filter(|&i| !visited[i])
        .map(NodeId)
        .collect()
}
