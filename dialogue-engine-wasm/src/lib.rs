//! WASM bindings for dialogue-engine — the embedding boundary for web hosts.
//!
//! Ownership across the boundary is explicit: a `DialogueStory` owns
//! the parsed graph, each `DialogueInteractor` owns its cursor (plus a
//! shared handle on the story), and a `ChoiceList` is a snapshot that
//! the host releases independently of the interactor it came from.
//! All teardown goes through the wasm-bindgen generated `free()`.

use std::sync::Arc;
use wasm_bindgen::prelude::*;

use dialogue_engine::core::interactor::{Interactor, State, Step};
use dialogue_engine::core::parser;
use dialogue_engine::schema::story::Story;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct StoryInfo {
    node_count: usize,
    labels: Vec<String>,
}

// ---------------------------------------------------------------------------
// DialogueStory — owns the immutable parsed graph
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialogueStory {
    story: Arc<Story>,
}

#[wasm_bindgen]
impl DialogueStory {
    /// Parse script text into a story. Fails with the parse error's
    /// message (kind plus 1-based line number) on malformed input or
    /// an undeclared label.
    #[wasm_bindgen(constructor)]
    pub fn parse(source: &str) -> Result<DialogueStory, JsError> {
        let story = parser::parse(source)
            .map_err(|e| JsError::new(&format!("Script parse error: {e}")))?;
        Ok(DialogueStory {
            story: Arc::new(story),
        })
    }

    /// Number of nodes in the parsed graph.
    pub fn node_count(&self) -> usize {
        self.story.len()
    }

    /// JSON array of declared label names, sorted for stable output.
    pub fn labels(&self) -> String {
        let mut labels: Vec<&str> = self.story.labels().collect();
        labels.sort_unstable();
        serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string())
    }

    /// JSON object describing the story: node count and label names.
    pub fn summary(&self) -> String {
        let mut labels: Vec<String> = self.story.labels().map(str::to_string).collect();
        labels.sort_unstable();
        let info = StoryInfo {
            node_count: self.story.len(),
            labels,
        };
        serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string())
    }

    /// Create a cursor at the given entry label, or at the start of
    /// the story when no label is given. Dropping the story handle
    /// later does not invalidate the cursor; it keeps the graph alive.
    pub fn interactor(&self, entry: Option<String>) -> Result<DialogueInteractor, JsError> {
        let cursor = match entry {
            Some(label) => Interactor::at_label(self.story.clone(), &label)
                .map_err(|e| JsError::new(&format!("{e}")))?,
            None => Interactor::from_start(self.story.clone()),
        };
        Ok(DialogueInteractor { cursor })
    }
}

// ---------------------------------------------------------------------------
// DialogueInteractor — a traversal cursor
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct DialogueInteractor {
    cursor: Interactor,
}

#[wasm_bindgen]
impl DialogueInteractor {
    /// Current state: "line", "choices", or "ended".
    pub fn state(&self) -> String {
        match self.cursor.state() {
            State::AtLine(_) => "line",
            State::AtChoiceSet(_) => "choices",
            State::Ended => "ended",
        }
        .to_string()
    }

    /// ID of the current node; absent once the story has ended.
    pub fn node_id(&self) -> Option<usize> {
        match self.cursor.state() {
            State::AtLine(id) | State::AtChoiceSet(id) => Some(id.0),
            State::Ended => None,
        }
    }

    /// Text of the current line. Errors outside the "line" state.
    pub fn text(&self) -> Result<String, JsError> {
        self.cursor
            .text()
            .map(str::to_string)
            .map_err(|e| JsError::new(&format!("{e}")))
    }

    /// Speaker of the current line; `None` for narration. Errors
    /// outside the "line" state.
    pub fn speaker(&self) -> Result<Option<String>, JsError> {
        self.cursor
            .speaker()
            .map(|s| s.map(str::to_string))
            .map_err(|e| JsError::new(&format!("{e}")))
    }

    /// Snapshot of the current choice labels. Errors outside the
    /// "choices" state. The returned list outlives this cursor.
    pub fn choices(&self) -> Result<ChoiceList, JsError> {
        let labels = self
            .cursor
            .choices()
            .map_err(|e| JsError::new(&format!("{e}")))?;
        Ok(ChoiceList {
            labels: labels.into_iter().map(str::to_string).collect(),
        })
    }

    /// Step along the current line's edge. Returns the ID of the node
    /// moved to, or nothing when the story concluded; moved, concluded,
    /// and error remain three distinct outcomes.
    pub fn advance(&mut self) -> Result<Option<usize>, JsError> {
        match self.cursor.advance() {
            Ok(Step::Moved(id)) => Ok(Some(id.0)),
            Ok(Step::Ended) => Ok(None),
            Err(e) => Err(JsError::new(&format!("{e}"))),
        }
    }

    /// Jump into the indexed choice's branch. Same result convention
    /// as `advance`; an out-of-range index errors and leaves the
    /// cursor where it was.
    pub fn select_choice(&mut self, index: usize) -> Result<Option<usize>, JsError> {
        match self.cursor.select_choice(index) {
            Ok(Step::Moved(id)) => Ok(Some(id.0)),
            Ok(Step::Ended) => Ok(None),
            Err(e) => Err(JsError::new(&format!("{e}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// ChoiceList — an independently released snapshot of choice labels
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ChoiceList {
    labels: Vec<String>,
}

#[wasm_bindgen]
impl ChoiceList {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`, or nothing when out of range.
    pub fn get(&self, index: usize) -> Option<String> {
        self.labels.get(index).cloned()
    }

    /// JSON array of all labels, in authored order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.labels).unwrap_or_else(|_| "[]".to_string())
    }
}
