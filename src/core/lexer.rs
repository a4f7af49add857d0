/// Line classifier: turns each physical script line into a lexical record.
use crate::core::parser::ParseError;

/// What a single script line means, before graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Whitespace-only. Creates no node.
    Blank,
    /// `[name]`: registers the next node under this label.
    Label(String),
    /// `@goto name`: redirects the preceding node's fall-through.
    Goto(String),
    /// `> text`: opens or continues a choice set.
    Choice(String),
    /// `$: text`: a narrator line with no speaker.
    Narration(String),
    /// `Speaker: text`: a spoken line.
    Dialogue { speaker: String, text: String },
}

/// One classified line with its position and indentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLine {
    /// 1-based physical line number, for error reporting.
    pub number: usize,
    /// Count of leading whitespace characters. A tab counts as one;
    /// only relative comparisons between lines matter.
    pub indent: usize,
    pub kind: LineKind,
}

/// Classify one physical line (already stripped of its newline).
///
/// Classification rules, in priority order:
/// 1. whitespace only => `Blank`
/// 2. `[name]` => `Label`
/// 3. `@goto name` => `Goto`
/// 4. `> text` => `Choice` (one trailing `:` is stripped)
/// 5. `$: text` => `Narration`
/// 6. `Speaker: text` => `Dialogue` (split at the first colon)
///
/// Anything else fails with `MalformedLine` carrying `number`.
pub fn classify(raw: &str, number: usize) -> Result<ClassifiedLine, ParseError> {
    let indent = raw.len() - raw.trim_start().len();
    let content = raw.trim();

    let kind = if content.is_empty() {
        LineKind::Blank
    } else if let Some(inner) = content.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if inner.is_empty()
            || inner.contains(char::is_whitespace)
            || inner.contains('[')
            || inner.contains(']')
        {
            return Err(ParseError::MalformedLine { line: number });
        }
        LineKind::Label(inner.to_string())
    } else if let Some(rest) = content.strip_prefix("@goto") {
        let name = rest.trim();
        if name.is_empty() || !rest.starts_with(char::is_whitespace) {
            return Err(ParseError::MalformedLine { line: number });
        }
        LineKind::Goto(name.to_string())
    } else if let Some(rest) = content.strip_prefix("> ") {
        // Choice labels are authored with a trailing colon: `> Wave back:`
        let trimmed = rest.trim();
        let label = trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end();
        LineKind::Choice(label.to_string())
    } else if let Some(rest) = content.strip_prefix("$:") {
        // Checked before the dialogue rule so `$` never becomes a speaker.
        LineKind::Narration(rest.trim().to_string())
    } else if let Some((speaker, text)) = content.split_once(':') {
        let speaker = speaker.trim();
        if speaker.is_empty() {
            return Err(ParseError::MalformedLine { line: number });
        }
        LineKind::Dialogue {
            speaker: speaker.to_string(),
            text: text.trim().to_string(),
        }
    } else {
        return Err(ParseError::MalformedLine { line: number });
    };

    Ok(ClassifiedLine {
        number,
        indent,
        kind,
    })
}
