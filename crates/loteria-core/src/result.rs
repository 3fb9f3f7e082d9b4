//! Normalisation of the vision model's raw reply into a [`GameResult`].
//!
//! The model is asked for a bare JSON object but frequently wraps it in a
//! markdown code block. Fences are stripped, the remainder is parsed as JSON,
//! and the object is carried through verbatim: no range or type checks.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const FENCE: &str = "```";

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("malformed model response: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed model response: expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },
}

/// One game as read from the reply: its key and the values under it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntry {
    pub id: String,
    pub numbers: Vec<Value>,
}

/// Ordered mapping of game identifier to drawn numbers.
///
/// Entries keep the order in which their keys first appear in the reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameResult {
    entries: Vec<GameEntry>,
}

impl GameResult {
    pub fn entries(&self) -> &[GameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the longest number sequence, 0 when empty.
    pub fn max_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.numbers.len())
            .max()
            .unwrap_or(0)
    }

    /// Entries whose length differs from `expected`. Reported, never enforced.
    pub fn irregular(&self, expected: usize) -> impl Iterator<Item = &GameEntry> {
        self.entries
            .iter()
            .filter(move |e| e.numbers.len() != expected)
    }
}

impl FromIterator<(String, Vec<Value>)> for GameResult {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Value>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, numbers)| GameEntry { id, numbers })
                .collect(),
        }
    }
}

/// Remove a surrounding markdown code block from `raw`.
///
/// Drops an opening fence (with an optional language tag such as `json`),
/// a closing fence, and surrounding whitespace. Repeats until nothing changes,
/// so applying it twice gives the same result as applying it once.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    loop {
        let before = text.len();
        if let Some(rest) = text.strip_prefix(FENCE) {
            let tag_end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
                .unwrap_or(rest.len());
            text = rest[tag_end..].trim_start();
        }
        if let Some(rest) = text.strip_suffix(FENCE) {
            text = rest.trim_end();
        }
        if text.len() == before {
            return text;
        }
    }
}

/// Parse the model's raw reply into a [`GameResult`].
pub fn normalize(raw: &str) -> Result<GameResult, NormalizeError> {
    let body = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|source| NormalizeError::Malformed { source })?;

    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(NormalizeError::NotAnObject {
                found: json_kind(&other),
            });
        }
    };

    let result: GameResult = map
        .into_iter()
        .map(|(id, v)| match v {
            Value::Array(items) => (id, items),
            other => (id, vec![other]),
        })
        .collect();

    debug!(games = result.len(), max_len = result.max_len(), "normalized model reply");
    Ok(result)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
