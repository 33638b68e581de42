use serde::Serialize;

/// Maximum length of a derived display name.
const NAME_LIMIT: usize = 50;

/// One conversation: a display name, the prompt that started it, and an
/// ordered history of markup snapshots. The last snapshot is current.
#[derive(Debug, Clone)]
pub struct Conversation {
    name: String,
    original_prompt: Option<String>,
    history: Vec<String>,
}

impl Conversation {
    /// A conversation always starts with exactly one snapshot; the store
    /// deletes it before the history can become empty.
    pub fn new(
        name: impl Into<String>,
        original_prompt: Option<String>,
        initial_snapshot: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original_prompt,
            history: vec![initial_snapshot.into()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The initiating instruction, absent for image-originated conversations.
    pub fn original_prompt(&self) -> Option<&str> {
        self.original_prompt.as_deref()
    }

    pub fn current(&self) -> &str {
        // Invariant: history is non-empty while the conversation exists.
        self.history.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub(crate) fn push(&mut self, snapshot: String) {
        self.history.push(snapshot);
    }

    pub(crate) fn replace_last(&mut self, snapshot: String) {
        if let Some(last) = self.history.last_mut() {
            *last = snapshot;
        }
    }

    pub(crate) fn pop(&mut self) -> Option<String> {
        self.history.pop()
    }

    /// All snapshots joined in order. Consecutive full documents concatenated
    /// are not valid markup; this is a debug/legacy export view.
    pub fn concatenated(&self) -> String {
        self.history.concat()
    }
}

/// `(id, name)` pair returned by the list operation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub name: String,
}

/// Derive a display name from an initiating prompt: the text before the first
/// period, truncated to 50 characters (on a char boundary).
pub fn display_name(prompt: &str) -> String {
    prompt
        .split('.')
        .next()
        .unwrap_or(prompt)
        .chars()
        .take(NAME_LIMIT)
        .collect()
}
