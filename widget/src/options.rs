//! Construction-time configuration for a [`TagEditor`](crate::TagEditor).

use std::num::NonZeroUsize;

/// Default cap on the number of tags in the collection.
pub const DEFAULT_MAX_TAGS: NonZeroUsize = NonZeroUsize::MIN.saturating_add(9);

/// Default cap on the length (in characters) of a single normalized tag.
pub const DEFAULT_MAX_LEN: NonZeroUsize = NonZeroUsize::MIN.saturating_add(49);

const DEFAULT_PLACEHOLDER: &str = "Type a tag and press Enter or comma";

/// Built-in vocabulary for the suggestion popup.
const BUILTIN_SUGGESTIONS: [&str; 4] = ["javascript", "java", "html", "css"];

/// Options resolved at construction; the editor never mutates them afterwards
/// and exposes them read-only via [`TagEditor::options`](crate::TagEditor::options).
///
/// The `NonZeroUsize` limits encode the "must be positive" requirement at the
/// type level instead of validating at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEditorOptions {
    /// Maximum number of tags the collection may hold.
    pub max_tags: NonZeroUsize,
    /// Maximum length, in characters, of a single normalized tag.
    pub max_len: NonZeroUsize,
    /// Hint text rendered while the input field is empty.
    pub placeholder: String,
    /// Seed tags, normalized and validated at construction. Entries that fail
    /// validation are skipped with a warning.
    pub initial_tags: Vec<String>,
    /// Static vocabulary offered by the suggestion popup. An empty vector
    /// disables the popup entirely.
    pub suggestions: Vec<String>,
}

impl Default for TagEditorOptions {
    fn default() -> Self {
        Self {
            max_tags: DEFAULT_MAX_TAGS,
            max_len: DEFAULT_MAX_LEN,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            initial_tags: Vec::new(),
            suggestions: BUILTIN_SUGGESTIONS.map(str::to_string).to_vec(),
        }
    }
}
