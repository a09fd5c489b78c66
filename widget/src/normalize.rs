//! Input normalization applied to every candidate tag before validation and
//! storage.
//!
//! Normalization is a pre-filter, independent of the renderer's display
//! sanitization: the renderer still sanitizes whatever it is given (see
//! `render::sanitize_display`), so the two layers never rely on each other.

/// Characters removed outright from candidate tags.
///
/// These are stripped (not escaped): a tag that survives normalization can be
/// embedded in any markup context without further quoting.
const STRIPPED_CHARS: [char; 5] = ['<', '>', '"', '\'', '&'];

/// Canonicalize a raw tag candidate.
///
/// Strips the characters in [`STRIPPED_CHARS`], lowercases, collapses every
/// run of whitespace to a single space, and trims. Stripping happens first:
/// removing a character can merge the whitespace around it, and the collapse
/// step must see the merged run. This ordering makes `normalize` idempotent
/// for every input, which callers rely on when re-normalizing stored tags.
pub fn normalize(raw: &str) -> String {
    let lowered: String = raw
        .chars()
        .filter(|ch| !STRIPPED_CHARS.contains(ch))
        .flat_map(char::to_lowercase)
        .collect();

    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            // Leading whitespace is dropped; interior runs become one space.
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}
