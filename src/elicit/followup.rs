//! Follow-up question extraction and completion marker detection.
//!
//! A deliberately naive heuristic: sentences end at `.`, `?` or `!` followed
//! by whitespace. Abbreviations ("Mr. Smith"), decimals followed by a space
//! and quoted punctuation all produce false boundaries, and that is accepted.

/// Literal the model emits once every checklist criterion is satisfied.
pub const SUCCESS_MARKER: &str = "Success!";

/// Whether a response declares the request complete (case-sensitive).
pub fn is_satisfied(response: &str) -> bool {
    response.contains(SUCCESS_MARKER)
}

/// Split text after sentence-ending punctuation followed by whitespace.
///
/// The whitespace run at each boundary is dropped; whitespace anywhere else
/// is kept inside its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch.is_whitespace() && matches!(prev, Some('.' | '?' | '!')) {
            sentences.push(&text[start..idx]);

            let mut next_start = text.len();
            while let Some(&(pos, c)) = chars.peek() {
                if !c.is_whitespace() {
                    next_start = pos;
                    break;
                }
                chars.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(ch);
    }

    sentences.push(&text[start..]);
    sentences
}

/// First sentence of `response` ending in `?`, trimmed; empty when none.
pub fn extract_follow_up(response: &str) -> &str {
    split_sentences(response)
        .into_iter()
        .map(str::trim)
        .find(|sentence| sentence.ends_with('?'))
        .unwrap_or("")
}
