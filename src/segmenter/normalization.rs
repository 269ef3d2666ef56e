// WHY: every stored block goes through the same whitespace collapse so sentence
// text compares equal regardless of how the manuscript was wrapped

/// Collapse every run of whitespace (spaces, tabs, `\r`, `\n`) into a single space
/// and trim both ends
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    normalize_text_into(text, &mut result);
    result
}

/// Normalize into a supplied buffer so segmenters can reuse one allocation per flush
pub fn normalize_text_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    // WHY: a separator is only written once the next non-whitespace char shows up,
    // which drops leading and trailing runs without a second trim pass
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = !buffer.is_empty();
        } else {
            if pending_space {
                buffer.push(' ');
                pending_space = false;
            }
            buffer.push(ch);
        }
    }
}

/// Rewrite `\r\n` pairs as `\n` before any line-oriented segmentation
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}
