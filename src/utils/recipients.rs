// src/utils/recipients.rs

const SEPARATORS: &[char] = &['\n', ',', ';'];

/// Splits pasted recipient text on newlines, commas and semicolons.
///
/// Spaces alone do not separate entries. Pieces are trimmed, empty pieces are
/// dropped and input order is preserved.
pub fn parse(text: &str) -> Vec<String> {
    text.split(SEPARATORS)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
