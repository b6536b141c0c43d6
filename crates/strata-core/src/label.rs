//! Short, spreadsheet-style vertex labels used in diagram export.

use crate::graph::VertexId;

/// Return the label for a 1-based vertex id: `1 -> "A"`, `26 -> "Z"`,
/// `27 -> "AA"`, `28 -> "AB"`, …
///
/// Id `0` has no label and maps to `"?"`.
#[must_use]
pub fn vertex_label(id: VertexId) -> String {
    if id == 0 {
        return "?".to_string();
    }

    // Bijective base-26: there is no zero digit.
    let mut rest = id;
    let mut letters = Vec::new();
    while rest > 0 {
        rest -= 1;
        letters.push(b'A' + u8::try_from(rest % 26).unwrap_or_default());
        rest /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
