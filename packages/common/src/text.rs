//! UTF-16 position helpers.
//!
//! Remote offsets count UTF-16 code units while Rust strings index by byte, so
//! every conversion between the two goes through here.

/// Length of `s` in UTF-16 code units
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Convert a byte index into a UTF-16 offset
pub fn byte_to_utf16(s: &str, byte_idx: usize) -> usize {
    let end = byte_idx.min(s.len());
    s.get(..end).map(utf16_len).unwrap_or_else(|| {
        // Not on a char boundary: count whole chars that start before it
        s.char_indices()
            .take_while(|(i, _)| *i < end)
            .map(|(_, c)| c.len_utf16())
            .sum()
    })
}

/// Convert a UTF-16 offset into a byte index.
///
/// Returns `None` when the offset falls inside a surrogate pair or past the end.
pub fn utf16_to_byte(s: &str, pos: usize) -> Option<usize> {
    if pos == 0 {
        return Some(0);
    }

    let mut acc = 0;
    for (i, ch) in s.char_indices() {
        if acc == pos {
            return Some(i);
        }
        acc += ch.len_utf16();
        if acc > pos {
            return None;
        }
    }

    (acc == pos).then_some(s.len())
}
