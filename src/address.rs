//! Cell reference arithmetic
//!
//! Converts human readable references such as `"AA34"` into zero based
//! `(column, row)` indexes.

/// Converts a cell reference into its zero based `(column, row)` position.
///
/// The reference must be one or more uppercase letters followed by one or
/// more digits. Anything else (lowercase letters, `$` markers, a row of `0`,
/// overflowing values) yields `None`: producers occasionally emit stray
/// references and callers are expected to skip them.
///
/// # Examples
///
/// ```
/// use xlgrid::ref_to_indexes;
///
/// assert_eq!(ref_to_indexes("A1"), Some((0, 0)));
/// assert_eq!(ref_to_indexes("AA34"), Some((26, 33)));
/// assert_eq!(ref_to_indexes("34"), None);
/// ```
pub fn ref_to_indexes(reference: &str) -> Option<(u32, u32)> {
    let bytes = reference.as_bytes();
    let letters = bytes.iter().take_while(|c| c.is_ascii_uppercase()).count();
    if letters == 0 || letters == bytes.len() {
        return None;
    }

    let mut col = 0u32;
    for c in &bytes[..letters] {
        col = col.checked_mul(26)?.checked_add((c - b'A') as u32 + 1)?;
    }

    let mut row = 0u32;
    for c in &bytes[letters..] {
        match *c {
            c @ b'0'..=b'9' => row = row.checked_mul(10)?.checked_add((c - b'0') as u32)?,
            _ => return None,
        }
    }

    Some((col - 1, row.checked_sub(1)?))
}

/// Splits a range reference such as `"A1:C3"` into its two endpoints.
///
/// A single reference returns `None` as second endpoint.
pub fn split_range(range: &str) -> (&str, Option<&str>) {
    match range.split_once(':') {
        Some((start, end)) => (start, Some(end)),
        None => (range, None),
    }
}
