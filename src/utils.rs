//! Internal module providing handy function

use quick_xml::events::BytesRef;

use crate::XlsxError;

macro_rules! from_err {
    ($from:ty, $to:tt, $var:tt) => {
        impl From<$from> for $to {
            fn from(e: $from) -> $to {
                $to::$var(e)
            }
        }
    };
}

/// Resolves a general entity reference (`&amp;`, `&#65;`, ...) into `buf`.
///
/// Unknown named entities are kept verbatim.
pub(crate) fn unescape_entity_to_buffer(
    e: &BytesRef<'_>,
    buf: &mut String,
) -> Result<(), XlsxError> {
    if let Some(ch) = e.resolve_char_ref()? {
        buf.push(ch);
        return Ok(());
    }
    let name = e.decode()?;
    match quick_xml::escape::resolve_predefined_entity(&name) {
        Some(s) => buf.push_str(s),
        None => {
            buf.push('&');
            buf.push_str(&name);
            buf.push(';');
        }
    }
    Ok(())
}
