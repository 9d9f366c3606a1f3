//! The XML codec.
//!
//! Reading is split in two: a tokenizer frontend (blocking or async, see
//! [`crate::io`]) turns `quick_xml` events into [`Token`]s, and the sans-IO
//! [`DocumentAssembler`] turns tokens into a [`crate::ReqIf`]. Writing goes
//! straight from the object graph to a `quick_xml` writer.

use std::borrow::Cow;

use quick_xml::escape::escape;

mod assemble;
pub mod kind;
mod location;
mod read;
mod tree;
mod write;

pub use assemble::DocumentAssembler;
pub(crate) use location::LineTracker;
pub use location::Location;
pub use tree::{Element, Node, StartTag, Token};
pub(crate) use write::write_document;

/// Escape `value` for use inside a double-quoted attribute.
///
/// Tabs and line breaks become character references.
pub(crate) fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            '\t' => out.push_str("&#x9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Convert a tokenizer offset into the position carried by errors.
pub(crate) fn position<T: TryInto<u64>>(offset: T) -> u64 {
    offset.try_into().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::escape_attribute;

    #[test]
    fn attribute_whitespace_becomes_character_references() {
        assert_eq!(escape_attribute("a \"b\" & c"), "a &quot;b&quot; &amp; c");
        assert_eq!(
            escape_attribute("line one\nline two\r\n\tend"),
            "line one&#xA;line two&#xD;&#xA;&#x9;end"
        );
    }
}
