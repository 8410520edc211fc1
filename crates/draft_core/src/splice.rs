//! Single-region replacement of the `<content>...</content>` block.
//!
//! The region runs from the first `<content>` opening tag to the first
//! `</content>` after it. Documents with more than one content block only
//! ever have the first one extracted or replaced.

use std::ops::Range;

const OPEN_TAG: &str = "<content>";
const CLOSE_TAG: &str = "</content>";

/// Byte range of the first content region, closing tag included.
pub fn content_region(xml: &str) -> Option<Range<usize>> {
    let start = xml.find(OPEN_TAG)?;
    let after_open = start + OPEN_TAG.len();
    let close = xml[after_open..].find(CLOSE_TAG)?;
    Some(start..after_open + close + CLOSE_TAG.len())
}

/// The unit sent for refinement: the content region, or the whole document
/// when there is none.
pub fn refinement_unit(xml: &str) -> &str {
    match content_region(xml) {
        Some(range) => &xml[range],
        None => xml,
    }
}

/// Replaces the content region with `replacement`, or the whole document
/// when there is no region.
pub fn splice_content(xml: &str, replacement: &str) -> String {
    let Some(range) = content_region(xml) else {
        return replacement.to_string();
    };

    let mut spliced = String::with_capacity(xml.len() - range.len() + replacement.len());
    spliced.push_str(&xml[..range.start]);
    spliced.push_str(replacement);
    spliced.push_str(&xml[range.end..]);
    spliced
}

#[cfg(test)]
#[path = "tests/splice_tests.rs"]
mod tests;
