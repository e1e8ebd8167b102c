//! Tag-boundary scanner for suite tables.
//!
//! The scanner never builds a document tree. It locates tag boundaries with small
//! case-insensitive patterns and walks them left to right:
//!
//! 1. `find_table` picks the first `<table ...>` and the first `</table>` after it.
//! 2. `RowScanner` yields each `<tr ...> ... </tr>` block, resuming after the previous
//!    block's close tag. An unclosed `<tr>` ends the scan instead of failing it.
//! 3. `parse_anchor` pulls `href` and the label out of a row; rows without an anchor
//!    are header or decoration rows and are left to the caller to skip.
//!
//! Every pattern matches across line breaks, so anchors split over several lines by
//! hand-edited files still decode.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TABLE_OPEN: Regex = Regex::new(r"(?i)<table[\s>]").unwrap();
    static ref TABLE_CLOSE: Regex = Regex::new(r"(?i)</table>").unwrap();
    static ref ROW_OPEN: Regex = Regex::new(r"(?i)<tr[\s>]").unwrap();
    static ref ROW_CLOSE: Regex = Regex::new(r"(?i)</tr>").unwrap();
    static ref ANCHOR: Regex =
        Regex::new(r#"(?is)<a\s[^>]*?href=['"]([^'"]+)['"][^>]*>(.*?)</a>"#).unwrap();
}

/// A slice of the scanned text together with its byte offset in that text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// The `href` and label of the first anchor in a row, both undecoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor<'a> {
    pub href: &'a str,
    pub label: &'a str,
}

/// Returns the first complete `<table>...</table>` block in `text`.
pub fn find_table(text: &str) -> Option<Block<'_>> {
    let open = TABLE_OPEN.find(text)?;
    let close = TABLE_CLOSE.find_at(text, open.end())?;
    Some(Block {
        text: &text[open.start()..close.end()],
        offset: open.start(),
    })
}

/// Sequential, non-overlapping scan over the `<tr>` blocks of a table.
#[derive(Debug, Clone)]
pub struct RowScanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> RowScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for RowScanner<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let open = ROW_OPEN.find_at(self.text, self.pos)?;
        let close = ROW_CLOSE.find_at(self.text, open.end())?;
        self.pos = close.end();
        Some(Block {
            text: &self.text[open.start()..close.end()],
            offset: open.start(),
        })
    }
}

/// Extracts the first anchor of a row, if it has one.
pub fn parse_anchor(row: &str) -> Option<Anchor<'_>> {
    let caps = ANCHOR.captures(row)?;
    Some(Anchor {
        href: caps.get(1)?.as_str(),
        label: caps.get(2)?.as_str(),
    })
}

/// Percent-decodes an `href` into a suite-relative filename.
///
/// Escapes that do not decode to UTF-8 leave the value untouched.
pub fn decode_href(href: &str) -> Cow<'_, str> {
    urlencoding::decode(href).unwrap_or(Cow::Borrowed(href))
}
