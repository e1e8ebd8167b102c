//! HTML encoding of suite documents.
//!
//! `scanner` reads the lenient subset of HTML that suite files are written in;
//! `format` writes the canonical layout back out.

pub mod format;
pub mod scanner;

pub use format::{encode_href, format_document, format_row, format_suite_table, FOOTER, HEADER};
pub use scanner::{decode_href, find_table, parse_anchor, Anchor, Block, RowScanner};
