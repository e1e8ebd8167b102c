//! Byte-exact writer for the suite table document.

/// Everything before the suite table.
pub const HEADER: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
    "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n",
    "<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n",
    "<head>\n",
    "  <meta content=\"text/html; charset=UTF-8\" http-equiv=\"content-type\" />\n",
    "  <title>Test Suite</title>\n",
    "</head>\n",
    "<body>\n",
);

/// Everything after the suite table.
pub const FOOTER: &str = "</body>\n</html>\n";

const TABLE_OPEN: &str = "<table id=\"suiteTable\" cellpadding=\"1\" cellspacing=\"1\" border=\"1\" class=\"selenium\"><tbody>\n";
const TITLE_ROW: &str = "<tr><td><b>Test Suite</b></td></tr>\n";
const TABLE_CLOSE: &str = "</tbody></table>\n";

/// Formats one linked row. `path` is percent-encoded, `title` is written verbatim.
pub fn format_row(path: &str, title: &str) -> String {
    format!(
        "<tr><td><a href=\"{}\">{}</a></td></tr>\n",
        encode_href(path),
        title
    )
}

/// Formats the whole `<table>` element for the given `(path, title)` rows.
pub fn format_suite_table<I, P, T>(rows: I) -> String
where
    I: IntoIterator<Item = (P, T)>,
    P: AsRef<str>,
    T: AsRef<str>,
{
    let mut content = String::from(TABLE_OPEN);
    content.push_str(TITLE_ROW);
    for (path, title) in rows {
        content.push_str(&format_row(path.as_ref(), title.as_ref()));
    }
    content.push_str(TABLE_CLOSE);
    content
}

/// Formats a complete suite document.
pub fn format_document<I, P, T>(rows: I) -> String
where
    I: IntoIterator<Item = (P, T)>,
    P: AsRef<str>,
    T: AsRef<str>,
{
    let mut doc = String::from(HEADER);
    doc.push_str(&format_suite_table(rows));
    doc.push_str(FOOTER);
    doc
}

/// Percent-encodes each `/`-separated segment so the separators stay readable.
pub fn encode_href(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SUITE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">
<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">
<head>
  <meta content=\"text/html; charset=UTF-8\" http-equiv=\"content-type\" />
  <title>Test Suite</title>
</head>
<body>
<table id=\"suiteTable\" cellpadding=\"1\" cellspacing=\"1\" border=\"1\" class=\"selenium\"><tbody>
<tr><td><b>Test Suite</b></td></tr>
</tbody></table>
</body>
</html>
";

    #[test]
    fn test_empty_document_layout() {
        let rows: Vec<(&str, &str)> = vec![];
        assert_eq!(format_document(rows), EMPTY_SUITE);
    }

    #[test]
    fn test_rows_in_order() {
        let table = format_suite_table(vec![("a.html", "A"), ("dir/b.html", "B")]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[2], "<tr><td><a href=\"a.html\">A</a></td></tr>");
        assert_eq!(lines[3], "<tr><td><a href=\"dir/b.html\">B</a></td></tr>");
        assert_eq!(lines[4], "</tbody></table>");
    }

    #[test]
    fn test_encode_href_keeps_separators() {
        assert_eq!(encode_href("../my tests/50%.html"), "../my%20tests/50%25.html");
        assert_eq!(encode_href("quote\"d.html"), "quote%22d.html");
        assert_eq!(encode_href("plain-name_1.html"), "plain-name_1.html");
    }
}
