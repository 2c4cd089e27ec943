use std::path::Path;

// A value inside `-vf` / `-filter_complex` is unescaped twice before the
// filter sees it: once by the filtergraph parser and once by the option
// parser. drawtext then expands `%{...}` and `\` in its text a third time.

/// Option level: protect the value from the `key=value:key=value` splitter.
fn escape_option_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Filtergraph level: single-quote the value so `,` `;` `[` `]` pass through.
/// A quote inside cannot be escaped within quotes, so it is closed, written
/// escaped, and reopened.
fn quote_graph_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// drawtext `text=` value that renders `text` literally.
pub fn drawtext_text_value(text: &str) -> String {
    let literal = text.replace('\\', "\\\\").replace('%', "\\%");
    quote_graph_value(&escape_option_value(&literal))
}

/// Path as a filter option value, with forward slashes only.
pub fn filter_path_value(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    quote_graph_value(&escape_option_value(&path))
}

pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
