//! Line-oriented YAML block editor (§4.8, Design Note in §9)
//!
//! No YAML parser is used: a "block" is located by its header line
//! (trailing colon, optionally indented); its children are every
//! subsequent line indented strictly more than the header, up to but
//! not including the first line indented equally or less (blank lines
//! in between are treated as part of the block). A "scalar" is a
//! `key: value` line located the same way, by key alone.

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Finds the line whose trimmed content is exactly `{key}:` or starts
/// with `{key}:`, returning its index and indentation.
fn find_header(lines: &[String], key: &str) -> Option<(usize, usize)> {
    let prefix = format!("{key}:");
    lines.iter().enumerate().find_map(|(i, line)| {
        let trimmed = line.trim_start();
        if trimmed.starts_with(&prefix) {
            Some((i, indent_of(line)))
        } else {
            None
        }
    })
}

/// Sets a scalar `key: value` line in place, preserving its original
/// indentation. Appends `key: value` at the end if the key is absent.
pub fn set_scalar(lines: &mut Vec<String>, key: &str, value: &str) {
    if let Some((idx, indent)) = find_header(lines, key) {
        lines[idx] = format!("{}{key}: {value}", " ".repeat(indent));
    } else {
        lines.push(format!("{key}: {value}"));
    }
}

/// Returns the exclusive end index of the block headed by the line at
/// `header_idx` with indentation `header_indent`: the first subsequent
/// line indented `<= header_indent` and non-blank, or the end of file.
fn block_end(lines: &[String], header_idx: usize, header_indent: usize) -> usize {
    let mut end = header_idx + 1;
    while end < lines.len() {
        let line = &lines[end];
        if !is_blank(line) && indent_of(line) <= header_indent {
            break;
        }
        end += 1;
    }
    end
}

/// Replaces the children of the block headed by `header:` with
/// `new_children`, each indented two spaces past the header. Does
/// nothing if the header is not found.
pub fn replace_block_children(lines: &mut Vec<String>, header: &str, new_children: &[String]) {
    let Some((idx, indent)) = find_header(lines, header) else {
        return;
    };
    let end = block_end(lines, idx, indent);
    let child_indent = " ".repeat(indent + 2);
    let replacement: Vec<String> = new_children
        .iter()
        .map(|c| format!("{child_indent}{c}"))
        .collect();
    lines.splice(idx + 1..end, replacement);
}

/// Uncomments (if commented with a leading `#`) and sets a JVM flag
/// line such as `-Xms4g`, preserving indentation. Appends a new line
/// at the document's indentation level 0 if the flag is absent
/// entirely.
pub fn set_jvm_flag(lines: &mut Vec<String>, flag: &str, value: &str) {
    for line in lines.iter_mut() {
        let trimmed = line.trim_start();
        let (indent, rest) = (indent_of(line), trimmed.trim_start_matches('#').trim_start());
        if rest.starts_with(flag) {
            *line = format!("{}{flag}{value}", " ".repeat(indent));
            return;
        }
    }
    lines.push(format!("{flag}{value}"));
}

#[must_use]
pub fn to_lines(content: &str) -> Vec<String> {
    content.lines().map(str::to_string).collect()
}

#[must_use]
pub fn from_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_existing_scalar_in_place() {
        let mut lines = to_lines("network:\n  port: 5801\n  other: true\n");
        set_scalar(&mut lines, "port", "6801");
        assert_eq!(lines[1], "  port: 6801");
    }

    #[test]
    fn replaces_block_children_stopping_at_dedent() {
        let mut lines = to_lines(
            "cluster:\n  member-list:\n    - 127.0.0.1:5801\n  other-key: value\n",
        );
        replace_block_children(
            &mut lines,
            "member-list",
            &["- 10.0.0.1:5801".to_string(), "- 10.0.0.2:5801".to_string()],
        );
        let joined = from_lines(&lines);
        assert!(joined.contains("    - 10.0.0.1:5801"));
        assert!(joined.contains("    - 10.0.0.2:5801"));
        assert!(joined.contains("other-key: value"));
        assert!(!joined.contains("127.0.0.1"));
    }

    #[test]
    fn uncomments_and_sets_heap_flag() {
        let mut lines = to_lines("options:\n  #-Xms2g\n  -Xmx2g\n");
        set_jvm_flag(&mut lines, "-Xms", "4g");
        set_jvm_flag(&mut lines, "-Xmx", "4g");
        let joined = from_lines(&lines);
        assert!(joined.contains("-Xms4g"));
        assert!(joined.contains("-Xmx4g"));
        assert!(!joined.contains('#'));
    }
}
