//! Embedding text as JavaScript arrays inside the output page.
//!
//! Every linked file ends up as one array whose first entry is the file name
//! and whose remaining entries are the file's lines:
//!
//! ```text
//!     var v_cmds_txt = [
//!  "cmds.txt",
//! "set interface <IF_NAME>"];
//! ```

/// Escape a line for use inside a double-quoted script string.
///
/// Backslashes and quotes are escaped, hyphens become `\-` so sequences like
/// `-->` can't close markup, and line breaks are dropped.
pub fn escape_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    for ch in line.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '-' => out.push_str("\\-"),
            '\r' | '\n' => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Script variable name holding the content of `file_name`.
///
/// The viewer derives the same name from the clicked wrapper's id.
pub fn var_name_for_file(file_name: &str) -> String {
    let mut out = String::with_capacity(file_name.len() + 2);
    out.push_str("v_");
    out.extend(file_name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    out
}

/// Render one embeddable array. `lines` are escaped here.
pub fn render_array<'a>(var: &str, first: &str, lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = format!("    var {var} = [\n \"{}\"", escape_line(first));
    for line in lines {
        out.push_str(",\n\"");
        out.push_str(&escape_line(line));
        out.push('"');
    }
    out.push_str("];\n\n");
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_line() {
        assert_eq!(
            escape_line(r#"say "hi" \ to a-b"#),
            r#"say \"hi\" \\ to a\-b"#
        );
    }

    #[test]
    fn test_escape_line_drops_carriage_return() {
        assert_eq!(escape_line("abc\r"), "abc");
    }

    #[test]
    fn test_var_name_for_file() {
        assert_eq!(var_name_for_file("cmds.txt"), "v_cmds_txt");
        assert_eq!(var_name_for_file("my-file v2.csv"), "v_my_file_v2_csv");
    }

    #[test]
    fn test_render_array() {
        let out = render_array("v_a_txt", "a.txt", ["one", "t\"wo"]);
        assert_eq!(out, "    var v_a_txt = [\n \"a.txt\",\n\"one\",\n\"t\\\"wo\"];\n\n");
    }

    #[test]
    fn test_render_array_empty_file() {
        let out = render_array("v_e", "e", std::iter::empty());
        assert_eq!(out, "    var v_e = [\n \"e\"];\n\n");
    }
}
