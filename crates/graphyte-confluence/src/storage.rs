//! Confluence storage format (XHTML) fragments.

use std::fmt::Write;

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<hN>` heading with escaped text.
pub fn heading(level: u8, text: &str) -> String {
    format!("<h{level}>{}</h{level}>", escape(text))
}

/// Wrap `text` in CDATA, splitting any `]]>` it contains.
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Table whose first row is a header row.
pub fn table(rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table><tbody>");
    for (i, row) in rows.iter().enumerate() {
        let cell = if i == 0 { "th" } else { "td" };
        html.push_str("<tr>");
        for value in row {
            let _ = write!(html, "<{cell}>{}</{cell}>", escape(value));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Table inside a titled panel, as used for sheets and CSV templates.
pub fn titled_table(title: &str, rows: &[Vec<String>]) -> String {
    format!(
        "<ac:structured-macro ac:name=\"panel\" ac:schema-version=\"1\">\
         <ac:parameter ac:name=\"title\">{}</ac:parameter>\
         <ac:rich-text-body>{}</ac:rich-text-body></ac:structured-macro>",
        escape(title),
        table(rows)
    )
}

/// Code block macro holding `content` verbatim.
pub fn code_block(title: &str, content: &str) -> String {
    format!(
        "<ac:structured-macro ac:name=\"code\" ac:schema-version=\"1\">\
         <ac:parameter ac:name=\"title\">{}</ac:parameter>\
         <ac:parameter ac:name=\"linenumbers\">true</ac:parameter>\
         <ac:plain-text-body>{}</ac:plain-text-body></ac:structured-macro>",
        escape(title),
        cdata(content)
    )
}

/// Image showing an attachment of the page.
pub fn attached_image(filename: &str) -> String {
    format!(
        "<p><ac:image><ri:attachment ri:filename=\"{}\" /></ac:image></p>",
        escape(filename)
    )
}

/// Link to an attachment of the page.
pub fn attachment_link(filename: &str, text: &str) -> String {
    format!(
        "<ac:link><ri:attachment ri:filename=\"{}\" />\
         <ac:plain-text-link-body>{}</ac:plain-text-link-body></ac:link>",
        escape(filename),
        cdata(text)
    )
}

/// List of child pages in creation order.
pub fn children_macro() -> &'static str {
    "<p><ac:structured-macro ac:name=\"children\" ac:schema-version=\"2\">\
     <ac:parameter ac:name=\"depth\">1</ac:parameter>\
     <ac:parameter ac:name=\"sort\">creation</ac:parameter></ac:structured-macro></p>"
}

/// Table of contents under a heading that the TOC itself leaves out.
pub fn toc_with_header(header: &str) -> String {
    format!(
        "{}<p><ac:structured-macro ac:name=\"toc\" ac:schema-version=\"1\">\
         <ac:parameter ac:name=\"maxLevel\">7</ac:parameter>\
         <ac:parameter ac:name=\"exclude\">{}</ac:parameter></ac:structured-macro></p>",
        heading(1, header),
        escape(header)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_table_header_row() {
        let rows = vec![
            vec!["Name".to_owned(), "Desc".to_owned()],
            vec!["<VLAN>".to_owned(), "id".to_owned()],
        ];
        assert_eq!(
            table(&rows),
            "<table><tbody><tr><th>Name</th><th>Desc</th></tr>\
             <tr><td>&lt;VLAN&gt;</td><td>id</td></tr></tbody></table>"
        );
    }

    #[test]
    fn test_code_block_splits_cdata_end() {
        let html = code_block("t.txt", "a ]]> b");
        assert!(html.contains("<![CDATA[a ]]]]><![CDATA[> b]]>"));
    }

    #[test]
    fn test_attachment_refs_escape_names() {
        assert_eq!(
            attached_image("A&B.svg"),
            "<p><ac:image><ri:attachment ri:filename=\"A&amp;B.svg\" /></ac:image></p>"
        );
        assert!(attachment_link("m.zip", "Get it").contains("<![CDATA[Get it]]>"));
    }

    #[test]
    fn test_toc_excludes_its_header() {
        let html = toc_with_header("Table of Contents");
        assert!(html.starts_with("<h1>Table of Contents</h1>"));
        assert!(html.contains("<ac:parameter ac:name=\"exclude\">Table of Contents</ac:parameter>"));
    }
}
