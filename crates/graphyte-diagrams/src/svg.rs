//! SVG normalization for inline embedding.
//!
//! The normalizer streams the document once through a `quick-xml` reader and
//! writes a rewritten copy:
//!
//! - The outermost `<svg>` is flattened: it gets `id="svg"`, full width and
//!   `xMinYMin slice` scaling, loses fixed dimensions, position and style,
//!   and gains a `viewBox` when only `width`/`height` were given.
//! - Every `<a>` is classified by its target. `mod:<name>` links point at
//!   another module's page, `lit:<target>` links keep `<target>` verbatim,
//!   anything else is a local file: the anchor becomes a
//!   `<g class="wrapper" id="<file>">` the viewer reacts to, and the file
//!   name is recorded on the [`ModuleContext`].
//! - `<foreignObject>` blocks are removed, except in draw.io exports which
//!   need them for labels.
//! - XML declarations, doctypes and processing instructions are dropped.
//!
//! Running the normalizer on its own output yields the same document.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use graphyte_module::{DiagramKind, ModuleContext};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;
use tracing::{info, warn};

use crate::consts::{DRAWIO_SIGNATURES, LITERAL_LINK_PREFIX, MODULE_LINK_PREFIX};

static DRAWIO_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]+agent=[^>]+draw\.io").unwrap());

/// Attributes replaced on the outermost container.
const ROOT_DROPPED: &[&str] = &["id", "width", "height", "style", "x", "y", "preserveAspectRatio"];

/// Attributes removed when an anchor becomes a wrapper group.
const LINK_DROPPED: &[&str] = &[
    "id",
    "class",
    "href",
    "xlink:href",
    "xlink:actuate",
    "xlink:show",
    "xlink:type",
    "target",
];

/// Marker attribute on anchors already rewritten to a module or literal
/// target, so a second pass leaves them alone.
const RESOLVED_MARKER: &str = "data-link";

/// Error normalizing an SVG document.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The document is not well-formed XML.
    #[error("Malformed SVG: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Reading the SVG file failed.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// SVG file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The document has no root element.
    #[error("SVG document has no root element")]
    Empty,
}

/// Tool family an SVG came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Rendered by `PlantUML` from a UML or YANG module.
    PlantUml,
    /// Exported by draw.io / diagrams.net.
    DrawIo,
    /// Anything else.
    Other,
}

impl SourceFormat {
    /// Detect the format from raw content and the module's diagram kind.
    pub fn detect(content: &str, kind: DiagramKind) -> Self {
        if DRAWIO_SIGNATURES.iter().any(|s| content.contains(s)) || DRAWIO_AGENT.is_match(content)
        {
            Self::DrawIo
        } else if kind == DiagramKind::Svg {
            Self::Other
        } else {
            Self::PlantUml
        }
    }

    /// Whether whitespace between tags is rebuilt as one newline per tag.
    fn reflows(self) -> bool {
        matches!(self, Self::PlantUml | Self::DrawIo)
    }
}

/// How an open `<a>` or `<g>` must be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Anchor,
    Downgraded,
    Group,
}

/// Link classification.
#[derive(Debug, PartialEq, Eq)]
enum LinkTarget {
    Module(String),
    Literal(String),
    Local(String),
}

fn classify(target: &str) -> Option<LinkTarget> {
    if let Some(rest) = target.strip_prefix(MODULE_LINK_PREFIX) {
        let name = rest.rsplit_once('.').map_or(rest, |(stem, _)| stem);
        return Some(LinkTarget::Module(name.to_owned()));
    }
    if let Some(rest) = target.strip_prefix(LITERAL_LINK_PREFIX) {
        return Some(LinkTarget::Literal(rest.to_owned()));
    }
    let trimmed = target.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let base = trimmed.rsplit(['\\', '/']).next().unwrap_or(trimmed);
    (!base.is_empty()).then(|| LinkTarget::Local(base.to_owned()))
}

/// One attribute with its raw (still escaped) value.
struct Attr {
    key: String,
    raw: String,
    value: String,
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn attrs_of(e: &BytesStart) -> Vec<Attr> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let raw = lossy(&attr.value).replace('"', "&quot;");
            let value = attr
                .unescape_value()
                .map_or_else(|_| lossy(&attr.value).into_owned(), Cow::into_owned);
            Attr {
                key: lossy(attr.key.as_ref()).into_owned(),
                raw,
                value,
            }
        })
        .collect()
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Numeric part of a length such as `120px` or `84.5`.
fn numeric_length(value: &str) -> Option<&str> {
    let v = value.trim().trim_end_matches("px").trim();
    (!v.is_empty() && v.parse::<f64>().is_ok()).then_some(v)
}

struct Normalizer<'c> {
    ctx: &'c mut ModuleContext,
    format: SourceFormat,
    out: String,
    stack: Vec<Container>,
    root_seen: bool,
    text_depth: usize,
}

impl Normalizer<'_> {
    fn tag_break(&mut self) {
        if self.format.reflows() && self.text_depth == 0 {
            self.out.push('\n');
        }
    }

    fn write_open(&mut self, name: &str, attrs: &[Attr], extra: &[(&str, String)], empty: bool) {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in extra {
            self.out.push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
        }
        for attr in attrs {
            self.out.push_str(&format!(" {}=\"{}\"", attr.key, attr.raw));
        }
        self.out.push_str(if empty { "/>" } else { ">" });
    }

    fn write_root(&mut self, name: &str, e: &BytesStart, empty: bool) {
        let attrs = attrs_of(e);
        let lookup = |key: &str| attrs.iter().find(|a| a.key == key).map(|a| a.value.as_str());

        let view_box = if lookup("viewBox").is_none() {
            match (lookup("width").and_then(numeric_length), lookup("height").and_then(numeric_length)) {
                (Some(w), Some(h)) => Some(format!("0 0 {w} {h}")),
                _ => None,
            }
        } else {
            None
        };

        let mut kept: Vec<Attr> = attrs
            .into_iter()
            .filter(|a| !ROOT_DROPPED.contains(&a.key.as_str()))
            .collect();
        if let Some(vb) = view_box {
            kept.push(Attr {
                key: "viewBox".to_owned(),
                raw: escape_attr(&vb),
                value: vb,
            });
        }

        let extra = [
            ("id", "svg".to_owned()),
            ("width", "100%".to_owned()),
            ("preserveAspectRatio", "xMinYMin slice".to_owned()),
        ];
        self.write_open(name, &kept, &extra, empty);
    }

    /// Rewrite an anchor. Returns how it must be closed.
    fn write_anchor(&mut self, e: &BytesStart, empty: bool) -> Container {
        let mut attrs = attrs_of(e);
        let already_resolved = attrs.iter().any(|a| a.key == RESOLVED_MARKER);
        let target = attrs
            .iter()
            .find(|a| a.key == "xlink:href")
            .or_else(|| attrs.iter().find(|a| a.key == "href"))
            .map(|a| a.value.clone());

        let link = match target {
            Some(t) if !already_resolved => classify(&t).map(|l| (t, l)),
            _ => None,
        };

        match link {
            None => {
                self.write_open("a", &attrs, &[], empty);
                Container::Anchor
            }
            Some((original, LinkTarget::Module(name))) => {
                let resolved = self.ctx.resolve_module_link(&name).unwrap_or_else(|| {
                    warn!(link = %original, "Could not find linked module, keeping link as is");
                    original.clone()
                });
                set_targets(&mut attrs, &resolved);
                self.write_open("a", &attrs, &[(RESOLVED_MARKER, "mod".to_owned())], empty);
                Container::Anchor
            }
            Some((_, LinkTarget::Literal(target))) => {
                set_targets(&mut attrs, &target);
                self.write_open("a", &attrs, &[(RESOLVED_MARKER, "lit".to_owned())], empty);
                Container::Anchor
            }
            Some((_, LinkTarget::Local(file))) => {
                self.ctx.push_link(&file);
                attrs.retain(|a| !LINK_DROPPED.contains(&a.key.as_str()));
                let extra = [("class", "wrapper".to_owned()), ("id", file)];
                self.write_open("g", &attrs, &extra, empty);
                Container::Downgraded
            }
        }
    }

    fn run(mut self, content: &str) -> Result<String, NormalizeError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(false);

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = lossy(e.name().as_ref()).into_owned();
                    match name.as_str() {
                        "foreignObject" if self.format != SourceFormat::DrawIo => {
                            reader.read_to_end(e.name())?;
                            continue;
                        }
                        _ if !self.root_seen => {
                            self.root_seen = true;
                            self.write_root(&name, &e, false);
                        }
                        "a" => {
                            let kind = self.write_anchor(&e, false);
                            self.stack.push(kind);
                        }
                        "g" => {
                            self.write_open("g", &attrs_of(&e), &[], false);
                            self.stack.push(Container::Group);
                        }
                        _ => self.write_open(&name, &attrs_of(&e), &[], false),
                    }
                    if name == "text" {
                        self.text_depth += 1;
                    }
                    self.tag_break();
                }
                Event::Empty(e) => {
                    let name = lossy(e.name().as_ref()).into_owned();
                    match name.as_str() {
                        "foreignObject" if self.format != SourceFormat::DrawIo => continue,
                        _ if !self.root_seen => {
                            self.root_seen = true;
                            self.write_root(&name, &e, true);
                        }
                        "a" => {
                            self.write_anchor(&e, true);
                        }
                        _ => self.write_open(&name, &attrs_of(&e), &[], true),
                    }
                    self.tag_break();
                }
                Event::End(e) => {
                    let name = lossy(e.name().as_ref()).into_owned();
                    if name == "text" {
                        self.text_depth = self.text_depth.saturating_sub(1);
                    }
                    let close = if name == "a" || name == "g" {
                        match self.stack.pop() {
                            Some(Container::Anchor) => "a",
                            Some(Container::Downgraded | Container::Group) => "g",
                            None => name.as_str(),
                        }
                    } else {
                        name.as_str()
                    };
                    self.out.push_str("</");
                    self.out.push_str(close);
                    self.out.push('>');
                    self.tag_break();
                }
                Event::Text(e) => {
                    let text = lossy(&e);
                    let droppable = !self.root_seen
                        || (self.format.reflows() && self.text_depth == 0);
                    if !(droppable && text.trim().is_empty()) {
                        self.out.push_str(&text);
                    }
                }
                Event::GeneralRef(e) => {
                    self.out.push('&');
                    self.out.push_str(&lossy(&e));
                    self.out.push(';');
                }
                Event::CData(e) => {
                    self.out.push_str("<![CDATA[");
                    self.out.push_str(&lossy(&e));
                    self.out.push_str("]]>");
                }
                Event::Comment(e) => {
                    self.out.push_str("<!--");
                    self.out.push_str(&lossy(&e));
                    self.out.push_str("-->");
                    self.tag_break();
                }
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if !self.root_seen {
            return Err(NormalizeError::Empty);
        }
        Ok(self.out)
    }
}

/// Point every link attribute of an anchor at `target`.
fn set_targets(attrs: &mut [Attr], target: &str) {
    for attr in attrs
        .iter_mut()
        .filter(|a| a.key == "href" || a.key == "xlink:href")
    {
        attr.raw = escape_attr(target);
        target.clone_into(&mut attr.value);
    }
}

/// Normalize SVG text for inline embedding.
///
/// Local link targets are recorded on `ctx`; `mod:` links are resolved
/// against its navigation items.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the document is not well-formed or empty.
pub fn normalize_svg(content: &str, ctx: &mut ModuleContext) -> Result<String, NormalizeError> {
    let format = SourceFormat::detect(content, ctx.diagram_kind());
    Normalizer {
        ctx,
        format,
        out: String::with_capacity(content.len()),
        stack: Vec::new(),
        root_seen: false,
        text_depth: 0,
    }
    .run(content)
}

/// Read and normalize an SVG file.
///
/// # Errors
///
/// Returns [`NormalizeError::Io`] if the file can't be read, otherwise as
/// [`normalize_svg`].
pub fn process_svg(path: &Path, ctx: &mut ModuleContext) -> Result<String, NormalizeError> {
    info!(svg = %path.display(), "Processing SVG");
    let content = std::fs::read_to_string(path).map_err(|source| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let svg = normalize_svg(&content, ctx)?;
    info!(links = ctx.linked_files().len(), "SVG processed");
    Ok(svg)
}
