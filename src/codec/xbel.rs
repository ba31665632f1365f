//! XBEL (XML Bookmark Exchange Language 1.0) codec.
//!
//! <https://xbel.sourceforge.net/language/versions/1.0/xbel-1.0.xhtml>
//!
//! Aliases are not supported, as they have no counterpart in the other
//! formats; they are skipped on read along with `desc`, `info` and any
//! other element this model has no field for.

use std::io::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use quick_xml::Reader;
use quick_xml::escape::{resolve_xml_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::format::Format;
use crate::model::{Bookmark, Field, FieldDiff, Folder, Node, NodeKind, Separator, SpecialFolder};
use crate::util::{decode_text, escape_xml};

use super::{Codec, WriteConfig, is_fake_separator};

const XBEL_VERSION: &str = "1.0";

const DOCTYPE: &str = r#"<!DOCTYPE xbel PUBLIC "+//IDN python.org//DTD XML Bookmark Exchange Language 1.0//EN//XML" "http://pyxml.sourceforge.net/topics/dtds/xbel.dtd">"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct XbelCodec;

impl Codec for XbelCodec {
    fn format(&self) -> Format {
        Format::Xbel
    }

    fn decode(&self, source: &[u8]) -> Result<Folder> {
        let text = decode_text(source, None);
        parse(&text)
    }

    fn encode(&self, root: &Folder, sink: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(DOCTYPE);
        out.push('\n');
        self.write_folder(&mut out, root, config, 0)?;
        sink.write_all(out.as_bytes())?;
        Ok(())
    }

    fn supports_special(&self, special: SpecialFolder) -> bool {
        special == SpecialFolder::Toolbar
    }

    fn acceptable_difference(&self, diff: &FieldDiff<'_>, cull_attr: bool) -> bool {
        let lost = !diff.left.is_empty() && diff.right.is_empty();
        match diff.field {
            // Separators carry no attributes under cull_attr.
            Field::Id | Field::DateAdded => cull_attr && diff.kind == NodeKind::Separator && lost,
            // The root element has no icon under cull_attr.
            Field::Icon => cull_attr && diff.kind == NodeKind::Folder && diff.depth == 0 && lost,
            // No element carries its own modification time.
            Field::DateModified => true,
            Field::Special => {
                lost && diff
                    .left
                    .special()
                    .is_some_and(|s| !self.supports_special(s))
            }
            _ => false,
        }
    }
}

impl XbelCodec {
    fn write_folder(&self, out: &mut String, folder: &Folder, config: &WriteConfig, depth: usize) -> Result<()> {
        let indent = "  ".repeat(depth);
        let tag = if depth == 0 { "xbel" } else { "folder" };

        out.push_str(&indent);
        out.push('<');
        out.push_str(tag);
        if depth == 0 {
            push_attr(out, "version", XBEL_VERSION);
        }
        push_attr(out, "id", &folder.id);
        push_time_attr(out, "added", folder.date_added)?;
        if !(config.cull_attr && depth == 0) {
            push_attr(out, "icon", &folder.icon);
        }
        if folder.special == Some(SpecialFolder::Toolbar) {
            push_attr(out, "toolbar", "yes");
        }
        out.push_str(">\n");

        push_title(out, &folder.name, depth + 1);
        for child in &folder.children {
            if !self.keeps_child(config, child) {
                continue;
            }
            match child {
                Node::Separator(s) => write_separator(out, s, config, depth + 1)?,
                Node::Bookmark(b) => write_bookmark(out, b, depth + 1)?,
                Node::Folder(f) => self.write_folder(out, f, config, depth + 1)?,
            }
        }

        out.push_str(&indent);
        out.push_str("</");
        out.push_str(tag);
        out.push_str(">\n");
        Ok(())
    }
}

fn write_separator(out: &mut String, sep: &Separator, config: &WriteConfig, depth: usize) -> Result<()> {
    out.push_str(&"  ".repeat(depth));
    out.push_str("<separator");
    if !config.cull_attr {
        push_attr(out, "id", &sep.id);
        push_time_attr(out, "added", sep.date_added)?;
    }
    out.push_str("/>\n");
    Ok(())
}

fn write_bookmark(out: &mut String, mark: &Bookmark, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str("<bookmark");
    push_attr(out, "id", &mark.id);
    push_time_attr(out, "added", mark.date_added)?;
    push_attr(out, "icon", &mark.icon);
    out.push_str(" href=\"");
    out.push_str(&escape_xml(&mark.url));
    out.push('"');
    push_time_attr(out, "modified", mark.url_date_modified)?;
    push_time_attr(out, "visited", mark.url_date_visited)?;
    out.push_str(">\n");
    push_title(out, &mark.name, depth + 1);
    out.push_str(&indent);
    out.push_str("</bookmark>\n");
    Ok(())
}

/// Append ` name="value"`, skipping empty values.
fn push_attr(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_xml(value));
    out.push('"');
}

fn push_time_attr(out: &mut String, name: &str, value: Option<i64>) -> Result<()> {
    if let Some(us) = value {
        push_attr(out, name, &format_time(us)?);
    }
    Ok(())
}

fn push_title(out: &mut String, name: &str, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str("<title>");
    out.push_str(&escape_xml(name));
    out.push_str("</title>\n");
}

/// Format microseconds as UTC ISO-8601, with a fraction only when needed.
fn format_time(us: i64) -> Result<String> {
    let dt = DateTime::<Utc>::from_timestamp_micros(us)
        .ok_or_else(|| Error::format(format!("timestamp out of range: {us}")))?;
    let precision = if dt.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    Ok(dt.to_rfc3339_opts(precision, true))
}

/// Parse an ISO-8601 timestamp; values without an offset are taken as UTC.
fn parse_time(value: &str) -> Result<i64> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_micros());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc().timestamp_micros());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(dt.and_utc().timestamp_micros());
    }
    Err(Error::format(format!("invalid ISO 8601 timestamp: {value:?}")))
}

// ============================================================================
// Reader
// ============================================================================

/// What an open element contributes to the tree.
enum Open {
    Node,
    Title,
    Skipped,
}

struct Frame {
    node: Node,
    titled: bool,
}

#[derive(Default)]
struct Parser {
    open: Vec<Open>,
    stack: Vec<Frame>,
    title: String,
    result: Option<Folder>,
}

fn parse(content: &str) -> Result<Folder> {
    let mut reader = Reader::from_str(content);
    let mut parser = Parser::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.start(&e)?,
            Event::Empty(e) => {
                parser.start(&e)?;
                parser.end()?;
            }
            Event::End(_) => parser.end()?,
            Event::Text(e) => parser.text(&String::from_utf8_lossy(e.as_ref())),
            Event::CData(e) => parser.text(&String::from_utf8_lossy(e.as_ref())),
            Event::GeneralRef(e) => {
                if let Some(c) = e.resolve_char_ref()? {
                    parser.text(c.encode_utf8(&mut [0; 4]));
                } else {
                    let name = String::from_utf8_lossy(e.as_ref());
                    match resolve_xml_entity(&name) {
                        Some(resolved) => parser.text(resolved),
                        None => parser.text(&format!("&{name};")),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !parser.stack.is_empty() {
        return Err(Error::structure("unexpected end of xbel document"));
    }
    parser
        .result
        .ok_or_else(|| Error::structure("no xbel root element found"))
}

impl Parser {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if matches!(self.open.last(), Some(Open::Title | Open::Skipped)) {
            self.open.push(Open::Skipped);
            return Ok(());
        }

        let tag = e.name();
        let tag = tag.as_ref();

        let Some(top) = self.stack.last_mut() else {
            if tag != b"xbel" || self.result.is_some() {
                return Err(Error::structure(format!(
                    "expected <xbel> root element, found <{}>",
                    String::from_utf8_lossy(tag)
                )));
            }
            let attrs = Attrs::read(e)?;
            let version = attrs.get("version");
            if version != Some(XBEL_VERSION) {
                return Err(Error::format(format!(
                    "unsupported xbel version: {}",
                    version.unwrap_or("None")
                )));
            }
            let folder = Folder {
                id: attrs.get("id").unwrap_or_default().to_string(),
                date_added: attrs.time("added")?,
                icon: attrs.get("icon").unwrap_or_default().to_string(),
                ..Default::default()
            };
            self.push(Node::Folder(folder));
            return Ok(());
        };

        let in_folder = matches!(top.node, Node::Folder(_));
        let wants_title = !top.titled && !matches!(top.node, Node::Separator(_));

        match tag {
            b"title" if wants_title => {
                top.titled = true;
                self.title.clear();
                self.open.push(Open::Title);
            }
            b"folder" if in_folder => {
                let attrs = Attrs::read(e)?;
                let special = (attrs.get("toolbar") == Some("yes")).then_some(SpecialFolder::Toolbar);
                let folder = Folder {
                    id: attrs.get("id").unwrap_or_default().to_string(),
                    date_added: attrs.time("added")?,
                    icon: attrs.get("icon").unwrap_or_default().to_string(),
                    special,
                    ..Default::default()
                };
                self.push(Node::Folder(folder));
            }
            b"bookmark" if in_folder => {
                let attrs = Attrs::read(e)?;
                let id = attrs.get("id").unwrap_or_default().to_string();
                let date_added = attrs.time("added")?;
                let url = attrs
                    .get("href")
                    .ok_or_else(|| Error::format("bookmark without href"))?;
                let node = if is_fake_separator(url) {
                    // floccus writes fake separators even though xbel has real ones
                    Node::Separator(Separator { id, date_added })
                } else {
                    Node::Bookmark(Bookmark {
                        id,
                        date_added,
                        icon: attrs.get("icon").unwrap_or_default().to_string(),
                        url: url.to_string(),
                        url_date_modified: attrs.time("modified")?,
                        url_date_visited: attrs.time("visited")?,
                        ..Default::default()
                    })
                };
                self.push(node);
            }
            b"separator" if in_folder => {
                let attrs = Attrs::read(e)?;
                let sep = Separator {
                    id: attrs.get("id").unwrap_or_default().to_string(),
                    date_added: attrs.time("added")?,
                };
                self.push(Node::Separator(sep));
            }
            _ => self.open.push(Open::Skipped),
        }
        Ok(())
    }

    fn push(&mut self, node: Node) {
        self.stack.push(Frame { node, titled: false });
        self.open.push(Open::Node);
    }

    fn end(&mut self) -> Result<()> {
        match self.open.pop() {
            Some(Open::Node) => {
                let Some(frame) = self.stack.pop() else {
                    return Err(Error::structure("unbalanced xbel element"));
                };
                match self.stack.last_mut() {
                    Some(Frame {
                        node: Node::Folder(parent),
                        ..
                    }) => parent.children.push(frame.node),
                    Some(_) => return Err(Error::structure("xbel element nested in a non-folder")),
                    None => match frame.node {
                        Node::Folder(root) => self.result = Some(root),
                        _ => return Err(Error::structure("xbel root is not a folder")),
                    },
                }
            }
            Some(Open::Title) => {
                let title = std::mem::take(&mut self.title);
                match self.stack.last_mut().map(|f| &mut f.node) {
                    Some(Node::Folder(f)) => f.name = title,
                    Some(Node::Bookmark(b)) => b.name = title,
                    _ => {}
                }
            }
            Some(Open::Skipped) => {}
            None => return Err(Error::structure("unbalanced xbel end tag")),
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if matches!(self.open.last(), Some(Open::Title)) {
            self.title.push_str(text);
        }
    }
}

/// Unescaped attributes of one element.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(e: &BytesStart<'_>) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| Error::structure(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = unescape(&raw)
                .map_err(|e| Error::structure(format!("bad attribute {key}: {e}")))?
                .into_owned();
            attrs.push((key, value));
        }
        Ok(Attrs(attrs))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn time(&self, name: &str) -> Result<Option<i64>> {
        self.get(name).map(parse_time).transpose()
    }
}
