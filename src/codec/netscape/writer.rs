//! Netscape bookmark file writer.

use crate::codec::WriteConfig;
use crate::model::{Bookmark, Folder, Node, Separator};
use crate::util::escape_xml;

use super::parser::SPECIAL_ATTRS;
use super::{DOCTYPE, NetscapeHtmlCodec};
use crate::codec::Codec;

const INDENT: &str = "    ";

pub(super) fn write_document(codec: &NetscapeHtmlCodec, root: &Folder, config: &WriteConfig) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE ");
    out.push_str(DOCTYPE);
    out.push_str(">\n");
    out.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    write_folder(codec, &mut out, root, config, 0);
    out
}

fn write_folder(codec: &NetscapeHtmlCodec, out: &mut String, folder: &Folder, config: &WriteConfig, depth: usize) {
    let indent = INDENT.repeat(depth);
    let name = escape_xml(&folder.name);

    let mut attrs = Attrs::default();
    if !(config.cull_attr && depth == 0) {
        if !config.cull_attr {
            attrs.text("ID", &folder.id);
        }
        attrs.time("ADD_DATE", folder.date_added);
        if !config.cull_attr {
            attrs.text("ICON", &folder.icon);
        }
        attrs.time("LAST_MODIFIED", folder.date_modified);
        if let Some((attr, _)) = SPECIAL_ATTRS.iter().find(|(_, s)| folder.special == Some(*s)) {
            attrs.text(&attr.to_ascii_uppercase(), "true");
        }
    }

    if depth == 0 {
        out.push_str(&format!("<TITLE>{name}</TITLE>\n"));
        out.push_str(&format!("<H1{}>{name}</H1>\n", attrs.0));
    } else {
        out.push_str(&format!("{indent}<DT><H3{}>{name}</H3>\n", attrs.0));
    }

    out.push_str(&indent);
    out.push_str("<DL><p>\n");
    for child in &folder.children {
        if !codec.keeps_child(config, child) {
            continue;
        }
        match child {
            Node::Separator(s) => write_separator(out, s, config, depth + 1),
            Node::Bookmark(b) => write_bookmark(out, b, config, depth + 1),
            Node::Folder(f) => write_folder(codec, out, f, config, depth + 1),
        }
    }
    out.push_str(&indent);
    out.push_str("</DL><p>\n");
}

fn write_separator(out: &mut String, sep: &Separator, config: &WriteConfig, depth: usize) {
    let mut attrs = Attrs::default();
    if !config.cull_attr {
        attrs.text("ID", &sep.id);
        attrs.time("ADD_DATE", sep.date_added);
    }
    out.push_str(&format!("{}<HR{}>\n", INDENT.repeat(depth), attrs.0));
}

fn write_bookmark(out: &mut String, mark: &Bookmark, config: &WriteConfig, depth: usize) {
    let mut attrs = Attrs::default();
    if !config.cull_attr {
        attrs.text("ID", &mark.id);
    }
    attrs.time("ADD_DATE", mark.date_added);
    attrs.text("ICON", &mark.icon);
    attrs.time("LAST_MODIFIED", mark.date_modified);
    attrs.always("HREF", &mark.url);
    attrs.time("LAST_VISIT", mark.url_date_visited);
    out.push_str(&format!(
        "{}<DT><A{}>{}</A>\n",
        INDENT.repeat(depth),
        attrs.0,
        escape_xml(&mark.name)
    ));
}

/// Serialized ` NAME="value"` pairs.
#[derive(Default)]
struct Attrs(String);

impl Attrs {
    fn always(&mut self, name: &str, value: &str) {
        self.0.push(' ');
        self.0.push_str(name);
        self.0.push_str("=\"");
        self.0.push_str(&escape_xml(value));
        self.0.push('"');
    }

    fn text(&mut self, name: &str, value: &str) {
        if !value.is_empty() {
            self.always(name, value);
        }
    }

    /// Whole seconds, truncated toward zero.
    fn time(&mut self, name: &str, value: Option<i64>) {
        if let Some(us) = value {
            self.always(name, &(us / 1_000_000).to_string());
        }
    }
}
