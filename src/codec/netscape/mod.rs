//! Netscape bookmark file (`NETSCAPE-Bookmark-file-1`) codec.
//!
//! The format every browser can import and export. It is HTML in name
//! only: list items are never closed, so reading goes through a dedicated
//! [tokenizer] and a stack-based [parser] rather than an HTML tree builder.
//!
//! Timestamps are decimal seconds. Only the toolbar and unfiled special
//! folders have attributes; there is no place for `url_date_modified`.

mod parser;
mod tokenizer;
mod writer;

use std::io::Write;

use crate::error::Result;
use crate::format::Format;
use crate::model::{Field, FieldDiff, Folder, NodeKind, SpecialFolder};
use crate::util::{decode_text, extract_html_charset};

use super::{Codec, WriteConfig};

const DOCTYPE: &str = "NETSCAPE-Bookmark-file-1";

#[derive(Debug, Clone, Copy, Default)]
pub struct NetscapeHtmlCodec;

impl Codec for NetscapeHtmlCodec {
    fn format(&self) -> Format {
        Format::NetscapeHtml
    }

    fn decode(&self, source: &[u8]) -> Result<Folder> {
        let text = decode_text(source, extract_html_charset(source));
        parser::parse(&text)
    }

    fn encode(&self, root: &Folder, sink: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let html = writer::write_document(self, root, config);
        sink.write_all(html.as_bytes())?;
        Ok(())
    }

    fn supports_special(&self, special: SpecialFolder) -> bool {
        matches!(special, SpecialFolder::Toolbar | SpecialFolder::OtherUnfiled)
    }

    fn acceptable_difference(&self, diff: &FieldDiff<'_>, cull_attr: bool) -> bool {
        let lost = !diff.left.is_empty() && diff.right.is_empty();
        let accepted = match diff.field {
            // nothing carries an id under cull_attr
            Field::Id => cull_attr && lost,
            Field::DateAdded => cull_attr && diff.kind == NodeKind::Separator && lost,
            Field::Icon => cull_attr && diff.kind == NodeKind::Folder && lost,
            Field::UrlDateModified => true,
            Field::Special => {
                lost && diff
                    .left
                    .special()
                    .is_some_and(|s| !self.supports_special(s))
            }
            _ => false,
        };
        if accepted || !diff.field.is_timestamp() {
            return accepted;
        }

        match (diff.left.timestamp(), diff.right.timestamp()) {
            // second precision
            (Some(a), Some(b)) => a / 1_000_000 == b / 1_000_000,
            // the <H1> has no attributes under cull_attr
            (Some(_), None) => cull_attr && diff.depth == 0 && diff.kind == NodeKind::Folder,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bookmark, Node, Separator, Strict, Value, structural_diff};

    fn encode(root: &Folder, config: WriteConfig) -> String {
        let mut out = Vec::new();
        NetscapeHtmlCodec.encode(root, &mut out, &config).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sample() -> Folder {
        let mut mark = Bookmark::new("Tom & Jerry", "http://x/?a=1&b=2").with_id("3");
        mark.date_added = Some(1_700_000_000_000_000);
        mark.url_date_visited = Some(1_700_000_100_000_000);
        let mut toolbar = Folder::special(SpecialFolder::Toolbar).with_id("2");
        toolbar.icon = "data:image/png;base64,AA==".into();
        toolbar.children.push(mark.into());
        let mut root = Folder::new("Bookmarks").with_id("1").with_child(toolbar);
        root.children.push(Separator::new().into());
        root.date_added = Some(1_000_000);
        root
    }

    #[test]
    fn test_encode_layout() {
        let html = encode(&sample(), WriteConfig::default());
        assert_eq!(
            html,
            r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=UTF-8">
<TITLE>Bookmarks</TITLE>
<H1 ID="1" ADD_DATE="1">Bookmarks</H1>
<DL><p>
    <DT><H3 ID="2" ICON="data:image/png;base64,AA==" PERSONAL_TOOLBAR_FOLDER="true">Bookmarks Toolbar</H3>
    <DL><p>
        <DT><A ID="3" ADD_DATE="1700000000" HREF="http://x/?a=1&amp;b=2" LAST_VISIT="1700000100">Tom &amp; Jerry</A>
    </DL><p>
    <HR>
</DL><p>
"#
        );
    }

    #[test]
    fn test_encode_cull_attr() {
        let html = encode(&sample(), WriteConfig::new().with_cull_attr(true));
        assert!(html.contains("<H1>Bookmarks</H1>"), "{html}");
        assert!(html.contains(r#"<DT><H3 PERSONAL_TOOLBAR_FOLDER="true">"#), "{html}");
        assert!(html.contains(r#"<DT><A ADD_DATE="1700000000" HREF="#), "{html}");
        assert!(!html.contains("ID="), "{html}");
    }

    #[test]
    fn test_decode_inverts_encode() {
        let root = sample();
        let decoded = NetscapeHtmlCodec
            .decode(encode(&root, WriteConfig::default()).as_bytes())
            .unwrap();
        assert!(structural_diff(&root, &decoded, &Strict).is_empty());
    }

    #[test]
    fn test_decode_windows_1252() {
        let mut html = b"<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=windows-1252\">\n\
<H1>Caf"
            .to_vec();
        html.push(0xe9);
        html.extend_from_slice(b"</H1>\n<DL><p>\n</DL><p>\n");
        let root = NetscapeHtmlCodec.decode(&html).unwrap();
        assert_eq!(root.name, "Café");
    }

    #[test]
    fn test_saved_tabs_culled_when_empty() {
        let root = Folder::new("R")
            .with_child(Folder::special(SpecialFolder::SavedTabs))
            .with_child(Folder::special(SpecialFolder::OtherUnfiled));
        let html = encode(&root, WriteConfig::new().with_cull_special(true));
        assert!(!html.contains("Tabs collection"), "{html}");
        assert!(html.contains(r#"UNFILED_BOOKMARKS_FOLDER="true""#), "{html}");

        let decoded = NetscapeHtmlCodec.decode(html.as_bytes()).unwrap();
        assert_eq!(decoded.children.len(), 1);
        assert!(matches!(&decoded.children[0], Node::Folder(f) if f.special == Some(SpecialFolder::OtherUnfiled)));
    }

    #[test]
    fn test_acceptable_differences() {
        let codec = NetscapeHtmlCodec;
        let diff = |kind, depth, field, left, right| FieldDiff {
            kind,
            depth,
            field,
            left,
            right,
        };
        let ts = Value::Timestamp;

        // truncated to seconds
        assert!(codec.acceptable_difference(
            &diff(NodeKind::Bookmark, 1, Field::DateAdded, ts(Some(1_500_000)), ts(Some(1_000_000))),
            false
        ));
        assert!(!codec.acceptable_difference(
            &diff(NodeKind::Bookmark, 1, Field::DateAdded, ts(Some(2_500_000)), ts(Some(1_000_000))),
            false
        ));
        // lost url_date_modified is always fine
        assert!(codec.acceptable_difference(
            &diff(NodeKind::Bookmark, 1, Field::UrlDateModified, ts(Some(1)), ts(None)),
            false
        ));
        // root attributes only vanish under cull_attr
        let root_date = diff(NodeKind::Folder, 0, Field::DateModified, ts(Some(1)), ts(None));
        assert!(codec.acceptable_difference(&root_date, true));
        assert!(!codec.acceptable_difference(&root_date, false));
        // saved tabs is not representable; toolbar is
        let special = |s| diff(NodeKind::Folder, 1, Field::Special, Value::Special(Some(s)), Value::Special(None));
        assert!(codec.acceptable_difference(&special(SpecialFolder::SavedTabs), false));
        assert!(!codec.acceptable_difference(&special(SpecialFolder::Toolbar), false));
        // ids only under cull_attr
        let id = diff(NodeKind::Bookmark, 2, Field::Id, Value::Text("5"), Value::Text(""));
        assert!(codec.acceptable_difference(&id, true));
        assert!(!codec.acceptable_difference(&id, false));
    }
}
