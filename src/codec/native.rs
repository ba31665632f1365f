//! Native `bkmk-json` codec.
//!
//! A direct serde dump of the tree model, pretty-printed with two-space
//! indentation. It represents every field and category, so it has no
//! acceptable differences and ignores both culling options.

use std::io::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::model::{Folder, Node, SpecialFolder};

use super::{Codec, WriteConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

/// Borrowed stand-in for `Node::Folder`, so the root carries its tag.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RootRef<'a> {
    Folder(&'a Folder),
}

impl Codec for NativeCodec {
    fn format(&self) -> Format {
        Format::Native
    }

    fn decode(&self, source: &[u8]) -> Result<Folder> {
        match serde_json::from_slice::<Node>(source)? {
            Node::Folder(root) => Ok(root),
            other => Err(Error::structure(format!(
                "root node must be a folder, found {}",
                other.kind()
            ))),
        }
    }

    fn encode(&self, root: &Folder, sink: &mut dyn Write, _config: &WriteConfig) -> Result<()> {
        serde_json::to_writer_pretty(&mut *sink, &RootRef::Folder(root))?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    fn supports_special(&self, _special: SpecialFolder) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FAKE_SEPARATOR_URLS;
    use crate::model::{Bookmark, Separator};

    fn encode(root: &Folder) -> String {
        let mut out = Vec::new();
        NativeCodec.encode(root, &mut out, &WriteConfig::default()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_optional_fields_omitted() {
        let root = Folder::new("Bookmarks").with_child(Separator::new());
        assert_eq!(
            encode(&root),
            r#"{
  "type": "folder",
  "name": "Bookmarks",
  "children": [
    {
      "type": "separator"
    }
  ]
}
"#
        );
    }

    #[test]
    fn test_special_serialized_by_name() {
        let root = Folder::new("").with_child(Folder::special(SpecialFolder::SavedTabs));
        let json = encode(&root);
        assert!(json.contains(r#""special": "SAVED_TABS""#), "{json}");
        assert_eq!(NativeCodec.decode(json.as_bytes()).unwrap(), root);
    }

    #[test]
    fn test_fake_separator_url_stays_a_bookmark() {
        let mut mark = Bookmark::new("not a separator", FAKE_SEPARATOR_URLS[0]);
        mark.date_added = Some(1_700_000_000_123_456);
        let root = Folder::new("root").with_child(mark);

        let decoded = NativeCodec.decode(encode(&root).as_bytes()).unwrap();
        assert_eq!(decoded, root);
        assert!(matches!(decoded.children[0], Node::Bookmark(_)));
    }

    #[test]
    fn test_unknown_type_is_format_error() {
        let err = NativeCodec
            .decode(br#"{"type": "alias", "children": []}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_root_must_be_folder() {
        let err = NativeCodec.decode(br#"{"type": "separator"}"#).unwrap_err();
        assert!(matches!(err, Error::Structure(_)), "got {err:?}");
    }

    #[test]
    fn test_bookmark_requires_url() {
        let err = NativeCodec
            .decode(br#"{"type": "folder", "children": [{"type": "bookmark", "name": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }
}
