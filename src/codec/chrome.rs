//! Chrome `Bookmarks` JSON codec.
//!
//! Chrome has no single root: the document holds a fixed map of named
//! roots. The `synced` root carries the collection's own children and
//! becomes the tree root; every other root becomes a special folder
//! prepended to it in document order. Writing reverses this, so top-level
//! special folders are lifted back out into their named roots, in tree
//! order, with `synced` last.
//!
//! Timestamps are decimal strings of microseconds since 1601-01-01.
//! There are no separators and no icons; separators travel as fake
//! separator URLs.

use std::io::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::format::Format;
use crate::model::{Bookmark, Field, FieldDiff, Folder, Node, Separator, SpecialFolder};

use super::{Codec, FAKE_SEPARATOR_NAME, FAKE_SEPARATOR_URLS, WriteConfig, is_fake_separator, parse_decimal};

const SUPPORTED_VERSION: u64 = 1;

/// Microseconds between 1601-01-01 and 1970-01-01.
const WINDOWS_UNIX_DIFF: i64 = 11_644_473_600_000_000;

/// Root key of the primary (non-special) root.
const PRIMARY_ROOT: &str = "synced";

const ROOT_KEYS: [(&str, SpecialFolder); 3] = [
    ("bookmark_bar", SpecialFolder::Toolbar),
    ("other", SpecialFolder::OtherUnfiled),
    ("tabs", SpecialFolder::SavedTabs),
];

#[derive(Debug, Serialize, Deserialize)]
struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<serde_json::Value>,
    roots: IndexMap<String, ChromeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NodeType {
    Folder,
    Url,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChromeNode {
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_added: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_last_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<ChromeNode>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeJsonCodec;

impl Codec for ChromeJsonCodec {
    fn format(&self) -> Format {
        Format::ChromeJson
    }

    fn decode(&self, source: &[u8]) -> Result<Folder> {
        let doc: Document = serde_json::from_slice(source)?;
        match &doc.version {
            None => log::warn!("no chrome-json version found, assuming version {SUPPORTED_VERSION}"),
            // some writers emit the version as a float
            Some(v) if v.as_f64() == Some(SUPPORTED_VERSION as f64) => {}
            Some(v) => return Err(Error::format(format!("unsupported chrome-json version: {v}"))),
        }

        let mut roots = doc.roots;
        let primary = roots
            .shift_remove(PRIMARY_ROOT)
            .ok_or_else(|| Error::structure(format!("missing \"{PRIMARY_ROOT}\" root")))?;
        let mut root = into_root_folder(primary, None)?;

        let mut specials = Vec::with_capacity(roots.len());
        for (key, node) in roots {
            let special = ROOT_KEYS
                .iter()
                .find(|(k, _)| *k == key)
                .map(|&(_, s)| s)
                .ok_or_else(|| Error::format(format!("unrecognised chrome-json root: {key}")))?;
            specials.push(Node::Folder(into_root_folder(node, Some(special))?));
        }
        specials.append(&mut root.children);
        root.children = specials;
        Ok(root)
    }

    fn encode(&self, root: &Folder, sink: &mut dyn Write, config: &WriteConfig) -> Result<()> {
        let mut roots = IndexMap::new();
        let mut rest = Vec::new();

        for child in &root.children {
            let Some((key, folder)) = top_level_special(child) else {
                if self.keeps_child(config, child) {
                    rest.push(self.to_chrome(child, config)?);
                }
                continue;
            };
            let node = self.folder_to_chrome(folder, config)?;
            if roots.insert(key.to_string(), node).is_some() {
                return Err(Error::validation(format!(
                    "more than one top-level folder for chrome-json root {key}"
                )));
            }
        }

        let mut primary = self.folder_to_chrome(root, config)?;
        primary.children = Some(rest);
        roots.insert(PRIMARY_ROOT.to_string(), primary);

        let doc = Document {
            version: Some(SUPPORTED_VERSION.into()),
            roots,
        };
        serde_json::to_writer_pretty(&mut *sink, &doc)?;
        sink.write_all(b"\n")?;
        Ok(())
    }

    fn supports_special(&self, _special: SpecialFolder) -> bool {
        true
    }

    fn acceptable_difference(&self, diff: &FieldDiff<'_>, _cull_attr: bool) -> bool {
        let lost = !diff.left.is_empty() && diff.right.is_empty();
        match diff.field {
            Field::Icon => lost,
            Field::UrlDateModified => true,
            Field::Special => {
                lost && diff
                    .left
                    .special()
                    .is_some_and(|s| !self.supports_special(s))
            }
            _ => false,
        }
    }

    fn root_sort_key(&self, node: &Node) -> Option<u8> {
        Some(node.special().map_or(0, SpecialFolder::rank))
    }
}

impl ChromeJsonCodec {
    fn to_chrome(&self, node: &Node, config: &WriteConfig) -> Result<ChromeNode> {
        Ok(match node {
            Node::Separator(sep) => {
                let stamp = to_chrome_time(sep.date_added)?;
                ChromeNode {
                    node_type: NodeType::Url,
                    id: sep.id.clone(),
                    date_added: stamp.clone(),
                    name: FAKE_SEPARATOR_NAME.to_string(),
                    date_modified: stamp.clone(),
                    url: Some(FAKE_SEPARATOR_URLS[0].to_string()),
                    date_last_used: stamp,
                    children: None,
                }
            }
            Node::Bookmark(mark) => ChromeNode {
                node_type: NodeType::Url,
                id: mark.id.clone(),
                date_added: to_chrome_time(mark.date_added)?,
                name: mark.name.clone(),
                date_modified: to_chrome_time(mark.date_modified)?,
                url: Some(mark.url.clone()),
                date_last_used: to_chrome_time(mark.url_date_visited)?,
                children: None,
            },
            Node::Folder(folder) => self.folder_to_chrome(folder, config)?,
        })
    }

    fn folder_to_chrome(&self, folder: &Folder, config: &WriteConfig) -> Result<ChromeNode> {
        let children = folder
            .children
            .iter()
            .filter(|c| self.keeps_child(config, c))
            .map(|c| self.to_chrome(c, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChromeNode {
            node_type: NodeType::Folder,
            id: folder.id.clone(),
            date_added: to_chrome_time(folder.date_added)?,
            name: folder.name.clone(),
            date_modified: to_chrome_time(folder.date_modified)?,
            url: None,
            date_last_used: None,
            children: Some(children),
        })
    }
}

/// Root key for a special folder directly under the tree root.
fn top_level_special(node: &Node) -> Option<(&'static str, &Folder)> {
    let folder = node.as_folder()?;
    let special = folder.special?;
    ROOT_KEYS
        .iter()
        .find(|(_, s)| *s == special)
        .map(|&(key, _)| (key, folder))
}

fn into_root_folder(node: ChromeNode, special: Option<SpecialFolder>) -> Result<Folder> {
    match from_chrome(node)? {
        Node::Folder(mut folder) => {
            folder.special = special;
            Ok(folder)
        }
        other => Err(Error::structure(format!(
            "chrome-json root must be a folder, found {}",
            other.kind()
        ))),
    }
}

fn from_chrome(node: ChromeNode) -> Result<Node> {
    let id = node.id;
    let date_added = from_chrome_time(node.date_added.as_deref())?;
    let date_modified = from_chrome_time(node.date_modified.as_deref())?;

    match node.node_type {
        NodeType::Folder => {
            let children = node
                .children
                .ok_or_else(|| Error::format("chrome-json folder without children"))?
                .into_iter()
                .map(from_chrome)
                .collect::<Result<Vec<_>>>()?;
            Ok(Node::Folder(Folder {
                id,
                date_added,
                name: node.name,
                date_modified,
                children,
                ..Default::default()
            }))
        }
        NodeType::Url => {
            let url = node
                .url
                .ok_or_else(|| Error::format("chrome-json url node without url"))?;
            if is_fake_separator(&url) {
                return Ok(Node::Separator(Separator { id, date_added }));
            }
            Ok(Node::Bookmark(Bookmark {
                id,
                date_added,
                name: node.name,
                date_modified,
                url,
                url_date_visited: from_chrome_time(node.date_last_used.as_deref())?,
                ..Default::default()
            }))
        }
    }
}

/// Chrome writes `"0"` for never; that reads as unset.
fn from_chrome_time(value: Option<&str>) -> Result<Option<i64>> {
    let Some(value) = value else {
        return Ok(None);
    };
    match parse_decimal(value, "chrome-json")? {
        0 => Ok(None),
        t => Ok(Some(t - WINDOWS_UNIX_DIFF)),
    }
}

fn to_chrome_time(value: Option<i64>) -> Result<Option<String>> {
    value
        .map(|us| {
            us.checked_add(WINDOWS_UNIX_DIFF)
                .map(|t| t.to_string())
                .ok_or_else(|| Error::format(format!("timestamp out of range: {us}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Strict, structural_diff};

    const SAMPLE: &str = r#"{
  "checksum": "0123456789abcdef",
  "roots": {
    "bookmark_bar": {
      "children": [
        {
          "date_added": "13349473600000000",
          "date_last_used": "0",
          "guid": "00000000-0000-4000-a000-000000000001",
          "id": "5",
          "name": "Rust",
          "type": "url",
          "url": "https://www.rust-lang.org/"
        },
        {
          "id": "6",
          "name": "|",
          "type": "url",
          "url": "https://separator.floccus.org/?id=6"
        }
      ],
      "date_added": "13349473600000000",
      "date_modified": "0",
      "id": "1",
      "name": "Bookmarks bar",
      "type": "folder"
    },
    "other": {
      "children": [],
      "id": "2",
      "name": "Other bookmarks",
      "type": "folder"
    },
    "synced": {
      "children": [
        {
          "children": [],
          "id": "7",
          "name": "Mobile folder",
          "type": "folder"
        }
      ],
      "id": "3",
      "name": "Mobile bookmarks",
      "type": "folder"
    }
  },
  "version": 1
}"#;

    fn encode(root: &Folder) -> String {
        let mut out = Vec::new();
        ChromeJsonCodec
            .encode(root, &mut out, &WriteConfig::default())
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_decode_roots() {
        let root = ChromeJsonCodec.decode(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.name, "Mobile bookmarks");
        assert_eq!(root.special, None);
        assert_eq!(root.children.len(), 3);

        let Node::Folder(bar) = &root.children[0] else {
            panic!("expected folder");
        };
        assert_eq!(bar.special, Some(SpecialFolder::Toolbar));
        assert_eq!(bar.date_added, Some(1_705_000_000_000_000));
        assert_eq!(bar.date_modified, None);
        let Node::Bookmark(rust) = &bar.children[0] else {
            panic!("expected bookmark");
        };
        assert_eq!(rust.url_date_visited, None);
        assert_eq!(
            bar.children[1],
            Node::Separator(Separator {
                id: "6".into(),
                date_added: None,
            })
        );

        assert_eq!(root.children[1].special(), Some(SpecialFolder::OtherUnfiled));
        assert!(matches!(&root.children[2], Node::Folder(f) if f.name == "Mobile folder"));
    }

    #[test]
    fn test_encode_lifts_special_folders() {
        let mut mark = Bookmark::new("A", "http://a").with_id("4");
        mark.date_added = Some(0);
        mark.icon = "data:dropped".into();
        let root = Folder::new("Bookmarks")
            .with_child(mark)
            .with_child(Folder::special(SpecialFolder::SavedTabs).with_child(Separator {
                id: "9".into(),
                date_added: Some(1),
            }));

        let json = encode(&root);
        let expected = r#"{
  "version": 1,
  "roots": {
    "tabs": {
      "type": "folder",
      "name": "Tabs collection",
      "children": [
        {
          "type": "url",
          "id": "9",
          "date_added": "11644473600000001",
          "name": "|",
          "date_modified": "11644473600000001",
          "url": "about:bookmark-separator",
          "date_last_used": "11644473600000001"
        }
      ]
    },
    "synced": {
      "type": "folder",
      "name": "Bookmarks",
      "children": [
        {
          "type": "url",
          "id": "4",
          "date_added": "11644473600000000",
          "name": "A",
          "url": "http://a"
        }
      ]
    }
  }
}
"#;
        assert_eq!(json, expected);

        let decoded = ChromeJsonCodec.decode(json.as_bytes()).unwrap();
        // tabs folder comes first now; icon is gone
        assert_eq!(decoded.children[0].special(), Some(SpecialFolder::SavedTabs));
        assert!(matches!(&decoded.children[1], Node::Bookmark(b) if b.icon.is_empty()));
    }

    #[test]
    fn test_round_trip_with_sort_key() {
        let root = ChromeJsonCodec.decode(SAMPLE.as_bytes()).unwrap();
        let again = ChromeJsonCodec.decode(encode(&root).as_bytes()).unwrap();
        assert!(structural_diff(&root, &again, &Strict).is_empty());
    }

    #[test]
    fn test_version_guard() {
        let err = ChromeJsonCodec
            .decode(br#"{"version": 2, "roots": {"synced": {"type": "folder", "children": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");

        let root = ChromeJsonCodec
            .decode(br#"{"roots": {"synced": {"type": "folder", "name": "x", "children": []}}}"#)
            .unwrap();
        assert_eq!(root.name, "x");
    }

    #[test]
    fn test_float_version_is_accepted() {
        let root = ChromeJsonCodec
            .decode(br#"{"version": 1.0, "roots": {"synced": {"type": "folder", "name": "x", "children": []}}}"#)
            .unwrap();
        assert_eq!(root.name, "x");

        let err = ChromeJsonCodec
            .decode(br#"{"version": 1.5, "roots": {"synced": {"type": "folder", "children": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_special_roots_keep_document_order() {
        let source = br#"{"version": 1, "roots": {
            "tabs": {"type": "folder", "id": "1", "children": []},
            "bookmark_bar": {"type": "folder", "id": "2", "children": []},
            "synced": {"type": "folder", "id": "3", "children": [
                {"type": "url", "id": "4", "name": "a", "url": "http://a"}]}}}"#;
        let root = ChromeJsonCodec.decode(source).unwrap();
        let specials: Vec<_> = root.children.iter().map(Node::special).collect();
        assert_eq!(
            specials,
            [Some(SpecialFolder::SavedTabs), Some(SpecialFolder::Toolbar), None]
        );

        // tree order on the way out, primary root last
        let json = encode(&root);
        let at = |key: &str| json.find(&format!("\"{key}\": {{")).unwrap();
        assert!(at("tabs") < at("bookmark_bar"));
        assert!(at("bookmark_bar") < at("synced"));
    }

    #[test]
    fn test_root_errors() {
        let err = ChromeJsonCodec
            .decode(br#"{"version": 1, "roots": {"other": {"type": "folder", "children": []}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Structure(_)), "got {err:?}");

        let err = ChromeJsonCodec
            .decode(
                br#"{"version": 1, "roots": {
                    "synced": {"type": "folder", "children": []},
                    "trash": {"type": "folder", "children": []}}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");

        let err = ChromeJsonCodec
            .decode(br#"{"version": 1, "roots": {"synced": {"type": "bookmark", "url": "x"}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Format(_)), "got {err:?}");
    }

    #[test]
    fn test_duplicate_special_is_rejected() {
        let root = Folder::new("r")
            .with_child(Folder::special(SpecialFolder::Toolbar))
            .with_child(Folder::special(SpecialFolder::Toolbar));
        let err = ChromeJsonCodec
            .encode(&root, &mut Vec::new(), &WriteConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }
}
