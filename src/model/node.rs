//! Bookmark tree nodes.
//!
//! The derives double as the native (`bkmk-json`) serialization: every node
//! carries a `type` discriminator and optional fields are omitted when they
//! hold their default value.

use serde::{Deserialize, Serialize};

/// A format-recognized top-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialFolder {
    Toolbar,
    OtherUnfiled,
    SavedTabs,
}

impl SpecialFolder {
    /// All categories, in the order `fill_special` prepends them.
    pub const ALL: [SpecialFolder; 3] = [
        SpecialFolder::Toolbar,
        SpecialFolder::OtherUnfiled,
        SpecialFolder::SavedTabs,
    ];

    /// Display name given to a synthesized folder of this category.
    pub fn default_name(self) -> &'static str {
        match self {
            SpecialFolder::Toolbar => "Bookmarks Toolbar",
            SpecialFolder::OtherUnfiled => "Other Bookmarks",
            SpecialFolder::SavedTabs => "Tabs collection",
        }
    }

    /// Serialized name, as written by the native format.
    pub fn name(self) -> &'static str {
        match self {
            SpecialFolder::Toolbar => "TOOLBAR",
            SpecialFolder::OtherUnfiled => "OTHER_UNFILED",
            SpecialFolder::SavedTabs => "SAVED_TABS",
        }
    }

    /// Stable 1-based rank, used to order special roots.
    pub fn rank(self) -> u8 {
        match self {
            SpecialFolder::Toolbar => 1,
            SpecialFolder::OtherUnfiled => 2,
            SpecialFolder::SavedTabs => 3,
        }
    }
}

/// Display name given to an unnamed collection root.
pub const ROOT_DEFAULT_NAME: &str = "Bookmarks";

/// A visual divider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separator {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// When this entry was added (microseconds since the Unix epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
}

/// A link to a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// When this entry was modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<i64>,
    pub url: String,
    /// When the target URL was modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_date_modified: Option<i64>,
    /// When the target URL was last visited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_date_visited: Option<i64>,
}

/// An ordered container of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<i64>,
    pub children: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<SpecialFolder>,
}

/// One entry in a bookmark tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Separator(Separator),
    Bookmark(Bookmark),
    Folder(Folder),
}

/// Discriminant of a [`Node`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Separator,
    Bookmark,
    Folder,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Separator => "separator",
            NodeKind::Bookmark => "bookmark",
            NodeKind::Folder => "folder",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Separator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Bookmark {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// An empty folder of the given category, named by its default name.
    pub fn special(special: SpecialFolder) -> Self {
        Self {
            name: special.default_name().to_string(),
            special: Some(special),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// True for an empty folder whose category `supported` rejects.
    ///
    /// Such folders are placeholders that carry no information in the
    /// destination format, so `cull_special` drops them on write.
    pub fn is_culled_placeholder(&self, supported: impl Fn(SpecialFolder) -> bool) -> bool {
        self.children.is_empty() && self.special.is_some_and(|s| !supported(s))
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Separator(_) => NodeKind::Separator,
            Node::Bookmark(_) => NodeKind::Bookmark,
            Node::Folder(_) => NodeKind::Folder,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Separator(s) => &s.id,
            Node::Bookmark(b) => &b.id,
            Node::Folder(f) => &f.id,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Node::Folder(f) => Some(f),
            _ => None,
        }
    }

    /// Category of a special folder, `None` for every other node.
    pub fn special(&self) -> Option<SpecialFolder> {
        self.as_folder().and_then(|f| f.special)
    }
}

impl From<Separator> for Node {
    fn from(s: Separator) -> Self {
        Node::Separator(s)
    }
}

impl From<Bookmark> for Node {
    fn from(b: Bookmark) -> Self {
        Node::Bookmark(b)
    }
}

impl From<Folder> for Node {
    fn from(f: Folder) -> Self {
        Node::Folder(f)
    }
}

/// Whether `node` survives the cull-special policy of a destination format.
pub fn keep_child(cull_special: bool, supported: impl Fn(SpecialFolder) -> bool, node: &Node) -> bool {
    match node {
        Node::Folder(f) => !(cull_special && f.is_culled_placeholder(supported)),
        _ => true,
    }
}
