//! Deep structural comparison of two bookmark trees.
//!
//! The comparator walks both trees in lockstep and reports every field whose
//! values differ, unless the [`DiffRules`] declare that difference an
//! expected loss. A node kind mismatch at the same position is always
//! reported, as is a differing number of (kept) children.

use std::fmt;

use super::{Folder, Node, NodeKind, SpecialFolder};

/// A comparable node field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    DateAdded,
    Name,
    Icon,
    DateModified,
    Url,
    UrlDateModified,
    UrlDateVisited,
    Special,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::DateAdded => "date_added",
            Field::Name => "name",
            Field::Icon => "icon",
            Field::DateModified => "date_modified",
            Field::Url => "url",
            Field::UrlDateModified => "url_date_modified",
            Field::UrlDateVisited => "url_date_visited",
            Field::Special => "special",
        }
    }

    /// True for the timestamp fields.
    pub fn is_timestamp(self) -> bool {
        matches!(
            self,
            Field::DateAdded | Field::DateModified | Field::UrlDateModified | Field::UrlDateVisited
        )
    }
}

/// The value of a field on one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<'a> {
    Text(&'a str),
    Timestamp(Option<i64>),
    Special(Option<SpecialFolder>),
}

impl Value<'_> {
    /// True for an empty string or an unset timestamp/category.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Timestamp(t) => t.is_none(),
            Value::Special(s) => s.is_none(),
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(t) => *t,
            _ => None,
        }
    }

    pub fn special(&self) -> Option<SpecialFolder> {
        match self {
            Value::Special(s) => *s,
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Timestamp(Some(t)) => write!(f, "{t}"),
            Value::Special(Some(s)) => f.write_str(s.name()),
            Value::Timestamp(None) | Value::Special(None) => f.write_str("None"),
        }
    }
}

/// One differing field, handed to [`DiffRules::accept`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff<'a> {
    pub kind: NodeKind,
    /// Depth of the node; the root is 0.
    pub depth: usize,
    pub field: Field,
    pub left: Value<'a>,
    pub right: Value<'a>,
}

/// A reported (not accepted) difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difference {
    Field {
        path: String,
        kind: NodeKind,
        field: Field,
        left: String,
        right: String,
    },
    Kind {
        path: String,
        left: NodeKind,
        right: NodeKind,
    },
    ChildCount {
        path: String,
        left: usize,
        right: usize,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::Field {
                path,
                kind,
                field,
                left,
                right,
            } => write!(f, "{path}: {kind} {} different: {left} vs {right}", field.name()),
            Difference::Kind { path, left, right } => {
                write!(f, "{path}: type mismatch: {left} vs {right}")
            }
            Difference::ChildCount { path, left, right } => {
                write!(f, "{path}: child count mismatch: {left} vs {right}")
            }
        }
    }
}

/// Policy hooks for [`structural_diff`].
pub trait DiffRules {
    /// Return true when `diff` is an expected, acceptable loss.
    fn accept(&self, _diff: &FieldDiff<'_>) -> bool {
        false
    }

    /// Return false for children that the comparison should ignore.
    fn keep_child(&self, _node: &Node) -> bool {
        true
    }

    /// Sort key for the root's children, `None` to keep stored order.
    fn root_sort_key(&self, _node: &Node) -> Option<u8> {
        None
    }
}

/// Rules that accept nothing and keep everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl DiffRules for Strict {}

/// Compare two trees and collect every unaccepted difference.
pub fn structural_diff<R: DiffRules + ?Sized>(a: &Folder, b: &Folder, rules: &R) -> Vec<Difference> {
    let mut out = Vec::new();
    Differ {
        rules,
        out: &mut out,
    }
    .folder(a, b, 0, "");
    out
}

struct Differ<'r, R: ?Sized> {
    rules: &'r R,
    out: &'r mut Vec<Difference>,
}

impl<R: DiffRules + ?Sized> Differ<'_, R> {
    fn field(&mut self, path: &str, kind: NodeKind, depth: usize, field: Field, left: Value<'_>, right: Value<'_>) {
        if left == right {
            return;
        }
        let diff = FieldDiff {
            kind,
            depth,
            field,
            left,
            right,
        };
        if self.rules.accept(&diff) {
            return;
        }
        self.out.push(Difference::Field {
            path: display_path(path),
            kind,
            field,
            left: diff.left.to_string(),
            right: diff.right.to_string(),
        });
    }

    fn node(&mut self, a: &Node, b: &Node, depth: usize, path: &str) {
        match (a, b) {
            (Node::Separator(x), Node::Separator(y)) => {
                let k = NodeKind::Separator;
                self.field(path, k, depth, Field::Id, Value::Text(&x.id), Value::Text(&y.id));
                self.field(
                    path,
                    k,
                    depth,
                    Field::DateAdded,
                    Value::Timestamp(x.date_added),
                    Value::Timestamp(y.date_added),
                );
            }
            (Node::Bookmark(x), Node::Bookmark(y)) => {
                let k = NodeKind::Bookmark;
                self.field(path, k, depth, Field::Id, Value::Text(&x.id), Value::Text(&y.id));
                self.field(
                    path,
                    k,
                    depth,
                    Field::DateAdded,
                    Value::Timestamp(x.date_added),
                    Value::Timestamp(y.date_added),
                );
                self.field(path, k, depth, Field::Name, Value::Text(&x.name), Value::Text(&y.name));
                self.field(path, k, depth, Field::Icon, Value::Text(&x.icon), Value::Text(&y.icon));
                self.field(
                    path,
                    k,
                    depth,
                    Field::DateModified,
                    Value::Timestamp(x.date_modified),
                    Value::Timestamp(y.date_modified),
                );
                self.field(path, k, depth, Field::Url, Value::Text(&x.url), Value::Text(&y.url));
                self.field(
                    path,
                    k,
                    depth,
                    Field::UrlDateModified,
                    Value::Timestamp(x.url_date_modified),
                    Value::Timestamp(y.url_date_modified),
                );
                self.field(
                    path,
                    k,
                    depth,
                    Field::UrlDateVisited,
                    Value::Timestamp(x.url_date_visited),
                    Value::Timestamp(y.url_date_visited),
                );
            }
            (Node::Folder(x), Node::Folder(y)) => self.folder(x, y, depth, path),
            _ => self.out.push(Difference::Kind {
                path: display_path(path),
                left: a.kind(),
                right: b.kind(),
            }),
        }
    }

    fn folder(&mut self, a: &Folder, b: &Folder, depth: usize, path: &str) {
        let k = NodeKind::Folder;
        self.field(path, k, depth, Field::Id, Value::Text(&a.id), Value::Text(&b.id));
        self.field(
            path,
            k,
            depth,
            Field::DateAdded,
            Value::Timestamp(a.date_added),
            Value::Timestamp(b.date_added),
        );
        self.field(path, k, depth, Field::Name, Value::Text(&a.name), Value::Text(&b.name));
        self.field(path, k, depth, Field::Icon, Value::Text(&a.icon), Value::Text(&b.icon));
        self.field(
            path,
            k,
            depth,
            Field::DateModified,
            Value::Timestamp(a.date_modified),
            Value::Timestamp(b.date_modified),
        );
        self.field(
            path,
            k,
            depth,
            Field::Special,
            Value::Special(a.special),
            Value::Special(b.special),
        );

        let left = self.children(a, depth);
        let right = self.children(b, depth);
        if left.len() != right.len() {
            self.out.push(Difference::ChildCount {
                path: display_path(path),
                left: left.len(),
                right: right.len(),
            });
        }
        for (i, (x, y)) in left.into_iter().zip(right).enumerate() {
            let child_path = format!("{path}/{i}");
            self.node(x, y, depth + 1, &child_path);
        }
    }

    fn children<'a>(&self, folder: &'a Folder, depth: usize) -> Vec<&'a Node> {
        let mut kept: Vec<&Node> = folder
            .children
            .iter()
            .filter(|c| self.rules.keep_child(c))
            .collect();
        if depth == 0 {
            // Stable, so nodes sharing a key keep their stored order.
            kept.sort_by_key(|c| self.rules.root_sort_key(c));
        }
        kept
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
