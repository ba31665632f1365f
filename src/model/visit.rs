//! Tree traversal utilities for normalization passes.
//!
//! Every walk is pre-order: a folder is visited before its children, and
//! children are visited in their stored order. Passes that need global state
//! (a running maximum, a set of seen categories) implement [`VisitMut`] or
//! [`Visit`] on a context struct and read the result back after the walk.

use super::{Bookmark, Folder, Node, Separator};

/// Shared borrow of one node, including the root folder.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Separator(&'a Separator),
    Bookmark(&'a Bookmark),
    Folder(&'a Folder),
}

/// Exclusive borrow of one node, including the root folder.
#[derive(Debug)]
pub enum NodeMut<'a> {
    Separator(&'a mut Separator),
    Bookmark(&'a mut Bookmark),
    Folder(&'a mut Folder),
}

impl<'a> NodeRef<'a> {
    pub fn id(self) -> &'a str {
        match self {
            NodeRef::Separator(s) => &s.id,
            NodeRef::Bookmark(b) => &b.id,
            NodeRef::Folder(f) => &f.id,
        }
    }
}

impl<'a> NodeMut<'a> {
    pub fn id_mut(self) -> &'a mut String {
        match self {
            NodeMut::Separator(s) => &mut s.id,
            NodeMut::Bookmark(b) => &mut b.id,
            NodeMut::Folder(f) => &mut f.id,
        }
    }
}

/// Read-only visitor.
pub trait Visit {
    fn visit(&mut self, node: NodeRef<'_>);
}

/// Mutating visitor.
pub trait VisitMut {
    fn visit_mut(&mut self, node: NodeMut<'_>);
}

impl<F: FnMut(NodeRef<'_>)> Visit for F {
    fn visit(&mut self, node: NodeRef<'_>) {
        self(node)
    }
}

impl<F: FnMut(NodeMut<'_>)> VisitMut for F {
    fn visit_mut(&mut self, node: NodeMut<'_>) {
        self(node)
    }
}

impl Folder {
    /// Visit this folder and everything below it.
    pub fn walk<V: Visit + ?Sized>(&self, visitor: &mut V) {
        visitor.visit(NodeRef::Folder(self));
        for child in &self.children {
            child.walk(visitor);
        }
    }

    /// Visit this folder and everything below it, with mutable access.
    pub fn walk_mut<V: VisitMut + ?Sized>(&mut self, visitor: &mut V) {
        visitor.visit_mut(NodeMut::Folder(self));
        for child in &mut self.children {
            child.walk_mut(visitor);
        }
    }
}

impl Node {
    pub fn walk<V: Visit + ?Sized>(&self, visitor: &mut V) {
        match self {
            Node::Separator(s) => visitor.visit(NodeRef::Separator(s)),
            Node::Bookmark(b) => visitor.visit(NodeRef::Bookmark(b)),
            Node::Folder(f) => f.walk(visitor),
        }
    }

    pub fn walk_mut<V: VisitMut + ?Sized>(&mut self, visitor: &mut V) {
        match self {
            Node::Separator(s) => visitor.visit_mut(NodeMut::Separator(s)),
            Node::Bookmark(b) => visitor.visit_mut(NodeMut::Bookmark(b)),
            Node::Folder(f) => f.walk_mut(visitor),
        }
    }
}
