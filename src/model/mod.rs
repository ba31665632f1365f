//! Core data model for bookmark processing.
//!
//! This module contains:
//! - Node types (separator, bookmark, folder) and special-folder categories
//! - Pre-order traversal with plain or context-carrying visitors
//! - The structural diff used to judge round-trip equivalence

pub mod diff;
mod node;
mod visit;

pub use diff::{DiffRules, Difference, Field, FieldDiff, Strict, Value, structural_diff};
pub use node::{
    Bookmark, Folder, Node, NodeKind, ROOT_DEFAULT_NAME, Separator, SpecialFolder, keep_child,
};
pub use visit::{NodeMut, NodeRef, Visit, VisitMut};
