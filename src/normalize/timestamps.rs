//! Timestamp filling.

use crate::model::{Folder, NodeMut};

/// Set every unset timestamp field to `ts`. Set fields are left alone.
///
/// Separators only have `date_added`; folders have no URL dates.
pub fn fill_timestamps(root: &mut Folder, ts: i64) {
    root.walk_mut(&mut |node: NodeMut<'_>| match node {
        NodeMut::Separator(s) => {
            s.date_added.get_or_insert(ts);
        }
        NodeMut::Bookmark(b) => {
            b.date_added.get_or_insert(ts);
            b.date_modified.get_or_insert(ts);
            b.url_date_modified.get_or_insert(ts);
            b.url_date_visited.get_or_insert(ts);
        }
        NodeMut::Folder(f) => {
            f.date_added.get_or_insert(ts);
            f.date_modified.get_or_insert(ts);
        }
    });
}
