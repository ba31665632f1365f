//! Special-folder synthesis.

use crate::error::{Error, Result};
use crate::model::{Folder, Node, NodeRef, ROOT_DEFAULT_NAME, SpecialFolder, Visit};

/// Collects which categories already exist anywhere in a tree.
#[derive(Default)]
struct Present(Vec<SpecialFolder>);

impl Visit for Present {
    fn visit(&mut self, node: NodeRef<'_>) {
        if let NodeRef::Folder(f) = node
            && let Some(special) = f.special
            && !self.0.contains(&special)
        {
            self.0.push(special);
        }
    }
}

/// Make every special category exist, prepending empty folders for the
/// missing ones in [`SpecialFolder::ALL`] order. Names an unnamed root.
///
/// Calling this again after a write that culled the placeholders adds them
/// back; the pass does not remember what it synthesized.
pub fn fill_special(root: &mut Folder) -> Result<()> {
    if let Some(special) = root.special {
        return Err(Error::validation(format!(
            "root folder must not be special, found {}",
            special.name()
        )));
    }

    let mut present = Present::default();
    root.walk(&mut present);

    if root.name.is_empty() {
        root.name = ROOT_DEFAULT_NAME.to_string();
    }

    let missing: Vec<Node> = SpecialFolder::ALL
        .into_iter()
        .filter(|s| !present.0.contains(s))
        .map(|s| Node::Folder(Folder::special(s)))
        .collect();
    if !missing.is_empty() {
        log::debug!("adding {} special folder(s)", missing.len());
        root.children.splice(0..0, missing);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bookmark;

    #[test]
    fn test_fills_all_categories_in_order() {
        let mut root = Folder::new("").with_child(Bookmark::new("a", "http://a"));
        fill_special(&mut root).unwrap();

        assert_eq!(root.name, ROOT_DEFAULT_NAME);
        let specials: Vec<_> = root.children.iter().map(Node::special).collect();
        assert_eq!(
            specials,
            [
                Some(SpecialFolder::Toolbar),
                Some(SpecialFolder::OtherUnfiled),
                Some(SpecialFolder::SavedTabs),
                None,
            ]
        );
        let Node::Folder(tabs) = &root.children[2] else {
            panic!("expected folder");
        };
        assert_eq!(tabs.name, "Tabs collection");
        assert!(tabs.children.is_empty());
    }

    #[test]
    fn test_existing_categories_anywhere_count() {
        let nested = Folder::new("deep").with_child(Folder::special(SpecialFolder::OtherUnfiled));
        let mut root = Folder::new("Mine").with_child(nested);
        fill_special(&mut root).unwrap();

        assert_eq!(root.name, "Mine");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].special(), Some(SpecialFolder::Toolbar));
        assert_eq!(root.children[1].special(), Some(SpecialFolder::SavedTabs));
    }

    #[test]
    fn test_second_call_adds_nothing() {
        let mut root = Folder::new("r");
        fill_special(&mut root).unwrap();
        let once = root.clone();
        fill_special(&mut root).unwrap();
        assert_eq!(root, once);
    }

    #[test]
    fn test_special_root_is_rejected() {
        let mut root = Folder::special(SpecialFolder::Toolbar);
        let err = fill_special(&mut root).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }
}
