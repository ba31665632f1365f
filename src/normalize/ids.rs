//! Id assignment and prefixing.

use std::fmt;

use crate::model::{Folder, NodeMut, NodeRef, Visit, VisitMut};

/// Ordering rank of an id when looking for the largest one.
///
/// Empty ids rank 0 and numeric ids rank as their value. Any other id ranks
/// as `10^len`, above every numeric id of its length, so fresh numeric ids
/// can never spell an existing opaque one. Ranks are unbounded decimals.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdRank {
    // field order matters: shorter numbers sort first
    len: usize,
    digits: String,
}

impl IdRank {
    fn from_digits(digits: &str) -> Self {
        let digits = digits.trim_start_matches('0');
        IdRank {
            len: digits.len(),
            digits: digits.to_string(),
        }
    }

    fn power_of_ten(exp: usize) -> Self {
        let mut digits = String::with_capacity(exp + 1);
        digits.push('1');
        digits.push_str(&"0".repeat(exp));
        IdRank { len: exp + 1, digits }
    }

    /// The rank one above this one.
    pub fn succ(&self) -> Self {
        let mut digits: Vec<u8> = self.digits.bytes().collect();
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
        let digits: String = digits.into_iter().map(char::from).collect();
        IdRank {
            len: digits.len(),
            digits,
        }
    }
}

impl fmt::Display for IdRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.digits.is_empty() {
            f.write_str("0")
        } else {
            f.write_str(&self.digits)
        }
    }
}

pub fn numeric_id_rank(id: &str) -> IdRank {
    if id.bytes().all(|b| b.is_ascii_digit()) {
        // covers the empty id too
        return IdRank::from_digits(id);
    }
    IdRank::power_of_ten(id.len())
}

/// Running maximum over every id in the tree.
#[derive(Default)]
struct MaxId(IdRank);

impl Visit for MaxId {
    fn visit(&mut self, node: NodeRef<'_>) {
        let rank = numeric_id_rank(node.id());
        if rank > self.0 {
            self.0 = rank;
        }
    }
}

/// Hands out consecutive ids to nodes that have none.
struct Assign {
    next: IdRank,
    assigned: usize,
}

impl VisitMut for Assign {
    fn visit_mut(&mut self, node: NodeMut<'_>) {
        let id = node.id_mut();
        if id.is_empty() {
            *id = self.next.to_string();
            self.next = self.next.succ();
            self.assigned += 1;
        }
    }
}

/// Give every node without an id a fresh numeric one, counting up from one
/// past the largest existing id in pre-order.
pub fn fill_ids(root: &mut Folder) {
    let mut max = MaxId::default();
    root.walk(&mut max);

    let mut assign = Assign {
        next: max.0.succ(),
        assigned: 0,
    };
    root.walk_mut(&mut assign);
    log::debug!("assigned {} id(s) starting after {}", assign.assigned, max.0);
}

/// Prepend `prefix` to every non-empty id.
pub fn prefix_ids(root: &mut Folder, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    root.walk_mut(&mut |node: NodeMut<'_>| {
        let id = node.id_mut();
        if !id.is_empty() {
            id.insert_str(0, prefix);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bookmark, Node, Separator};
    use proptest::prelude::*;

    fn ids(root: &Folder) -> Vec<String> {
        let mut out = Vec::new();
        root.walk(&mut |node: NodeRef<'_>| out.push(node.id().to_string()));
        out
    }

    #[test]
    fn test_rank_examples() {
        assert_eq!(numeric_id_rank("").to_string(), "0");
        assert_eq!(numeric_id_rank("7").to_string(), "7");
        assert_eq!(numeric_id_rank("abc").to_string(), "1000");
        assert!(numeric_id_rank("7") < numeric_id_rank("abc"));
        assert_eq!(numeric_id_rank("12345").to_string(), "12345");
        assert!(numeric_id_rank("12345") > numeric_id_rank("abc"));
        assert_eq!(numeric_id_rank("007"), numeric_id_rank("7"));
        assert!(numeric_id_rank("99") < numeric_id_rank("100"));
    }

    #[test]
    fn test_rank_succ_carries() {
        assert_eq!(numeric_id_rank("").succ().to_string(), "1");
        assert_eq!(numeric_id_rank("199").succ().to_string(), "200");
        assert_eq!(numeric_id_rank("999").succ().to_string(), "1000");
        assert_eq!(numeric_id_rank("999").succ(), numeric_id_rank("1000"));
    }

    #[test]
    fn test_fill_ids_past_long_opaque_id() {
        let guid = "firefox-profile-0123456789abcdef0123456789abcdef";
        assert_eq!(guid.len(), 48);
        let mut root = Folder::new("r")
            .with_child(Bookmark::new("a", "http://a").with_id(guid))
            .with_child(Bookmark::new("b", "http://b"))
            .with_child(Bookmark::new("c", "http://c"));
        fill_ids(&mut root);

        let base = "0".repeat(47);
        assert_eq!(
            ids(&root),
            [format!("1{base}1"), guid.to_string(), format!("1{base}2"), format!("1{base}3")]
        );
    }

    #[test]
    fn test_fill_ids_past_huge_numeric_id() {
        let huge = "9".repeat(45);
        let mut root = Folder::new("r")
            .with_child(Bookmark::new("a", "http://a").with_id(huge.clone()))
            .with_child(Bookmark::new("b", "http://b"));
        fill_ids(&mut root);

        let after = format!("1{}", "0".repeat(45));
        assert_eq!(root.id, after);
        assert_eq!(ids(&root)[2], format!("{}1", &after[..45]));
    }

    #[test]
    fn test_fill_ids_counts_past_opaque_ids() {
        let mut root = Folder::new("r")
            .with_child(Bookmark::new("a", "http://a").with_id("abc"))
            .with_child(Folder::new("f").with_child(Separator::new()))
            .with_child(Bookmark::new("b", "http://b").with_id("7"));
        fill_ids(&mut root);
        assert_eq!(ids(&root), ["1001", "abc", "1002", "1003", "7"]);
    }

    #[test]
    fn test_fill_ids_on_empty_tree() {
        let mut root = Folder::new("r").with_child(Bookmark::new("a", "http://a"));
        fill_ids(&mut root);
        assert_eq!(ids(&root), ["1", "2"]);
    }

    #[test]
    fn test_prefix_ids_skips_empty() {
        let mut root = Folder::new("r")
            .with_id("1")
            .with_child(Bookmark::new("a", "http://a"))
            .with_child(Bookmark::new("b", "http://b").with_id("2"));
        prefix_ids(&mut root, "ff-");
        assert_eq!(ids(&root), ["ff-1", "", "ff-2"]);
    }

    fn arb_id() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[0-9]{1,4}", "[a-z]{1,5}"]
    }

    fn arb_tree() -> impl Strategy<Value = Folder> {
        let leaf = arb_id().prop_map(|id| Node::Bookmark(Bookmark::new("x", "http://x").with_id(id)));
        let node = leaf.prop_recursive(3, 24, 4, |inner| {
            (arb_id(), prop::collection::vec(inner, 0..4)).prop_map(|(id, children)| {
                Node::Folder(Folder {
                    id,
                    children,
                    ..Default::default()
                })
            })
        });
        prop::collection::vec(node, 0..5).prop_map(|children| Folder {
            children,
            ..Default::default()
        })
    }

    proptest! {
        #[test]
        fn prop_fill_ids_is_idempotent(tree in arb_tree()) {
            let mut once = tree.clone();
            fill_ids(&mut once);
            let mut twice = once.clone();
            fill_ids(&mut twice);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_fill_ids_keeps_existing_and_fills_all(tree in arb_tree()) {
            let before = ids(&tree);
            let max = before.iter().map(|id| numeric_id_rank(id)).max().unwrap_or_default();
            let mut filled = tree.clone();
            fill_ids(&mut filled);
            let after = ids(&filled);

            let mut next = max.succ();
            for (old, new) in before.iter().zip(&after) {
                if old.is_empty() {
                    prop_assert_eq!(new, &next.to_string());
                    next = next.succ();
                } else {
                    prop_assert_eq!(old, new);
                }
            }
        }
    }
}
