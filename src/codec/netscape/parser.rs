//! Stack machine that builds a tree from Netscape bookmark tokens.
//!
//! `<DT>` is never closed in these files, so a generic HTML tree builder
//! nests every entry inside the previous one. Instead the parser keeps the
//! chain of open nodes: folders stay open until their `</DL>`, while a
//! bookmark or separator stays open only until the next sibling starts.

use crate::codec::{is_fake_separator, parse_decimal};
use crate::error::{Error, Result};
use crate::model::{Bookmark, Folder, Node, Separator, SpecialFolder};
use crate::util::unescape_html;

use super::DOCTYPE;
use super::tokenizer::{Token, Tokenizer};

/// Boolean folder attributes and the category each one marks.
pub(super) const SPECIAL_ATTRS: [(&str, SpecialFolder); 2] = [
    ("personal_toolbar_folder", SpecialFolder::Toolbar),
    ("unfiled_bookmarks_folder", SpecialFolder::OtherUnfiled),
];

pub(super) fn parse(input: &str) -> Result<Folder> {
    let mut parser = Parser::default();
    for token in Tokenizer::new(input) {
        parser.token(token)?;
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    started: bool,
    stack: Vec<Node>,
    result: Option<Folder>,
    /// Inside a `<DD>` description, whose text belongs to no field.
    in_description: bool,
}

impl Parser {
    fn token(&mut self, token: Token<'_>) -> Result<()> {
        match token {
            Token::Doctype(decl) => {
                if decl.eq_ignore_ascii_case(DOCTYPE) {
                    self.started = true;
                }
            }
            Token::StartTag { name, attrs } => {
                if !self.started {
                    return Err(Error::structure(format!(
                        "did not see expected DOCTYPE before <{name}>"
                    )));
                }
                self.start_tag(&name, &Attrs(attrs))?;
            }
            Token::EndTag(name) => {
                if name == "dl" {
                    self.in_description = false;
                    self.end_list()?;
                }
            }
            Token::Text(text) => self.text(text),
            Token::Comment => {}
        }
        Ok(())
    }

    fn start_tag(&mut self, name: &str, attrs: &Attrs) -> Result<()> {
        match name {
            "dd" => {
                self.in_description = true;
                return Ok(());
            }
            "h1" | "h3" | "a" | "hr" | "dt" | "dl" => self.in_description = false,
            _ => return Ok(()),
        }

        let id = attrs.get("id").unwrap_or_default().to_string();
        let date_added = attrs.time("add_date")?;

        match name {
            "h1" => {
                if !self.stack.is_empty() || self.result.is_some() {
                    return Err(Error::structure("<H1> is only valid as the first heading"));
                }
                self.stack.push(Node::Folder(Folder {
                    id,
                    date_added,
                    icon: attrs.get("icon").unwrap_or_default().to_string(),
                    date_modified: attrs.time("last_modified")?,
                    ..Default::default()
                }));
            }
            "h3" => {
                let special = SPECIAL_ATTRS
                    .iter()
                    .find(|(attr, _)| attrs.get(attr) == Some("true"))
                    .map(|&(_, special)| special);
                self.open_child(Node::Folder(Folder {
                    id,
                    date_added,
                    icon: attrs.get("icon").unwrap_or_default().to_string(),
                    date_modified: attrs.time("last_modified")?,
                    special,
                    ..Default::default()
                }))?;
            }
            "a" => {
                let url = attrs
                    .get("href")
                    .ok_or_else(|| Error::format("<A> without HREF"))?;
                let node = if is_fake_separator(url) {
                    // floccus writes fake separators even though <HR> exists
                    Node::Separator(Separator { id, date_added })
                } else {
                    Node::Bookmark(Bookmark {
                        id,
                        date_added,
                        icon: attrs.get("icon").unwrap_or_default().to_string(),
                        date_modified: attrs.time("last_modified")?,
                        url: url.to_string(),
                        url_date_visited: attrs.time("last_visit")?,
                        ..Default::default()
                    })
                };
                self.open_child(node)?;
            }
            "hr" => self.open_child(Node::Separator(Separator { id, date_added }))?,
            "dt" => self.close_entry()?,
            "dl" => match self.stack.last() {
                Some(Node::Folder(_)) => {}
                Some(other) => {
                    return Err(Error::structure(format!("<DL> inside a {}", other.kind())));
                }
                None => {
                    if self.result.is_some() {
                        return Err(Error::structure("<DL> after the root list was closed"));
                    }
                    // some tools omit <H1> entirely
                    self.stack.push(Node::Folder(Folder::default()));
                }
            },
            _ => {}
        }
        Ok(())
    }

    /// Close a dangling bookmark or separator, attaching it to its folder.
    fn close_entry(&mut self) -> Result<()> {
        if matches!(self.stack.last(), Some(Node::Folder(_)) | None) {
            return Ok(());
        }
        let Some(entry) = self.stack.pop() else {
            return Ok(());
        };
        self.attach(entry)
    }

    /// Open a new entry inside the current folder.
    fn open_child(&mut self, node: Node) -> Result<()> {
        self.close_entry()?;
        match self.stack.last() {
            Some(Node::Folder(_)) => {
                self.stack.push(node);
                Ok(())
            }
            _ => Err(Error::structure(format!("{} outside of any folder", node.kind()))),
        }
    }

    fn end_list(&mut self) -> Result<()> {
        self.close_entry()?;
        match self.stack.pop() {
            Some(Node::Folder(folder)) => {
                if self.stack.is_empty() {
                    self.result = Some(folder);
                    Ok(())
                } else {
                    self.attach(Node::Folder(folder))
                }
            }
            _ => Err(Error::structure("unbalanced </DL>")),
        }
    }

    fn attach(&mut self, node: Node) -> Result<()> {
        match self.stack.last_mut() {
            Some(Node::Folder(parent)) => {
                parent.children.push(node);
                Ok(())
            }
            _ => Err(Error::structure(format!("{} outside of any folder", node.kind()))),
        }
    }

    fn text(&mut self, raw: &str) {
        if self.in_description {
            return;
        }
        let text = unescape_html(raw);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        // names may arrive in several chunks, e.g. around a comment
        match self.stack.last_mut() {
            Some(Node::Folder(f)) => f.name.push_str(text),
            Some(Node::Bookmark(b)) => b.name.push_str(text),
            Some(Node::Separator(_)) | None => {}
        }
    }

    fn finish(self) -> Result<Folder> {
        if !self.started {
            return Err(Error::structure("did not see expected DOCTYPE"));
        }
        if !self.stack.is_empty() {
            return Err(Error::structure(format!(
                "unexpected end of input with {} unclosed level(s)",
                self.stack.len()
            )));
        }
        self.result
            .ok_or_else(|| Error::structure("failed to parse anything out of the file"))
    }
}

/// Attributes of one tag; names are already lowercase.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decimal seconds, converted to microseconds. Empty counts as unset.
    fn time(&self, name: &str) -> Result<Option<i64>> {
        let Some(value) = self.get(name).filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        let secs = parse_decimal(value, name)?;
        secs.checked_mul(1_000_000)
            .map(Some)
            .ok_or_else(|| Error::format(format!("{name} timestamp out of range: {value}")))
    }
}
