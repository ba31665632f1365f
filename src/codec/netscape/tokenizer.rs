//! Tag-soup tokenizer for Netscape bookmark files.
//!
//! Only what the bookmark grammar needs: doctype, start/end tags with
//! attributes, text, and comments (reported but carrying nothing). Tag and
//! attribute names are ASCII `[A-Za-z0-9:_-]`, lowercased on the way out.
//! Character references are resolved in attribute values; text is handed
//! out raw so the parser can trim before unescaping chunks.

use memchr::{memchr, memmem};

use crate::util::unescape_html;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Token<'a> {
    /// Body of `<!DOCTYPE ...>`, without the keyword.
    Doctype(&'a str),
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    EndTag(String),
    Text(&'a str),
    /// A comment, processing instruction or other `<!...>` declaration.
    Comment,
}

/// Streaming tokenizer over a decoded document.
pub(super) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Tokenizer { input, pos: 0 }
    }

    /// Offset of the next `<` that opens markup, at or after `from`.
    fn find_markup(&self, from: usize) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut i = from;
        while let Some(rel) = memchr(b'<', &bytes[i..]) {
            i += rel;
            match bytes.get(i + 1) {
                Some(c) if c.is_ascii_alphabetic() || matches!(c, b'/' | b'!' | b'?') => return Some(i),
                _ => i += 1,
            }
        }
        None
    }

    /// Offset just past the next `>` at or after `from`, or end of input.
    fn skip_past_gt(&self, from: usize) -> usize {
        let bytes = self.input.as_bytes();
        memchr(b'>', &bytes[from..]).map_or(bytes.len(), |rel| from + rel + 1)
    }

    fn declaration(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let start = self.pos;

        if bytes[start..].starts_with(b"<!--") {
            self.pos = memmem::find(&bytes[start + 4..], b"-->").map_or(bytes.len(), |rel| start + 4 + rel + 3);
            return Token::Comment;
        }

        let end = self.skip_past_gt(start);
        self.pos = end;
        let body_end = if bytes.get(end - 1) == Some(&b'>') { end - 1 } else { end };
        let body = &self.input[start + 2..body_end];
        if bytes[start + 1] == b'!'
            && let Some(keyword) = body.get(..7)
            && keyword.eq_ignore_ascii_case("doctype")
        {
            return Token::Doctype(body[7..].trim());
        }
        Token::Comment
    }

    fn end_tag(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let start = self.pos + 2;
        let stop = scan_name(bytes, start);
        let name = String::from_utf8_lossy(&bytes[start..stop]).to_ascii_lowercase();
        self.pos = self.skip_past_gt(stop);
        Token::EndTag(name)
    }

    fn start_tag(&mut self) -> Token<'a> {
        let bytes = self.input.as_bytes();
        let len = bytes.len();
        let start = self.pos + 1;
        let mut k = scan_name(bytes, start);
        let name = String::from_utf8_lossy(&bytes[start..k]).to_ascii_lowercase();
        let mut attrs = Vec::new();

        loop {
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            let name_start = k;
            k = scan_name(bytes, k);
            if name_start == k {
                // stray byte such as the `/` of `<br/>`
                k += 1;
                continue;
            }
            let attr_name = String::from_utf8_lossy(&bytes[name_start..k]).to_ascii_lowercase();

            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            let mut value = String::new();
            if k < len && bytes[k] == b'=' {
                k += 1;
                while k < len && bytes[k].is_ascii_whitespace() {
                    k += 1;
                }
                let raw = if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    let vstart = k + 1;
                    k = memchr(quote, &bytes[vstart..]).map_or(len, |rel| vstart + rel);
                    let raw = &bytes[vstart..k];
                    if k < len {
                        k += 1;
                    }
                    raw
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        k += 1;
                    }
                    &bytes[vstart..k]
                };
                value = unescape_html(&String::from_utf8_lossy(raw)).into_owned();
            }
            attrs.push((attr_name, value));
        }

        self.pos = k;
        Token::StartTag { name, attrs }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.input.as_bytes();
        if self.pos >= bytes.len() {
            return None;
        }

        let token = match self.find_markup(self.pos) {
            Some(at) if at == self.pos => match bytes[at + 1] {
                b'!' | b'?' => self.declaration(),
                b'/' => self.end_tag(),
                _ => self.start_tag(),
            },
            next => {
                let end = next.unwrap_or(bytes.len());
                let text = &self.input[self.pos..end];
                self.pos = end;
                Token::Text(text)
            }
        };
        Some(token)
    }
}

fn scan_name(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'_' | b':')) {
        i += 1;
    }
    i
}
