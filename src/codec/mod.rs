//! Codecs for the four bookmark formats.
//!
//! Each codec maps between the [`Folder`] tree and one external byte
//! representation. The [`Codec`] trait is the capability object stored in
//! the static registry ([`crate::Format::codec`]): besides decode/encode it
//! exposes what the format can represent, which the round-trip checker uses
//! to tell expected losses from bugs.

mod chrome;
mod native;
mod netscape;
mod xbel;

pub use chrome::ChromeJsonCodec;
pub use native::NativeCodec;
pub use netscape::NetscapeHtmlCodec;
pub use xbel::XbelCodec;

use std::io::Write;

use crate::error::Result;
use crate::format::Format;
use crate::model::{FieldDiff, Folder, Node, SpecialFolder};

/// URLs that other bookmark tools use to smuggle separators through formats
/// without one. Decoders accept any of them (as a prefix, since floccus adds
/// a query string); encoders always write the first.
pub const FAKE_SEPARATOR_URLS: [&str; 3] = [
    "about:bookmark-separator",
    "https://separator.mayastudios.com/",
    "https://separator.floccus.org/",
];

/// Name written for a fake separator entry.
pub const FAKE_SEPARATOR_NAME: &str = "|";

/// True when `url` is one of the fake separator sentinels.
pub fn is_fake_separator(url: &str) -> bool {
    FAKE_SEPARATOR_URLS.iter().any(|f| url.starts_with(f))
}

/// Configuration for writing a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WriteConfig {
    /// Omit empty special folders whose category the format cannot represent.
    pub cull_special: bool,
    /// Omit attributes the format supports, but not on the node being written.
    pub cull_attr: bool,
}

impl WriteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cull_special(mut self, cull_special: bool) -> Self {
        self.cull_special = cull_special;
        self
    }

    pub fn with_cull_attr(mut self, cull_attr: bool) -> Self {
        self.cull_attr = cull_attr;
        self
    }
}

/// Polymorphic interface for format-specific backends.
pub trait Codec: Send + Sync {
    /// The format this codec implements.
    fn format(&self) -> Format;

    /// Parse a complete document into its root folder.
    fn decode(&self, source: &[u8]) -> Result<Folder>;

    /// Serialize `root` and everything below it.
    ///
    /// Output is deterministic: the same tree and config always produce the
    /// same bytes.
    fn encode(&self, root: &Folder, sink: &mut dyn Write, config: &WriteConfig) -> Result<()>;

    /// Whether a folder of this category keeps its category through a write.
    fn supports_special(&self, special: SpecialFolder) -> bool;

    /// Whether a difference between a tree and its decoded re-encoding is a
    /// documented loss of this format rather than a bug.
    fn acceptable_difference(&self, _diff: &FieldDiff<'_>, _cull_attr: bool) -> bool {
        false
    }

    /// Sort key for the root's children when comparing round trips, for
    /// formats that reorder top-level special folders on write.
    fn root_sort_key(&self, _node: &Node) -> Option<u8> {
        None
    }

    /// Whether `node` is written at all under `config`.
    fn keeps_child(&self, config: &WriteConfig, node: &Node) -> bool {
        crate::model::keep_child(config.cull_special, |s| self.supports_special(s), node)
    }
}

/// Parse an optional decimal timestamp attribute.
pub(crate) fn parse_decimal(value: &str, what: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| crate::error::Error::format(format!("invalid {what} timestamp: {value:?}")))
}
