//! Format identifiers and the static codec registry.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::codec::{ChromeJsonCodec, Codec, NativeCodec, NetscapeHtmlCodec, XbelCodec};
use crate::error::{Error, Result};

/// A supported bookmark format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Own JSON format; a lossless dump of the tree model.
    Native,
    /// XML Bookmark Exchange Language 1.0.
    Xbel,
    /// NETSCAPE-Bookmark-file-1, exported by most browsers.
    NetscapeHtml,
    /// The JSON file Chrome keeps its bookmarks in.
    ChromeJson,
}

static NATIVE: NativeCodec = NativeCodec;
static XBEL: XbelCodec = XbelCodec;
static NETSCAPE_HTML: NetscapeHtmlCodec = NetscapeHtmlCodec;
static CHROME_JSON: ChromeJsonCodec = ChromeJsonCodec;

/// Extension table, longest suffix first so `.bkmk.json` beats `.json`.
const EXTENSIONS: [(&str, &[Format]); 4] = [
    (".bkmk.json", &[Format::Native]),
    (".xbel", &[Format::Xbel]),
    (".html", &[Format::NetscapeHtml]),
    (".json", &[Format::ChromeJson, Format::Native]),
];

impl Format {
    pub const ALL: [Format; 4] = [
        Format::Native,
        Format::Xbel,
        Format::NetscapeHtml,
        Format::ChromeJson,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Format::Native => "bkmk-json",
            Format::Xbel => "xbel",
            Format::NetscapeHtml => "netscape-html",
            Format::ChromeJson => "chrome-json",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Format::Native => "bkmk JSON - own custom format, easiest for scripting with jq(1)",
            Format::Xbel => "XML Bookmark Exchange Language 1.0",
            Format::NetscapeHtml => {
                "NETSCAPE Bookmark file 1 - supported by most browsers including Firefox and Chrome"
            }
            Format::ChromeJson => "Chrome Bookmarks JSON - used internally by Chrome",
        }
    }

    /// The codec registered for this format.
    pub fn codec(self) -> &'static dyn Codec {
        match self {
            Format::Native => &NATIVE,
            Format::Xbel => &XBEL,
            Format::NetscapeHtml => &NETSCAPE_HTML,
            Format::ChromeJson => &CHROME_JSON,
        }
    }

    /// Guess a format from a file name.
    pub fn guess(path: impl AsRef<Path>) -> Result<Format> {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        for (ext, formats) in EXTENSIONS {
            if let Some((first, others)) = formats.split_first()
                && name.ends_with(ext)
            {
                if !others.is_empty() {
                    let others: Vec<_> = others.iter().map(|f| f.name()).collect();
                    log::debug!(
                        "guessing format {} for *{ext}; possible others are: {}",
                        first.name(),
                        others.join(", ")
                    );
                }
                return Ok(*first);
            }
        }
        Err(Error::validation(format!(
            "could not guess format of {}",
            path.as_ref().display()
        )))
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::validation(format!("not a valid format: {s}")))
    }
}
