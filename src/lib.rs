//! # bkmk
//!
//! Convert bookmark collections between formats without silently losing
//! data on a read-convert-write-reread cycle.
//!
//! ## Features
//!
//! - Read and write native `bkmk-json`, XBEL 1.0, Netscape bookmark HTML and
//!   Chrome's `Bookmarks` JSON
//! - Normalize on read: synthesize special folders, assign ids, fill
//!   timestamps, namespace ids
//! - Cull on write: drop placeholders and attributes the target cannot place
//! - Check that a conversion round-trips, per format, under every flag
//!   combination
//!
//! ## Quick Start
//!
//! ```no_run
//! use bkmk::{Bookmarks, Format, NormalizeConfig, WriteConfig};
//!
//! let bookmarks = Bookmarks::open("bookmarks.html", Format::NetscapeHtml, &NormalizeConfig::default())?;
//! bookmarks.save("bookmarks.xbel", Format::Xbel, &WriteConfig::default())?;
//! # Ok::<(), bkmk::Error>(())
//! ```
//!
//! ## Working with Trees
//!
//! A collection is one root [`Folder`] holding [`Node`]s:
//!
//! ```
//! use bkmk::{Bookmark, Bookmarks, Folder, Format, SpecialFolder, WriteConfig};
//!
//! let root = Folder::new("Bookmarks")
//!     .with_child(Folder::special(SpecialFolder::Toolbar).with_child(Bookmark::new("Rust", "https://www.rust-lang.org/")));
//! let json = Bookmarks::from_root(root).to_bytes(Format::Native, &WriteConfig::default())?;
//! # Ok::<(), bkmk::Error>(())
//! ```

pub mod bookmarks;
pub mod codec;
pub mod error;
pub mod format;
pub mod model;
pub mod normalize;
pub mod roundtrip;
pub(crate) mod util;

pub use bookmarks::Bookmarks;
pub use codec::{Codec, WriteConfig};
pub use error::{Error, Result};
pub use format::Format;
pub use model::{Bookmark, Folder, Node, NodeKind, Separator, SpecialFolder};
pub use normalize::{NormalizeConfig, Options};
