//! The [`Bookmarks`] collection and its read/write entry points.

use std::io::{Read, Write};
use std::path::Path;

use crate::codec::WriteConfig;
use crate::error::Result;
use crate::format::Format;
use crate::model::Folder;
use crate::normalize::{self, NormalizeConfig};
use crate::util::time_now_micros;

/// A whole bookmark collection: one root folder that is never special.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks {
    pub root: Folder,
}

impl Bookmarks {
    /// An empty, unnamed collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: Folder) -> Self {
        Bookmarks { root }
    }

    /// Decode a collection and run the configured read-side passes.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bkmk::{Bookmarks, Format, NormalizeConfig};
    ///
    /// let file = std::fs::File::open("bookmarks.html")?;
    /// let config = NormalizeConfig::new().with_fill_ids(true);
    /// let bookmarks = Bookmarks::read(file, Format::NetscapeHtml, &config)?;
    /// println!("{} top-level entries", bookmarks.root.children.len());
    /// # Ok::<(), bkmk::Error>(())
    /// ```
    pub fn read<R: Read>(mut reader: R, format: Format, config: &NormalizeConfig) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data, format, config)
    }

    /// Decode a collection held in memory.
    pub fn from_bytes(data: &[u8], format: Format, config: &NormalizeConfig) -> Result<Self> {
        let root = format.codec().decode(data)?;
        log::debug!("decoded {format} document ({} bytes)", data.len());
        let mut bookmarks = Bookmarks { root };
        bookmarks.normalize(config)?;
        Ok(bookmarks)
    }

    /// Read a file from disk.
    pub fn open<P: AsRef<Path>>(path: P, format: Format, config: &NormalizeConfig) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::read(file, format, config)
    }

    /// Encode the collection, applying the configured culling.
    pub fn write<W: Write>(&self, mut writer: W, format: Format, config: &WriteConfig) -> Result<()> {
        format.codec().encode(&self.root, &mut writer, config)?;
        writer.flush()?;
        Ok(())
    }

    pub fn to_bytes(&self, format: Format, config: &WriteConfig) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        format.codec().encode(&self.root, &mut out, config)?;
        Ok(out)
    }

    /// Write the collection to a file on disk.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: Format, config: &WriteConfig) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write(std::io::BufWriter::new(file), format, config)
    }

    /// See [`normalize::fill_special`].
    pub fn fill_special(&mut self) -> Result<()> {
        normalize::fill_special(&mut self.root)
    }

    /// See [`normalize::fill_ids`].
    pub fn fill_ids(&mut self) {
        normalize::fill_ids(&mut self.root);
    }

    /// Stamp unset timestamps with `ts`, or the current time.
    pub fn fill_timestamps(&mut self, ts: Option<i64>) {
        normalize::fill_timestamps(&mut self.root, ts.unwrap_or_else(time_now_micros));
    }

    pub fn prefix_ids(&mut self, prefix: &str) {
        normalize::prefix_ids(&mut self.root, prefix);
    }

    /// Run every pass enabled in `config`, in the canonical order.
    pub fn normalize(&mut self, config: &NormalizeConfig) -> Result<()> {
        normalize::normalize(&mut self.root, config)
    }
}
