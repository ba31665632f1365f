//! Normalization passes.
//!
//! Each pass walks the whole tree in place. The read side runs them in a
//! fixed order after decoding:
//!
//! 1. **Prefix ids** - namespace the ids the source file already had
//! 2. **Fill special** - synthesize missing special folders
//! 3. **Fill ids** - number every node without an id, new folders included
//! 4. **Fill timestamps** - stamp every unset timestamp field
//!
//! The write side has two culling policies instead, carried by
//! [`WriteConfig`] and applied by each codec while encoding.

mod ids;
mod special;
mod timestamps;

pub use ids::{IdRank, fill_ids, numeric_id_rank, prefix_ids};
pub use special::fill_special;
pub use timestamps::fill_timestamps;

use crate::codec::WriteConfig;
use crate::error::Result;
use crate::model::Folder;
use crate::util::time_now_micros;

/// Configuration for the read-side passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizeConfig {
    pub fill_special: bool,
    pub fill_ids: bool,
    pub fill_timestamps: bool,
    /// Value for [`fill_timestamps`]; the current time when `None`.
    pub timestamp: Option<i64>,
    /// Prepended to every existing id; empty disables the pass.
    pub prefix_ids: String,
}

impl NormalizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fill_special(mut self, fill_special: bool) -> Self {
        self.fill_special = fill_special;
        self
    }

    pub fn with_fill_ids(mut self, fill_ids: bool) -> Self {
        self.fill_ids = fill_ids;
        self
    }

    pub fn with_fill_timestamps(mut self, fill_timestamps: bool) -> Self {
        self.fill_timestamps = fill_timestamps;
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_prefix_ids(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_ids = prefix.into();
        self
    }
}

/// Run the enabled read-side passes on `root`.
pub fn normalize(root: &mut Folder, config: &NormalizeConfig) -> Result<()> {
    if !config.prefix_ids.is_empty() {
        prefix_ids(root, &config.prefix_ids);
    }
    if config.fill_special {
        fill_special(root)?;
    }
    if config.fill_ids {
        fill_ids(root);
    }
    if config.fill_timestamps {
        fill_timestamps(root, config.timestamp.unwrap_or_else(time_now_micros));
    }
    Ok(())
}

/// Read-side and write-side options of one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Options {
    pub normalize: NormalizeConfig,
    pub write: WriteConfig,
}

impl Options {
    pub fn new(normalize: NormalizeConfig, write: WriteConfig) -> Self {
        Options { normalize, write }
    }

    /// Flag combinations whose output is not stable across repeated
    /// conversions.
    pub fn conflicts(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.normalize.fill_special && !self.write.cull_special {
            out.push("cull_special=false may cause fill_special=true to write empty non-special cruft folders");
        }
        if self.write.cull_attr && self.normalize.fill_ids {
            out.push("cull_attr=true may undo some/all of the effects of fill_ids=true");
        }
        if self.write.cull_attr && self.normalize.fill_timestamps {
            out.push("cull_attr=true may undo some/all of the effects of fill_timestamps=true");
        }
        out
    }

    /// Log each conflict as a warning. Returns true if there were none.
    pub fn warn_conflicts(&self) -> bool {
        let conflicts = self.conflicts();
        for conflict in &conflicts {
            log::warn!("{conflict}");
        }
        conflicts.is_empty()
    }

    /// True when no flag combination is unstable.
    pub fn is_stable(&self) -> bool {
        self.conflicts().is_empty()
    }
}
