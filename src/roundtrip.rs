//! Round-trip equivalence checking.
//!
//! A conversion is sound when encoding a tree, decoding it, encoding the
//! result and decoding again loses nothing beyond what the target format
//! documents as lossy, and when both encodings are byte-identical. "Lossy"
//! is defined per codec by [`Codec::acceptable_difference`], its root sort
//! key and its cull-special filter.

use std::fmt;

use crate::bookmarks::Bookmarks;
use crate::codec::{Codec, WriteConfig};
use crate::error::Result;
use crate::format::Format;
use crate::model::{DiffRules, Difference, FieldDiff, Folder, Node, structural_diff};
use crate::normalize::{NormalizeConfig, Options};

/// Fixed fill value, so repeated runs produce identical bytes.
pub const CHECK_TIMESTAMP: i64 = 1_700_000_000_000_000;

/// [`DiffRules`] of one format under one write configuration.
pub struct FormatRules<'a> {
    codec: &'a dyn Codec,
    write: WriteConfig,
}

impl<'a> FormatRules<'a> {
    pub fn new(format: Format, write: WriteConfig) -> Self {
        FormatRules {
            codec: format.codec(),
            write,
        }
    }
}

impl DiffRules for FormatRules<'_> {
    fn accept(&self, diff: &FieldDiff<'_>) -> bool {
        self.codec.acceptable_difference(diff, self.write.cull_attr)
    }

    fn keep_child(&self, node: &Node) -> bool {
        self.codec.keeps_child(&self.write, node)
    }

    fn root_sort_key(&self, node: &Node) -> Option<u8> {
        self.codec.root_sort_key(node)
    }
}

/// Outcome of one [`check`].
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub format: Format,
    pub options: Options,
    /// Original tree against its first decode.
    pub first: Vec<Difference>,
    /// First decode against the second.
    pub second: Vec<Difference>,
    /// Whether both encodings were byte-identical.
    pub bytes_equal: bool,
}

impl RoundTripReport {
    pub fn passed(&self) -> bool {
        self.first.is_empty() && self.second.is_empty() && self.bytes_equal
    }
}

impl fmt::Display for RoundTripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = &self.options.normalize;
        let w = &self.options.write;
        write!(
            f,
            "{} fill_special={} fill_ids={} fill_timestamps={} cull_special={} cull_attr={}",
            self.format, n.fill_special, n.fill_ids, n.fill_timestamps, w.cull_special, w.cull_attr
        )?;
        for diff in &self.first {
            write!(f, "\n  first: {diff}")?;
        }
        for diff in &self.second {
            write!(f, "\n  second: {diff}")?;
        }
        if !self.bytes_equal {
            write!(f, "\n  encodings differ")?;
        }
        Ok(())
    }
}

/// Encode `tree` to `format` twice over, decoding with `options` in between.
pub fn check(tree: &Folder, format: Format, options: &Options) -> Result<RoundTripReport> {
    let codec = format.codec();
    let rules = FormatRules::new(format, options.write);

    let mut first_bytes = Vec::new();
    codec.encode(tree, &mut first_bytes, &options.write)?;
    let first = Bookmarks::from_bytes(&first_bytes, format, &options.normalize)?;

    let mut second_bytes = Vec::new();
    codec.encode(&first.root, &mut second_bytes, &options.write)?;
    let second = Bookmarks::from_bytes(&second_bytes, format, &options.normalize)?;

    let report = RoundTripReport {
        format,
        options: options.clone(),
        first: structural_diff(tree, &first.root, &rules),
        second: structural_diff(&first.root, &second.root, &rules),
        bytes_equal: first_bytes == second_bytes,
    };
    log::debug!("round trip {}: {}", format, if report.passed() { "ok" } else { "failed" });
    Ok(report)
}

/// All 32 combinations of the five boolean flags, unstable ones included.
///
/// Timestamps are pinned to [`CHECK_TIMESTAMP`]; filter with
/// [`Options::is_stable`] for the combinations expected to pass.
pub fn flag_combinations() -> Vec<Options> {
    (0u8..32)
        .map(|bits| {
            let bit = |n: u8| bits & (1 << n) != 0;
            let mut normalize = NormalizeConfig::new()
                .with_fill_special(bit(0))
                .with_fill_ids(bit(1))
                .with_fill_timestamps(bit(2));
            normalize.timestamp = Some(CHECK_TIMESTAMP);
            let write = WriteConfig::new().with_cull_special(bit(3)).with_cull_attr(bit(4));
            Options::new(normalize, write)
        })
        .collect()
}

/// Check a source document against every format under every stable flag
/// combination. Each tree is read from `data` with the same read-side
/// options the round trip uses.
pub fn check_source(data: &[u8], source: Format) -> Result<Vec<RoundTripReport>> {
    let mut reports = Vec::new();
    for options in flag_combinations().into_iter().filter(Options::is_stable) {
        let tree = Bookmarks::from_bytes(data, source, &options.normalize)?;
        for format in Format::ALL {
            reports.push(check(&tree.root, format, &options)?);
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bookmark, Separator, SpecialFolder};

    fn sample() -> Folder {
        let mut mark = Bookmark::new("Rust", "https://www.rust-lang.org/").with_id("11");
        mark.date_added = Some(1_600_000_000_123_456);
        mark.icon = "data:image/png;base64,AA==".into();
        mark.url_date_modified = Some(1_600_000_001_000_000);
        let toolbar = Folder::special(SpecialFolder::Toolbar)
            .with_id("2")
            .with_child(mark)
            .with_child(Separator {
                id: "12".into(),
                date_added: Some(1_600_000_002_000_000),
            });
        let tabs = Folder::special(SpecialFolder::SavedTabs)
            .with_child(Bookmark::new("tab", "http://tab"));
        Folder::new("Bookmarks")
            .with_id("1")
            .with_child(tabs)
            .with_child(toolbar)
            .with_child(Folder::new("empty"))
    }

    #[test]
    fn test_flag_combinations() {
        let all = flag_combinations();
        assert_eq!(all.len(), 32);
        assert_eq!(all.iter().filter(|o| o.is_stable()).count(), 15);
    }

    #[test]
    fn test_every_format_passes_plain_round_trip() {
        for format in Format::ALL {
            let report = check(&sample(), format, &Options::default()).unwrap();
            assert!(report.passed(), "{report}");
        }
    }

    #[test]
    fn test_every_stable_combination_passes() {
        for options in flag_combinations().into_iter().filter(Options::is_stable) {
            let mut tree = sample();
            crate::normalize::normalize(&mut tree, &options.normalize).unwrap();
            for format in Format::ALL {
                let report = check(&tree, format, &options).unwrap();
                assert!(report.passed(), "{report}");
            }
        }
    }

    #[test]
    fn test_lossy_field_is_reported_under_strict_comparison() {
        let tree = sample();
        let bytes = Bookmarks::from_root(tree.clone())
            .to_bytes(Format::ChromeJson, &WriteConfig::default())
            .unwrap();
        let back = Bookmarks::from_bytes(&bytes, Format::ChromeJson, &NormalizeConfig::default()).unwrap();

        let strict = structural_diff(&tree, &back.root, &crate::model::Strict);
        assert!(!strict.is_empty());
        let lenient = structural_diff(&tree, &back.root, &FormatRules::new(Format::ChromeJson, WriteConfig::default()));
        assert!(lenient.is_empty(), "{lenient:?}");
    }

    #[test]
    fn test_report_display_lists_differences() {
        let report = RoundTripReport {
            format: Format::Xbel,
            options: Options::default(),
            first: Vec::new(),
            second: Vec::new(),
            bytes_equal: false,
        };
        assert!(!report.passed());
        assert!(report.to_string().ends_with("encodings differ"));
    }
}
