//! Round-trip checks over the fixture exports.

use bkmk::roundtrip::{check, check_source, flag_combinations};
use bkmk::{Bookmarks, Format, NormalizeConfig, Options};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn assert_round_trips(name: &str) {
    let path = format!("{FIXTURES_DIR}/{name}");
    let source = Format::guess(&path).unwrap();
    let data = std::fs::read(&path).unwrap();

    let reports = check_source(&data, source).unwrap();
    assert_eq!(reports.len(), 15 * Format::ALL.len());
    let failures: Vec<String> = reports
        .iter()
        .filter(|r| !r.passed())
        .map(|r| r.to_string())
        .collect();
    assert!(failures.is_empty(), "{name}:\n{}", failures.join("\n"));
}

#[test]
fn test_netscape_fixture_round_trips() {
    assert_round_trips("firefox.html");
}

#[test]
fn test_xbel_fixture_round_trips() {
    assert_round_trips("bookmarks.xbel");
}

#[test]
fn test_chrome_fixture_round_trips() {
    assert_round_trips("Bookmarks.json");
}

#[test]
fn test_native_fixture_round_trips() {
    assert_round_trips("sample.bkmk.json");
}

#[test]
fn test_unstable_combination_is_flagged() {
    let path = format!("{FIXTURES_DIR}/sample.bkmk.json");
    let data = std::fs::read(path).unwrap();

    let unstable: Vec<Options> = flag_combinations()
        .into_iter()
        .filter(|o| !o.is_stable())
        .collect();
    assert_eq!(unstable.len(), 17);

    // fill_special without cull_special leaves empty cruft folders behind
    let options = unstable
        .into_iter()
        .find(|o| o.normalize.fill_special && !o.normalize.fill_ids && !o.write.cull_attr)
        .unwrap();
    assert_eq!(options.conflicts().len(), 1);

    let tree = Bookmarks::from_bytes(&data, Format::Native, &options.normalize).unwrap();
    let report = check(&tree.root, Format::Xbel, &options).unwrap();
    // the placeholders come back as plain folders and get synthesized again
    assert!(!report.passed());
    assert!(!report.first.is_empty());
}

#[test]
fn test_reports_are_deterministic() {
    let path = format!("{FIXTURES_DIR}/firefox.html");
    let data = std::fs::read(path).unwrap();
    let config = NormalizeConfig::new()
        .with_fill_ids(true)
        .with_fill_timestamps(true)
        .with_timestamp(bkmk::roundtrip::CHECK_TIMESTAMP);

    let a = Bookmarks::from_bytes(&data, Format::NetscapeHtml, &config).unwrap();
    let b = Bookmarks::from_bytes(&data, Format::NetscapeHtml, &config).unwrap();
    assert_eq!(a, b);
}
