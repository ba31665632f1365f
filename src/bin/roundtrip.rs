use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use bkmk::Format;
use bkmk::roundtrip::{RoundTripReport, check_source};

fn main() -> ExitCode {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: bkmk-roundtrip FILE...");
        return ExitCode::from(2);
    }

    let mut failed = 0;
    for path in &paths {
        match run(Path::new(path)) {
            Ok(reports) => {
                for report in reports.iter().filter(|r| !r.passed()) {
                    println!("FAILED: {path}: {report}");
                }
                if reports.iter().any(|r| !r.passed()) {
                    failed += 1;
                }
            }
            Err(e) => {
                println!("FAILED: {path}: {e}");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        println!("\n{failed}/{} files failed", paths.len());
        ExitCode::FAILURE
    } else {
        println!("\nAll tests passed!");
        ExitCode::SUCCESS
    }
}

fn run(path: &Path) -> bkmk::Result<Vec<RoundTripReport>> {
    let start = Instant::now();
    let format = Format::guess(path)?;
    let data = std::fs::read(path)?;
    let reports = check_source(&data, format)?;
    let passed = reports.iter().filter(|r| r.passed()).count();
    let status = if passed == reports.len() { "PASSED" } else { "CHECKED" };
    println!(
        "{status}: {}: {passed}/{} checks as {format} ({:?})",
        path.display(),
        reports.len(),
        start.elapsed()
    );
    Ok(reports)
}
