//! bkmk - Convert between bookmark formats

use std::io;
use std::process::ExitCode;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use bkmk::{Bookmarks, Error, Format, NormalizeConfig, Options, WriteConfig};

#[derive(Parser)]
#[command(name = "bkmk")]
#[command(version, about = "Convert between different bookmark formats", long_about = None)]
#[command(after_help = "EXAMPLES:
    bkmk bookmarks.html bookmarks.xbel            Convert Netscape HTML to XBEL
    bkmk -f chrome-json -t bkmk-json < Bookmarks  Convert stdin to stdout
    bkmk --fill-ids --fill-special --cull-special in.xbel out.html")]
struct Cli {
    /// Input path; omit or '-' for stdin
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Output path; omit or '-' for stdout
    #[arg(value_name = "OUTPUT")]
    output: Option<String>,

    /// Input format; omit to guess from the input path
    #[arg(short = 'f', long = "from", value_name = "FMT")]
    from: Option<Format>,

    /// Output format; omit to guess from the output path
    #[arg(short = 't', long = "to", value_name = "FMT")]
    to: Option<Format>,

    /// Fill in missing special folders after reading, so every special folder exists
    #[arg(long)]
    fill_special: bool,

    /// Fill in missing ids after reading, so every element has an id
    #[arg(long)]
    fill_ids: bool,

    /// Fill in missing timestamps after reading, so every element has all timestamps
    #[arg(long)]
    fill_timestamps: bool,

    /// Add a prefix to all existing ids after reading, useful when combining several sources
    #[arg(long, value_name = "PREFIX", default_value = "")]
    prefix_ids: String,

    /// Cull empty special folders that are not recognised by the output format
    #[arg(long)]
    cull_special: bool,

    /// Cull attributes the output format supports, but not on the element being written
    #[arg(long)]
    cull_attr: bool,

    /// List the supported formats and exit
    #[arg(long)]
    list_formats: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report debug notes as well as warnings
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> Options {
        let normalize = NormalizeConfig::new()
            .with_fill_special(self.fill_special)
            .with_fill_ids(self.fill_ids)
            .with_fill_timestamps(self.fill_timestamps)
            .with_prefix_ids(self.prefix_ids.clone());
        let write = WriteConfig::new()
            .with_cull_special(self.cull_special)
            .with_cull_attr(self.cull_attr);
        Options::new(normalize, write)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        LevelFilter::Error
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    if cli.list_formats {
        for format in Format::ALL {
            println!("{:<14} {}", format.name(), format.description());
        }
        return ExitCode::SUCCESS;
    }

    match convert(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn convert(cli: &Cli) -> bkmk::Result<()> {
    let input = file_path(cli.input.as_deref());
    let output = file_path(cli.output.as_deref());
    let from = resolve_format(input, cli.from, "-f", "stdin")?;
    let to = resolve_format(output, cli.to, "-t", "stdout")?;

    let options = cli.options();
    options.warn_conflicts();

    let bookmarks = match input {
        Some(path) => Bookmarks::open(path, from, &options.normalize)?,
        None => Bookmarks::read(io::stdin().lock(), from, &options.normalize)?,
    };
    match output {
        Some(path) => bookmarks.save(path, to, &options.write),
        None => bookmarks.write(io::stdout().lock(), to, &options.write),
    }
}

/// A real path, or `None` for stdio.
fn file_path(arg: Option<&str>) -> Option<&str> {
    arg.filter(|p| *p != "-")
}

fn resolve_format(path: Option<&str>, explicit: Option<Format>, flag: &str, stdname: &str) -> bkmk::Result<Format> {
    match (explicit, path) {
        (Some(format), _) => Ok(format),
        (None, Some(path)) => Format::guess(path),
        (None, None) => Err(Error::Validation(format!(
            "must give explicit {flag} when using {stdname}"
        ))),
    }
}

/// Writes log records to stderr as `bkmk: <level>: <message>`.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        };
        eprintln!("bkmk: {level}: {}", record.args());
    }

    fn flush(&self) {}
}
