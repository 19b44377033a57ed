//! Command-line front end for the forced-command binary.
//!
//! sshd runs `rsynk` as the forced command for a key; the client's requested
//! command arrives in `SSH_ORIGINAL_COMMAND` and the channel is on stdio.

use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command, value_parser};
use logging::{LogConfig, init_tracing};
use rsynk_embedding::{
    CommandFactory, ExitCode, FileBoundaries, RsynkFile, ServerConfig, TrackedFiles, run_exec,
};

/// One `--track` value: `[NAME=]PATH[=OFFSET:LENGTH]`.
#[derive(Clone, Debug, Eq, PartialEq)]
struct TrackSpec {
    name: String,
    path: PathBuf,
    boundaries: Option<FileBoundaries>,
}

impl TrackSpec {
    fn into_file(self) -> RsynkFile {
        let file = RsynkFile::new(self.name, self.path);
        match self.boundaries {
            Some(boundaries) => file.with_boundaries(boundaries),
            None => file,
        }
    }
}

fn parse_range(range: &str) -> Option<FileBoundaries> {
    let (offset, length) = range.split_once(':')?;
    Some(FileBoundaries::new(offset.parse().ok()?, length.parse().ok()?))
}

fn parse_track(value: &str) -> Result<TrackSpec, String> {
    let parts: Vec<&str> = value.split('=').collect();
    let (name, path, boundaries) = match parts.as_slice() {
        [path] => (*path, *path, None),
        [first, second] => match parse_range(second) {
            Some(boundaries) => (*first, *first, Some(boundaries)),
            None => (*first, *second, None),
        },
        [name, path, range] => {
            let boundaries =
                parse_range(range).ok_or_else(|| format!("invalid range '{range}'"))?;
            (*name, *path, Some(boundaries))
        }
        _ => return Err(format!("expected [NAME=]PATH[=OFFSET:LENGTH], got '{value}'")),
    };
    if name.is_empty() || path.is_empty() {
        return Err(format!("empty name or path in '{value}'"));
    }
    Ok(TrackSpec {
        name: name.to_owned(),
        path: PathBuf::from(path),
        boundaries,
    })
}

/// Builds the `clap` command used for parsing.
fn clap_command() -> Command {
    Command::new("rsynk")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Serves tracked files to rsync clients over an SSH exec channel.")
        .arg(
            Arg::new("track")
                .long("track")
                .value_name("[NAME=]PATH[=OFFSET:LENGTH]")
                .help("Make PATH downloadable as NAME, optionally limited to a byte range.")
                .value_parser(parse_track)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("command")
                .long("command")
                .value_name("CMD")
                .env("SSH_ORIGINAL_COMMAND")
                .help("Command line requested by the client.")
                .required(true),
        )
        .arg(
            Arg::new("command-workers")
                .long("command-workers")
                .value_name("N")
                .help("Number of threads running commands.")
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity; repeat for more.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Write logs to PATH instead of standard error.")
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Parsed command line.
#[derive(Debug)]
struct Options {
    tracks: Vec<TrackSpec>,
    command: String,
    command_workers: usize,
    verbosity: u8,
    log_file: Option<PathBuf>,
}

fn parse_args<I, S>(arguments: I) -> Result<Options, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let mut matches = clap_command().try_get_matches_from(arguments)?;
    Ok(Options {
        tracks: matches
            .remove_many::<TrackSpec>("track")
            .map(|values| values.collect())
            .unwrap_or_default(),
        command: matches.remove_one::<String>("command").unwrap_or_default(),
        command_workers: matches.remove_one::<usize>("command-workers").unwrap_or(1),
        verbosity: matches.get_count("verbose"),
        log_file: matches.remove_one::<PathBuf>("log-file"),
    })
}

/// Parses `arguments`, serves the requested command over stdio and returns
/// the process exit code.
pub fn run<I, S>(arguments: I, stderr: &mut dyn Write) -> ProcessExitCode
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let options = match parse_args(arguments) {
        Ok(options) => options,
        Err(error) => {
            let _ = write!(stderr, "{}", error.render());
            return if error.use_stderr() {
                ExitCode::Syntax.into()
            } else {
                ExitCode::Ok.into()
            };
        }
    };

    let mut log_config = LogConfig::from_verbose_level(options.verbosity);
    if let Some(path) = options.log_file {
        log_config = log_config.with_log_file(path);
    }
    if let Err(error) = init_tracing(&log_config) {
        let _ = writeln!(stderr, "rsynk: {error}");
        return ExitCode::FileIo.into();
    }

    let files = Arc::new(TrackedFiles::new());
    files.add(options.tracks.into_iter().map(TrackSpec::into_file));

    let config = ServerConfig::default().with_command_workers(options.command_workers);
    let factory = match CommandFactory::for_tracked_files(files, &config) {
        Ok(factory) => factory,
        Err(error) => {
            let _ = writeln!(stderr, "rsynk: cannot start command workers: {error}");
            return ExitCode::SocketIo.into();
        }
    };

    run_exec(
        &factory,
        &options.command,
        io::stdin(),
        BufWriter::new(io::stdout()),
        io::stderr(),
    )
    .into()
}
