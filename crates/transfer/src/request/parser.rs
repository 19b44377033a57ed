use super::data::{ProtocolToken, RequestData};
use super::error::{ArgsParseError, ArgsParseReason};
use super::option::RsyncOption;

/// Parses the command line an rsync client runs on the remote side.
///
/// The parser is stateless; both entry points build a fresh
/// [`RequestData`] per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestParser;

impl RequestParser {
    /// Parses a full invocation whose first token is the program name.
    pub fn parse_command<S: AsRef<str>>(args: &[S]) -> Result<RequestData, ArgsParseError> {
        let Some(program) = args.first() else {
            return Err(ArgsParseError::new(ArgsParseReason::MissingRsyncCommand, args));
        };
        let program = program.as_ref();
        if program != "rsync" && !program.ends_with("/rsync") {
            return Err(ArgsParseError::new(ArgsParseReason::MissingRsyncCommand, args));
        }
        Self::parse_server_args(&args[1..]).map_err(|error| error.with_args(args))
    }

    /// Parses the arguments following the program name.
    pub fn parse_server_args<S: AsRef<str>>(args: &[S]) -> Result<RequestData, ArgsParseError> {
        let fail = |reason: ArgsParseReason| ArgsParseError::new(reason, args);
        let mut request = RequestData::default();
        let mut options_done = false;
        let mut positionals = 0usize;

        for arg in args.iter().map(AsRef::as_ref) {
            if arg.is_empty() || arg == "-" {
                continue;
            }
            if !options_done {
                if arg == "--" {
                    options_done = true;
                    continue;
                }
                if let Some(long) = arg.strip_prefix("--") {
                    parse_long(long, &mut request).map_err(fail)?;
                    continue;
                }
                if let Some(bundle) = arg.strip_prefix('-') {
                    parse_bundle(bundle, &mut request).map_err(fail)?;
                    continue;
                }
            }
            push_file(arg, positionals == 0, &mut request);
            positionals += 1;
        }

        if !request.has(RsyncOption::Server) {
            return Err(fail(ArgsParseReason::MissingServerFlag));
        }
        Ok(request)
    }
}

fn parse_long(long: &str, request: &mut RequestData) -> Result<(), ArgsParseReason> {
    let (name, value) = match long.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (long, None),
    };

    match name {
        "checksum-seed" => request.checksum_seed = Some(parse_value(name, value)?),
        "timeout" => request.timeout = Some(parse_value(name, value)?),
        "bwlimit" => {
            if value.is_none_or(str::is_empty) {
                return Err(invalid_value(name, value));
            }
        }
        _ => match RsyncOption::from_long(name) {
            Some(option) if value.is_none() => {
                request.options.insert(option);
            }
            Some(_) => return Err(invalid_value(name, value)),
            None => return Err(ArgsParseReason::UnknownLongOption(name.to_owned())),
        },
    }
    Ok(())
}

fn parse_value<T: std::str::FromStr>(
    name: &str,
    value: Option<&str>,
) -> Result<T, ArgsParseReason> {
    value
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| invalid_value(name, value))
}

fn invalid_value(name: &str, value: Option<&str>) -> ArgsParseReason {
    ArgsParseReason::InvalidValue {
        option: name.to_owned(),
        value: value.unwrap_or_default().to_owned(),
    }
}

fn parse_bundle(bundle: &str, request: &mut RequestData) -> Result<(), ArgsParseReason> {
    for (index, letter) in bundle.char_indices() {
        if letter == 'e' {
            if request.protocol_token.is_some() {
                return Err(ArgsParseReason::MalformedProtocolToken(bundle.to_owned()));
            }
            let token = parse_protocol_token(&bundle[index + 1..])
                .ok_or_else(|| ArgsParseReason::MalformedProtocolToken(bundle.to_owned()))?;
            insert_letters(&token.capabilities, request)?;
            request.protocol_token = Some(token);
            return Ok(());
        }
        insert_letters(&bundle[index..index + letter.len_utf8()], request)?;
    }
    Ok(())
}

/// Splits `<version>.<sub-version><letters>`; the dot is mandatory and
/// neither numeric part may contain another `e`.
fn parse_protocol_token(rest: &str) -> Option<ProtocolToken> {
    let (version, after_dot) = rest.split_once('.')?;
    let version = parse_digits(version)?;

    let digits_end = after_dot
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(after_dot.len());
    let (sub_version, capabilities) = after_dot.split_at(digits_end);
    if capabilities.contains('e') {
        return None;
    }

    Some(ProtocolToken {
        version,
        sub_version: parse_digits(sub_version)?,
        capabilities: capabilities.to_owned(),
    })
}

/// Empty input is `Some(None)`; non-digits or overflow are `None`.
fn parse_digits(digits: &str) -> Option<Option<u32>> {
    if digits.is_empty() {
        return Some(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(Some)
}

fn insert_letters(letters: &str, request: &mut RequestData) -> Result<(), ArgsParseReason> {
    for letter in letters.chars() {
        let option =
            RsyncOption::from_short(letter).ok_or(ArgsParseReason::UnknownShortOption(letter))?;
        request.options.insert(option);
    }
    Ok(())
}

/// The first positional names the transfer root: `.` alone is dropped and a
/// leading `./` or `.` is stripped. Later positionals are kept verbatim.
fn push_file(arg: &str, first: bool, request: &mut RequestData) {
    if !first {
        request.files.push(arg.to_owned());
        return;
    }
    if arg == "." {
        return;
    }
    let root = arg
        .strip_prefix("./")
        .or_else(|| arg.strip_prefix('.'))
        .unwrap_or(arg);
    request.files.push(root.to_owned());
}
