//! Command-line parsing for the `employee-events` binary.

use std::path::PathBuf;

use thiserror::Error;

use crate::db::SubjectKind;

pub const USAGE: &str = "usage: employee-events [--config PATH] <command>

commands:
  list <employee|team>          print subjects as JSON
  report <employee|team> <id>   print one subject's dashboard data as JSON
  check                         report tables missing from the store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(SubjectKind),
    Report(SubjectKind, i64),
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("unknown subject kind {0:?}, expected employee or team")]
    UnknownSubject(String),

    #[error("invalid id {0:?}, expected an integer")]
    InvalidId(String),
}

/// Parse arguments, excluding the program name.
pub fn parse_args<I, S>(args: I) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config = None;
    let mut positional = Vec::new();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().ok_or(UsageError::MissingArgument("--config PATH"))?;
            config = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config = Some(PathBuf::from(path));
        } else {
            positional.push(arg);
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None => return Err(UsageError::MissingCommand),
        Some("list") => Command::List(subject(positional.next())?),
        Some("report") => {
            let kind = subject(positional.next())?;
            let raw = positional.next().ok_or(UsageError::MissingArgument("id"))?;
            let id = raw.trim().parse::<i64>().map_err(|_| UsageError::InvalidId(raw))?;
            Command::Report(kind, id)
        }
        Some("check") => Command::Check,
        Some(other) => return Err(UsageError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = positional.next() {
        return Err(UsageError::UnexpectedArgument(extra));
    }
    Ok(Invocation { config, command })
}

fn subject(arg: Option<String>) -> Result<SubjectKind, UsageError> {
    let raw = arg.ok_or(UsageError::MissingArgument("employee|team"))?;
    SubjectKind::parse(&raw).ok_or(UsageError::UnknownSubject(raw))
}
