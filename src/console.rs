//! Console
//!
//! Reads the user's commands typed into the shell, carries them out on the session and renders
//! notifications from the session as text.
//!
//! Commands understood:
//!   build                      Build the project and boot it if it builds
//!   break <file>:<line>[:<col>] Toggle a breakpoint on a line of source
//!   break <address>            Toggle a breakpoint on an address, `$2000`, `&2000`, `0x2000`
//!                              or decimal
//!   breakpoints                List breakpoints
//!   errors                     List errors from the last build
//!   log                        Show the output of the last build
//!   config <key> [<value>]     Get or set a config item
//!   quit                       Leave the shell

use beebide_core::breakpoint::Breakpoint;
use beebide_core::error::{ShellError, ShellErrorKind};
use beebide_core::notifier::{self, Notification};
use beebide_core::session::Session;
use beebide_core::Result;

use regex::Regex;

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleCmd {
    Build,
    BreakAtSource(String, u32, Option<u32>),
    BreakAtAddress(u16),
    Breakpoints,
    Errors,
    Log,
    GetConfig(String),
    SetConfig(String, i64),
    Quit,
}

/// Whether the shell should carry on after a command
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Continue(Vec<String>),
    Quit,
}

fn syntax_error(error: &str, debug: String) -> ShellError {
    ShellError::new(ShellErrorKind::RequestSyntaxError, error.to_string(), debug)
}

/// Parse an address as `$2000`, `&2000`, `0x2000` or plain decimal
fn parse_address(s: &str) -> Option<u16> {
    let hex = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix('&'))
        .or_else(|| s.strip_prefix("0x"));

    match hex {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => s.parse::<u16>().ok(),
    }
}

fn parse_break(arg: &str) -> Result<ConsoleCmd> {
    lazy_static! {
        static ref RE_SOURCE_LOCATION: Regex =
            Regex::new("^([^:]+):(\\d+)(?::(\\d+))?$").unwrap();
    }

    if let Some(address) = parse_address(arg) {
        return Ok(ConsoleCmd::BreakAtAddress(address));
    }

    let captures = RE_SOURCE_LOCATION.captures(arg).ok_or_else(|| {
        syntax_error(
            "Can't understand breakpoint",
            format!("Can't understand breakpoint '{}', expected file:line or an address", arg),
        )
    })?;

    let line_num = captures[2].parse::<u32>().map_err(|e| {
        syntax_error(
            "Badly specified line",
            format!("Badly specified line '{}': {}", &captures[2], e),
        )
    })?;
    let column = match captures.get(3) {
        Some(col) => Some(col.as_str().parse::<u32>().map_err(|e| {
            syntax_error(
                "Badly specified column",
                format!("Badly specified column '{}': {}", col.as_str(), e),
            )
        })?),
        None => None,
    };

    Ok(ConsoleCmd::BreakAtSource(
        captures[1].to_string(),
        line_num,
        column,
    ))
}

/// Parse a line typed by the user, `None` if there's nothing there
pub fn parse_cmd(line: &str) -> Result<Option<ConsoleCmd>> {
    let words: Vec<&str> = line.split_whitespace().collect();

    let cmd = match words.as_slice() {
        [] => return Ok(None),
        ["build"] => ConsoleCmd::Build,
        ["break", arg] => parse_break(arg)?,
        ["breakpoints"] => ConsoleCmd::Breakpoints,
        ["errors"] => ConsoleCmd::Errors,
        ["log"] => ConsoleCmd::Log,
        ["config", key] => ConsoleCmd::GetConfig(key.to_string()),
        ["config", key, value] => {
            let value = value.parse::<i64>().map_err(|e| {
                syntax_error(
                    "Badly specified config value",
                    format!("Badly specified config value '{}': {}", value, e),
                )
            })?;
            ConsoleCmd::SetConfig(key.to_string(), value)
        }
        ["quit"] | ["exit"] => ConsoleCmd::Quit,
        _ => {
            return Err(syntax_error(
                "Can't understand command",
                format!("Can't understand command '{}'", line.trim()),
            ))
        }
    };

    Ok(Some(cmd))
}

pub fn format_breakpoint(bp: &Breakpoint) -> String {
    let address = match bp.address() {
        Some(address) => format!("${:04X}", address),
        None => "$????".to_string(),
    };

    match (bp.file_id(), bp.line_num(), bp.column()) {
        (Some(file_id), Some(line_num), Some(column)) => {
            format!("{} {}:{}:{}", address, file_id, line_num, column)
        }
        (Some(file_id), Some(line_num), None) => format!("{} {}:{}", address, file_id, line_num),
        _ => address,
    }
}

fn format_breakpoints(breakpoints: &[Breakpoint]) -> Vec<String> {
    if breakpoints.is_empty() {
        return vec!["No breakpoints".to_string()];
    }

    breakpoints
        .iter()
        .enumerate()
        .map(|(i, bp)| format!("{}: {}", i + 1, format_breakpoint(bp)))
        .collect()
}

fn format_errors(session: &Session) -> Vec<String> {
    session
        .errors()
        .iter()
        .map(|e| format!("{}:{}{}", e.source_file, e.line_num, e.message))
        .collect()
}

/// Navigable lines are marked so they stand out from plain output
fn format_log(session: &Session) -> Vec<String> {
    session
        .log()
        .iter()
        .map(|line| {
            if line.is_navigable() {
                format!("> {}", line.text)
            } else {
                format!("  {}", line.text)
            }
        })
        .collect()
}

/// Carry out a command on the session
pub fn execute(session: &mut Session, cmd: ConsoleCmd) -> Flow {
    let lines = match cmd {
        ConsoleCmd::Build => match session.build_and_boot() {
            Ok(id) => vec![format!("Build {} requested", id)],
            Err(e) => vec![format!("Error: {}", e)],
        },
        ConsoleCmd::BreakAtSource(file_id, line_num, column) => {
            let enabled = session.toggle_by_source_location(&file_id, line_num, column);
            let location = match column {
                Some(column) => format!("{}:{}:{}", file_id, line_num, column),
                None => format!("{}:{}", file_id, line_num),
            };
            vec![format!(
                "Breakpoint at {} {}",
                location,
                if enabled { "set" } else { "removed" }
            )]
        }
        ConsoleCmd::BreakAtAddress(address) => {
            let enabled = session.toggle_by_address(address);
            vec![format!(
                "Breakpoint at ${:04X} {}",
                address,
                if enabled { "set" } else { "removed" }
            )]
        }
        ConsoleCmd::Breakpoints => format_breakpoints(session.breakpoints()),
        ConsoleCmd::Errors => {
            let errors = format_errors(session);
            if errors.is_empty() {
                vec!["No errors".to_string()]
            } else {
                errors
            }
        }
        ConsoleCmd::Log => format_log(session),
        ConsoleCmd::GetConfig(key) => match session.get_config(&key) {
            Some(value) => vec![format!("{} = {}", key, value)],
            None => vec![format!("Error: No config item {}", key)],
        },
        ConsoleCmd::SetConfig(key, value) => {
            if session.set_config(&key, value) {
                vec![format!("{} = {}", key, value)]
            } else {
                vec![format!("Error: No config item {}", key)]
            }
        }
        ConsoleCmd::Quit => return Flow::Quit,
    };

    Flow::Continue(lines)
}

/// Render a notification from the session for the terminal
///
/// Log messages more verbose than `log_level` are dropped.
pub fn render(session: &Session, msg: &Notification, log_level: i64) -> Vec<String> {
    match msg.cmd() {
        notifier::BREAKPOINTS_CHANGED => format_breakpoints(session.breakpoints()),
        notifier::ERRORS_CHANGED => format_log(session),
        notifier::START => {
            let payload = msg.args().get(0);
            let output = payload
                .and_then(|p| p.get("output"))
                .and_then(|o| o.as_str())
                .unwrap_or("build output");
            vec![format!("Booting {}", output)]
        }
        notifier::LOG => {
            let level = msg.args().get(0).and_then(|l| l.as_i64()).unwrap_or(0);
            if level > log_level {
                return vec![];
            }
            let text = msg.args().get(1).and_then(|t| t.as_str()).unwrap_or("");
            let label = match level {
                1 => "CRITICAL",
                2 => "ERROR",
                3 => "WARN",
                4 => "INFO",
                _ => "DEBUG",
            };
            vec![format!("[{}] {}", label, text)]
        }
        _ => vec![],
    }
}
