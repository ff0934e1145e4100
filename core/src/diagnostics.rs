//! Assembler diagnostics
//!
//! Turns the assembler's stderr into log lines, picking out the ones that point at a source
//! location so they can be navigated to.

use regex::Regex;

/// A diagnostic that points at a line of source
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub source_file: String,
    pub line_num: u64,
    pub message: String,
}

/// A line of build output, navigable if it parsed as an `ErrorRecord`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogLine {
    pub text: String,
    pub error: Option<ErrorRecord>,
}

impl LogLine {
    pub fn is_navigable(&self) -> bool {
        self.error.is_some()
    }
}

/// Parse a line of the form `<file>:<line><message>`.
///
/// The file is everything up to the first colon and the line number the run of digits straight
/// after it, what follows is the message verbatim. Anything else isn't a diagnostic.
pub fn parse_diagnostic(line: &str) -> Option<ErrorRecord> {
    lazy_static! {
        static ref RE_DIAGNOSTIC: Regex = Regex::new("^([^:]*):(\\d+)(.*)$").unwrap();
    }

    let captures = RE_DIAGNOSTIC.captures(line)?;
    let line_num = captures[2].parse::<u64>().ok()?;

    Some(ErrorRecord {
        source_file: captures[1].to_string(),
        line_num,
        message: captures[3].to_string(),
    })
}

/// Turn a line of stderr into a log line, `None` for blank lines.
pub fn log_line(line: &str) -> Option<LogLine> {
    if line.is_empty() {
        return None;
    }

    Some(LogLine {
        text: line.to_string(),
        error: parse_diagnostic(line),
    })
}

#[cfg(test)]
mod tests {
    use super::{log_line, parse_diagnostic, ErrorRecord};

    #[test]
    fn check_diagnostic_parsed() {
        assert_eq!(
            parse_diagnostic("main.asm:42 undefined symbol FOO"),
            Some(ErrorRecord {
                source_file: "main.asm".to_string(),
                line_num: 42,
                message: " undefined symbol FOO".to_string(),
            })
        );
    }

    #[test]
    fn check_message_keeps_following_colons() {
        let record = parse_diagnostic("lib/sprites.asm:7: error: Branch out of range").unwrap();
        assert_eq!(record.source_file, "lib/sprites.asm");
        assert_eq!(record.line_num, 7);
        assert_eq!(record.message, ": error: Branch out of range");
    }

    #[test]
    fn check_non_diagnostic_lines() {
        assert_eq!(parse_diagnostic("assembly failed"), None);
        assert_eq!(parse_diagnostic("Error: something went wrong"), None);
        assert_eq!(parse_diagnostic("main.asm: no line"), None);
    }

    #[test]
    fn check_huge_line_number_is_not_a_diagnostic() {
        assert_eq!(
            parse_diagnostic("main.asm:999999999999999999999999 overflow"),
            None
        );
    }

    #[test]
    fn check_log_lines() {
        assert_eq!(log_line(""), None);

        let plain = log_line("assembly failed").unwrap();
        assert_eq!(plain.text, "assembly failed");
        assert!(!plain.is_navigable());

        let navigable = log_line("main.asm:3 bad").unwrap();
        assert_eq!(navigable.text, "main.asm:3 bad");
        assert_eq!(navigable.error.unwrap().line_num, 3);
    }
}
