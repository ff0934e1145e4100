//! Errors
//!
//! Errors that can happen around the edges of a session: loading projects, parsing shell
//! requests and talking to the assembler worker. Assembler diagnostics are not errors, they're
//! reported as data by the build orchestrator.

use std::error;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShellErrorKind {
    RequestSyntaxError,
    ProjectError,
    WorkerSpawnError,
}

#[derive(Clone, Debug)]
pub struct ShellError {
    kind: ShellErrorKind,
    error_string: String,
    debug_string: String,
}

impl ShellError {
    pub fn new(kind: ShellErrorKind, error_string: String, debug_string: String) -> Self {
        ShellError {
            kind,
            error_string,
            debug_string,
        }
    }

    pub fn kind(&self) -> &ShellErrorKind {
        &self.kind
    }

    pub fn get_error_string(&self) -> &str {
        &self.error_string
    }

    pub fn get_debug_string(&self) -> &str {
        &self.debug_string
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.error_string)
    }
}

impl error::Error for ShellError {}
