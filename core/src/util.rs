//! Utilities
//!
//! Various simple utilities for use in the shell

use std::env;
use std::path::{Path, PathBuf};

use crate::notifier::{log_msg, LogLevel, NotifierTx};

/// Log an error and a debug message, commonly used in the code base
pub fn send_error_and_debug(notifier_tx: &NotifierTx, err_msg: &str, debug_msg: &str) {
    log_msg(notifier_tx, LogLevel::ERROR, err_msg);
    log_msg(notifier_tx, LogLevel::DEBUG, debug_msg);
}

/// Find out the full path of a file based on the PATH environment variable.
///
/// Returns the command unchanged if it can't be found on the PATH.
pub fn get_file_full_path(cmd: &str) -> String {
    let cmd_full_path_buf = env::var_os("PATH")
        .and_then(|paths| {
            env::split_paths(&paths)
                .filter_map(|dir| {
                    let cmd_full_path = dir.join(&cmd);
                    if cmd_full_path.is_file() {
                        Some(cmd_full_path)
                    } else {
                        None
                    }
                })
                .next()
        })
        .unwrap_or_else(|| PathBuf::from(cmd));
    cmd_full_path_buf.to_string_lossy().into_owned()
}

/// Return true if the path specified exists.
pub fn file_exists(path: &str) -> bool {
    Path::new(path).exists()
}
