//! Notifier
//!
//! This module contains tools for notifying every listener about an event in the session.
//!
//! The core of the session only ever holds a `NotifierTx` and emits events into it, it never
//! knows or cares who is listening. The `Notifier` sits on the other end of that channel and
//! fans each `Notification` out to every registered listener.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub const BREAKPOINTS_CHANGED: &str = "breakpointsChanged";
pub const ERRORS_CHANGED: &str = "errorsChanged";
pub const START: &str = "start";
pub const LOG: &str = "log";

/// Sending half of the notification bus, cheap to clone and never blocks.
pub type NotifierTx = UnboundedSender<Notification>;

/// Log level to log at, clients can choose to filter messages at certain log
/// levels
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LogLevel {
    CRITICAL = 1,
    ERROR,
    WARN,
    INFO,
    DEBUG,
}

/// A notification to be sent to all listeners of an event
///
/// Takes a String as the command and a vector of JSON values as arguments. For example, a
/// `Notification` with a command `log` and arguments `[4, "Build requested"]` is an INFO level
/// log message.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    cmd: String,
    args: Vec<serde_json::Value>,
}

impl Notification {
    /// Create a notification
    pub fn new(cmd: String, args: Vec<serde_json::Value>) -> Self {
        Notification { cmd, args }
    }

    /// Return the notification cmd
    pub fn cmd(&self) -> &str {
        self.cmd.as_ref()
    }

    /// Return the notification arguments
    pub fn args(&self) -> &Vec<serde_json::Value> {
        &self.args
    }
}

/// Create the notification bus, the receiver should be drained into a `Notifier`.
pub fn channel() -> (NotifierTx, UnboundedReceiver<Notification>) {
    mpsc::unbounded_channel()
}

/// A `Listener` is a wrapper around a channel that we can send notifications to
#[derive(Debug)]
struct Listener {
    sender: UnboundedSender<Notification>,
}

/// The `Notifier` fans out notifications to every listener.
///
/// We store a vector of `Listener`s and when one is finished with we drop it
/// from the list.
#[derive(Debug, Default)]
pub struct Notifier {
    listeners: Vec<Listener>,
}

impl Notifier {
    /// Constructor for creating the Notifier object
    pub fn new() -> Notifier {
        Notifier {
            listeners: Vec::new(),
        }
    }

    /// Add a listener to the notifier
    pub fn add_listener(&mut self, sender: UnboundedSender<Notification>) {
        self.listeners.push(Listener { sender });
    }

    /// Send the message to all listeners
    ///
    /// Any listener whose receiving end has gone away is dropped.
    pub fn send_msg(&mut self, msg: Notification) {
        self.listeners
            .retain(|listener| listener.sender.send(msg.clone()).is_ok());
    }
}

fn emit(notifier_tx: &NotifierTx, msg: Notification) {
    if let Err(e) = notifier_tx.send(msg) {
        eprintln!("Notifier can't send {}: bus closed", e.0.cmd());
    }
}

/// Notify that the breakpoint table has changed
pub fn breakpoints_changed(notifier_tx: &NotifierTx) {
    emit(
        notifier_tx,
        Notification::new(BREAKPOINTS_CHANGED.to_string(), vec![]),
    );
}

/// Notify that the error list has changed
pub fn errors_changed(notifier_tx: &NotifierTx) {
    emit(notifier_tx, Notification::new(ERRORS_CHANGED.to_string(), vec![]));
}

/// Notify that a build succeeded and its artifact can be booted
pub fn start(notifier_tx: &NotifierTx, payload: serde_json::Value) {
    emit(
        notifier_tx,
        Notification::new(START.to_string(), vec![payload]),
    );
}

/// Send a log message
pub fn log_msg(notifier_tx: &NotifierTx, level: LogLevel, msg: &str) {
    emit(
        notifier_tx,
        Notification::new(
            LOG.to_string(),
            vec![serde_json::json!(level as u8), serde_json::json!(msg)],
        ),
    );
}
