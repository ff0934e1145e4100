//! The shell's main loop.
//!
//! Everything to do with the session happens on this one task: commands typed by the user,
//! messages from the assembler worker and notifications out to the console are taken one at a
//! time so nothing else ever touches the session while it's being changed.

use tokio::io::stdin;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec};

use beebide_core::notifier::{self, Notification, Notifier};
use beebide_core::project::Project;
use beebide_core::session::Session;
use beebide_core::Result;

use futures::StreamExt;

use crate::console::{self, Flow};
use crate::worker::Worker;

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_notification(session: &Session, msg: &Notification) {
    let log_level = session.get_config("LogLevel").unwrap_or(4);
    print_lines(console::render(session, msg, log_level));
}

/// Whether the main loop has anything left to wait for
fn keep_running(input_open: bool, session: &Session) -> bool {
    input_open || session.is_building()
}

/// Handle a line typed by the user, returns false when it's time to leave
fn handle_line(session: &mut Session, line: &str) -> bool {
    match console::parse_cmd(line) {
        Ok(Some(cmd)) => match console::execute(session, cmd) {
            Flow::Continue(lines) => {
                print_lines(lines);
                true
            }
            Flow::Quit => false,
        },
        Ok(None) => true,
        Err(e) => {
            println!("Error: {}", e.get_error_string());
            println!("{}", e.get_debug_string());
            true
        }
    }
}

pub async fn run(
    project_path: Option<&str>,
    output: String,
    worker_cmd: Vec<String>,
) -> Result<()> {
    let (notifier_tx, mut notifier_rx) = notifier::channel();
    let mut notifier = Notifier::new();
    let (console_tx, mut console_rx) = mpsc::unbounded_channel();
    notifier.add_listener(console_tx);

    let (worker_tx, worker_rx) = mpsc::unbounded_channel();
    let mut worker = Worker::spawn(worker_cmd, worker_rx, notifier_tx.clone())?;

    let mut session = Session::new(worker_tx, notifier_tx, output);
    if let Some(path) = project_path {
        session.set_project(Project::from_manifest(path)?);
    }

    let mut lines = FramedRead::new(stdin(), LinesCodec::new());
    let mut input_open = true;

    // Once input runs out stay around until the outstanding build has been answered
    while keep_running(input_open, &session) {
        tokio::select! {
            line = lines.next(), if input_open => match line {
                Some(Ok(line)) => {
                    if !handle_line(&mut session, &line) {
                        break;
                    }
                }
                Some(Err(e)) => {
                    eprintln!("Can't read input: {}", e);
                    break;
                }
                None => input_open = false,
            },
            resp = worker.next_response() => match resp {
                Some(Ok(resp)) => {
                    session.handle_worker_message(resp);
                }
                Some(Err(e)) => {
                    eprintln!("Can't read from assembler worker: {}", e);
                    break;
                }
                None => {
                    eprintln!("Assembler worker exited");
                    break;
                }
            },
            Some(msg) = notifier_rx.recv() => notifier.send_msg(msg),
            Some(msg) = console_rx.recv() => print_notification(&session, &msg),
            _ = signal::ctrl_c() => break,
        }
    }

    session.end();
    worker.stop();

    while let Ok(msg) = notifier_rx.try_recv() {
        notifier.send_msg(msg);
    }
    while let Ok(msg) = console_rx.try_recv() {
        print_notification(&session, &msg);
    }

    Ok(())
}
