//! Assembler worker process
//!
//! Spawns the assembler worker and wires up its stdio: requests queued by the session are
//! written to its stdin as they arrive and responses are read back from its stdout. Anything
//! the worker writes to stderr goes straight to ours.

use std::io;
use std::process::Stdio;

use beebide_core::codec::WorkerCodec;
use beebide_core::error::{ShellError, ShellErrorKind};
use beebide_core::notifier::{log_msg, LogLevel, NotifierTx};
use beebide_core::protocol::{WorkerRequest, WorkerResponse};
use beebide_core::util::{file_exists, get_file_full_path};
use beebide_core::Result;

use futures::prelude::*;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::codec::{FramedRead, FramedWrite};

#[derive(Debug)]
pub struct Worker {
    process: Child,
    responses: FramedRead<ChildStdout, WorkerCodec>,
}

impl Worker {
    /// Check the worker command exists, finding it on the PATH if need be, and spawn it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        mut worker_cmd: Vec<String>,
        mut requests_rx: UnboundedReceiver<WorkerRequest>,
        notifier_tx: NotifierTx,
    ) -> Result<Worker> {
        if worker_cmd.is_empty() {
            return Err(ShellError::new(
                ShellErrorKind::WorkerSpawnError,
                "No assembler worker specified".to_string(),
                "Specify the assembler worker command after --".to_string(),
            ));
        }

        if !file_exists(&worker_cmd[0]) {
            worker_cmd[0] = get_file_full_path(&worker_cmd[0]);
        }
        if !file_exists(&worker_cmd[0]) {
            return Err(ShellError::new(
                ShellErrorKind::WorkerSpawnError,
                format!("Can't spawn assembler worker as {} does not exist", worker_cmd[0]),
                format!("Can't find {} directly or on the PATH", worker_cmd[0]),
            ));
        }

        let mut process = Command::new(&worker_cmd[0])
            .args(&worker_cmd[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ShellError::new(
                    ShellErrorKind::WorkerSpawnError,
                    "Failed to spawn assembler worker".to_string(),
                    format!("Failed to spawn {}: {}", worker_cmd[0], e),
                )
            })?;

        let missing_pipe = |name: &str| {
            ShellError::new(
                ShellErrorKind::WorkerSpawnError,
                "Failed to spawn assembler worker".to_string(),
                format!("Assembler worker process did not have a handle to {}", name),
            )
        };
        let stdin = process.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = process.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;

        if let Some(pid) = process.id() {
            log_msg(
                &notifier_tx,
                LogLevel::INFO,
                &format!("Assembler worker launched with pid: {}", pid),
            );
        }

        let mut requests = FramedWrite::new(stdin, WorkerCodec::new(notifier_tx.clone()));
        let writer_notifier_tx = notifier_tx.clone();
        tokio::spawn(async move {
            while let Some(req) = requests_rx.recv().await {
                if let Err(e) = requests.send(req).await {
                    log_msg(
                        &writer_notifier_tx,
                        LogLevel::ERROR,
                        &format!("Can't write to assembler worker: {}", e),
                    );
                    break;
                }
            }
        });

        Ok(Worker {
            process,
            responses: FramedRead::new(stdout, WorkerCodec::new(notifier_tx)),
        })
    }

    /// The next message from the worker, `None` once it's closed its stdout
    pub async fn next_response(&mut self) -> Option<io::Result<WorkerResponse>> {
        self.responses.next().await
    }

    pub fn stop(&mut self) {
        if let Err(e) = self.process.start_kill() {
            eprintln!("Can't stop assembler worker: {}", e);
        }
    }
}
