//! Build orchestrator
//!
//! Packages up the project and the breakpoint table, hands them to the assembler worker and
//! makes sense of whatever comes back. Nothing here ever fails as far as the caller is
//! concerned, assembler errors are just more data to show.

use crate::diagnostics::{self, ErrorRecord, LogLine};
use crate::notifier::{self, LogLevel, NotifierTx};
use crate::project::Project;
use crate::protocol::{self, BuildResult, WorkerRequest, WorkerResponse, WorkerTx};
use crate::registry::BreakpointRegistry;

/// What handling a message from the worker came to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResponseOutcome {
    /// A single breakpoint was resolved
    Resolved,
    /// The build succeeded and the artifact was handed on to boot
    Built,
    /// The build failed
    Failed,
    /// The result was for a build since superseded and was dropped
    Stale,
}

#[derive(Debug)]
pub struct BuildOrchestrator {
    worker_tx: WorkerTx,
    notifier_tx: NotifierTx,
    output: String,
    errors: Vec<ErrorRecord>,
    log: Vec<LogLine>,
    last_build_id: u64,
    in_flight: Option<u64>,
    ignore_stale: bool,
}

impl BuildOrchestrator {
    pub fn new(worker_tx: WorkerTx, notifier_tx: NotifierTx, output: String) -> Self {
        BuildOrchestrator {
            worker_tx,
            notifier_tx,
            output,
            errors: vec![],
            log: vec![],
            last_build_id: 0,
            in_flight: None,
            ignore_stale: true,
        }
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn log(&self) -> &[LogLine] {
        &self.log
    }

    /// Whether a build has been requested and not yet answered
    pub fn is_building(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_ignore_stale(&mut self, ignore_stale: bool) {
        self.ignore_stale = ignore_stale;
    }

    /// Start a build of the project, returns the id the request was tagged with.
    ///
    /// Returns as soon as the request is queued, the result turns up later through
    /// `handle_response`.
    pub fn build_and_boot(&mut self, registry: &mut BreakpointRegistry, project: &Project) -> u64 {
        self.errors.clear();
        self.log.clear();
        notifier::errors_changed(&self.notifier_tx);

        registry.invalidate_source_breakpoints();

        self.last_build_id += 1;
        let id = self.last_build_id;
        if let Some(previous) = self.in_flight.replace(id) {
            notifier::log_msg(
                &self.notifier_tx,
                LogLevel::DEBUG,
                &format!("Build {} superseded by build {}", previous, id),
            );
        }

        protocol::post(
            &self.worker_tx,
            &self.notifier_tx,
            WorkerRequest::build(
                id,
                project.clone(),
                registry.breakpoints().to_vec(),
                self.output.clone(),
            ),
        );
        notifier::log_msg(
            &self.notifier_tx,
            LogLevel::INFO,
            &format!("Building {} as {}", project.name, self.output),
        );

        id
    }

    /// Deal with a message from the assembler worker
    pub fn handle_response(
        &mut self,
        registry: &mut BreakpointRegistry,
        response: WorkerResponse,
    ) -> ResponseOutcome {
        match response {
            WorkerResponse::BreakpointResolved { bp, .. } => {
                registry.apply_resolution(&bp);
                ResponseOutcome::Resolved
            }
            WorkerResponse::BuildResult(result) => self.handle_build_result(registry, result),
        }
    }

    fn handle_build_result(
        &mut self,
        registry: &mut BreakpointRegistry,
        result: BuildResult,
    ) -> ResponseOutcome {
        if let Some(id) = result.id {
            if self.ignore_stale && id < self.last_build_id {
                notifier::log_msg(
                    &self.notifier_tx,
                    LogLevel::WARN,
                    &format!(
                        "Ignoring result of build {}, build {} is more recent",
                        id, self.last_build_id
                    ),
                );
                return ResponseOutcome::Stale;
            }
        }
        // An older result applied anyway leaves the newer build outstanding
        if result.id.is_none() || result.id == self.in_flight {
            self.in_flight = None;
        }

        let mut diagnostics_produced = false;
        for line in result.stderr.iter() {
            if let Some(log_line) = diagnostics::log_line(line) {
                if let Some(error) = &log_line.error {
                    self.errors.push(error.clone());
                }
                self.log.push(log_line);
                diagnostics_produced = true;
            }
        }
        if diagnostics_produced {
            notifier::errors_changed(&self.notifier_tx);
        }

        if !result.succeeded() {
            notifier::log_msg(
                &self.notifier_tx,
                LogLevel::INFO,
                &format!(
                    "Build failed with status {} and {} errors",
                    result.status,
                    self.errors.len()
                ),
            );
            return ResponseOutcome::Failed;
        }

        match &result.breakpoints {
            Some(breakpoints) => registry.replace_all(breakpoints.clone()),
            None => notifier::log_msg(
                &self.notifier_tx,
                LogLevel::WARN,
                "Build succeeded without a breakpoint table, keeping existing breakpoints",
            ),
        }

        match serde_json::to_value(&result) {
            Ok(payload) => notifier::start(&self.notifier_tx, payload),
            Err(e) => notifier::log_msg(
                &self.notifier_tx,
                LogLevel::ERROR,
                &format!("Can't hand on build result to boot: {}", e),
            ),
        }

        ResponseOutcome::Built
    }

    /// Forget everything about the current and past builds
    pub fn reset(&mut self) {
        self.errors.clear();
        self.log.clear();
        self.in_flight = None;
        notifier::errors_changed(&self.notifier_tx);
    }
}
