//! Session
//!
//! Everything that lives for as long as the user has the shell open: the breakpoint registry,
//! the build orchestrator, the loaded project and config. A session is only ever driven from one
//! task, requests from the user and messages from the assembler worker are handled one after
//! the other.

use crate::breakpoint::Breakpoint;
use crate::build::{BuildOrchestrator, ResponseOutcome};
use crate::config::Config;
use crate::diagnostics::{ErrorRecord, LogLine};
use crate::error::{ShellError, ShellErrorKind};
use crate::notifier::{self, LogLevel, NotifierTx};
use crate::project::Project;
use crate::protocol::{WorkerResponse, WorkerTx};
use crate::registry::BreakpointRegistry;
use crate::Result;

#[derive(Debug)]
pub struct Session<'a> {
    registry: BreakpointRegistry,
    orchestrator: BuildOrchestrator,
    project: Option<Project>,
    config: Config<'a>,
    notifier_tx: NotifierTx,
}

impl<'a> Session<'a> {
    pub fn new(worker_tx: WorkerTx, notifier_tx: NotifierTx, output: String) -> Self {
        let config = Config::new();
        let mut orchestrator = BuildOrchestrator::new(worker_tx.clone(), notifier_tx.clone(), output);
        orchestrator.set_ignore_stale(config.get_config("IgnoreStaleBuilds") != Some(0));

        Session {
            registry: BreakpointRegistry::new(worker_tx, notifier_tx.clone()),
            orchestrator,
            project: None,
            config,
            notifier_tx,
        }
    }

    pub fn set_project(&mut self, project: Project) {
        notifier::log_msg(
            &self.notifier_tx,
            LogLevel::INFO,
            &format!(
                "Loaded project {} with {} files",
                project.name,
                project.files.len()
            ),
        );
        self.project = Some(project);
    }

    pub fn toggle_by_source_location(
        &mut self,
        file_id: &str,
        line_num: u32,
        column: Option<u32>,
    ) -> bool {
        self.registry
            .toggle_by_source_location(file_id, line_num, column)
    }

    pub fn toggle_by_address(&mut self, address: u16) -> bool {
        self.registry.toggle_by_address(address)
    }

    /// Build the loaded project and boot it if the build succeeds
    pub fn build_and_boot(&mut self) -> Result<u64> {
        let project = match &self.project {
            Some(project) => project,
            None => {
                return Err(ShellError::new(
                    ShellErrorKind::ProjectError,
                    "No project loaded".to_string(),
                    "Can't build without a project, load one with --project".to_string(),
                ))
            }
        };

        Ok(self.orchestrator.build_and_boot(&mut self.registry, project))
    }

    /// Handle a message from the assembler worker
    pub fn handle_worker_message(&mut self, response: WorkerResponse) -> ResponseOutcome {
        self.orchestrator
            .handle_response(&mut self.registry, response)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        self.registry.breakpoints()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        self.orchestrator.errors()
    }

    pub fn log(&self) -> &[LogLine] {
        self.orchestrator.log()
    }

    pub fn is_building(&self) -> bool {
        self.orchestrator.is_building()
    }

    pub fn get_config(&self, key: &str) -> Option<i64> {
        self.config.get_config(key)
    }

    pub fn set_config(&mut self, key: &str, value: i64) -> bool {
        if !self.config.set_config(key, value) {
            return false;
        }

        if key == "IgnoreStaleBuilds" {
            self.orchestrator.set_ignore_stale(value != 0);
        }
        true
    }

    /// Tear the session down, dropping all breakpoints, errors and any build in progress.
    pub fn end(&mut self) {
        self.registry.clear();
        self.orchestrator.reset();
        notifier::log_msg(&self.notifier_tx, LogLevel::INFO, "Session ended");
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::Session;
    use crate::breakpoint::Breakpoint;
    use crate::build::ResponseOutcome;
    use crate::error::ShellErrorKind;
    use crate::notifier::{self, Notification};
    use crate::project::{Project, SourceFile};
    use crate::protocol::{WorkerRequest, WorkerResponse};

    fn create_session<'a>() -> (
        Session<'a>,
        UnboundedReceiver<WorkerRequest>,
        UnboundedReceiver<Notification>,
    ) {
        let (worker_tx, worker_rx) = mpsc::unbounded_channel();
        let (notifier_tx, notifier_rx) = notifier::channel();
        let mut session = Session::new(worker_tx, notifier_tx, "output.ssd".to_string());
        session.set_project(Project::new(
            "quake".to_string(),
            "quake.asm".to_string(),
            vec![SourceFile {
                id: "quake.asm".to_string(),
                name: "quake.asm".to_string(),
                contents: "ORG &1900\n".to_string(),
            }],
        ));
        (session, worker_rx, notifier_rx)
    }

    fn response(value: serde_json::Value) -> WorkerResponse {
        serde_json::from_value(value).unwrap()
    }

    fn last_build_request(worker_rx: &mut UnboundedReceiver<WorkerRequest>) -> WorkerRequest {
        let mut last = None;
        while let Ok(req) = worker_rx.try_recv() {
            if let WorkerRequest::Build(_) = req {
                last = Some(req);
            }
        }
        last.unwrap()
    }

    #[test]
    fn check_build_without_project_fails() {
        let (worker_tx, _worker_rx) = mpsc::unbounded_channel();
        let (notifier_tx, _notifier_rx) = notifier::channel();
        let mut session = Session::new(worker_tx, notifier_tx, "output.ssd".to_string());

        let err = session.build_and_boot().unwrap_err();

        assert_eq!(err.kind(), &ShellErrorKind::ProjectError);
        assert!(!session.is_building());
    }

    #[test]
    fn check_full_build_cycle() {
        let (mut session, mut worker_rx, _notifier_rx) = create_session();

        assert!(session.toggle_by_source_location("quake.asm", 10, Some(0)));
        session.handle_worker_message(response(serde_json::json!({
            "action":"bp",
            "bp":{"addr":8192,"fileId":"quake.asm","lineNum":10,"col":0}
        })));
        assert_eq!(session.breakpoints()[0].address(), Some(0x2000));

        let id = session.build_and_boot().unwrap();
        assert!(session.is_building());
        match last_build_request(&mut worker_rx) {
            WorkerRequest::Build(req) => {
                assert_eq!(req.id, Some(id));
                assert_eq!(req.output, "output.ssd");
                assert_eq!(req.breakpoints[0].address(), None);
                assert_eq!(req.project.name, "quake");
            }
            other => panic!("Expected a build request, got {:?}", other),
        }

        let outcome = session.handle_worker_message(response(serde_json::json!({
            "id":id,
            "stderr":[],
            "status":0,
            "breakpoints":[{"addr":8200,"fileId":"quake.asm","lineNum":10,"col":0}]
        })));

        assert_eq!(outcome, ResponseOutcome::Built);
        assert!(!session.is_building());
        assert_eq!(
            session.breakpoints(),
            &[Breakpoint::new(
                Some(8200),
                Some("quake.asm".to_string()),
                Some(10),
                Some(0)
            )][..]
        );
    }

    #[test]
    fn check_failed_build_keeps_breakpoint_count() {
        let (mut session, _worker_rx, _notifier_rx) = create_session();
        session.toggle_by_source_location("quake.asm", 10, Some(0));
        session.toggle_by_address(0x1900);

        session.build_and_boot().unwrap();
        let outcome = session.handle_worker_message(response(serde_json::json!({
            "stderr":["quake.asm:3 No such label","quake.asm:9 Bad opcode"],
            "status":1
        })));

        assert_eq!(outcome, ResponseOutcome::Failed);
        assert_eq!(session.breakpoints().len(), 2);
        assert_eq!(session.errors().len(), 2);
        assert_eq!(session.log().len(), 2);
    }

    #[test]
    fn check_config_controls_stale_builds() {
        let (mut session, _worker_rx, _notifier_rx) = create_session();
        assert_eq!(session.get_config("IgnoreStaleBuilds"), Some(1));

        session.build_and_boot().unwrap();
        session.build_and_boot().unwrap();
        assert_eq!(
            session.handle_worker_message(response(serde_json::json!({"id":1,"status":1}))),
            ResponseOutcome::Stale
        );

        assert!(session.set_config("IgnoreStaleBuilds", 0));
        assert_eq!(
            session.handle_worker_message(response(serde_json::json!({"id":1,"status":1}))),
            ResponseOutcome::Failed
        );

        assert!(!session.set_config("NoSuchThing", 0));
    }

    #[test]
    fn check_end_clears_everything() {
        let (mut session, _worker_rx, mut notifier_rx) = create_session();
        session.toggle_by_address(0x1900);
        session.build_and_boot().unwrap();
        session.handle_worker_message(response(serde_json::json!({
            "stderr":["quake.asm:3 No such label"],
            "status":1
        })));
        session.build_and_boot().unwrap();
        while notifier_rx.try_recv().is_ok() {}

        session.end();

        assert!(session.breakpoints().is_empty());
        assert!(session.errors().is_empty());
        assert!(!session.is_building());

        let mut cmds = vec![];
        while let Ok(msg) = notifier_rx.try_recv() {
            if msg.cmd() != "log" {
                cmds.push(msg.cmd().to_string());
            }
        }
        assert_eq!(cmds, vec!["breakpointsChanged", "errorsChanged"]);
    }
}
