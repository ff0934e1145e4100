//! Assembler worker protocol
//!
//! Messages exchanged with the long lived assembler worker. Requests go out as either a build of
//! the whole project or a single breakpoint to resolve, and the worker answers asynchronously
//! with either a single resolved breakpoint or the result of a build.
//!
//! Examples of each as JSON:
//!
//! ```text
//! -> {"action":"bp","bp":{"addr":-1,"fileId":"main.asm","lineNum":10,"col":0}}
//! -> {"id":3,"project":{...},"breakpoints":[...],"output":"output.ssd"}
//! <- {"action":"bp","bp":{"addr":8192,"fileId":"main.asm","lineNum":10,"col":0}}
//! <- {"stderr":["main.asm:4: No such label"],"status":1}
//! <- {"stderr":[],"status":0,"breakpoints":[...],"output":"output.ssd","image":[...]}
//! ```

use crate::breakpoint::Breakpoint;
use crate::notifier::NotifierTx;
use crate::project::Project;
use crate::util;

use tokio::sync::mpsc::UnboundedSender;

/// Sending half of the queue of requests to the assembler worker
pub type WorkerTx = UnboundedSender<WorkerRequest>;

/// The `action` tag of a single breakpoint message
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BpAction {
    #[serde(rename = "bp")]
    Bp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub project: Project,
    pub breakpoints: Vec<Breakpoint>,
    pub output: String,
}

/// Anything sent to the assembler worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerRequest {
    Breakpoint { action: BpAction, bp: Breakpoint },
    Build(BuildRequest),
}

impl WorkerRequest {
    /// Ask the worker to resolve a newly added breakpoint
    pub fn breakpoint(bp: Breakpoint) -> Self {
        WorkerRequest::Breakpoint {
            action: BpAction::Bp,
            bp,
        }
    }

    pub fn build(id: u64, project: Project, breakpoints: Vec<Breakpoint>, output: String) -> Self {
        WorkerRequest::Build(BuildRequest {
            id: Some(id),
            project,
            breakpoints,
            output,
        })
    }
}

/// The outcome of a build as reported by the worker.
///
/// Anything the worker sends beyond the fields the session needs, like the disk image itself,
/// is kept in `payload` and handed on untouched to whoever boots the artifact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub stderr: Vec<String>,
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<Breakpoint>>,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl BuildResult {
    pub fn succeeded(&self) -> bool {
        self.status == 0
    }
}

/// Queue a request for the assembler worker without waiting on it
///
/// If the worker has gone away the request is dropped and an error logged.
pub fn post(worker_tx: &WorkerTx, notifier_tx: &NotifierTx, req: WorkerRequest) {
    if let Err(e) = worker_tx.send(req) {
        let kind = match e.0 {
            WorkerRequest::Breakpoint { .. } => "breakpoint",
            WorkerRequest::Build(_) => "build",
        };
        util::send_error_and_debug(
            notifier_tx,
            "Assembler worker isn't running",
            &format!("Can't send {} request to assembler worker: channel closed", kind),
        );
    }
}

/// Anything received from the assembler worker
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerResponse {
    BreakpointResolved { action: BpAction, bp: Breakpoint },
    BuildResult(BuildResult),
}

#[cfg(test)]
mod tests {
    use super::{BuildResult, WorkerRequest, WorkerResponse};
    use crate::breakpoint::Breakpoint;
    use crate::project::Project;

    #[test]
    fn check_breakpoint_request_is_tagged() {
        let req = WorkerRequest::breakpoint(Breakpoint::at_address(0x1900));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "action":"bp",
                "bp":{"addr":6400,"fileId":null,"lineNum":-1,"col":-1}
            })
        );
    }

    #[test]
    fn check_build_request_shape() {
        let req = WorkerRequest::build(
            7,
            Project::new("quake".to_string(), "quake.asm".to_string(), vec![]),
            vec![],
            "output.ssd".to_string(),
        );
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "id":7,
                "project":{"name":"quake","main":"quake.asm","files":[]},
                "breakpoints":[],
                "output":"output.ssd"
            })
        );
    }

    #[test]
    fn check_resolution_response() {
        let resp: WorkerResponse = serde_json::from_value(serde_json::json!({
            "action":"bp",
            "bp":{"addr":8192,"fileId":"a.asm","lineNum":10,"col":0}
        }))
        .unwrap();

        match resp {
            WorkerResponse::BreakpointResolved { bp, .. } => {
                assert_eq!(bp.address(), Some(0x2000));
                assert_eq!(bp.file_id(), Some("a.asm"));
            }
            _ => panic!("Expected a resolution, got {:?}", resp),
        }
    }

    #[test]
    fn check_failed_build_response() {
        let resp: WorkerResponse = serde_json::from_value(serde_json::json!({
            "stderr":["a.asm:3: Unknown opcode"],
            "status":1
        }))
        .unwrap();

        match resp {
            WorkerResponse::BuildResult(result) => {
                assert!(!result.succeeded());
                assert_eq!(result.id, None);
                assert_eq!(result.stderr.len(), 1);
                assert_eq!(result.breakpoints, None);
                assert!(result.payload.is_empty());
            }
            _ => panic!("Expected a build result, got {:?}", resp),
        }
    }

    #[test]
    fn check_successful_build_keeps_extra_payload() {
        let resp: WorkerResponse = serde_json::from_value(serde_json::json!({
            "id":2,
            "stderr":[],
            "status":0,
            "breakpoints":[{"addr":8192,"fileId":"a.asm","lineNum":10,"col":0}],
            "output":"output.ssd",
            "image":[1,2,3]
        }))
        .unwrap();

        let result = match resp {
            WorkerResponse::BuildResult(result) => result,
            _ => panic!("Expected a build result, got {:?}", resp),
        };

        assert!(result.succeeded());
        assert_eq!(result.id, Some(2));
        assert_eq!(result.breakpoints.as_ref().unwrap().len(), 1);
        assert_eq!(result.payload["output"], serde_json::json!("output.ssd"));

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["image"], serde_json::json!([1, 2, 3]));
        assert_eq!(value["status"], serde_json::json!(0));
    }

    #[test]
    fn check_unknown_message_is_rejected() {
        let resp: Result<WorkerResponse, _> =
            serde_json::from_value(serde_json::json!({"hello":"there"}));
        assert!(resp.is_err());
    }

    #[test]
    fn check_post_to_stopped_worker_is_logged() {
        let (worker_tx, worker_rx) = tokio::sync::mpsc::unbounded_channel();
        let (notifier_tx, mut notifier_rx) = crate::notifier::channel();
        drop(worker_rx);

        super::post(
            &worker_tx,
            &notifier_tx,
            WorkerRequest::breakpoint(Breakpoint::at_address(1)),
        );

        let msg = notifier_rx.try_recv().unwrap();
        assert_eq!(msg.args()[1], serde_json::json!("Assembler worker isn't running"));
    }

    #[test]
    fn check_default_build_result_is_success() {
        assert!(BuildResult::default().succeeded());
    }
}
