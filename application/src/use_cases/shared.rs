//! Shared utilities for use cases.
//!
//! Status reporting used by the controller, the plan generator and the
//! step loop, plus the scripted test doubles their tests share.

use crate::ports::agent_progress::AgentProgressNotifier;
use crate::ports::event_logger::{AgentEvent, AgentEventLogger};
use muse_domain::{AgentTaskState, ResultId};
use serde_json::json;
use tracing::debug;

/// Announce a task state change to the progress port and the event log.
pub(crate) fn report_status(
    progress: &dyn AgentProgressNotifier,
    logger: &dyn AgentEventLogger,
    id: &ResultId,
    state: &AgentTaskState,
    plan_len: usize,
) {
    let line = state.status_line(plan_len);
    debug!("[{}] {}", id, line);
    progress.on_status_change(id, state, &line);
    logger.log(AgentEvent::new(
        "agent_status",
        json!({
            "result_id": id.as_str(),
            "status": state.status.as_str(),
            "current_step_index": state.current_step_index,
            "pause_cause": state.pause_cause,
        }),
    ));
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::ports::agent_progress::AgentProgressNotifier;
    use crate::ports::event_logger::{AgentEvent, AgentEventLogger};
    use crate::ports::generation_gateway::{
        GatewayError, GenerationGateway, GenerationRequest, StreamHandle,
    };
    use crate::ports::plan_generator::PlanGenerator;
    use async_trait::async_trait;
    use muse_domain::{Citation, Fragment, PlanStep, PlanStepDraft, StreamEvent};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::{Notify, mpsc};

    /// One scripted response of [`ScriptedGateway`].
    pub enum Script {
        Events(Vec<StreamEvent>),
        /// Send `before`, wait for the gate, then send `after`.
        Gated {
            before: Vec<StreamEvent>,
            gate: Arc<Notify>,
            after: Vec<StreamEvent>,
        },
        FailToOpen(GatewayError),
        /// The call never returns a handle.
        NeverOpens,
    }

    pub fn text(t: &str) -> StreamEvent {
        StreamEvent::Fragment(Fragment::text(t))
    }

    pub fn cites(pairs: &[(&str, &str)]) -> StreamEvent {
        StreamEvent::Fragment(Fragment::citations(
            pairs.iter().map(|(u, t)| Citation::new(*u, *t)).collect(),
        ))
    }

    pub fn reply(parts: &[&str]) -> Script {
        let mut events: Vec<_> = parts.iter().map(|p| text(p)).collect();
        events.push(StreamEvent::Completed);
        Script::Events(events)
    }

    /// Gateway that replays scripts in call order and records every request.
    ///
    /// Once the scripts run out each call answers with a single "done" fragment.
    #[derive(Default)]
    pub struct ScriptedGateway {
        scripts: Mutex<VecDeque<Script>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGateway {
        pub fn new(scripts: Vec<Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn push(&self, script: Script) {
            self.scripts.lock().unwrap().push_back(script);
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn send_all(tx: &mpsc::Sender<StreamEvent>, events: Vec<StreamEvent>) -> bool {
        for event in events {
            if tx.send(event).await.is_err() {
                return false;
            }
        }
        true
    }

    #[async_trait]
    impl GenerationGateway for ScriptedGateway {
        async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError> {
            self.requests.lock().unwrap().push(request);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| reply(&["done"]));

            let (tx, rx) = mpsc::channel(8);
            match script {
                Script::FailToOpen(e) => return Err(e),
                Script::NeverOpens => return std::future::pending().await,
                Script::Events(events) => {
                    tokio::spawn(async move {
                        send_all(&tx, events).await;
                    });
                }
                Script::Gated {
                    before,
                    gate,
                    after,
                } => {
                    tokio::spawn(async move {
                        if send_all(&tx, before).await {
                            gate.notified().await;
                            send_all(&tx, after).await;
                        }
                    });
                }
            }
            Ok(StreamHandle::new(rx))
        }
    }

    /// Planner returning a fixed answer.
    pub struct ScriptedPlanner {
        pub answer: Mutex<Option<Result<Vec<PlanStepDraft>, GatewayError>>>,
        pub goals: Mutex<Vec<String>>,
    }

    impl ScriptedPlanner {
        pub fn new(answer: Result<Vec<PlanStepDraft>, GatewayError>) -> Self {
            Self {
                answer: Mutex::new(Some(answer)),
                goals: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PlanGenerator for ScriptedPlanner {
        async fn generate_plan(&self, goal: &str) -> Result<Vec<PlanStepDraft>, GatewayError> {
            self.goals.lock().unwrap().push(goal.to_string());
            self.answer
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(GatewayError::Other("planner exhausted".to_string())))
        }
    }

    /// Progress notifier recording step-level callbacks as short strings.
    #[derive(Default)]
    pub struct RecordingProgress {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AgentProgressNotifier for RecordingProgress {
        fn on_step_start(&self, index: usize, _step: &PlanStep) {
            self.events.lock().unwrap().push(format!("start:{}", index));
        }

        fn on_step_complete(&self, index: usize, _step: &PlanStep) {
            self.events.lock().unwrap().push(format!("complete:{}", index));
        }

        fn on_step_error(&self, index: usize, _message: &str) {
            self.events.lock().unwrap().push(format!("error:{}", index));
        }

        fn on_awaiting_input(&self, index: usize, _step: &PlanStep) {
            self.events.lock().unwrap().push(format!("input:{}", index));
        }
    }

    /// Event logger keeping every event type in memory.
    #[derive(Default)]
    pub struct MemoryEventLogger {
        pub types: Mutex<Vec<&'static str>>,
    }

    impl AgentEventLogger for MemoryEventLogger {
        fn log(&self, event: AgentEvent) {
            self.types.lock().unwrap().push(event.event_type);
        }
    }

    /// Poll `cond` until it holds, failing the test after a few seconds.
    pub async fn wait_until(mut cond: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !cond() {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }
}
