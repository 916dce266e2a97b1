//! Execute Plan use case
//!
//! The step loop. Starting from a cursor, each iteration:
//!
//! 1. re-checks the run ticket and the task status,
//! 2. gates steps waiting on user input,
//! 3. marks the step `in-progress` and assembles its prompt and prior context,
//! 4. streams the generation and applies fragments as they arrive,
//! 5. completes or fails the step and advances the cursor.
//!
//! Checks and mutations for one step happen inside a single
//! [`AgentResultStore::update`], so a concurrent pause or stop either lands
//! before the step is claimed or is observed at the next fragment.
//! Cancellation mid-stream leaves the step `in-progress` with its partial
//! result and performs no further mutation.

use crate::config::ExecutionParams;
use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
use crate::ports::event_logger::{AgentEvent, AgentEventLogger, NoAgentEventLogger};
use crate::ports::generation_gateway::{GenerationGateway, GenerationRequest, StreamHandle};
use crate::registry::{ExecutionRegistry, RunTicket};
use crate::store::AgentResultStore;
use crate::use_cases::shared::report_status;
use muse_domain::core::string::preview;
use muse_domain::{
    AgentPromptTemplate, AgentResult, AgentStatus, AgentTaskState, Citation, DomainError,
    Fragment, PauseCause, PlanStep, StepStatus, StreamEvent,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a run of the step loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// The run ticket was cancelled (pause, stop or a newer run).
    Cancelled,
    /// The task status was no longer `running` before a step began.
    NotRunning,
    /// The cursor moved past the last step.
    PlanExhausted,
    /// The result was removed while the loop was running.
    ResultVanished,
    /// A step blocked on its input prompt.
    AwaitingInput,
    /// A step's generation failed.
    StepFailed,
    /// The step state machine refused a transition.
    Rejected(DomainError),
}

/// What a finished run reports back to its spawner.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub halt: HaltReason,
    /// Task state after finalization; `None` when the loop left the result
    /// untouched (cancelled, superseded or vanished).
    pub final_state: Option<AgentTaskState>,
}

enum StepFlow {
    Advance(usize),
    Halt(HaltReason),
}

enum Claim {
    Gated(PlanStep),
    Ready {
        step: PlanStep,
        request: GenerationRequest,
    },
}

/// Applied effect of one fragment, for notification outside the lock.
struct Applied {
    text: Option<String>,
    citations: Option<Vec<Citation>>,
}

#[derive(Clone)]
pub struct ExecutePlanUseCase {
    gateway: Arc<dyn GenerationGateway>,
    store: Arc<AgentResultStore>,
    registry: Arc<ExecutionRegistry>,
    params: ExecutionParams,
    progress: Arc<dyn AgentProgressNotifier>,
    logger: Arc<dyn AgentEventLogger>,
}

impl ExecutePlanUseCase {
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        store: Arc<AgentResultStore>,
        registry: Arc<ExecutionRegistry>,
    ) -> Self {
        Self {
            gateway,
            store,
            registry,
            params: ExecutionParams::default(),
            progress: Arc::new(NoAgentProgress),
            logger: Arc::new(NoAgentEventLogger),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn AgentProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn AgentEventLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    /// Run the step loop for `ticket` starting at `start_index`.
    ///
    /// The task must already be `running` with the ticket registered.
    pub async fn run(&self, ticket: RunTicket, start_index: usize) -> ExecutionOutcome {
        info!(
            "Run {} of {} starting at step {}",
            ticket.generation,
            ticket.id,
            start_index + 1
        );

        let mut index = start_index;
        let halt = loop {
            match self.run_step(&ticket, index).await {
                StepFlow::Advance(next) => index = next,
                StepFlow::Halt(reason) => break reason,
            }
        };

        self.finish(&ticket, halt)
    }

    async fn run_step(&self, ticket: &RunTicket, index: usize) -> StepFlow {
        let claim = self
            .store
            .update(&ticket.id, |result| self.claim_step(ticket, result, index));

        let (step, request) = match claim {
            None => return StepFlow::Halt(HaltReason::ResultVanished),
            Some(Err(reason)) => return StepFlow::Halt(reason),
            Some(Ok(Claim::Gated(step))) => {
                info!("[{}] Step {} awaits input", ticket.id, index + 1);
                self.progress.on_awaiting_input(index, &step);
                self.logger.log(AgentEvent::new(
                    "awaiting_input",
                    json!({
                        "result_id": ticket.id.as_str(),
                        "step_index": index,
                        "step_id": step.id.as_str(),
                        "input_prompt": step.input_prompt,
                    }),
                ));
                return StepFlow::Halt(HaltReason::AwaitingInput);
            }
            Some(Ok(Claim::Ready { step, request })) => (step, request),
        };

        info!(
            "[{}] Step {}: {}",
            ticket.id,
            index + 1,
            preview(&step.description, 80)
        );
        self.progress.on_step_start(index, &step);
        self.logger.log(AgentEvent::new(
            "step_started",
            json!({
                "result_id": ticket.id.as_str(),
                "step_index": index,
                "step_id": step.id.as_str(),
                "prompt": request.prompt,
                "has_context": request.context.is_some(),
            }),
        ));

        let opened = tokio::select! {
            biased;
            _ = ticket.token.cancelled() => return self.cancelled(ticket, index),
            opened = self.gateway.stream(request) => opened,
        };
        let handle = match opened {
            Ok(handle) => handle,
            Err(e) => return self.fail_step(ticket, index, &e.user_message()),
        };

        self.consume(ticket, index, handle).await
    }

    /// Steps 1-4 of one iteration, under the store lock.
    fn claim_step(
        &self,
        ticket: &RunTicket,
        result: &mut AgentResult,
        index: usize,
    ) -> Result<Claim, HaltReason> {
        if !self.registry.is_active(ticket) {
            return Err(HaltReason::Cancelled);
        }
        if result.agent_state.status != AgentStatus::Running {
            return Err(HaltReason::NotRunning);
        }
        let context = AgentPromptTemplate::prior_context(&result.plan, index);
        let Some(step) = result.plan.get_mut(index) else {
            return Err(HaltReason::PlanExhausted);
        };

        if step.needs_input() {
            step.mark_awaiting_input().map_err(HaltReason::Rejected)?;
            let gated = step.clone();
            result.agent_state.pause_at(index, PauseCause::AwaitingInput);
            return Ok(Claim::Gated(gated));
        }

        let prompt = AgentPromptTemplate::step_prompt(step);
        step.mark_in_progress().map_err(HaltReason::Rejected)?;
        let step = step.clone();
        result.agent_state.current_step_index = index;

        let request = GenerationRequest::new(prompt, self.params.step_mode)
            .with_focuses(result.focuses.clone())
            .with_context(context)
            .with_grounding(self.params.effective_grounding());
        Ok(Claim::Ready { step, request })
    }

    async fn consume(&self, ticket: &RunTicket, index: usize, mut handle: StreamHandle) -> StepFlow {
        let mut started = false;
        loop {
            let event = tokio::select! {
                biased;
                _ = ticket.token.cancelled() => return self.cancelled(ticket, index),
                event = handle.recv() => event,
            };

            match event {
                Some(StreamEvent::Fragment(fragment)) => {
                    match self.apply_fragment(ticket, index, &fragment, &mut started) {
                        Some(applied) => {
                            if let Some(text) = applied.text.as_deref() {
                                self.progress.on_step_fragment(index, text);
                            }
                            if let Some(citations) = applied.citations.as_deref() {
                                self.progress.on_step_citations(index, citations);
                            }
                        }
                        None => return self.cancelled(ticket, index),
                    }
                }
                Some(StreamEvent::Error(message)) => {
                    return self.fail_step(ticket, index, &message);
                }
                // A producer that hangs up without an explicit completion
                // still counts as a clean end of stream.
                Some(StreamEvent::Completed) | None => break,
            }
        }

        self.complete_step(ticket, index)
    }

    /// Apply one fragment. `None` means the run must stop consuming.
    ///
    /// The first text of a run replaces whatever result the step carried
    /// (the user's answer on a re-run); later text is appended.
    fn apply_fragment(
        &self,
        ticket: &RunTicket,
        index: usize,
        fragment: &Fragment,
        started: &mut bool,
    ) -> Option<Applied> {
        self.store
            .update(&ticket.id, |result| {
                if ticket.is_cancelled() {
                    return None;
                }
                let step = result.plan.get_mut(index)?;
                if step.status != StepStatus::InProgress {
                    return None;
                }

                let text = fragment.text.as_deref().filter(|t| !t.is_empty());
                if let Some(text) = text {
                    if *started {
                        step.append_output(text);
                    } else {
                        step.begin_output(text);
                        *started = true;
                    }
                }

                let added = fragment
                    .citations
                    .as_deref()
                    .map_or(0, |incoming| step.merge_citations(incoming));

                Some(Applied {
                    text: text.map(str::to_string),
                    citations: (added > 0).then(|| step.citations.clone()),
                })
            })
            .flatten()
    }

    fn complete_step(&self, ticket: &RunTicket, index: usize) -> StepFlow {
        let completed = self.store.update(&ticket.id, |result| {
            if ticket.is_cancelled() {
                return Err(HaltReason::Cancelled);
            }
            let step = result
                .plan
                .get_mut(index)
                .ok_or(HaltReason::ResultVanished)?;
            step.mark_completed().map_err(HaltReason::Rejected)?;
            let step = step.clone();
            result.agent_state.current_step_index = index + 1;
            Ok(step)
        });

        match completed {
            None => StepFlow::Halt(HaltReason::ResultVanished),
            Some(Err(HaltReason::Cancelled)) => self.cancelled(ticket, index),
            Some(Err(reason)) => StepFlow::Halt(reason),
            Some(Ok(step)) => {
                let length = step.result.as_deref().map_or(0, str::len);
                info!("[{}] Step {} completed ({} bytes)", ticket.id, index + 1, length);
                self.progress.on_step_complete(index, &step);
                self.logger.log(AgentEvent::new(
                    "step_completed",
                    json!({
                        "result_id": ticket.id.as_str(),
                        "step_index": index,
                        "step_id": step.id.as_str(),
                        "result": step.result,
                        "citations": step.citations,
                    }),
                ));
                StepFlow::Advance(index + 1)
            }
        }
    }

    fn fail_step(&self, ticket: &RunTicket, index: usize, message: &str) -> StepFlow {
        let failed = self.store.update(&ticket.id, |result| {
            if ticket.is_cancelled() {
                return Err(HaltReason::Cancelled);
            }
            let step = result
                .plan
                .get_mut(index)
                .ok_or(HaltReason::ResultVanished)?;
            step.mark_error(message).map_err(HaltReason::Rejected)?;
            result.agent_state.fail();
            Ok(())
        });

        match failed {
            None => StepFlow::Halt(HaltReason::ResultVanished),
            Some(Err(HaltReason::Cancelled)) => self.cancelled(ticket, index),
            Some(Err(reason)) => StepFlow::Halt(reason),
            Some(Ok(())) => {
                warn!("[{}] Step {} failed: {}", ticket.id, index + 1, message);
                self.progress.on_step_error(index, message);
                self.logger.log(AgentEvent::new(
                    "step_failed",
                    json!({
                        "result_id": ticket.id.as_str(),
                        "step_index": index,
                        "error": message,
                    }),
                ));
                StepFlow::Halt(HaltReason::StepFailed)
            }
        }
    }

    fn cancelled(&self, ticket: &RunTicket, index: usize) -> StepFlow {
        debug!(
            "[{}] Run {} observed cancellation at step {}",
            ticket.id,
            ticket.generation,
            index + 1
        );
        StepFlow::Halt(HaltReason::Cancelled)
    }

    /// Release the ticket and settle the task status.
    ///
    /// Stopped, errored and user-paused tasks are left as they are; otherwise
    /// a fully completed plan completes the task and anything else pauses it.
    fn finish(&self, ticket: &RunTicket, halt: HaltReason) -> ExecutionOutcome {
        let current = self.registry.release(ticket);

        if !current || matches!(halt, HaltReason::Cancelled | HaltReason::ResultVanished) {
            debug!(
                "[{}] Run {} exits without finalization ({:?})",
                ticket.id, ticket.generation, halt
            );
            if halt == HaltReason::Cancelled {
                self.progress.on_cancelled(&ticket.id);
            }
            return ExecutionOutcome {
                halt,
                final_state: None,
            };
        }

        let settled = self.store.update(&ticket.id, |result| {
            let all_completed = result.all_steps_completed();
            let state = &mut result.agent_state;
            if !state.is_settled() {
                if matches!(halt, HaltReason::Rejected(_)) {
                    state.fail();
                } else if all_completed {
                    state.complete();
                } else if state.status != AgentStatus::Paused {
                    let cursor = state.current_step_index;
                    state.pause_at(cursor, PauseCause::Incomplete);
                }
            }
            (result.agent_state.clone(), result.plan.len())
        });

        let Some((state, plan_len)) = settled else {
            return ExecutionOutcome {
                halt: HaltReason::ResultVanished,
                final_state: None,
            };
        };

        if let HaltReason::Rejected(e) = &halt {
            warn!("[{}] Run {} rejected: {}", ticket.id, ticket.generation, e);
        }
        info!("[{}] Run {} finished: {}", ticket.id, ticket.generation, state.status);
        report_status(
            self.progress.as_ref(),
            self.logger.as_ref(),
            &ticket.id,
            &state,
            plan_len,
        );
        self.progress.on_execution_finished(&ticket.id, &state);

        ExecutionOutcome {
            halt,
            final_state: Some(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation_gateway::GatewayError;
    use crate::use_cases::shared::testing::{
        MemoryEventLogger, RecordingProgress, Script, ScriptedGateway, cites, reply, text,
        wait_until,
    };
    use muse_domain::{Focus, GenerationMode, ResultId};
    use tokio::sync::Notify;

    struct Harness {
        gateway: Arc<ScriptedGateway>,
        store: Arc<AgentResultStore>,
        registry: Arc<ExecutionRegistry>,
        progress: Arc<RecordingProgress>,
        logger: Arc<MemoryEventLogger>,
        use_case: ExecutePlanUseCase,
    }

    impl Harness {
        fn new(scripts: Vec<Script>) -> Self {
            let gateway = Arc::new(ScriptedGateway::new(scripts));
            let store = Arc::new(AgentResultStore::new());
            let registry = Arc::new(ExecutionRegistry::new());
            let progress = Arc::new(RecordingProgress::default());
            let logger = Arc::new(MemoryEventLogger::default());
            let use_case = ExecutePlanUseCase::new(gateway.clone(), store.clone(), registry.clone())
                .with_progress(progress.clone())
                .with_event_logger(logger.clone());
            Self {
                gateway,
                store,
                registry,
                progress,
                logger,
                use_case,
            }
        }

        /// Insert a running result and register a ticket for it.
        fn running(&self, plan: Vec<PlanStep>) -> RunTicket {
            let mut result = AgentResult::new("goal", vec![Focus::Creative])
                .unwrap()
                .with_id("r1")
                .with_plan(plan);
            result.agent_state.run_from(0);
            self.store.insert(result);
            self.registry.register(&r1())
        }

        fn result(&self) -> AgentResult {
            self.store.get(&r1()).unwrap()
        }
    }

    fn r1() -> ResultId {
        ResultId::new("r1")
    }

    fn statuses(result: &AgentResult) -> Vec<StepStatus> {
        result.plan.iter().map(|s| s.status).collect()
    }

    #[tokio::test]
    async fn test_steps_complete_in_order() {
        let h = Harness::new(vec![reply(&["a"]), reply(&["b"]), reply(&["c"])]);
        let ticket = h.running(vec![
            PlanStep::new("one"),
            PlanStep::new("two"),
            PlanStep::new("three"),
        ]);

        let outcome = h.use_case.run(ticket, 0).await;

        assert_eq!(outcome.halt, HaltReason::PlanExhausted);
        let result = h.result();
        assert_eq!(result.agent_state.status, AgentStatus::Completed);
        assert_eq!(statuses(&result), vec![StepStatus::Completed; 3]);
        assert_eq!(
            h.progress.events(),
            ["start:0", "complete:0", "start:1", "complete:1", "start:2", "complete:2"]
        );
        assert!(!h.registry.is_registered(&result.id));
        assert!(h.logger.types.lock().unwrap().contains(&"step_completed"));
    }

    #[tokio::test]
    async fn test_haiku_context_reaches_second_step() {
        let h = Harness::new(vec![
            reply(&["Waves fold ", "into foam"]),
            reply(&["A fine haiku."]),
        ]);
        let ticket = h.running(vec![
            PlanStep::new("Write a haiku about the sea"),
            PlanStep::new("Critique the haiku"),
        ]);

        let outcome = h.use_case.run(ticket, 0).await;

        assert_eq!(
            outcome.final_state.map(|s| s.status),
            Some(AgentStatus::Completed)
        );
        let requests = h.gateway.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].prompt, "Write a haiku about the sea");
        assert_eq!(requests[0].context, None);
        assert_eq!(
            requests[1].context.as_deref(),
            Some("Step: Write a haiku about the sea\nResult: Waves fold into foam")
        );
        assert_eq!(requests[1].mode, GenerationMode::Thinker);
        assert!(requests[1].grounding);
        assert_eq!(requests[1].focuses, vec![Focus::Creative]);
        assert_eq!(h.result().plan[1].result.as_deref(), Some("A fine haiku."));
    }

    #[tokio::test]
    async fn test_context_excludes_later_steps() {
        let h = Harness::new(vec![reply(&["r0"]), reply(&["r1"]), reply(&["r2"])]);
        let ticket = h.running(vec![
            PlanStep::new("first"),
            PlanStep::new("second"),
            PlanStep::new("third"),
        ]);

        h.use_case.run(ticket, 0).await;

        let context = h.gateway.requests()[1].context.clone().unwrap();
        assert_eq!(context, "Step: first\nResult: r0");
        assert!(!context.contains("second"));
        assert!(!context.contains("third"));
        assert_eq!(
            h.gateway.requests()[2].context.as_deref(),
            Some("Step: first\nResult: r0\n\nStep: second\nResult: r1")
        );
    }

    #[tokio::test]
    async fn test_input_gate_pauses_without_streaming() {
        let h = Harness::new(vec![]);
        let ticket = h.running(vec![
            PlanStep::new("Pick the city").with_input_prompt("Which city?"),
            PlanStep::new("Plan the days"),
        ]);

        let outcome = h.use_case.run(ticket, 0).await;

        assert_eq!(outcome.halt, HaltReason::AwaitingInput);
        let result = h.result();
        assert_eq!(
            statuses(&result),
            vec![StepStatus::AwaitingInput, StepStatus::Idle]
        );
        assert_eq!(result.agent_state.status, AgentStatus::Paused);
        assert_eq!(result.agent_state.current_step_index, 0);
        assert_eq!(
            result.agent_state.pause_cause,
            Some(PauseCause::AwaitingInput)
        );
        assert!(h.gateway.requests().is_empty());
        assert_eq!(h.progress.events(), ["input:0"]);
    }

    #[tokio::test]
    async fn test_rerun_seeds_prompt_and_replaces_result() {
        let h = Harness::new(vec![reply(&["Day 1: ", "Asakusa"])]);
        let mut step = PlanStep::new("Plan the itinerary").with_input_prompt("Which city?");
        step.mark_awaiting_input().unwrap();
        step.provide_input("Tokyo").unwrap();
        let ticket = h.running(vec![step]);

        h.use_case.run(ticket, 0).await;

        assert_eq!(
            h.gateway.requests()[0].prompt,
            "Based on my previous work on this step: 'User input: \"Tokyo\"', now do this: Plan the itinerary"
        );
        let result = h.result();
        assert_eq!(result.plan[0].result.as_deref(), Some("Day 1: Asakusa"));
        assert_eq!(result.agent_state.status, AgentStatus::Completed);
    }

    #[tokio::test]
    async fn test_stream_error_halts_forward_progress() {
        let h = Harness::new(vec![
            reply(&["ok"]),
            Script::Events(vec![
                text("partial"),
                StreamEvent::Error(
                    "You have exceeded your API quota. Please check your account status."
                        .to_string(),
                ),
            ]),
        ]);
        let ticket = h.running(vec![
            PlanStep::new("one"),
            PlanStep::new("two"),
            PlanStep::new("three"),
        ]);

        let outcome = h.use_case.run(ticket, 0).await;

        assert_eq!(outcome.halt, HaltReason::StepFailed);
        let result = h.result();
        assert_eq!(
            statuses(&result),
            vec![StepStatus::Completed, StepStatus::Error, StepStatus::Idle]
        );
        assert_eq!(
            result.plan[1].result.as_deref(),
            Some("Error: You have exceeded your API quota. Please check your account status.")
        );
        assert_eq!(result.agent_state.status, AgentStatus::Error);
        assert_eq!(result.status_line(), "Error on step 2. Execution halted.");
        assert_eq!(h.gateway.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_open_failure_marks_step_error() {
        let h = Harness::new(vec![Script::FailToOpen(GatewayError::MissingApiKey)]);
        let ticket = h.running(vec![PlanStep::new("one")]);

        h.use_case.run(ticket, 0).await;

        let result = h.result();
        assert_eq!(result.plan[0].status, StepStatus::Error);
        assert_eq!(
            result.plan[0].result.as_deref(),
            Some("Error: The API key is missing or invalid. Please configure it to use the AI features.")
        );
        assert_eq!(result.agent_state.status, AgentStatus::Error);
    }

    #[tokio::test]
    async fn test_citations_are_merged_without_duplicates() {
        let h = Harness::new(vec![Script::Events(vec![
            text("Tokyo is "),
            cites(&[("https://a.example", "A")]),
            text("large."),
            cites(&[("https://a.example", "A"), ("https://b.example", "B")]),
            cites(&[("https://b.example", "B again")]),
            StreamEvent::Completed,
        ])]);
        let ticket = h.running(vec![PlanStep::new("Describe Tokyo")]);

        h.use_case.run(ticket, 0).await;

        let step = &h.result().plan[0];
        assert_eq!(step.result.as_deref(), Some("Tokyo is large."));
        let uris: Vec<_> = step.citations.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(uris, ["https://a.example", "https://b.example"]);
        assert_eq!(step.citations[1].title, "B");
    }

    #[tokio::test]
    async fn test_hang_up_counts_as_clean_end() {
        let h = Harness::new(vec![Script::Events(vec![text("only")])]);
        let ticket = h.running(vec![PlanStep::new("one")]);

        h.use_case.run(ticket, 0).await;

        let result = h.result();
        assert_eq!(result.plan[0].status, StepStatus::Completed);
        assert_eq!(result.agent_state.status, AgentStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancellation_freezes_step_mid_stream() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(vec![
            reply(&["done"]),
            Script::Gated {
                before: vec![text("half a ")],
                gate: gate.clone(),
                after: vec![text("thought"), StreamEvent::Completed],
            },
        ]);
        let ticket = h.running(vec![
            PlanStep::new("one"),
            PlanStep::new("two"),
            PlanStep::new("three"),
        ]);

        let use_case = h.use_case.clone();
        let run = tokio::spawn(async move { use_case.run(ticket, 0).await });

        let store = h.store.clone();
        wait_until(|| {
            store
                .get(&r1())
                .is_some_and(|r| r.plan[1].has_result())
        })
        .await;

        h.store.update(&r1(), |r| {
            h.registry.deregister(&r.id);
            r.agent_state.pause_by_user();
        });
        gate.notify_one();

        let outcome = run.await.unwrap();
        assert_eq!(outcome.halt, HaltReason::Cancelled);
        assert!(outcome.final_state.is_none());

        let result = h.result();
        assert_eq!(
            statuses(&result),
            vec![
                StepStatus::Completed,
                StepStatus::InProgress,
                StepStatus::Idle
            ]
        );
        assert_eq!(result.plan[1].result.as_deref(), Some("half a "));
        assert_eq!(result.agent_state.status, AgentStatus::Paused);
        assert_eq!(result.agent_state.pause_cause, Some(PauseCause::User));
        assert_eq!(h.gateway.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_pause_while_stream_is_opening() {
        let h = Harness::new(vec![Script::NeverOpens]);
        let ticket = h.running(vec![PlanStep::new("one"), PlanStep::new("two")]);

        let use_case = h.use_case.clone();
        let run = tokio::spawn(async move { use_case.run(ticket, 0).await });
        let gateway = h.gateway.clone();
        wait_until(|| gateway.requests().len() == 1).await;

        h.store.update(&r1(), |r| r.agent_state.pause_by_user());
        h.registry.deregister(&r1());
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), run)
            .await
            .expect("run did not observe the pause")
            .unwrap();

        assert_eq!(outcome.halt, HaltReason::Cancelled);
        assert_eq!(outcome.final_state, None);
        let result = h.result();
        assert_eq!(
            statuses(&result),
            vec![StepStatus::InProgress, StepStatus::Idle]
        );
        assert_eq!(result.agent_state.status, AgentStatus::Paused);
        assert_eq!(h.gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_superseded_run_leaves_result_alone() {
        let gate = Arc::new(Notify::new());
        let h = Harness::new(vec![Script::Gated {
            before: vec![text("stale")],
            gate: gate.clone(),
            after: vec![StreamEvent::Completed],
        }]);
        let first = h.running(vec![PlanStep::new("one")]);

        let use_case = h.use_case.clone();
        let run = tokio::spawn(async move { use_case.run(first, 0).await });
        let store = h.store.clone();
        wait_until(|| {
            store
                .get(&r1())
                .is_some_and(|r| r.plan[0].has_result())
        })
        .await;

        let second = h.registry.register(&r1());
        let outcome = run.await.unwrap();

        assert_eq!(outcome.halt, HaltReason::Cancelled);
        assert!(h.registry.is_active(&second));
        let result = h.result();
        assert_eq!(result.agent_state.status, AgentStatus::Running);
        assert_eq!(result.plan[0].status, StepStatus::InProgress);
    }

    #[tokio::test]
    async fn test_not_running_halts_before_any_work() {
        let h = Harness::new(vec![]);
        let ticket = h.running(vec![PlanStep::new("one")]);
        h.store.update(&r1(), |r| r.agent_state.stop());

        let outcome = h.use_case.run(ticket, 0).await;

        assert_eq!(outcome.halt, HaltReason::NotRunning);
        assert_eq!(
            outcome.final_state.map(|s| s.status),
            Some(AgentStatus::Stopped)
        );
        assert!(h.gateway.requests().is_empty());
        assert_eq!(h.result().plan[0].status, StepStatus::Idle);
    }

    #[tokio::test]
    async fn test_resume_past_completed_steps() {
        let h = Harness::new(vec![reply(&["second"])]);
        let mut first = PlanStep::new("one");
        first.mark_in_progress().unwrap();
        first.begin_output("first");
        first.mark_completed().unwrap();
        let ticket = h.running(vec![first, PlanStep::new("two")]);

        h.use_case.run(ticket, 1).await;

        let result = h.result();
        assert_eq!(result.plan[0].result.as_deref(), Some("first"));
        assert_eq!(result.agent_state.status, AgentStatus::Completed);
        assert_eq!(h.gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_vanished_result_ends_run() {
        let h = Harness::new(vec![]);
        let ticket = h.running(vec![PlanStep::new("one")]);
        h.store.remove(&r1());

        let outcome = h.use_case.run(ticket, 0).await;
        assert_eq!(outcome.halt, HaltReason::ResultVanished);
        assert!(outcome.final_state.is_none());
    }
}
