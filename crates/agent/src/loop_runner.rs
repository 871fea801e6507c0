//! The agent loop state machine.
//!
//! ```text
//! AwaitingPrompt ─▶ AwaitingCompletion ─┬─ text ──────────────────────────▶ AwaitingPrompt
//!                         ▲             └─ call ─▶ AwaitingConfirmation ─┬─ declined ─▶ AwaitingPrompt
//!                         └──────────────────────────────────────────────┴─ executed
//! ```
//!
//! Each [`AgentLoop::step`] runs one pass from the current state to the next
//! point where the loop would yield. The only way out is an unrecoverable
//! error, which moves the loop to [`LoopState::Terminated`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use wrapwright_core::error::AgentError;
use wrapwright_core::event::{DomainEvent, EventBus};
use wrapwright_core::message::{Lifetime, Message};
use wrapwright_core::operator::Operator;
use wrapwright_core::provider::{AssistantTurn, FunctionCall, FunctionDefinition};
use wrapwright_wraps::{Dispatched, Dispatcher};

use crate::gate::{self, Decision, PromptInput, SessionState};
use crate::prompts;
use crate::reasoning::{Completion, ReasoningClient};
use crate::store::MessageStore;
use crate::token::{estimate_functions_tokens, estimate_message_tokens};

const PROMPT_LABEL: &str = "Prompt: ";

/// Where the loop will pick up on the next [`AgentLoop::step`].
#[derive(Debug, Clone)]
pub enum LoopState {
    AwaitingPrompt,
    AwaitingCompletion,
    AwaitingConfirmation,
    Terminated(AgentError),
}

/// What one step accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The model answered in text
    Replied { content: String },

    /// A call ran, successfully or not
    Executed { name: String, success: bool },

    /// The operator declined a call
    Skipped { name: String },
}

/// The core agent loop that orchestrates the model, the operator and the wraps.
pub struct AgentLoop {
    reasoning: ReasoningClient,
    dispatcher: Dispatcher,
    operator: Arc<dyn Operator>,
    event_bus: Arc<EventBus>,

    /// Conversation history, compacted before every completion
    store: MessageStore,

    session: SessionState,

    /// Wraps already announced in the persistent history
    learned: HashSet<String>,

    /// Declared on every completion request
    functions: Vec<FunctionDefinition>,

    /// Total tokens the model accepts, request and response together
    context_window_tokens: usize,

    state: LoopState,
}

impl AgentLoop {
    pub fn new(
        reasoning: ReasoningClient,
        dispatcher: Dispatcher,
        operator: Arc<dyn Operator>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            reasoning,
            dispatcher,
            operator,
            event_bus,
            store: MessageStore::new(),
            session: SessionState::default(),
            learned: HashSet::new(),
            functions: wrapwright_wraps::definitions(),
            context_window_tokens: 8000,
            state: LoopState::AwaitingCompletion,
        }
    }

    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window_tokens = tokens;
        self
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Load the wrap library index. A failure leaves the library empty and
    /// the agent still runs.
    pub async fn load_library(&self) -> usize {
        let library = self.dispatcher.library();
        info!(location = %library.location(), "Fetching wrap library index");

        match library.load_index().await {
            Ok(index) => {
                self.event_bus.publish(DomainEvent::LibraryLoaded {
                    count: index.len(),
                    timestamp: Utc::now(),
                });
                index.len()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load wrap library, continuing without wraps");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "wrap_library".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                0
            }
        }
    }

    /// Seed the persistent history. Call once, after the library is loaded.
    pub fn start(&mut self, goal: &str) {
        let wraps = self.dispatcher.library().descriptors();
        info!(wraps = wraps.len(), "Starting agent");
        self.record(Lifetime::Persistent, prompts::initialize_agent(&wraps));
        self.record(Lifetime::Persistent, prompts::goal(goal));
        self.state = LoopState::AwaitingCompletion;
    }

    /// Start and keep stepping until something unrecoverable happens.
    pub async fn run(&mut self, goal: &str) -> AgentError {
        self.start(goal);
        loop {
            if let Err(e) = self.step().await {
                return e;
            }
        }
    }

    pub async fn step(&mut self) -> Result<StepOutcome, AgentError> {
        if let LoopState::Terminated(e) = &self.state {
            return Err(e.clone());
        }

        match self.advance().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(error = %e, "Unrecoverable error encountered");
                self.event_bus.publish(DomainEvent::ErrorOccurred {
                    context: "agent_loop".into(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.state = LoopState::Terminated(e.clone());
                Err(e)
            }
        }
    }

    async fn advance(&mut self) -> Result<StepOutcome, AgentError> {
        if matches!(self.state, LoopState::AwaitingPrompt) {
            self.ask_for_prompt().await?;
            self.state = LoopState::AwaitingCompletion;
        }

        let completion = self.request_completion().await?;
        match completion.turn {
            AssistantTurn::Text(content) => {
                self.record(Lifetime::Temporary, Message::assistant(content.clone()));
                self.state = LoopState::AwaitingPrompt;
                Ok(StepOutcome::Replied { content })
            }
            AssistantTurn::Call(call) => {
                self.state = LoopState::AwaitingConfirmation;
                self.confirm_and_execute(call).await
            }
        }
    }

    async fn ask_for_prompt(&mut self) -> Result<(), AgentError> {
        if let Some(remaining) = self.session.consume_autopilot() {
            debug!(remaining, "Autopilot skipped the prompt");
            return Ok(());
        }

        loop {
            let input = self.operator.prompt(PROMPT_LABEL).await?;
            match PromptInput::parse(&input) {
                PromptInput::Autopilot(0) => {
                    warn!("Ignoring `!auto 0`; give a positive number of steps");
                }
                PromptInput::Autopilot(count) => {
                    self.session.arm_autopilot(count);
                    info!(count, "Autopilot armed");
                    self.event_bus.publish(DomainEvent::AutopilotArmed {
                        count,
                        timestamp: Utc::now(),
                    });
                    self.record(Lifetime::Temporary, prompts::autopilot_notice());
                    return Ok(());
                }
                PromptInput::Instruction(text) => {
                    self.record(Lifetime::Temporary, Message::user(text));
                    return Ok(());
                }
            }
        }
    }

    async fn request_completion(&mut self) -> Result<Completion, AgentError> {
        let reserved =
            self.reasoning.max_tokens() as usize + estimate_functions_tokens(&self.functions);
        self.store
            .compact(self.context_window_tokens, reserved, estimate_message_tokens)?;

        let messages = self.store.render();
        self.event_bus.publish(DomainEvent::CompletionRequested {
            messages: messages.len(),
            timestamp: Utc::now(),
        });

        let completion = self.reasoning.complete(messages, &self.functions).await?;
        self.event_bus.publish(DomainEvent::CompletionReceived {
            model: completion.model.clone(),
            tokens_used: completion.usage.as_ref().map(|u| u.total_tokens),
            timestamp: Utc::now(),
        });
        Ok(completion)
    }

    async fn confirm_and_execute(&mut self, call: FunctionCall) -> Result<StepOutcome, AgentError> {
        let decision = gate::decide(&mut self.session, &call, self.operator.as_ref()).await?;

        match decision {
            Decision::Declined => {
                self.event_bus.publish(DomainEvent::FunctionDeclined {
                    name: call.name.clone(),
                    timestamp: Utc::now(),
                });
                self.record(Lifetime::Temporary, prompts::function_declined(&call.name));
                self.state = LoopState::AwaitingPrompt;
                return Ok(StepOutcome::Skipped { name: call.name });
            }
            Decision::AutoApproved { remaining } => {
                let summary = call.summary();
                self.record(
                    Lifetime::Temporary,
                    prompts::auto_approved(&summary, remaining),
                );
                self.event_bus.publish(DomainEvent::FunctionAutoApproved {
                    summary,
                    remaining,
                    timestamp: Utc::now(),
                });
            }
            Decision::Approved => {}
        }

        let dispatched = self.dispatcher.execute(&call).await;
        self.event_bus.publish(DomainEvent::FunctionExecuted {
            name: dispatched.name.clone(),
            success: dispatched.result.ok,
            duration_ms: dispatched.duration_ms,
            timestamp: Utc::now(),
        });
        self.record_execution(&dispatched);

        self.state = LoopState::AwaitingCompletion;
        Ok(StepOutcome::Executed {
            name: dispatched.name,
            success: dispatched.result.ok,
        })
    }

    fn record_execution(&mut self, dispatched: &Dispatched) {
        let result = &dispatched.result;
        if !result.ok {
            let error = result.error.as_deref().unwrap_or("unknown error");
            warn!(function = %dispatched.name, error, "Function call failed");
            self.record(Lifetime::Temporary, prompts::function_failed(error));
            return;
        }

        if let Some(wrap) = dispatched
            .learned
            .as_ref()
            .filter(|wrap| self.learned.insert(wrap.name.clone()))
        {
            info!(wrap = %wrap.name, repo = ?wrap.repo_locator, "Learned a wrap");
            self.record(Lifetime::Persistent, prompts::wrap_learned(wrap));
            self.event_bus.publish(DomainEvent::WrapLearned {
                name: wrap.name.clone(),
                description: wrap.description.clone(),
                repo: wrap.repo_locator.clone(),
                timestamp: Utc::now(),
            });
        }

        self.record(
            Lifetime::Temporary,
            prompts::function_result(
                &dispatched.name,
                &dispatched.arguments,
                result.result.as_ref(),
            ),
        );
    }

    /// Append to the store and let subscribers see it.
    fn record(&mut self, lifetime: Lifetime, message: Message) {
        self.event_bus
            .publish(DomainEvent::message_appended(lifetime, &message));
        self.store.append(lifetime, message);
    }
}
