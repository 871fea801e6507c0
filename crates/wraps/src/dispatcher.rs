//! Execution dispatcher — runs a confirmed function call.
//!
//! Failures here are data, never control flow: every path ends in an
//! [`ExecutionResult`] the agent can hand back to the model.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use wrapwright_core::provider::FunctionCall;
use wrapwright_core::wrap::{ExecutionResult, WrapDescriptor, WrapInvocation, WrapRuntime};

use crate::functions::AgentFunction;
use crate::library::WrapLibrary;

/// The outcome of one dispatched call.
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Name as proposed by the model
    pub name: String,

    /// Decoded arguments, or `Null` when they did not parse
    pub arguments: serde_json::Value,

    pub result: ExecutionResult,

    /// Set when a `LearnWrap` call succeeded
    pub learned: Option<WrapDescriptor>,

    pub duration_ms: u64,
}

pub struct Dispatcher {
    library: Arc<WrapLibrary>,
    runtime: Arc<dyn WrapRuntime>,
}

impl Dispatcher {
    pub fn new(library: Arc<WrapLibrary>, runtime: Arc<dyn WrapRuntime>) -> Self {
        Self { library, runtime }
    }

    pub fn library(&self) -> &Arc<WrapLibrary> {
        &self.library
    }

    pub async fn execute(&self, call: &FunctionCall) -> Dispatched {
        let start = Instant::now();
        let arguments = serde_json::from_str(&call.arguments).unwrap_or(serde_json::Value::Null);

        let (result, learned) = match AgentFunction::parse(call) {
            Ok(AgentFunction::InvokeWrap(invocation)) => (self.invoke(invocation).await, None),
            Ok(AgentFunction::LearnWrap { name }) => self.learn(&name).await,
            Err(e) => {
                warn!(function = %call.name, error = %e, "Rejected function call");
                (ExecutionResult::failure(e), None)
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(function = %call.name, ok = result.ok, duration_ms, "Function call finished");

        Dispatched {
            name: call.name.clone(),
            arguments,
            result,
            learned,
            duration_ms,
        }
    }

    /// Run on its own task so a panicking runtime is reported like any other failure.
    async fn invoke(&self, invocation: WrapInvocation) -> ExecutionResult {
        let runtime = Arc::clone(&self.runtime);
        match tokio::spawn(async move { runtime.invoke(invocation).await }).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => ExecutionResult::failure(e),
            Err(join_error) => ExecutionResult::failure(format!("wrap runtime crashed: {join_error}")),
        }
    }

    async fn learn(&self, name: &str) -> (ExecutionResult, Option<WrapDescriptor>) {
        let descriptor = match self.library.get(name) {
            Ok(d) => d,
            Err(e) => return (ExecutionResult::failure(e), None),
        };
        match self.library.resolve_schema(name).await {
            Ok(schema) => (
                ExecutionResult::success(serde_json::Value::String(schema)),
                Some(descriptor),
            ),
            Err(e) => {
                warn!(wrap = %name, error = %e, "Failed to learn wrap");
                (ExecutionResult::failure(e), None)
            }
        }
    }
}
