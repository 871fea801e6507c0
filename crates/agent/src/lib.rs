//! The core agent loop — the heart of Wrapwright.
//!
//! The agent follows a **Reason → Confirm → Act** cycle:
//!
//! 1. **Compact** the message store to fit the context window
//! 2. **Ask the model** for its next turn, declaring `LearnWrap` and `InvokeWrap`
//! 3. **If text**: record it and ask the operator for the next instruction
//! 4. **If a call**: pass it through the confirmation gate, then execute it
//!    or record that it was declined
//! 5. Loop back to step 1
//!
//! The loop never finishes on its own. It ends when an unrecoverable
//! [`AgentError`](wrapwright_core::AgentError) occurs or the caller stops
//! stepping it.

pub mod gate;
pub mod loop_runner;
pub mod prompts;
pub mod reasoning;
pub mod store;
pub mod token;

#[cfg(test)]
mod test_helpers;

pub use gate::{Decision, PromptInput, SessionState};
pub use loop_runner::{AgentLoop, LoopState, StepOutcome};
pub use reasoning::{Completion, ReasoningClient};
pub use store::MessageStore;
