//! # Wrapwright Core
//!
//! Domain types, traits, and error definitions for the Wrapwright agent.
//! This crate has **no transport dependencies** — it defines the domain model
//! that the provider, wrap, agent and CLI crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the agent loop is a trait here:
//! - [`Provider`] — the reasoning service (LLM function calling)
//! - [`WrapRuntime`] — the capability invocation runtime
//! - [`Operator`] — the human on the other end of the terminal
//!
//! Implementations live in their respective crates, so the loop can be
//! driven end to end with scripted stand-ins in tests.

pub mod error;
pub mod event;
pub mod message;
pub mod operator;
pub mod provider;
pub mod wrap;

// Re-export key types at crate root for ergonomics
pub use error::{
    AgentError, DispatchError, Error, OperatorError, ProviderError, RegistryError, Result,
};
pub use event::{DomainEvent, EventBus};
pub use message::{Lifetime, Message, Role};
pub use operator::Operator;
pub use provider::{
    AssistantTurn, Choice, ChoiceMessage, FunctionCall, FunctionDefinition, Provider,
    ProviderRequest, ProviderResponse, Usage,
};
pub use wrap::{ExecutionResult, WrapDescriptor, WrapInvocation, WrapRuntime};
