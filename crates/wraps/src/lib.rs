//! Wrap library access and function dispatch for Wrapwright.
//!
//! The model never touches a wrap directly. It may call exactly two
//! functions, declared by [`functions::definitions`]:
//!
//! - `LearnWrap(name)` — look the wrap up in the [`WrapLibrary`] and hand
//!   its schema back to the model
//! - `InvokeWrap(uri, method, args)` — run a method through the configured
//!   [`WrapRuntime`](wrapwright_core::WrapRuntime)
//!
//! The [`Dispatcher`] turns every outcome, including failures, into an
//! [`ExecutionResult`](wrapwright_core::ExecutionResult).

pub mod dispatcher;
pub mod functions;
pub mod library;
pub mod locator;
pub mod runtime;

pub use dispatcher::{Dispatched, Dispatcher};
pub use functions::{AgentFunction, INVOKE_WRAP, LEARN_WRAP, definitions};
pub use library::WrapLibrary;
pub use locator::Locator;
pub use runtime::HttpWrapRuntime;
