//! Operator trait — the human in the loop.
//!
//! The agent asks the operator for free-form instructions and for yes/no
//! confirmations. Both return raw text; interpreting it is the agent's job.

use async_trait::async_trait;

use crate::error::OperatorError;

#[async_trait]
pub trait Operator: Send + Sync {
    /// Ask for a free-form instruction.
    async fn prompt(&self, label: &str) -> Result<String, OperatorError>;

    /// Ask a yes/no question. The raw answer is returned untouched.
    async fn confirm(&self, question: &str) -> Result<String, OperatorError>;
}
