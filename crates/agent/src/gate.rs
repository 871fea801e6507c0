//! Confirmation gate — nothing runs without a yes or an autopilot credit.
//!
//! All mutable session flags live in [`SessionState`], which the loop owns
//! and lends to the gate, so every decision is a pure function of the
//! state, the call and the operator's answer.

use tracing::info;
use wrapwright_core::error::OperatorError;
use wrapwright_core::operator::Operator;
use wrapwright_core::provider::FunctionCall;

/// Answers that count as approval. Anything else declines.
const AFFIRMATIVE: &[&str] = &["y", "yes", "yy"];

/// Autopilot bookkeeping for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub autopilot_enabled: bool,
    pub autopilot_remaining: u32,
}

impl SessionState {
    /// Arm autopilot for `count` approvals. Zero leaves it disabled.
    pub fn arm_autopilot(&mut self, count: u32) {
        self.autopilot_remaining = count;
        self.autopilot_enabled = count > 0;
    }

    pub fn autopilot_active(&self) -> bool {
        self.autopilot_enabled && self.autopilot_remaining > 0
    }

    /// Spend one autopilot credit. Returns the credits left, or `None` when
    /// autopilot was not active.
    pub fn consume_autopilot(&mut self) -> Option<u32> {
        if !self.autopilot_active() {
            return None;
        }
        self.autopilot_remaining -= 1;
        if self.autopilot_remaining == 0 {
            self.autopilot_enabled = false;
        }
        Some(self.autopilot_remaining)
    }
}

/// What the operator typed at the free-form prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// `!auto N`
    Autopilot(u32),
    Instruction(String),
}

impl PromptInput {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let count = trimmed
            .strip_prefix("!auto ")
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));

        match count {
            // All digits, so the only failure is overflow
            Some(digits) => Self::Autopilot(digits.parse().unwrap_or(u32::MAX)),
            None => Self::Instruction(input.to_string()),
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// The gate's verdict on a proposed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approved,
    AutoApproved { remaining: u32 },
    Declined,
}

/// The question put to the operator for a proposed call.
pub fn confirmation_question(call: &FunctionCall) -> String {
    format!(
        "Do you wish to execute the following function?\n\n```\n{}\n```\n\n(Y/N)\n",
        call.summary()
    )
}

pub async fn decide(
    session: &mut SessionState,
    call: &FunctionCall,
    operator: &dyn Operator,
) -> Result<Decision, OperatorError> {
    if let Some(remaining) = session.consume_autopilot() {
        info!(function = %call.name, remaining, "Autopilot approved function call");
        return Ok(Decision::AutoApproved { remaining });
    }

    let answer = operator.confirm(&confirmation_question(call)).await?;
    if is_affirmative(&answer) {
        Ok(Decision::Approved)
    } else {
        info!(function = %call.name, answer = %answer.trim(), "Operator declined function call");
        Ok(Decision::Declined)
    }
}
