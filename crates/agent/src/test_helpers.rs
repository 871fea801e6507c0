//! Shared scripted collaborators for agent tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use wrapwright_core::error::{OperatorError, ProviderError};
use wrapwright_core::operator::Operator;
use wrapwright_core::provider::{
    Choice, ChoiceMessage, FunctionCall, Provider, ProviderRequest, ProviderResponse, Usage,
};
use wrapwright_core::wrap::{ExecutionResult, WrapInvocation, WrapRuntime};

/// A mock provider that returns a sequence of scripted responses.
///
/// Panics if more calls are made than responses provided.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Arc<Self> {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    pub fn failing(error: ProviderError) -> Arc<Self> {
        Self::scripted(vec![Err(error)])
    }

    pub fn scripted(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedProvider: no response for call #{call}"))
    }
}

fn response(message: ChoiceMessage) -> ProviderResponse {
    ProviderResponse {
        choices: vec![Choice {
            message: Some(message),
        }],
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a plain text response.
pub fn text_response(text: &str) -> ProviderResponse {
    response(ChoiceMessage {
        content: Some(text.into()),
        function_call: None,
    })
}

/// Create a response proposing one function call.
pub fn call_response(name: &str, arguments: &str) -> ProviderResponse {
    response(ChoiceMessage {
        content: None,
        function_call: Some(FunctionCall::new(name, arguments)),
    })
}

/// An operator that replays canned answers. Running out means the input closed.
pub struct ScriptedOperator {
    prompts: Mutex<VecDeque<String>>,
    answers: Mutex<VecDeque<String>>,
    prompt_labels: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new(prompts: Vec<&str>, answers: Vec<&str>) -> Self {
        Self {
            prompts: Mutex::new(prompts.into_iter().map(String::from).collect()),
            answers: Mutex::new(answers.into_iter().map(String::from).collect()),
            prompt_labels: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Labels of every free-form prompt shown so far.
    pub fn prompts_shown(&self) -> Vec<String> {
        self.prompt_labels.lock().unwrap().clone()
    }

    /// Every confirmation question asked so far.
    pub fn confirmations(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Operator for ScriptedOperator {
    async fn prompt(&self, label: &str) -> Result<String, OperatorError> {
        self.prompt_labels.lock().unwrap().push(label.to_string());
        self.prompts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OperatorError::InputClosed)
    }

    async fn confirm(&self, question: &str) -> Result<String, OperatorError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(OperatorError::InputClosed)
    }
}

/// Runtime that answers every invocation with the same result.
pub struct ScriptedRuntime {
    reply: ExecutionResult,
    seen: Mutex<Vec<WrapInvocation>>,
}

impl ScriptedRuntime {
    pub fn new(reply: ExecutionResult) -> Arc<Self> {
        Arc::new(Self {
            reply,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn invocations(&self) -> Vec<WrapInvocation> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl WrapRuntime for ScriptedRuntime {
    async fn invoke(&self, invocation: WrapInvocation) -> Result<ExecutionResult, String> {
        self.seen.lock().unwrap().push(invocation);
        Ok(self.reply.clone())
    }
}
