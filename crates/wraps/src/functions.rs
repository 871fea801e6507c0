//! The closed set of functions the model may call.

use serde::Deserialize;
use wrapwright_core::error::DispatchError;
use wrapwright_core::provider::{FunctionCall, FunctionDefinition};
use wrapwright_core::wrap::WrapInvocation;

pub const INVOKE_WRAP: &str = "InvokeWrap";
pub const LEARN_WRAP: &str = "LearnWrap";

/// A proposed call, resolved to one of the built-in functions.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentFunction {
    InvokeWrap(WrapInvocation),
    LearnWrap { name: String },
}

#[derive(Deserialize)]
struct LearnWrapArgs {
    name: String,
}

impl AgentFunction {
    /// Resolve a call by name and decode its JSON arguments.
    pub fn parse(call: &FunctionCall) -> Result<Self, DispatchError> {
        let invalid = |e: serde_json::Error| DispatchError::InvalidArguments {
            function: call.name.clone(),
            reason: e.to_string(),
        };

        match call.name.as_str() {
            INVOKE_WRAP => {
                let invocation: WrapInvocation =
                    serde_json::from_str(&call.arguments).map_err(invalid)?;
                Ok(Self::InvokeWrap(invocation))
            }
            LEARN_WRAP => {
                let args: LearnWrapArgs = serde_json::from_str(&call.arguments).map_err(invalid)?;
                Ok(Self::LearnWrap { name: args.name })
            }
            other => Err(DispatchError::UnknownFunction(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InvokeWrap(_) => INVOKE_WRAP,
            Self::LearnWrap { .. } => LEARN_WRAP,
        }
    }
}

/// Signatures declared to the reasoning service on every request.
pub fn definitions() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            name: INVOKE_WRAP.into(),
            description: "Invoke a function on a wrap.".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "uri": {
                        "type": "string",
                        "description": "The wrap's URI"
                    },
                    "method": {
                        "type": "string",
                        "description": "The function to be called on the wrap"
                    },
                    "args": {
                        "type": "object",
                        "description": "The arguments to pass into the function being called",
                        "additionalProperties": true
                    }
                },
                "required": ["uri", "method", "args"],
                "additionalProperties": false
            }),
        },
        FunctionDefinition {
            name: LEARN_WRAP.into(),
            description: "Fetch a wrap's schema so its methods can be analysed and invoked. \
                          Takes the wrap's name as listed in the library."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "The name of the wrap to load"
                    }
                },
                "required": ["name"]
            }),
        },
    ]
}
