//! Wrap domain types — descriptors, invocations and the runtime trait.
//!
//! A wrap is an external capability package. The library describes which
//! wraps exist; the runtime executes methods on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata for one wrap in the library index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapDescriptor {
    /// Unique name within the library
    pub name: String,

    /// What the wrap is for (shown to the model)
    #[serde(default)]
    pub description: String,

    /// Where the wrap's schema lives (`file://` or `http(s)://`)
    #[serde(rename = "abi")]
    pub schema_locator: String,

    /// Source repository, informational only
    #[serde(default, rename = "repo", skip_serializing_if = "Option::is_none")]
    pub repo_locator: Option<String>,

    /// The URI the wrap is invoked at, when it differs from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl WrapDescriptor {
    /// Where `InvokeWrap` should point for this wrap.
    pub fn invocation_uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(&self.name)
    }
}

/// A request to run one method on a wrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapInvocation {
    pub uri: String,
    pub method: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// The ok/error envelope every executed function call is normalized into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// The capability invocation runtime.
///
/// Implementations run the invocation wherever wraps actually execute and
/// report the runtime's own verdict. A transport failure may be returned
/// as `Err`; the dispatcher folds both into an [`ExecutionResult`].
#[async_trait]
pub trait WrapRuntime: Send + Sync {
    async fn invoke(
        &self,
        invocation: WrapInvocation,
    ) -> std::result::Result<ExecutionResult, String>;
}
