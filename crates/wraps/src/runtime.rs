//! HTTP adapter for the wrap execution runtime.
//!
//! The runtime itself lives outside this process. It accepts
//! `POST {uri, method, args}` and answers `{ok: true, value}` or
//! `{ok: false, error}`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use wrapwright_config::RuntimeConfig;
use wrapwright_core::wrap::{ExecutionResult, WrapInvocation, WrapRuntime};

pub struct HttpWrapRuntime {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpWrapRuntime {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.endpoint.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RuntimeReply {
    ok: bool,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl From<RuntimeReply> for ExecutionResult {
    fn from(reply: RuntimeReply) -> Self {
        if reply.ok {
            return ExecutionResult::success(reply.value.unwrap_or(serde_json::Value::Null));
        }
        let error = match reply.error {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        ExecutionResult::failure(error)
    }
}

#[async_trait]
impl WrapRuntime for HttpWrapRuntime {
    async fn invoke(&self, invocation: WrapInvocation) -> Result<ExecutionResult, String> {
        debug!(uri = %invocation.uri, method = %invocation.method, "Invoking wrap");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&invocation)
            .send()
            .await
            .map_err(|e| format!("runtime unreachable: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("runtime returned {status}: {body}"));
        }

        let reply: RuntimeReply = response
            .json()
            .await
            .map_err(|e| format!("invalid runtime reply: {e}"))?;
        Ok(reply.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_becomes_success() {
        let reply: RuntimeReply =
            serde_json::from_str(r#"{"ok": true, "value": ["a.txt", "b.txt"]}"#).unwrap();
        let result = ExecutionResult::from(reply);
        assert!(result.ok);
        assert_eq!(result.result, Some(serde_json::json!(["a.txt", "b.txt"])));
    }

    #[test]
    fn error_reply_keeps_message() {
        let reply: RuntimeReply = serde_json::from_str(r#"{"ok": false, "error": "boom"}"#).unwrap();
        let result = ExecutionResult::from(reply);
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn structured_error_is_stringified() {
        let reply: RuntimeReply =
            serde_json::from_str(r#"{"ok": false, "error": {"code": 7}}"#).unwrap();
        let result = ExecutionResult::from(reply);
        assert_eq!(result.error.as_deref(), Some(r#"{"code":7}"#));
    }

    #[tokio::test]
    async fn unreachable_runtime_is_an_error() {
        let runtime = HttpWrapRuntime::new("http://127.0.0.1:9/invoke");
        let err = runtime
            .invoke(WrapInvocation {
                uri: "fs".into(),
                method: "list".into(),
                args: serde_json::json!({}),
            })
            .await
            .unwrap_err();
        assert!(err.contains("runtime unreachable"));
    }
}
