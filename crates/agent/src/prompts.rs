//! Text the agent writes into the conversation on its own behalf.

use serde_json::Value;
use wrapwright_core::message::Message;
use wrapwright_core::wrap::WrapDescriptor;

pub const AUTOPILOT_NOTICE: &str =
    "Entering autopilot mode. Please continue with the next step in the plan.";

/// The operator's goal, pinned for the whole session.
pub fn goal(goal: &str) -> Message {
    Message::user(format!("The user has the following goal: {goal}"))
}

/// System prompt describing the built-in functions and the wrap library.
pub fn initialize_agent(wraps: &[WrapDescriptor]) -> Message {
    let mut prompt = String::from(
        "You are an agent that accomplishes the user's goal by calling functions on \
         wraps. Wraps are packages of functions that run in a sandboxed runtime.\n\n\
         You have two functions available:\n\
         - LearnWrap(name): load a wrap's schema so you know which methods it exposes \
         and what arguments they take. Always learn a wrap before invoking it.\n\
         - InvokeWrap(uri, method, args): call a method on a learned wrap.\n\n\
         Work step by step. When a function fails, read the error and try another \
         approach. When you need more information from the user, ask for it.\n\n",
    );

    if wraps.is_empty() {
        prompt.push_str("No wraps are currently available in the library.");
    } else {
        prompt.push_str("The following wraps are available in the library:\n");
        for wrap in wraps {
            prompt.push_str(&format!(
                "- {}: {} (uri: {})\n",
                wrap.name,
                wrap.description,
                wrap.invocation_uri()
            ));
        }
    }

    Message::system(prompt)
}

/// Pretty JSON, except plain strings (schemas, file contents) which stay raw.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Record of a successful call, stored as a `function` message.
pub fn function_result(name: &str, arguments: &Value, result: Option<&Value>) -> Message {
    let args = serde_json::to_string_pretty(arguments).unwrap_or_else(|_| arguments.to_string());
    let result = result.map(render_value).unwrap_or_else(|| "null".into());
    Message::function(
        name,
        format!("Args:\n```json\n{args}\n```\nResult:\n```json\n{result}\n```\n"),
    )
}

pub fn function_failed(error: &str) -> Message {
    Message::system(format!("The function failed, this is the error: {error}"))
}

pub fn function_declined(name: &str) -> Message {
    Message::assistant(format!("The user asked to not execute the function \"{name}\"."))
}

pub fn wrap_learned(wrap: &WrapDescriptor) -> Message {
    Message::system(format!(
        "Loaded Wrap: {}\nDescription: {}\nURI: {}",
        wrap.name,
        wrap.description,
        wrap.invocation_uri()
    ))
}

/// Marks a call that ran on an autopilot credit rather than a yes.
pub fn auto_approved(summary: &str, remaining: u32) -> Message {
    Message::system(format!(
        "Running in AutoPilot mode ({remaining} left). Auto-approved the following function:\n\n```\n{summary}\n```"
    ))
}

pub fn autopilot_notice() -> Message {
    Message::system(AUTOPILOT_NOTICE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrapwright_core::message::Role;

    fn wrap(name: &str, description: &str) -> WrapDescriptor {
        WrapDescriptor {
            name: name.into(),
            description: description.into(),
            schema_locator: format!("file:///tmp/{name}.graphql"),
            repo_locator: None,
            uri: None,
        }
    }

    #[test]
    fn goal_is_a_user_message() {
        let msg = goal("list files");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "The user has the following goal: list files");
    }

    #[test]
    fn initialize_lists_every_wrap() {
        let msg = initialize_agent(&[wrap("ens", "Resolve ENS names"), wrap("fs", "File system")]);
        assert_eq!(msg.role, Role::System);
        assert!(msg.content.contains("- ens: Resolve ENS names (uri: ens)"));
        assert!(msg.content.contains("- fs: File system (uri: fs)"));
    }

    #[test]
    fn wraps_with_their_own_uri_advertise_it() {
        let mut ens = wrap("ens", "Resolve ENS names");
        ens.uri = Some("wrap://ipfs/QmEnsWrapHash".into());

        let init = initialize_agent(std::slice::from_ref(&ens));
        assert!(init.content.contains("- ens: Resolve ENS names (uri: wrap://ipfs/QmEnsWrapHash)"));

        let learned = wrap_learned(&ens);
        assert_eq!(
            learned.content,
            "Loaded Wrap: ens\nDescription: Resolve ENS names\nURI: wrap://ipfs/QmEnsWrapHash"
        );
    }

    #[test]
    fn auto_approved_names_the_call() {
        let msg = auto_approved(r#"InvokeWrap({"uri":"fs","method":"rm"})"#, 0);
        assert_eq!(msg.role, Role::System);
        assert!(msg.content.contains("(0 left)"));
        assert!(msg.content.contains(r#"InvokeWrap({"uri":"fs","method":"rm"})"#));
    }

    #[test]
    fn initialize_without_wraps_says_so() {
        let msg = initialize_agent(&[]);
        assert!(msg.content.contains("No wraps are currently available"));
    }

    #[test]
    fn function_result_fences_args_and_result() {
        let msg = function_result(
            "InvokeWrap",
            &serde_json::json!({"uri": "fs"}),
            Some(&serde_json::json!(["a"])),
        );
        assert_eq!(msg.role, Role::Function);
        assert_eq!(msg.name.as_deref(), Some("InvokeWrap"));
        assert_eq!(
            msg.content,
            "Args:\n```json\n{\n  \"uri\": \"fs\"\n}\n```\nResult:\n```json\n[\n  \"a\"\n]\n```\n"
        );
    }

    #[test]
    fn string_results_are_not_quoted() {
        let schema = Value::String("type Module {\n  bar: String!\n}".into());
        let msg = function_result("LearnWrap", &serde_json::json!({"name": "Foo"}), Some(&schema));
        assert!(msg.content.contains("```json\ntype Module {\n  bar: String!\n}\n```"));
    }

    #[test]
    fn failure_and_decline_messages() {
        let failed = function_failed("boom");
        assert_eq!(failed.role, Role::System);
        assert_eq!(failed.content, "The function failed, this is the error: boom");

        let declined = function_declined("InvokeWrap");
        assert_eq!(declined.role, Role::Assistant);
        assert_eq!(
            declined.content,
            "The user asked to not execute the function \"InvokeWrap\"."
        );
    }

    #[test]
    fn learned_announcement() {
        let msg = wrap_learned(&wrap("Foo", "Does foo things"));
        assert_eq!(msg.content, "Loaded Wrap: Foo\nDescription: Does foo things");
    }
}
