//! Terminal progress display driven by domain events.
//!
//! Conversation output is rendered between steps so it never interleaves
//! with a prompt. The "Thinking..." indicator runs on its own task since it
//! has to show up while a step is still waiting on the model.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tracing::debug;
use wrapwright_core::event::DomainEvent;
use wrapwright_core::message::{Lifetime, Role};

const THINKING: &str = "  Thinking...";

pub struct Progress {
    rx: broadcast::Receiver<Arc<DomainEvent>>,
}

impl Progress {
    pub fn new(rx: broadcast::Receiver<Arc<DomainEvent>>) -> Self {
        Self { rx }
    }

    /// Print everything published since the last call.
    pub fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    if let Some(text) = render(&event) {
                        println!("{text}");
                    }
                }
                Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "Progress display lagged"),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

/// Prefix every line, so multi-line content stays visually grouped.
fn prefixed(prefix: &str, content: &str) -> String {
    content
        .lines()
        .map(|line| format!("  {prefix} > {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// How an event looks on the terminal, if it is shown at all.
pub fn render(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::MessageAppended {
            lifetime,
            role,
            name,
            content,
            ..
        } => match (role, lifetime) {
            // Typed by the operator, or shown through other events.
            // Auto-approvals arrive here as temporary system notices.
            (Role::User, _) | (Role::System, Lifetime::Persistent) => None,
            (Role::Assistant, _) => Some(format!("\n{}", prefixed("Assistant", content))),
            (Role::System, Lifetime::Temporary) => Some(format!("\n{}", prefixed("System", content))),
            (Role::Function, _) => {
                let label = format!("Function {}", name.as_deref().unwrap_or("?"));
                Some(format!("\n{}", prefixed(&label, content)))
            }
        },
        DomainEvent::LibraryLoaded { count, .. } => Some(format!("  Library: {count} wraps available")),
        DomainEvent::WrapLearned {
            name,
            description,
            repo,
            ..
        } => Some(format!(
            "\n  🧠 Learnt a wrap: {name}\n  Description: {description}\n  Repo: {}",
            repo.as_deref().unwrap_or("unknown")
        )),
        DomainEvent::AutopilotArmed { count, .. } => {
            Some(format!("  > Autopilot armed for {count} steps"))
        }
        DomainEvent::FunctionDeclined { name, .. } => Some(format!("  Skipped {name}")),
        DomainEvent::ErrorOccurred {
            context,
            error_message,
            ..
        } if context == "wrap_library" => Some(format!("  [Warning] {error_message}")),
        _ => None,
    }
}

/// Show "Thinking..." while a completion is in flight.
pub fn spawn_thinking_indicator(mut rx: broadcast::Receiver<Arc<DomainEvent>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let clear = format!("\r{}\r", " ".repeat(THINKING.len()));
        loop {
            match rx.recv().await {
                Ok(event) => match event.as_ref() {
                    DomainEvent::CompletionRequested { .. } => eprint!("{THINKING}"),
                    DomainEvent::CompletionReceived { .. } | DomainEvent::ErrorOccurred { .. } => {
                        eprint!("{clear}")
                    }
                    _ => {}
                },
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wrapwright_core::message::Message;

    #[test]
    fn assistant_lines_are_prefixed() {
        let event = DomainEvent::message_appended(
            Lifetime::Temporary,
            &Message::assistant("First\nSecond"),
        );
        assert_eq!(
            render(&event).unwrap(),
            "\n  Assistant > First\n  Assistant > Second"
        );
    }

    #[test]
    fn operator_input_and_agent_prompt_are_hidden() {
        let user = DomainEvent::message_appended(Lifetime::Temporary, &Message::user("hi"));
        let prompt =
            DomainEvent::message_appended(Lifetime::Persistent, &Message::system("You are..."));
        assert!(render(&user).is_none());
        assert!(render(&prompt).is_none());
    }

    #[test]
    fn function_results_show_the_name() {
        let event = DomainEvent::message_appended(
            Lifetime::Temporary,
            &Message::function("InvokeWrap", "Args:"),
        );
        assert_eq!(render(&event).unwrap(), "\n  Function InvokeWrap > Args:");
    }

    #[test]
    fn learned_wrap_shows_repo() {
        let event = DomainEvent::WrapLearned {
            name: "ens".into(),
            description: "ENS names".into(),
            repo: Some("https://github.com/example/ens".into()),
            timestamp: Utc::now(),
        };
        let text = render(&event).unwrap();
        assert!(text.contains("Learnt a wrap: ens"));
        assert!(text.contains("Repo: https://github.com/example/ens"));
    }

    #[test]
    fn only_library_errors_are_rendered() {
        let library = DomainEvent::ErrorOccurred {
            context: "wrap_library".into(),
            error_message: "unreachable".into(),
            timestamp: Utc::now(),
        };
        let fatal = DomainEvent::ErrorOccurred {
            context: "agent_loop".into(),
            error_message: "overflow".into(),
            timestamp: Utc::now(),
        };
        assert!(render(&library).unwrap().contains("unreachable"));
        assert!(render(&fatal).is_none());
    }
}
