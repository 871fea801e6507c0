//! Message store — the agent's bounded conversation memory.
//!
//! Two append-only partitions:
//!
//! | Partition | Holds | Compaction |
//! |-----------|-------|------------|
//! | persistent | goal, agent prompt, learned wraps | never trimmed |
//! | temporary | prompts, replies, function results | oldest dropped first |
//!
//! The conversation sent to the model is always `persistent ++ temporary`.

use std::collections::VecDeque;

use tracing::debug;
use wrapwright_core::error::AgentError;
use wrapwright_core::message::{Lifetime, Message};

#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    persistent: Vec<Message>,
    temporary: VecDeque<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, lifetime: Lifetime, message: Message) {
        match lifetime {
            Lifetime::Persistent => self.persistent.push(message),
            Lifetime::Temporary => self.temporary.push_back(message),
        }
    }

    pub fn persistent(&self) -> &[Message] {
        &self.persistent
    }

    pub fn temporary(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.temporary.iter()
    }

    pub fn len(&self) -> usize {
        self.persistent.len() + self.temporary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The ordered conversation handed to the reasoning client.
    pub fn render(&self) -> Vec<Message> {
        self.persistent
            .iter()
            .chain(self.temporary.iter())
            .cloned()
            .collect()
    }

    /// Drop the oldest temporary messages until the conversation fits in
    /// `token_budget - reserved_for_response` tokens.
    ///
    /// Returns how many messages were dropped. Fails without touching
    /// anything when the persistent partition alone does not fit.
    pub fn compact<F>(
        &mut self,
        token_budget: usize,
        reserved_for_response: usize,
        count_tokens: F,
    ) -> Result<usize, AgentError>
    where
        F: Fn(&Message) -> usize,
    {
        let available = token_budget.saturating_sub(reserved_for_response);
        let persistent_tokens: usize = self.persistent.iter().map(&count_tokens).sum();

        if persistent_tokens > available {
            return Err(AgentError::ContextOverflow {
                persistent_tokens,
                budget: available,
            });
        }

        let mut total = persistent_tokens + self.temporary.iter().map(&count_tokens).sum::<usize>();
        let mut dropped = 0;
        while total > available {
            let Some(oldest) = self.temporary.pop_front() else {
                break;
            };
            total -= count_tokens(&oldest);
            dropped += 1;
        }

        if dropped > 0 {
            debug!(dropped, total, available, "Compacted temporary history");
        }
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is one token; keeps the arithmetic obvious.
    fn chars(m: &Message) -> usize {
        m.content.len()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn render_puts_persistent_first_in_insertion_order() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Temporary, Message::user("t1"));
        store.append(Lifetime::Persistent, Message::system("p1"));
        store.append(Lifetime::Temporary, Message::assistant("t2"));
        store.append(Lifetime::Persistent, Message::system("p2"));
        store.append(Lifetime::Temporary, Message::user("t3"));

        assert_eq!(contents(&store.render()), vec!["p1", "p2", "t1", "t2", "t3"]);
    }

    #[test]
    fn compact_is_noop_when_within_budget() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Persistent, Message::system("aaaa"));
        store.append(Lifetime::Temporary, Message::user("bbbb"));

        assert_eq!(store.compact(10, 2, chars).unwrap(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn compact_drops_oldest_temporary_first() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Persistent, Message::system("goal"));
        for text in ["aaaa", "bbbb", "cccc", "dddd"] {
            store.append(Lifetime::Temporary, Message::user(text));
        }

        // 4 persistent + 16 temporary = 20; room for 12
        let dropped = store.compact(15, 3, chars).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(contents(&store.render()), vec!["goal", "cccc", "dddd"]);
    }

    #[test]
    fn compact_never_removes_persistent_entries() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Persistent, Message::system("p-one"));
        store.append(Lifetime::Temporary, Message::user("temporary-entry"));
        store.append(Lifetime::Persistent, Message::system("p-two"));

        store.compact(10, 0, chars).unwrap();
        assert_eq!(contents(store.persistent()), vec!["p-one", "p-two"]);
        assert_eq!(store.temporary().len(), 0);
    }

    #[test]
    fn compact_result_fits_the_budget() {
        for budget in 8..40 {
            let mut store = MessageStore::new();
            store.append(Lifetime::Persistent, Message::system("12345678"));
            for i in 0..10 {
                store.append(Lifetime::Temporary, Message::user("x".repeat(i + 1)));
            }
            store.compact(budget, 0, chars).unwrap();
            let total: usize = store.render().iter().map(chars).sum();
            assert!(total <= budget, "budget {budget} exceeded: {total}");
        }
    }

    #[test]
    fn persistent_overflow_fails_without_removal() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Persistent, Message::system("0123456789"));
        store.append(Lifetime::Temporary, Message::user("abc"));

        let err = store.compact(12, 4, chars).unwrap_err();
        assert!(matches!(
            err,
            AgentError::ContextOverflow {
                persistent_tokens: 10,
                budget: 8
            }
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn reserve_larger_than_budget_overflows() {
        let mut store = MessageStore::new();
        store.append(Lifetime::Persistent, Message::system("x"));
        assert!(store.compact(10, 50, chars).is_err());
    }
}
