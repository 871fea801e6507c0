//! Reasoning service providers for Wrapwright.
//!
//! All providers implement the `wrapwright_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
