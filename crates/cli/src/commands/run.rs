//! `wrapwright run` — Pursue a goal until stopped.

use std::sync::Arc;

use wrapwright_agent::{AgentLoop, ReasoningClient};
use wrapwright_config::AppConfig;
use wrapwright_core::error::{AgentError, OperatorError};
use wrapwright_core::event::EventBus;
use wrapwright_core::{Error, Result};
use wrapwright_core::operator::Operator;
use wrapwright_providers::OpenAiCompatProvider;
use wrapwright_wraps::{Dispatcher, HttpWrapRuntime, WrapLibrary};

use crate::progress::{self, Progress};
use crate::terminal::TerminalOperator;
use crate::transcript::TranscriptWriter;

pub async fn run(goal: Option<String>) -> Result<()> {
    let config = AppConfig::load().map_err(|e| Error::Config(e.to_string()))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (a .env file works too):");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!("    WRAPWRIGHT_API_KEY=sk-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(Error::Config(
            "No API key found. See above for setup instructions.".into(),
        ));
    }

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let library = Arc::new(WrapLibrary::from_config(&config.library));
    let runtime = Arc::new(HttpWrapRuntime::from_config(&config.runtime));
    let operator = Arc::new(TerminalOperator::new());
    let event_bus = Arc::new(EventBus::default());

    let transcript = TranscriptWriter::create(&config.transcript_dir)
        .await
        .map_err(|e| {
            Error::Config(format!(
                "cannot open a transcript in {}: {e}",
                config.transcript_dir.display()
            ))
        })?;
    let transcript_path = transcript.path().to_path_buf();
    let transcript_task = transcript.spawn(event_bus.subscribe());
    let thinking_task = progress::spawn_thinking_indicator(event_bus.subscribe());
    let mut display = Progress::new(event_bus.subscribe());

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║               Wrapwright Agent               ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:       {}", config.model);
    println!("  Library:     {}", library.location());
    println!("  Runtime:     {}", config.runtime.endpoint);
    println!("  Transcript:  {}", transcript_path.display());
    println!();
    println!("  Ask the agent to learn a wrap, then to run one of its functions.");
    println!("  Type '!auto N' to approve the next N steps automatically.");
    println!("  Type 'exit' or press Ctrl+D to quit.");

    let goal = match goal {
        Some(goal) => goal,
        None => operator.prompt("Goal: ").await?,
    };

    let mut agent = AgentLoop::new(
        ReasoningClient::from_config(provider, &config),
        Dispatcher::new(library, runtime),
        operator,
        event_bus.clone(),
    )
    .with_context_window(config.context_window_tokens);

    agent.load_library().await;
    agent.start(&goal);

    let outcome = loop {
        display.drain();
        if let Err(e) = agent.step().await {
            display.drain();
            break e;
        }
    };

    // Closing the bus lets the background tasks finish
    drop(agent);
    drop(event_bus);
    let _ = thinking_task.await;
    let _ = transcript_task.await;

    match outcome {
        AgentError::Operator(OperatorError::InputClosed) => {
            println!();
            println!("  Goodbye! 👋");
            println!();
            Ok(())
        }
        e => {
            eprintln!();
            eprintln!("  Unrecoverable error encountered: {e}");
            eprintln!("  Transcript saved to {}", transcript_path.display());
            Err(e.into())
        }
    }
}
