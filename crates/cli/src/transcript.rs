//! Per-run transcript of every message the agent appends.
//!
//! One file per run, `chat_<YYYY-MM-DD_HH-MM-SS>.log`, each entry written as
//! `---\n{role}: {content}`.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use wrapwright_core::event::DomainEvent;
use wrapwright_core::message::Role;

pub struct TranscriptWriter {
    path: PathBuf,
    file: File,
}

impl TranscriptWriter {
    /// Create the directory if needed and open a fresh log in it.
    pub async fn create(dir: &Path) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let path = dir.join(format!("chat_{stamp}.log"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&mut self, role: Role, content: &str) -> std::io::Result<()> {
        let entry = format!("---\n{role}: {content}\n");
        self.file.write_all(entry.as_bytes()).await?;
        self.file.flush().await
    }

    /// Write every appended message until the event bus goes away.
    pub fn spawn(mut self, mut rx: broadcast::Receiver<std::sync::Arc<DomainEvent>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let DomainEvent::MessageAppended { role, content, .. } = event.as_ref() {
                            if let Err(e) = self.append(*role, content).await {
                                warn!(path = %self.path.display(), error = %e, "Failed to write transcript");
                            }
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Transcript fell behind, messages were skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(path = %self.path.display(), "Transcript closed");
        })
    }
}
