//! Background execution for tabhost.
//!
//! Slow work (database writes) runs on a small tokio worker pool. Its result
//! comes back as a [`UiEvent`] on an unbounded queue that only the
//! coordinating loop drains, so UI-owned state is never touched off-thread.

use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::debug;

use crate::types::command::ExternalIntent;

/// Screens the shell opens on top of the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    TabSwitcher,
    Bookmarks,
    Settings,
    PrivacyDashboard(String),
    Fire,
}

/// Work handed back to the coordinating loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    NewTab,
    OpenScreen(Screen),
    ToggleFullScreen,
    LaunchExternal(ExternalIntent),
    BookmarkSaved {
        tab_id: String,
        result: Result<String, String>,
    },
}

/// Cloneable handle used to start jobs and post events.
#[derive(Clone)]
pub struct BackgroundHandle {
    runtime: Handle,
    events: mpsc::UnboundedSender<UiEvent>,
}

impl BackgroundHandle {
    /// Queues an event for the next pass of the coordinating loop.
    pub fn post(&self, event: UiEvent) {
        if self.events.send(event).is_err() {
            debug!("ui queue closed; event dropped");
        }
    }

    /// Runs `job` on a worker and posts `complete(output)` when it is done.
    pub fn run<T, J, C>(&self, job: J, complete: C)
    where
        T: Send + 'static,
        J: FnOnce() -> T + Send + 'static,
        C: FnOnce(T) -> UiEvent + Send + 'static,
    {
        let events = self.events.clone();
        self.runtime.spawn_blocking(move || {
            let output = job();
            let _ = events.send(complete(output));
        });
    }
}

/// Owns the worker pool and the receiving end of the UI queue.
pub struct Background {
    runtime: Runtime,
    sender: mpsc::UnboundedSender<UiEvent>,
    receiver: mpsc::UnboundedReceiver<UiEvent>,
}

impl Background {
    pub fn new(workers: usize) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers.max(1))
            .thread_name("tabhost-worker")
            .enable_all()
            .build()?;
        let (sender, receiver) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            sender,
            receiver,
        })
    }

    pub fn handle(&self) -> BackgroundHandle {
        BackgroundHandle {
            runtime: self.runtime.handle().clone(),
            events: self.sender.clone(),
        }
    }

    /// Next queued event, without blocking.
    pub fn try_next_event(&mut self) -> Option<UiEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks the calling thread until an event arrives or `timeout` passes.
    /// Must not be called from inside an async context.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<UiEvent> {
        let receiver = &mut self.receiver;
        self.runtime
            .block_on(async { tokio::time::timeout(timeout, receiver.recv()).await })
            .ok()
            .flatten()
    }
}
