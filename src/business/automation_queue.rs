//! Automation Queue
//!
//! Every keyboard and clipboard side effect runs on one worker thread, one
//! job at a time, in enqueue order. Producers (hotkey callbacks, pairing
//! delivery) only ever push onto the channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::business::TextInserter;
use crate::error::AutomationError;

/// Text to put into the focused window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationJob {
    pub text: String,
    /// Typed key by key instead of pasted through the clipboard
    pub is_password: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Type or paste into the focused window
    Inject(AutomationJob),
    /// Leave text on the system clipboard
    SetClipboard(String),
}

enum Message {
    Run(Job),
    Stop,
}

/// Hooks run around every job on the worker thread.
pub trait JobHooks: Send + Sync {
    /// Called before any side effect; must silence global shortcuts
    fn before_job(&self);
    /// Called after every job, success or not; re-arms global shortcuts
    fn after_job(&self);
}

/// Cloneable producer handle. Enqueueing never blocks.
#[derive(Clone)]
pub struct JobSender {
    tx: Sender<Message>,
}

impl JobSender {
    /// Push a job. Returns false once the worker is gone.
    pub fn enqueue(&self, job: Job) -> bool {
        self.tx.send(Message::Run(job)).is_ok()
    }
}

pub struct JobReceiver {
    rx: Receiver<Message>,
}

impl JobReceiver {
    #[cfg(test)]
    pub(crate) fn try_next(&self) -> Option<Job> {
        match self.rx.try_recv().ok()? {
            Message::Run(job) => Some(job),
            Message::Stop => None,
        }
    }
}

/// Create the channel connecting producers to the worker
pub fn job_channel() -> (JobSender, JobReceiver) {
    let (tx, rx) = unbounded();
    (JobSender { tx }, JobReceiver { rx })
}

/// Handle to the running worker thread
pub struct AutomationQueue {
    sender: JobSender,
    worker: Option<JoinHandle<()>>,
}

impl AutomationQueue {
    /// Start the single consumer
    pub fn spawn(
        sender: JobSender,
        receiver: JobReceiver,
        inserter: Arc<TextInserter>,
        hooks: Arc<dyn JobHooks>,
        settle_delay: Duration,
    ) -> std::io::Result<Self> {
        let worker = thread::Builder::new()
            .name("automation-queue".into())
            .spawn(move || run_worker(receiver, &inserter, hooks.as_ref(), settle_delay))?;

        Ok(Self {
            sender,
            worker: Some(worker),
        })
    }

    pub fn sender(&self) -> JobSender {
        self.sender.clone()
    }

    /// Finish queued jobs, then stop the worker
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.sender.tx.send(Message::Stop);
            if worker.join().is_err() {
                tracing::error!("Automation worker panicked during shutdown");
            }
        }
    }
}

impl Drop for AutomationQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    receiver: JobReceiver,
    inserter: &TextInserter,
    hooks: &dyn JobHooks,
    settle_delay: Duration,
) {
    tracing::info!("Automation worker started");

    while let Ok(message) = receiver.rx.recv() {
        match message {
            Message::Run(job) => process_job(&job, inserter, hooks, settle_delay),
            Message::Stop => break,
        }
    }

    tracing::info!("Automation worker stopped");
}

fn process_job(job: &Job, inserter: &TextInserter, hooks: &dyn JobHooks, settle_delay: Duration) {
    hooks.before_job();
    thread::sleep(settle_delay);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| perform(job, inserter)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Automation job failed: {}", e),
        Err(_) => tracing::error!("Automation job panicked; worker continues"),
    }

    if let Err(e) = inserter.release_modifiers() {
        tracing::warn!("Post-job modifier release failed: {}", e);
    }
    hooks.after_job();
}

fn perform(job: &Job, inserter: &TextInserter) -> Result<(), AutomationError> {
    if let Err(e) = inserter.release_modifiers() {
        tracing::warn!("Pre-job modifier release failed: {}", e);
    }

    match job {
        Job::Inject(job) => {
            tracing::debug!(
                "Injecting {} chars ({})",
                job.text.chars().count(),
                if job.is_password { "typed" } else { "pasted" }
            );
            inserter.insert(job)
        }
        Job::SetClipboard(text) => {
            tracing::debug!("Placing {} chars on clipboard", text.chars().count());
            inserter.copy_to_clipboard(text)
        }
    }
}
