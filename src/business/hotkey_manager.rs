//! Hotkey Manager
//!
//! Keeps global shortcuts in step with the slot registry. Each shortcut only
//! enqueues an automation job; the queue worker does the typing.
//! Rebuilds and suspensions share one gate, so a shortcut can never fire
//! while the binding set is half rebuilt. While a job runs the manager stays
//! suspended: rebuild requests are deferred to the end of the job.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::business::{Job, JobHooks, JobSender, SlotRegistry};
use crate::platform::HotkeyBackend;

/// Global shortcut registry bound to the slot registry.
pub struct HotkeyManager {
    backend: Box<dyn HotkeyBackend>,
    slots: Arc<SlotRegistry>,
    jobs: JobSender,
    rebind_delay: Duration,
    gate: Mutex<GateState>,
}

#[derive(Default)]
struct GateState {
    /// Set between `before_job` and `after_job`, and forever after `stop`
    suspended: bool,
    /// A rebuild was requested while suspended
    deferred: bool,
}

impl HotkeyManager {
    pub fn new(
        backend: Box<dyn HotkeyBackend>,
        slots: Arc<SlotRegistry>,
        jobs: JobSender,
        rebind_delay: Duration,
    ) -> Self {
        Self {
            backend,
            slots,
            jobs,
            rebind_delay,
            gate: Mutex::new(GateState::default()),
        }
    }

    fn gate(&self) -> MutexGuard<'_, GateState> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unbind everything, then bind every slot shortcut again.
    /// Returns how many shortcuts are now live; 0 while a job is running.
    pub fn rebuild(&self) -> usize {
        let mut gate = self.gate();
        if gate.suspended {
            gate.deferred = true;
            tracing::debug!("Hotkey rebuild deferred until the running job ends");
            return 0;
        }
        self.rebind()
    }

    /// Unbind every shortcut and keep them unbound until [`resume`](Self::resume)
    pub fn suspend(&self) {
        let mut gate = self.gate();
        gate.suspended = true;
        self.unhook();
    }

    /// Lift a suspension and bind every shortcut again
    pub fn resume(&self) -> usize {
        let mut gate = self.gate();
        gate.suspended = false;
        if std::mem::take(&mut gate.deferred) {
            tracing::debug!("Running deferred hotkey rebuild");
        }
        self.rebind()
    }

    fn unhook(&self) {
        if let Err(e) = self.backend.unregister_all() {
            tracing::error!("Error unhooking shortcuts: {}", e);
        }
    }

    // Caller holds the gate
    fn rebind(&self) -> usize {
        self.unhook();
        thread::sleep(self.rebind_delay);

        let mut bound = 0;
        for (slot_id, combo) in self.slots.bindings() {
            let slots = self.slots.clone();
            let jobs = self.jobs.clone();
            let target = slot_id.clone();
            let callback = Arc::new(move || {
                if let Some(job) = slots.job_for(&target) {
                    jobs.enqueue(Job::Inject(job));
                }
            });

            match self.backend.register(&combo, callback) {
                Ok(()) => bound += 1,
                Err(e) => tracing::error!("Failed to register hotkey {}: {}", combo, e),
            }
        }

        tracing::info!("Hotkeys rebuilt ({} bound)", bound);
        bound
    }

    /// Rebuild on a background thread
    pub fn rebuild_detached(self: &Arc<Self>) {
        let manager = self.clone();
        let spawned = thread::Builder::new()
            .name("hotkey-rebuild".into())
            .spawn(move || {
                manager.rebuild();
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to spawn hotkey rebuild: {}", e);
        }
    }

    /// Stop the hotkey manager
    pub fn stop(&self) {
        self.suspend();
        tracing::info!("Hotkeys released");
    }
}

impl JobHooks for HotkeyManager {
    fn before_job(&self) {
        self.suspend();
    }

    fn after_job(&self) {
        self.resume();
    }
}
