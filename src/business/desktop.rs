//! Desktop API
//!
//! The operations a desktop UI drives: slot editing, pairing, PIN checks and
//! hotkey reloads. Also owns the wiring between registry, queue and hotkeys.

use anyhow::Result;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::business::{
    job_channel, AutomationQueue, DeliverySink, HotkeyManager, Job, JobSender, PairingManager,
    SlotRegistry, TextInserter,
};
use crate::data::{AutomationConfig, Document, EncryptedStore, SlotTarget};
use crate::error::{PairingError, SlotError};
use crate::platform::{ClipboardAccess, HotkeyBackend, TextAction};
use crate::ui::{list_interfaces, render_qr_data_url, NetworkInterface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceivedKind {
    Clipboard,
    Slot,
}

/// Announcement that a phone delivered content, consumed once by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedNotice {
    pub target_id: String,
    pub kind: ReceivedKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairingInfo {
    pub url: String,
    /// PNG as a `data:` URL
    pub qr_image: String,
}

/// Routes accepted pairing content to its destination.
pub struct DeliveryRouter {
    slots: Arc<SlotRegistry>,
    jobs: JobSender,
    received: Mutex<Option<ReceivedNotice>>,
}

impl DeliveryRouter {
    pub fn new(slots: Arc<SlotRegistry>, jobs: JobSender) -> Self {
        Self {
            slots,
            jobs,
            received: Mutex::new(None),
        }
    }

    /// Take the latest notice, if any
    pub fn take_received(&self) -> Option<ReceivedNotice> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl DeliverySink for DeliveryRouter {
    fn deliver(&self, target: &SlotTarget, content: String) {
        let kind = match target {
            SlotTarget::Clipboard => {
                if !self.jobs.enqueue(Job::SetClipboard(content)) {
                    tracing::error!("Automation queue closed, clipboard delivery dropped");
                    return;
                }
                ReceivedKind::Clipboard
            }
            SlotTarget::Slot(id) => {
                if let Err(e) = self.slots.set_text(id, content) {
                    tracing::error!("Failed to store delivered text in {}: {}", id, e);
                    return;
                }
                ReceivedKind::Slot
            }
        };

        *self.received.lock().unwrap_or_else(PoisonError::into_inner) = Some(ReceivedNotice {
            target_id: target.id().to_string(),
            kind,
        });
    }
}

/// OS seams handed to [`DesktopApi::start`]
pub struct PlatformParts {
    pub keys: Box<dyn TextAction>,
    pub clipboard: Box<dyn ClipboardAccess>,
    pub hotkeys: Box<dyn HotkeyBackend>,
}

pub struct DesktopApi {
    slots: Arc<SlotRegistry>,
    pairing: Arc<PairingManager>,
    router: Arc<DeliveryRouter>,
    hotkeys: Arc<HotkeyManager>,
    queue: Mutex<Option<AutomationQueue>>,
    mobile_port: u16,
}

impl DesktopApi {
    /// Load the store, start the automation worker and bind every shortcut
    pub fn start(
        store: EncryptedStore,
        platform: PlatformParts,
        timing: AutomationConfig,
        mobile_port: u16,
    ) -> Result<Self> {
        let slots = Arc::new(SlotRegistry::new(store));
        let (sender, receiver) = job_channel();

        let hotkeys = Arc::new(HotkeyManager::new(
            platform.hotkeys,
            slots.clone(),
            sender.clone(),
            timing.rebind_delay(),
        ));
        let weak: Weak<HotkeyManager> = Arc::downgrade(&hotkeys);
        slots.on_bindings_changed(Arc::new(move || {
            if let Some(hotkeys) = weak.upgrade() {
                hotkeys.rebuild_detached();
            }
        }));

        let settle_delay = timing.settle_delay();
        let inserter = Arc::new(TextInserter::new(platform.keys, platform.clipboard, timing));
        let queue = AutomationQueue::spawn(
            sender.clone(),
            receiver,
            inserter,
            hotkeys.clone(),
            settle_delay,
        )?;

        let router = Arc::new(DeliveryRouter::new(slots.clone(), sender));
        let pairing = Arc::new(PairingManager::new(router.clone()));

        hotkeys.rebuild();

        Ok(Self {
            slots,
            pairing,
            router,
            hotkeys,
            queue: Mutex::new(Some(queue)),
            mobile_port,
        })
    }

    /// Session manager the pairing listener forwards to
    pub fn pairing(&self) -> Arc<PairingManager> {
        self.pairing.clone()
    }

    pub fn get_initial_state(&self) -> Document {
        self.slots.get_all()
    }

    pub fn get_interfaces(&self) -> Vec<NetworkInterface> {
        list_interfaces()
    }

    /// Arm a session for `target_id` and build the URL the phone opens.
    /// Unusable targets fail with [`SlotError`].
    pub fn begin_pairing(&self, target_id: &str, ip: &str) -> Result<PairingInfo> {
        let session = self.pairing.begin(target_id)?;
        let url = format!(
            "http://{}:{}/mobile_page?key={}",
            ip, self.mobile_port, session.key
        );
        let qr_image = render_qr_data_url(&url)?;
        Ok(PairingInfo { url, qr_image })
    }

    pub fn cancel_pairing(&self) {
        self.pairing.cancel();
    }

    /// Forward a phone submission to the session manager
    pub fn submit(&self, key: &str, content: &str) -> Result<SlotTarget, PairingError> {
        self.pairing.submit(key, content)
    }

    pub fn upsert_slot(
        &self,
        id: &str,
        text: String,
        is_password: bool,
        shortcut: Option<String>,
    ) -> Result<(), SlotError> {
        self.slots.upsert(id, text, is_password, shortcut)
    }

    pub fn delete_slot(&self, id: &str) -> bool {
        self.slots.delete(id)
    }

    /// Wipe every slot, the PIN and the store file; disarms pairing too
    pub fn reset_all(&self) -> bool {
        self.pairing.cancel();
        self.slots.reset();
        self.router.take_received();
        true
    }

    pub fn has_pin(&self) -> bool {
        self.slots.has_pin()
    }

    pub fn set_pin(&self, pin: &str) -> Result<(), SlotError> {
        self.slots.set_pin(pin)
    }

    pub fn verify_pin(&self, pin: &str) -> bool {
        self.slots.verify_pin(pin)
    }

    /// Rebuild shortcuts in the background
    pub fn reload_hotkeys(&self) {
        self.hotkeys.rebuild_detached();
    }

    pub fn poll_received(&self) -> Option<ReceivedNotice> {
        self.router.take_received()
    }

    /// Disarm pairing, drain the queue and release every shortcut
    pub fn shutdown(&self) {
        self.pairing.cancel();
        let queue = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut queue) = queue else {
            return;
        };
        queue.shutdown();
        self.hotkeys.stop();
    }
}

impl Drop for DesktopApi {
    fn drop(&mut self) {
        self.shutdown();
    }
}
