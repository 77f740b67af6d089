//! Business logic module

mod automation_queue;
mod desktop;
mod hotkey_manager;
mod pairing;
mod slot_registry;
mod text_inserter;

pub use automation_queue::{
    job_channel, AutomationJob, AutomationQueue, Job, JobHooks, JobReceiver, JobSender,
};
pub use desktop::{
    DeliveryRouter, DesktopApi, PairingInfo, PlatformParts, ReceivedKind, ReceivedNotice,
};
pub use hotkey_manager::HotkeyManager;
pub use pairing::{DeliverySink, PairingManager, PairingSession};
pub use slot_registry::{BindingsListener, SlotRegistry};
pub use text_inserter::TextInserter;
