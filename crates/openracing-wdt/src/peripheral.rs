//! Register access seam for the watchdog peripheral.
//!
//! The driver never touches registers itself. Board support code implements
//! [`WdtPeripheral`] over the memory-mapped block; host builds use
//! [`SimulatedWdt`](crate::SimulatedWdt).

use crate::channel::{ChannelId, RequestMask};
use crate::config::WdtBehaviour;

/// Register-level operations the watchdog driver depends on.
///
/// Methods take `&self`: like MMIO, writes go through a shared reference and
/// implementations provide their own interior mutability. None of them may
/// block, and all are called with the driver's preconditions already
/// checked.
///
/// # Ordering
///
/// Clearing the timeout event also clears the request status register, so
/// the driver always calls [`read_request_status`](Self::read_request_status)
/// before [`process_and_clear_timeout_event`](Self::process_and_clear_timeout_event).
pub trait WdtPeripheral: Sync {
    /// Number of reload-request registers the peripheral exposes.
    ///
    /// The driver hands out at most [`MAX_CHANNELS`](crate::MAX_CHANNELS)
    /// of them, however many are declared.
    const CHANNEL_COUNT: u8;

    /// Write counter behaviour and the reload value in ticks.
    fn configure(&self, behaviour: WdtBehaviour, reload_ticks: u32);

    /// Enable the timeout interrupt at `priority`.
    fn arm_interrupt(&self, priority: u8);

    /// Trigger the start task. Irreversible until device reset.
    fn trigger_start(&self);

    /// Enable the reload-request register of `channel`.
    fn enable_reload_path(&self, channel: ChannelId);

    /// Write the reload key to `channel`'s reload-request register.
    fn request_reload(&self, channel: ChannelId);

    /// Read which enabled channels still have an outstanding reload request.
    fn read_request_status(&self) -> RequestMask;

    /// Check and clear the timeout event.
    ///
    /// Returns `true` if the event was set.
    fn process_and_clear_timeout_event(&self) -> bool;
}

impl<P: WdtPeripheral> WdtPeripheral for &P {
    const CHANNEL_COUNT: u8 = P::CHANNEL_COUNT;

    fn configure(&self, behaviour: WdtBehaviour, reload_ticks: u32) {
        (**self).configure(behaviour, reload_ticks);
    }

    fn arm_interrupt(&self, priority: u8) {
        (**self).arm_interrupt(priority);
    }

    fn trigger_start(&self) {
        (**self).trigger_start();
    }

    fn enable_reload_path(&self, channel: ChannelId) {
        (**self).enable_reload_path(channel);
    }

    fn request_reload(&self, channel: ChannelId) {
        (**self).request_reload(channel);
    }

    fn read_request_status(&self) -> RequestMask {
        (**self).read_request_status()
    }

    fn process_and_clear_timeout_event(&self) -> bool {
        (**self).process_and_clear_timeout_event()
    }
}
