//! Simulated watchdog peripheral.
//!
//! This module provides `SimulatedWdt`, an atomic register model that
//! implements [`WdtPeripheral`] for host tests and hardware-free
//! environments.

use portable_atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::channel::{ChannelId, MAX_CHANNELS, RequestMask};
use crate::config::WdtBehaviour;
use crate::peripheral::WdtPeripheral;

/// Register model of a watchdog peripheral with `CHANNELS` reload registers.
///
/// Models the parts of the hardware the driver relies on:
///
/// - behaviour and counter reload value, ignored once started
/// - timeout interrupt enable and priority
/// - sticky run status
/// - reload-request enable (`RREN`), frozen once started
/// - reload-request status (`REQSTATUS`): a bit clears when its channel is
///   reloaded; when every enabled channel has reloaded the counter restarts
///   and all enabled bits are set again
/// - the timeout event, raised by [`expire`](Self::expire); clearing it also
///   clears `REQSTATUS`
///
/// Every write to a reload-request register is counted so tests can observe
/// exactly which channels were fed.
///
/// # Example
///
/// ```rust
/// use openracing_wdt::{SimulatedWdt, WdtPeripheral, WdtBehaviour};
///
/// let wdt: SimulatedWdt<2> = SimulatedWdt::new();
/// wdt.configure(WdtBehaviour::RunSleep, 3276);
/// assert_eq!(wdt.reload_ticks(), 3276);
/// assert!(!wdt.is_running());
/// ```
#[derive(Debug)]
pub struct SimulatedWdt<const CHANNELS: u8 = 8> {
    behaviour: AtomicU32,
    crv: AtomicU32,
    configure_writes: AtomicU32,
    int_enabled: AtomicBool,
    int_priority: AtomicU8,
    running: AtomicBool,
    rren: AtomicU32,
    reqstatus: AtomicU32,
    timeout_event: AtomicBool,
    status_read: AtomicBool,
    status_read_before_clear: AtomicBool,
    reload_cycles: AtomicU32,
    reload_writes: [AtomicU32; MAX_CHANNELS as usize],
}

impl<const CHANNELS: u8> SimulatedWdt<CHANNELS> {
    /// Create a peripheral in its reset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            behaviour: AtomicU32::new(WdtBehaviour::RunSleep.bits()),
            crv: AtomicU32::new(u32::MAX),
            configure_writes: AtomicU32::new(0),
            int_enabled: AtomicBool::new(false),
            int_priority: AtomicU8::new(0),
            running: AtomicBool::new(false),
            rren: AtomicU32::new(0),
            reqstatus: AtomicU32::new(0),
            timeout_event: AtomicBool::new(false),
            status_read: AtomicBool::new(false),
            status_read_before_clear: AtomicBool::new(false),
            reload_cycles: AtomicU32::new(0),
            reload_writes: [const { AtomicU32::new(0) }; MAX_CHANNELS as usize],
        }
    }

    /// Simulate the counter reaching zero.
    ///
    /// Raises the timeout event if the counter is running. Returns whether
    /// the event was raised.
    pub fn expire(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.timeout_event.store(true, Ordering::Release);
        true
    }

    /// Currently configured behaviour.
    #[must_use]
    pub fn behaviour(&self) -> Option<WdtBehaviour> {
        WdtBehaviour::from_bits(self.behaviour.load(Ordering::Acquire))
    }

    /// Counter reload value in ticks.
    #[must_use]
    pub fn reload_ticks(&self) -> u32 {
        self.crv.load(Ordering::Acquire)
    }

    /// Number of accepted configuration writes.
    #[must_use]
    pub fn configure_writes(&self) -> u32 {
        self.configure_writes.load(Ordering::Acquire)
    }

    /// Whether the timeout interrupt is enabled.
    #[must_use]
    pub fn interrupt_enabled(&self) -> bool {
        self.int_enabled.load(Ordering::Acquire)
    }

    /// Priority the timeout interrupt was armed with.
    #[must_use]
    pub fn interrupt_priority(&self) -> u8 {
        self.int_priority.load(Ordering::Acquire)
    }

    /// Whether the start task has been triggered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Channels whose reload-request register is enabled.
    #[must_use]
    pub fn enabled_channels(&self) -> RequestMask {
        RequestMask::from_bits(self.rren.load(Ordering::Acquire))
    }

    /// Outstanding reload requests, without recording a status read.
    #[must_use]
    pub fn pending_requests(&self) -> RequestMask {
        RequestMask::from_bits(self.reqstatus.load(Ordering::Acquire))
    }

    /// Whether a timeout event is waiting to be cleared.
    #[must_use]
    pub fn timeout_pending(&self) -> bool {
        self.timeout_event.load(Ordering::Acquire)
    }

    /// Number of reload-request writes to channel `index`.
    #[must_use]
    pub fn reload_writes(&self, index: u8) -> u32 {
        self.reload_writes
            .get(usize::from(index))
            .map_or(0, |count| count.load(Ordering::Acquire))
    }

    /// Number of times every enabled channel was reloaded and the counter
    /// restarted.
    #[must_use]
    pub fn reload_cycles(&self) -> u32 {
        self.reload_cycles.load(Ordering::Acquire)
    }

    /// Whether the most recent timeout-event clear was preceded by a status
    /// register read.
    #[must_use]
    pub fn status_read_before_clear(&self) -> bool {
        self.status_read_before_clear.load(Ordering::Acquire)
    }

    fn in_range(channel: ChannelId) -> bool {
        channel.index() < CHANNELS
    }
}

impl<const CHANNELS: u8> Default for SimulatedWdt<CHANNELS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: u8> WdtPeripheral for SimulatedWdt<CHANNELS> {
    const CHANNEL_COUNT: u8 = {
        assert!(CHANNELS <= MAX_CHANNELS, "at most 32 reload channels");
        CHANNELS
    };

    fn configure(&self, behaviour: WdtBehaviour, reload_ticks: u32) {
        if self.is_running() {
            return;
        }
        self.behaviour.store(behaviour.bits(), Ordering::Release);
        self.crv.store(reload_ticks, Ordering::Release);
        self.configure_writes.fetch_add(1, Ordering::AcqRel);
    }

    fn arm_interrupt(&self, priority: u8) {
        self.int_priority.store(priority, Ordering::Release);
        self.int_enabled.store(true, Ordering::Release);
    }

    fn trigger_start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let enabled = self.rren.load(Ordering::Acquire);
        self.reqstatus.store(enabled, Ordering::Release);
    }

    fn enable_reload_path(&self, channel: ChannelId) {
        if self.is_running() || !Self::in_range(channel) {
            return;
        }
        self.rren.fetch_or(channel.mask(), Ordering::AcqRel);
    }

    fn request_reload(&self, channel: ChannelId) {
        if let Some(count) = self.reload_writes.get(usize::from(channel.index())) {
            count.fetch_add(1, Ordering::AcqRel);
        }

        let enabled = self.rren.load(Ordering::Acquire);
        if !self.is_running() || enabled & channel.mask() == 0 {
            return;
        }

        let previous = self
            .reqstatus
            .fetch_and(!channel.mask(), Ordering::AcqRel);
        if previous & !channel.mask() == 0 {
            self.reqstatus.store(enabled, Ordering::Release);
            self.reload_cycles.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn read_request_status(&self) -> RequestMask {
        self.status_read.store(true, Ordering::Release);
        self.pending_requests()
    }

    fn process_and_clear_timeout_event(&self) -> bool {
        let read_first = self.status_read.swap(false, Ordering::AcqRel);
        self.status_read_before_clear
            .store(read_first, Ordering::Release);

        let was_set = self.timeout_event.swap(false, Ordering::AcqRel);
        if was_set {
            self.reqstatus.store(0, Ordering::Release);
        }
        was_set
    }
}
