//! Watchdog instance handle and its operations.
//!
//! A [`Wdt`] binds one control block to its peripheral. It is cheap to
//! create and holds no state of its own, so several modules can each build a
//! handle to the same instance.
//!
//! # Concurrency
//!
//! Only [`Wdt::allocate_channel`] is meant to be called from several
//! contexts; it runs inside a critical section. The state transition of
//! [`Wdt::enable`] takes the same critical section, so a channel is never
//! granted after the watchdog starts. `initialize`, `reconfigure` and the
//! feed operations are single-caller operations and take no lock.

use tracing::{debug, info, trace, warn};

use crate::channel::{ChannelId, MAX_CHANNELS, RequestMask};
use crate::config::WdtConfig;
use crate::control_block::{Reservation, Start, TimeoutHandler, WdtControlBlock};
use crate::error::{WdtError, WdtResult};
use crate::peripheral::WdtPeripheral;
use crate::state::{Admission, DriverState, Operation, admission};

/// Handle to one watchdog instance.
///
/// # Example
///
/// ```rust
/// use openracing_wdt::prelude::*;
///
/// let registry: WdtRegistry<1> = WdtRegistry::new();
/// let periph: SimulatedWdt<2> = SimulatedWdt::new();
/// let wdt = registry.instance(0, &periph);
///
/// wdt.initialize(Some(&WdtConfig::new(100)?), None)?;
/// let channel = wdt.allocate_channel()?;
/// wdt.enable();
///
/// wdt.feed_channel(channel);
/// assert_eq!(periph.reload_writes(channel.index()), 1);
/// # Ok::<(), WdtError>(())
/// ```
#[derive(Debug)]
pub struct Wdt<'a, P> {
    index: usize,
    control: &'a WdtControlBlock,
    peripheral: P,
}

impl<'a, P: WdtPeripheral> Wdt<'a, P> {
    pub(crate) fn new(index: usize, control: &'a WdtControlBlock, peripheral: P) -> Self {
        Self {
            index,
            control,
            peripheral,
        }
    }

    /// Initialize the instance, optionally applying `config` and storing a
    /// timeout `handler`.
    ///
    /// The timeout interrupt is armed only when both a configuration and a
    /// handler are supplied. A refused call leaves the previously stored
    /// handler in place.
    ///
    /// # Errors
    ///
    /// - [`WdtError::InvalidState`] if the instance was already initialized
    /// - [`WdtError::InvalidConfiguration`] if `config` does not validate; the
    ///   instance stays `Uninitialized`
    pub fn initialize(
        &self,
        config: Option<&WdtConfig>,
        handler: Option<TimeoutHandler>,
    ) -> WdtResult<()> {
        self.admit(Operation::Initialize)?;
        let ticks = config.map(|c| self.checked_ticks(c)).transpose()?;

        self.control
            .state_cell()
            .advance(DriverState::Uninitialized, DriverState::Initialized)
            .inspect_err(|err| self.refused(Operation::Initialize, *err))?;
        self.control.set_timeout_handler(handler);

        if let (Some(config), Some(ticks)) = (config, ticks) {
            self.apply(config, ticks);
        }

        info!(
            instance = self.index,
            configured = config.is_some(),
            handler = handler.is_some(),
            "Watchdog initialized"
        );
        Ok(())
    }

    /// Re-apply configuration before the watchdog is started.
    ///
    /// May be called any number of times while `Initialized`; the last call
    /// wins.
    ///
    /// # Errors
    ///
    /// - [`WdtError::InvalidState`] if the instance is not initialized
    /// - [`WdtError::Busy`] if the watchdog is already running
    /// - [`WdtError::InvalidConfiguration`] if `config` does not validate
    pub fn reconfigure(&self, config: &WdtConfig) -> WdtResult<()> {
        self.admit(Operation::Reconfigure)?;
        let ticks = self.checked_ticks(config)?;
        self.apply(config, ticks);
        debug!(
            instance = self.index,
            reload_ms = config.reload_value_ms,
            reload_ticks = ticks,
            "Watchdog reconfigured"
        );
        Ok(())
    }

    /// Start the watchdog. There is no way back short of a device reset.
    ///
    /// # Panics
    ///
    /// Panics if the instance is not `Initialized` or no channel has been
    /// allocated.
    pub fn enable(&self) {
        self.require(Operation::Enable);

        match critical_section::with(|cs| self.control.start(cs)) {
            Start::Started => {}
            Start::NoChannel => no_channel_allocated(self.index),
            Start::NotAdmitted(state) => contract_violation(self.index, Operation::Enable, state),
        }
        self.peripheral.trigger_start();

        info!(
            instance = self.index,
            channels = self.control.allocated_channels(),
            "Watchdog enabled"
        );
    }

    /// Allocate the next free reload channel and enable its reload path.
    ///
    /// Safe to call concurrently from several contexts; counting and
    /// enabling the reload path happen in one critical section. Never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`WdtError::ResourceExhausted`] when all
    /// [`max_channels`](Self::max_channels) are taken. No state changes in
    /// that case.
    ///
    /// # Panics
    ///
    /// Panics if the instance is not `Initialized`, including when a
    /// concurrent [`enable`](Self::enable) wins the race.
    pub fn allocate_channel(&self) -> WdtResult<ChannelId> {
        self.require(Operation::AllocateChannel);

        let reservation = critical_section::with(|cs| {
            let reservation = self.control.reserve_channel(cs, self.max_channels());
            if let Reservation::Granted(channel) = reservation {
                self.peripheral.enable_reload_path(channel);
            }
            reservation
        });

        match reservation {
            Reservation::Granted(channel) => {
                info!(instance = self.index, channel = channel.index(), "Channel allocated");
                Ok(channel)
            }
            Reservation::Exhausted => {
                self.refused(Operation::AllocateChannel, WdtError::ResourceExhausted);
                Err(WdtError::ResourceExhausted)
            }
            Reservation::NotAdmitted(state) => {
                contract_violation(self.index, Operation::AllocateChannel, state)
            }
        }
    }

    /// Reload every allocated channel.
    ///
    /// # Panics
    ///
    /// Panics if the watchdog is not running.
    pub fn feed(&self) {
        self.require(Operation::Feed);
        for index in 0..self.control.allocated_channels() {
            self.peripheral.request_reload(ChannelId::new(index));
        }
    }

    /// Reload only `channel`.
    ///
    /// # Panics
    ///
    /// Panics if the watchdog is not running or `channel` was not allocated
    /// on this instance.
    pub fn feed_channel(&self, channel: ChannelId) {
        self.require(Operation::Feed);
        assert!(
            channel.index() < self.control.allocated_channels(),
            "watchdog {}: channel {channel} was not allocated on this instance",
            self.index
        );
        self.peripheral.request_reload(channel);
    }

    /// Service the timeout interrupt.
    ///
    /// Captures the outstanding reload requests, clears the timeout event,
    /// and if the event was set calls the stored handler with the captured
    /// mask. The handler runs without any critical section held.
    ///
    /// Returns the captured mask when a timeout event was processed.
    pub fn irq_handler(&self) -> Option<RequestMask> {
        // Clearing the event also clears the status register.
        let requests = self.peripheral.read_request_status();
        if !self.peripheral.process_and_clear_timeout_event() {
            return None;
        }

        if let Some(handler) = self.control.timeout_handler() {
            trace!(instance = self.index, requests = requests.bits(), "Dispatching timeout");
            handler(requests);
        }
        Some(requests)
    }

    /// Registry index of this instance.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.control.state()
    }

    /// Whether the watchdog has been started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Number of channels handed out so far.
    #[must_use]
    pub fn allocated_channels(&self) -> u8 {
        self.control.allocated_channels()
    }

    /// Number of reload channels this instance can hand out: the
    /// peripheral's count, capped at [`MAX_CHANNELS`].
    #[must_use]
    pub fn max_channels(&self) -> u8 {
        if P::CHANNEL_COUNT < MAX_CHANNELS {
            P::CHANNEL_COUNT
        } else {
            MAX_CHANNELS
        }
    }

    /// Whether a timeout handler is registered.
    #[must_use]
    pub fn has_timeout_handler(&self) -> bool {
        self.control.has_timeout_handler()
    }

    /// The bound peripheral.
    #[must_use]
    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    fn apply(&self, config: &WdtConfig, ticks: u32) {
        self.peripheral.configure(config.behaviour, ticks);
        if self.control.has_timeout_handler() {
            self.peripheral.arm_interrupt(config.interrupt_priority);
        }
    }

    fn checked_ticks(&self, config: &WdtConfig) -> WdtResult<u32> {
        let ticks = config.validate().and_then(|()| {
            config.reload_ticks().ok_or(WdtError::invalid_configuration(
                "reload_value_ms exceeds the 32-bit counter range",
            ))
        });
        ticks.inspect_err(|err| {
            warn!(
                instance = self.index,
                reload_ms = config.reload_value_ms,
                error = %err,
                "Rejected watchdog configuration"
            );
        })
    }

    fn admit(&self, op: Operation) -> WdtResult<()> {
        let state = self.state();
        match admission(state, op) {
            Admission::Allowed => Ok(()),
            Admission::Refused(err) => {
                self.refused(op, err);
                Err(err)
            }
            Admission::ContractViolation => contract_violation(self.index, op, state),
        }
    }

    fn require(&self, op: Operation) {
        let state = self.state();
        if admission(state, op) != Admission::Allowed {
            contract_violation(self.index, op, state);
        }
    }

    fn refused(&self, op: Operation, err: WdtError) {
        warn!(
            instance = self.index,
            operation = op.as_str(),
            state = self.state().as_str(),
            error = err.as_str(),
            "Watchdog operation refused"
        );
    }
}

#[cold]
#[track_caller]
#[expect(clippy::panic, reason = "driver contract violations abort")]
fn no_channel_allocated(index: usize) -> ! {
    panic!("watchdog {index}: enable requires at least one allocated channel");
}

#[cold]
#[track_caller]
#[expect(clippy::panic, reason = "driver contract violations abort")]
fn contract_violation(index: usize, op: Operation, state: DriverState) -> ! {
    panic!(
        "watchdog {index}: {} not permitted in state {state}",
        op.as_str()
    );
}
