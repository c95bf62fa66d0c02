//! Per-instance control blocks and the fixed registry that owns them.
//!
//! Control blocks are `const`-constructed so a registry can live in a
//! `static` for the lifetime of the device. They are never handed out by
//! `&mut`; all mutation goes through atomics or a critical section.

use core::cell::Cell;

use critical_section::{CriticalSection, Mutex};
use portable_atomic::{AtomicU8, Ordering};

use crate::channel::{ChannelId, RequestMask};
use crate::driver::Wdt;
use crate::peripheral::WdtPeripheral;
use crate::state::{Admission, DriverState, Operation, StateCell, admission};

/// Timeout notification callback.
///
/// Receives the channels whose reload request was still outstanding when the
/// counter expired. Runs in interrupt context without any driver critical
/// section held; it must be short, must not block, and must not call
/// [`Wdt::allocate_channel`].
pub type TimeoutHandler = fn(RequestMask);

/// Outcome of claiming a channel under the allocation critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reservation {
    Granted(ChannelId),
    Exhausted,
    NotAdmitted(DriverState),
}

/// Outcome of the `Initialized -> PoweredOn` step of `enable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Start {
    Started,
    NoChannel,
    NotAdmitted(DriverState),
}

/// Driver-local data of one watchdog instance.
pub struct WdtControlBlock {
    state: StateCell,
    alloc_index: AtomicU8,
    handler: Mutex<Cell<Option<TimeoutHandler>>>,
}

impl WdtControlBlock {
    /// Create an `Uninitialized` control block with no channels and no handler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: StateCell::new(),
            alloc_index: AtomicU8::new(0),
            handler: Mutex::new(Cell::new(None)),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state.get()
    }

    /// Number of reload channels handed out so far.
    #[must_use]
    pub fn allocated_channels(&self) -> u8 {
        self.alloc_index.load(Ordering::Acquire)
    }

    /// Whether a timeout handler is stored.
    #[must_use]
    pub fn has_timeout_handler(&self) -> bool {
        self.timeout_handler().is_some()
    }

    pub(crate) fn state_cell(&self) -> &StateCell {
        &self.state
    }

    pub(crate) fn timeout_handler(&self) -> Option<TimeoutHandler> {
        critical_section::with(|cs| self.handler.borrow(cs).get())
    }

    pub(crate) fn set_timeout_handler(&self, handler: Option<TimeoutHandler>) {
        critical_section::with(|cs| self.handler.borrow(cs).set(handler));
    }

    /// Claim the next channel index if the instance is `Initialized` and
    /// fewer than `max` are taken.
    ///
    /// The critical-section token makes the state check, the compare and the
    /// increment one indivisible step with respect to [`start`](Self::start).
    pub(crate) fn reserve_channel(&self, _cs: CriticalSection<'_>, max: u8) -> Reservation {
        let state = self.state();
        if admission(state, Operation::AllocateChannel) != Admission::Allowed {
            return Reservation::NotAdmitted(state);
        }
        let index = self.alloc_index.load(Ordering::Acquire);
        if index >= max {
            return Reservation::Exhausted;
        }
        self.alloc_index
            .store(index.saturating_add(1), Ordering::Release);
        Reservation::Granted(ChannelId::new(index))
    }

    /// Move `Initialized -> PoweredOn` once at least one channel exists.
    ///
    /// Runs under the same critical section as [`reserve_channel`], so no
    /// channel can be granted after the transition.
    ///
    /// [`reserve_channel`]: Self::reserve_channel
    pub(crate) fn start(&self, _cs: CriticalSection<'_>) -> Start {
        if self.allocated_channels() == 0 {
            return Start::NoChannel;
        }
        match self
            .state
            .advance(DriverState::Initialized, DriverState::PoweredOn)
        {
            Ok(()) => Start::Started,
            Err(_) => Start::NotAdmitted(self.state()),
        }
    }
}

impl Default for WdtControlBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for WdtControlBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WdtControlBlock")
            .field("state", &self.state())
            .field("allocated_channels", &self.allocated_channels())
            .field("has_timeout_handler", &self.has_timeout_handler())
            .finish()
    }
}

/// Fixed table of control blocks, one per physical watchdog instance.
///
/// # Example
///
/// ```rust
/// use openracing_wdt::{DriverState, SimulatedWdt, WdtRegistry};
///
/// static WDT_CONTROL: WdtRegistry<1> = WdtRegistry::new();
/// static WDT0: SimulatedWdt = SimulatedWdt::new();
///
/// let wdt = WDT_CONTROL.instance(0, &WDT0);
/// assert_eq!(wdt.state(), DriverState::Uninitialized);
/// ```
#[derive(Debug)]
pub struct WdtRegistry<const N: usize> {
    blocks: [WdtControlBlock; N],
}

impl<const N: usize> WdtRegistry<N> {
    /// Create a registry with every instance `Uninitialized`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: [const { WdtControlBlock::new() }; N],
        }
    }

    /// Number of instances.
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the registry holds no instances.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Bind instance `index` to its peripheral.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `N`; an unknown instance is a
    /// programming error.
    #[expect(clippy::panic, reason = "an unknown instance is a contract violation")]
    pub fn instance<P: WdtPeripheral>(&self, index: usize, peripheral: P) -> Wdt<'_, P> {
        let Some(block) = self.blocks.get(index) else {
            panic!("watchdog instance {index} out of range (registry holds {N})");
        };
        Wdt::new(index, block, peripheral)
    }
}

impl<const N: usize> Default for WdtRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
