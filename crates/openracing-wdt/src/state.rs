//! Driver lifecycle state machine.
//!
//! Every public operation asks [`admission`] whether it may run in the
//! current state. The answer comes from one table, so the legal transitions
//! live in one place instead of being re-checked ad hoc in each operation.
//!
//! ```text
//! Uninitialized ──initialize()──► Initialized ──enable()──► PoweredOn
//!                                   │     ▲
//!                    reconfigure()  │     │  allocate_channel()
//!                                   └─────┘
//! ```
//!
//! There is no edge leaving `PoweredOn`: once the hardware counter is
//! started it can only be stopped by a device reset.

use portable_atomic::{AtomicU8, Ordering};

use crate::error::WdtError;

/// Lifecycle state of one watchdog instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum DriverState {
    /// Control block has not been initialized.
    #[default]
    Uninitialized = 0,
    /// Initialized; may be configured and have channels allocated.
    Initialized = 1,
    /// Counter started. Terminal for the lifetime of the device.
    PoweredOn = 2,
}

impl DriverState {
    /// Convert from raw `u8` value.
    #[must_use]
    pub const fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Uninitialized),
            1 => Some(Self::Initialized),
            2 => Some(Self::PoweredOn),
            _ => None,
        }
    }

    /// Convert to raw `u8` value.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Whether the hardware counter is running.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::PoweredOn)
    }

    /// Get the state as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::PoweredOn => "PoweredOn",
        }
    }
}

impl core::fmt::Display for DriverState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver operations subject to a state check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// First-time initialization.
    Initialize,
    /// Re-applying configuration before start.
    Reconfigure,
    /// Starting the counter.
    Enable,
    /// Handing out a reload channel.
    AllocateChannel,
    /// Reloading one or all channels.
    Feed,
}

impl Operation {
    /// Get the operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Reconfigure => "reconfigure",
            Self::Enable => "enable",
            Self::AllocateChannel => "allocate_channel",
            Self::Feed => "feed",
        }
    }
}

/// Outcome of checking an operation against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The operation may proceed.
    Allowed,
    /// The operation is refused with a recoverable error.
    Refused(WdtError),
    /// The caller broke the driver contract; the operation must not proceed.
    ContractViolation,
}

/// Decide whether `op` may run while the instance is in `state`.
#[must_use]
pub const fn admission(state: DriverState, op: Operation) -> Admission {
    use DriverState::{Initialized, PoweredOn, Uninitialized};
    use Operation::{AllocateChannel, Enable, Feed, Initialize, Reconfigure};

    match (state, op) {
        (Uninitialized, Initialize)
        | (Initialized, Reconfigure | Enable | AllocateChannel)
        | (PoweredOn, Feed) => Admission::Allowed,

        (Initialized | PoweredOn, Initialize) | (Uninitialized, Reconfigure) => {
            Admission::Refused(WdtError::InvalidState)
        }
        (PoweredOn, Reconfigure) => Admission::Refused(WdtError::Busy),

        (Uninitialized | PoweredOn, Enable | AllocateChannel)
        | (Uninitialized | Initialized, Feed) => Admission::ContractViolation,
    }
}

/// Whether `from -> to` is an edge of the lifecycle graph.
#[must_use]
pub const fn is_legal_transition(from: DriverState, to: DriverState) -> bool {
    matches!(
        (from, to),
        (DriverState::Uninitialized, DriverState::Initialized)
            | (DriverState::Initialized, DriverState::PoweredOn)
    )
}

/// Atomic holder of a [`DriverState`].
///
/// The only mutator is [`advance`](Self::advance), which refuses anything
/// that is not a forward edge of the lifecycle graph. Reads are lock-free and
/// safe from interrupt context.
#[derive(Debug)]
pub struct StateCell {
    raw: AtomicU8,
}

impl StateCell {
    /// Create a cell in the `Uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: AtomicU8::new(DriverState::Uninitialized.to_raw()),
        }
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> DriverState {
        DriverState::from_raw(self.raw.load(Ordering::Acquire))
            .unwrap_or(DriverState::Uninitialized)
    }

    /// Move from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`WdtError::InvalidState`] if `from -> to` is not a legal
    /// transition or the cell is not currently in `from`.
    pub fn advance(&self, from: DriverState, to: DriverState) -> Result<(), WdtError> {
        if !is_legal_transition(from, to) {
            return Err(WdtError::InvalidState);
        }
        self.raw
            .compare_exchange(from.to_raw(), to.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_current| WdtError::InvalidState)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
