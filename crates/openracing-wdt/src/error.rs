//! Error types for watchdog driver operations.
//!
//! Only recoverable conditions are represented here. Calls that break the
//! driver's contract (enabling with no channels, feeding a stopped watchdog,
//! using a foreign channel) panic instead, because continuing would leave
//! the device without the protection the watchdog is supposed to give.

use thiserror::Error;

/// Errors returned by the watchdog instance manager.
///
/// The type is `Copy` and allocation free so it can be produced and
/// inspected from interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum WdtError {
    /// Operation is not permitted in the instance's current lifecycle state.
    #[error("Operation not permitted in the current driver state")]
    InvalidState,

    /// The watchdog is running and can no longer be reconfigured.
    #[error("Watchdog is running")]
    Busy,

    /// Every reload channel of the peripheral has already been handed out.
    #[error("All reload channels are allocated")]
    ResourceExhausted,

    /// The supplied configuration cannot be applied to the peripheral.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Which constraint was violated.
        reason: &'static str,
    },
}

impl WdtError {
    /// Create an invalid configuration error.
    #[must_use]
    pub const fn invalid_configuration(reason: &'static str) -> Self {
        Self::InvalidConfiguration { reason }
    }

    /// Numeric error code for compact logging.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::InvalidState => 1,
            Self::Busy => 2,
            Self::ResourceExhausted => 3,
            Self::InvalidConfiguration { .. } => 4,
        }
    }

    /// Short stable name of the error kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidState => "InvalidState",
            Self::Busy => "Busy",
            Self::ResourceExhausted => "ResourceExhausted",
            Self::InvalidConfiguration { .. } => "InvalidConfiguration",
        }
    }
}

/// A specialized `Result` type for watchdog driver operations.
pub type WdtResult<T> = core::result::Result<T, WdtError>;
