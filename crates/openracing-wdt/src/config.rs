//! Configuration types for the watchdog peripheral.

use crate::error::{WdtError, WdtResult};

/// Frequency of the low-frequency clock driving the watchdog counter.
pub const WDT_TICK_HZ: u64 = 32_768;

/// Largest reload value, in milliseconds, whose tick count still fits the
/// 32-bit counter reload register.
#[expect(
    clippy::cast_possible_truncation,
    reason = "u32::MAX * 1000 / 32768 is below u32::MAX"
)]
pub const MAX_RELOAD_MS: u32 = (u32::MAX as u64 * 1000 / WDT_TICK_HZ) as u32;

/// Highest interrupt priority level accepted (three priority bits).
pub const MAX_INTERRUPT_PRIORITY: u8 = 7;

/// Convert a reload duration in milliseconds to counter ticks.
///
/// Returns `None` when the result does not fit the 32-bit counter. The
/// arithmetic is done in 64 bits so the intermediate product cannot wrap.
#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "range checked before the cast")]
pub const fn ms_to_ticks(reload_value_ms: u32) -> Option<u32> {
    let ticks = reload_value_ms as u64 * WDT_TICK_HZ / 1000;
    if ticks > u32::MAX as u64 {
        None
    } else {
        Some(ticks as u32)
    }
}

/// How the watchdog counter behaves while the CPU sleeps or is halted by a
/// debugger.
///
/// The discriminants are the raw values written to the peripheral's
/// configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum WdtBehaviour {
    /// Counter pauses while sleeping and while halted.
    PauseSleepHalt = 0,
    /// Counter keeps running while sleeping, pauses while halted.
    #[default]
    RunSleep = 1,
    /// Counter pauses while sleeping, keeps running while halted.
    RunHalt = 8,
    /// Counter keeps running in both sleep and halt.
    RunSleepHalt = 9,
}

impl WdtBehaviour {
    /// Raw register value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decode a raw register value.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0 => Some(Self::PauseSleepHalt),
            1 => Some(Self::RunSleep),
            8 => Some(Self::RunHalt),
            9 => Some(Self::RunSleepHalt),
            _ => None,
        }
    }

    /// Whether the counter keeps running while the CPU sleeps.
    #[must_use]
    pub const fn runs_in_sleep(self) -> bool {
        matches!(self, Self::RunSleep | Self::RunSleepHalt)
    }

    /// Whether the counter keeps running while a debugger halts the CPU.
    #[must_use]
    pub const fn runs_in_halt(self) -> bool {
        matches!(self, Self::RunHalt | Self::RunSleepHalt)
    }
}

/// Watchdog peripheral configuration.
///
/// Plain `Copy` data; it is applied once during initialization or
/// reconfiguration and is not retained by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct WdtConfig {
    /// Sleep and debug-halt behaviour of the counter.
    pub behaviour: WdtBehaviour,

    /// Reload window in milliseconds.
    ///
    /// Default: 2000ms.
    pub reload_value_ms: u32,

    /// Priority of the timeout interrupt.
    ///
    /// Only used when a timeout handler is registered. Default: 7 (lowest).
    pub interrupt_priority: u8,
}

impl WdtConfig {
    /// Create a configuration with the given reload window and default
    /// behaviour and priority.
    ///
    /// # Errors
    ///
    /// Returns an error if `reload_value_ms` is zero or its tick count does
    /// not fit the 32-bit counter.
    pub fn new(reload_value_ms: u32) -> WdtResult<Self> {
        let config = Self {
            reload_value_ms,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WdtConfigBuilder {
        WdtConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WdtError::InvalidConfiguration`] if any value is out of range.
    pub fn validate(&self) -> WdtResult<()> {
        if self.reload_value_ms == 0 {
            return Err(WdtError::invalid_configuration(
                "reload_value_ms must be greater than 0",
            ));
        }
        if self.reload_value_ms > MAX_RELOAD_MS {
            return Err(WdtError::invalid_configuration(
                "reload_value_ms exceeds the 32-bit counter range",
            ));
        }
        if self.interrupt_priority > MAX_INTERRUPT_PRIORITY {
            return Err(WdtError::invalid_configuration(
                "interrupt_priority must not exceed 7",
            ));
        }
        Ok(())
    }

    /// Reload value converted to counter ticks.
    ///
    /// `None` if the value does not fit the counter; never the case for a
    /// configuration that passed [`validate`](Self::validate).
    #[must_use]
    pub const fn reload_ticks(&self) -> Option<u32> {
        ms_to_ticks(self.reload_value_ms)
    }

    /// Reload window as a `Duration`.
    #[must_use]
    pub fn reload_duration(&self) -> core::time::Duration {
        core::time::Duration::from_millis(u64::from(self.reload_value_ms))
    }
}

impl Default for WdtConfig {
    fn default() -> Self {
        Self {
            behaviour: WdtBehaviour::RunSleep,
            reload_value_ms: 2000,
            interrupt_priority: MAX_INTERRUPT_PRIORITY,
        }
    }
}

/// Builder for `WdtConfig`.
#[derive(Debug, Default)]
pub struct WdtConfigBuilder {
    config: WdtConfig,
}

impl WdtConfigBuilder {
    /// Set the counter behaviour.
    #[must_use]
    pub fn behaviour(mut self, behaviour: WdtBehaviour) -> Self {
        self.config.behaviour = behaviour;
        self
    }

    /// Set the reload window in milliseconds.
    #[must_use]
    pub fn reload_value_ms(mut self, ms: u32) -> Self {
        self.config.reload_value_ms = ms;
        self
    }

    /// Set the reload window from a `Duration`, saturating at `u32::MAX`
    /// milliseconds (which then fails validation).
    #[must_use]
    pub fn reload_value(mut self, reload: core::time::Duration) -> Self {
        self.config.reload_value_ms = u32::try_from(reload.as_millis()).unwrap_or(u32::MAX);
        self
    }

    /// Set the timeout interrupt priority.
    #[must_use]
    pub fn interrupt_priority(mut self, priority: u8) -> Self {
        self.config.interrupt_priority = priority;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WdtResult<WdtConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
