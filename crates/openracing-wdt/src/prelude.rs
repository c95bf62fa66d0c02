//! Prelude for openracing-wdt.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use openracing_wdt::prelude::*;
//!
//! let registry: WdtRegistry<1> = WdtRegistry::new();
//! let periph: SimulatedWdt = SimulatedWdt::new();
//! let wdt = registry.instance(0, &periph);
//! wdt.initialize(None, None).expect("Failed to initialize");
//! ```

pub use crate::channel::{ChannelId, RequestMask};
pub use crate::config::{WdtBehaviour, WdtConfig, WdtConfigBuilder};
pub use crate::control_block::{TimeoutHandler, WdtControlBlock, WdtRegistry};
pub use crate::driver::Wdt;
pub use crate::error::{WdtError, WdtResult};
pub use crate::peripheral::WdtPeripheral;
pub use crate::simulated::SimulatedWdt;
pub use crate::state::DriverState;
