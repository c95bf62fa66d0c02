//! # openracing-wdt
//!
//! Multi-channel hardware watchdog timer driver core.
//!
//! This crate provides a `#![no_std]` driver for a watchdog peripheral with
//! several reload-request registers:
//! - Lifecycle state machine with a single admission table
//! - Monotonic reload channel allocation, safe against concurrent callers
//! - Global and per-channel feeding
//! - Timeout interrupt dispatch to a user handler
//! - `WdtPeripheral` trait as the register access seam
//! - `SimulatedWdt` register model for host testing
//!
//! ## Channels
//!
//! Every allocated channel must be reloaded within the reload window. The
//! watchdog resets the device if any one of them is not, so independent
//! components can each own a channel and prove their own liveness.
//!
//! ## Contract
//!
//! Recoverable errors (`InvalidState`, `Busy`, `ResourceExhausted`,
//! `InvalidConfiguration`) are returned as [`WdtError`]. Misuse that would
//! silently defeat the watchdog panics instead: enabling with no channel,
//! allocating after start, feeding before start, feeding a foreign channel.
//!
//! ## State Machine
//!
//! ```text
//! ┌───────────────┐ initialize() ┌─────────────┐ enable() ┌───────────┐
//! │ Uninitialized │─────────────►│ Initialized │─────────►│ PoweredOn │
//! └───────────────┘              └─────────────┘          └───────────┘
//!                                 reconfigure()            feed()
//!                                 allocate_channel()       feed_channel()
//! ```
//!
//! ## Example
//!
//! ```rust
//! use openracing_wdt::prelude::*;
//!
//! static WDT_CONTROL: WdtRegistry<1> = WdtRegistry::new();
//! static WDT0: SimulatedWdt<2> = SimulatedWdt::new();
//!
//! fn on_timeout(_stuck: RequestMask) {
//!     // Last chance to persist diagnostics before the reset.
//! }
//!
//! let wdt = WDT_CONTROL.instance(0, &WDT0);
//! let config = WdtConfig::new(100)?;
//! wdt.initialize(Some(&config), Some(on_timeout))?;
//!
//! let control_loop = wdt.allocate_channel()?;
//! let telemetry = wdt.allocate_channel()?;
//! wdt.enable();
//!
//! wdt.feed_channel(control_loop);
//! wdt.feed_channel(telemetry);
//! assert!(wdt.is_running());
//! # Ok::<(), WdtError>(())
//! ```

#![no_std]
#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(any(feature = "std", test))]
extern crate std;

mod macros;

pub mod channel;
pub mod config;
pub mod control_block;
pub mod driver;
pub mod error;
pub mod peripheral;
pub mod prelude;
pub mod simulated;
pub mod state;

pub use channel::{ChannelId, MAX_CHANNELS, RequestMask};
pub use config::{MAX_INTERRUPT_PRIORITY, MAX_RELOAD_MS, WDT_TICK_HZ, WdtBehaviour, WdtConfig};
pub use control_block::{TimeoutHandler, WdtControlBlock, WdtRegistry};
pub use driver::Wdt;
pub use error::{WdtError, WdtResult};
pub use peripheral::WdtPeripheral;
pub use simulated::SimulatedWdt;
pub use state::{DriverState, Operation};
