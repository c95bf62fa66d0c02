//! Interrupt entry point generation.

/// Define a zero-argument interrupt entry point for one watchdog instance.
///
/// The generated function resolves the instance from a `static`
/// [`WdtRegistry`](crate::WdtRegistry) and a `static` peripheral and runs
/// [`Wdt::irq_handler`](crate::Wdt::irq_handler). Register it with the
/// target's vector table for the watchdog's timeout interrupt line.
///
/// # Example
///
/// ```rust
/// use openracing_wdt::{wdt_irq_handler, SimulatedWdt, WdtRegistry};
///
/// static WDT_CONTROL: WdtRegistry<1> = WdtRegistry::new();
/// static WDT0: SimulatedWdt = SimulatedWdt::new();
///
/// wdt_irq_handler!(
///     /// Timeout interrupt of WDT0.
///     pub fn wdt0_irq_handler, WDT_CONTROL, 0, WDT0
/// );
///
/// wdt0_irq_handler();
/// ```
#[macro_export]
macro_rules! wdt_irq_handler {
    ($(#[$meta:meta])* $vis:vis fn $name:ident, $registry:expr, $index:expr, $peripheral:expr) => {
        $(#[$meta])*
        $vis fn $name() {
            $registry.instance($index, &$peripheral).irq_handler();
        }
    };
}
