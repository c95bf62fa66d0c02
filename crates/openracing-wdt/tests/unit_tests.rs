//! Unit tests for the watchdog driver operations.

#![cfg(test)]

use openracing_wdt::prelude::*;
use portable_atomic::{AtomicU32, Ordering};

type TestResult = Result<(), Box<dyn std::error::Error>>;

mod lifecycle {
    use super::*;

    #[test]
    fn test_initial_state_is_uninitialized() {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        assert_eq!(wdt.state(), DriverState::Uninitialized);
        assert!(!wdt.is_running());
        assert_eq!(wdt.allocated_channels(), 0);
        assert_eq!(wdt.max_channels(), 8);
    }

    #[test]
    fn test_initialize_applies_config() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        let config = WdtConfig::builder()
            .behaviour(WdtBehaviour::RunSleepHalt)
            .reload_value_ms(1000)
            .build()?;

        wdt.initialize(Some(&config), None)?;

        assert_eq!(wdt.state(), DriverState::Initialized);
        assert_eq!(periph.reload_ticks(), 32_768);
        assert_eq!(periph.behaviour(), Some(WdtBehaviour::RunSleepHalt));
        Ok(())
    }

    #[test]
    fn test_double_initialize_is_invalid_state() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(None, None)?;
        let result = wdt.initialize(None, None);

        assert_eq!(result, Err(WdtError::InvalidState));
        assert_eq!(wdt.state(), DriverState::Initialized);
        Ok(())
    }

    #[test]
    fn test_rejected_initialize_keeps_first_handler() -> TestResult {
        static FIRST: AtomicU32 = AtomicU32::new(0);
        static SECOND: AtomicU32 = AtomicU32::new(0);
        fn first(_: RequestMask) {
            FIRST.fetch_add(1, Ordering::SeqCst);
        }
        fn second(_: RequestMask) {
            SECOND.fetch_add(1, Ordering::SeqCst);
        }

        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<1> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(Some(&WdtConfig::default()), Some(first))?;
        assert_eq!(
            wdt.initialize(Some(&WdtConfig::default()), Some(second)),
            Err(WdtError::InvalidState)
        );

        wdt.allocate_channel()?;
        wdt.enable();
        periph.expire();
        wdt.irq_handler();

        assert_eq!(FIRST.load(Ordering::SeqCst), 1);
        assert_eq!(SECOND.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[test]
    fn test_rejected_initialize_does_not_clear_handler() -> TestResult {
        fn handler(_: RequestMask) {}

        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(None, Some(handler))?;
        assert!(wdt.initialize(None, None).is_err());
        assert!(wdt.has_timeout_handler());
        Ok(())
    }

    #[test]
    fn test_reconfigure_before_initialize() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        let result = wdt.reconfigure(&WdtConfig::new(100)?);
        assert_eq!(result, Err(WdtError::InvalidState));
        assert_eq!(periph.configure_writes(), 0);
        Ok(())
    }

    #[test]
    fn test_reconfigure_while_running_is_busy() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(Some(&WdtConfig::new(100)?), None)?;
        wdt.allocate_channel()?;
        wdt.enable();

        let result = wdt.reconfigure(&WdtConfig::new(50)?);
        assert_eq!(result, Err(WdtError::Busy));
        assert_eq!(periph.reload_ticks(), 3276);
        Ok(())
    }

    #[test]
    fn test_reconfigure_is_repeatable() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(None, None)?;
        for ms in [10, 20, 30] {
            wdt.reconfigure(&WdtConfig::new(ms)?)?;
        }

        assert_eq!(periph.configure_writes(), 3);
        assert_eq!(periph.reload_ticks(), 983);
        assert_eq!(wdt.state(), DriverState::Initialized);
        Ok(())
    }

    #[test]
    fn test_reconfigure_rejects_invalid_config() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(Some(&WdtConfig::new(100)?), None)?;

        let config = WdtConfig {
            reload_value_ms: u32::MAX,
            ..WdtConfig::default()
        };
        let result = wdt.reconfigure(&config);

        assert!(matches!(result, Err(WdtError::InvalidConfiguration { .. })));
        assert_eq!(periph.reload_ticks(), 3276);
        Ok(())
    }

    #[test]
    fn test_reconfigure_arms_interrupt_at_configured_priority() -> TestResult {
        fn handler(_: RequestMask) {}

        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(None, Some(handler))?;
        assert!(!periph.interrupt_enabled());

        wdt.reconfigure(&WdtConfig::builder().interrupt_priority(2).build()?)?;
        assert!(periph.interrupt_enabled());
        assert_eq!(periph.interrupt_priority(), 2);

        wdt.reconfigure(&WdtConfig::builder().interrupt_priority(5).build()?)?;
        assert_eq!(periph.interrupt_priority(), 5);
        Ok(())
    }

    #[test]
    fn test_enable_starts_peripheral() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);

        wdt.initialize(None, None)?;
        wdt.allocate_channel()?;
        wdt.enable();

        assert_eq!(wdt.state(), DriverState::PoweredOn);
        assert!(wdt.is_running());
        assert!(periph.is_running());
        Ok(())
    }
}

mod allocation {
    use super::*;

    #[test]
    fn test_channels_are_sequential() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<4> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(None, None)?;

        for expected in 0..4u8 {
            let channel = wdt.allocate_channel()?;
            assert_eq!(channel.index(), expected);
        }
        assert_eq!(wdt.allocated_channels(), 4);
        assert_eq!(periph.enabled_channels().bits(), 0b1111);
        Ok(())
    }

    #[test]
    fn test_exhaustion_leaves_state_unchanged() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<1> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(None, None)?;

        wdt.allocate_channel()?;
        assert_eq!(wdt.allocate_channel(), Err(WdtError::ResourceExhausted));
        assert_eq!(wdt.allocate_channel(), Err(WdtError::ResourceExhausted));

        assert_eq!(wdt.allocated_channels(), 1);
        assert_eq!(periph.enabled_channels().bits(), 0b1);
        assert_eq!(wdt.state(), DriverState::Initialized);
        Ok(())
    }
}

mod wide_peripheral {
    use super::*;
    use openracing_wdt::MAX_CHANNELS;

    /// Peripheral declaring more reload registers than a request mask holds.
    #[derive(Debug, Default)]
    struct WidePeripheral {
        enabled: AtomicU32,
        paths: AtomicU32,
    }

    impl WdtPeripheral for WidePeripheral {
        const CHANNEL_COUNT: u8 = 40;

        fn configure(&self, _behaviour: WdtBehaviour, _reload_ticks: u32) {}

        fn arm_interrupt(&self, _priority: u8) {}

        fn trigger_start(&self) {}

        fn enable_reload_path(&self, channel: ChannelId) {
            self.enabled.fetch_or(channel.mask(), Ordering::SeqCst);
            self.paths.fetch_add(1, Ordering::SeqCst);
        }

        fn request_reload(&self, _channel: ChannelId) {}

        fn read_request_status(&self) -> RequestMask {
            RequestMask::EMPTY
        }

        fn process_and_clear_timeout_event(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_allocation_capped_at_mask_width() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph = WidePeripheral::default();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(None, None)?;

        assert_eq!(wdt.max_channels(), MAX_CHANNELS);
        for expected in 0..MAX_CHANNELS {
            assert_eq!(wdt.allocate_channel()?.index(), expected);
        }
        assert_eq!(wdt.allocate_channel(), Err(WdtError::ResourceExhausted));

        assert_eq!(wdt.allocated_channels(), MAX_CHANNELS);
        assert_eq!(periph.enabled.load(Ordering::SeqCst), u32::MAX);
        assert_eq!(periph.paths.load(Ordering::SeqCst), 32);
        Ok(())
    }
}

mod feeding {
    use super::*;

    #[test]
    fn test_feed_reloads_every_allocated_channel_once() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(None, None)?;
        for _ in 0..3 {
            wdt.allocate_channel()?;
        }
        wdt.enable();

        wdt.feed();

        for index in 0..3 {
            assert_eq!(periph.reload_writes(index), 1);
        }
        for index in 3..8 {
            assert_eq!(periph.reload_writes(index), 0);
        }
        assert_eq!(periph.reload_cycles(), 1);
        Ok(())
    }

    #[test]
    fn test_feed_channel_touches_only_that_channel() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<3> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(None, None)?;
        let [_, second, _] = [
            wdt.allocate_channel()?,
            wdt.allocate_channel()?,
            wdt.allocate_channel()?,
        ];
        wdt.enable();

        wdt.feed_channel(second);

        assert_eq!(periph.reload_writes(0), 0);
        assert_eq!(periph.reload_writes(1), 1);
        assert_eq!(periph.reload_writes(2), 0);
        assert_eq!(periph.pending_requests().bits(), 0b101);
        Ok(())
    }
}

mod interrupt {
    use super::*;

    #[test]
    fn test_handler_receives_outstanding_channels() -> TestResult {
        static LAST_MASK: AtomicU32 = AtomicU32::new(u32::MAX);
        fn handler(requests: RequestMask) {
            LAST_MASK.store(requests.bits(), Ordering::SeqCst);
        }

        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<3> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(Some(&WdtConfig::new(100)?), Some(handler))?;
        let first = wdt.allocate_channel()?;
        wdt.allocate_channel()?;
        wdt.allocate_channel()?;
        wdt.enable();

        wdt.feed_channel(first);
        periph.expire();
        let captured = wdt.irq_handler();

        assert_eq!(captured.map(RequestMask::bits), Some(0b110));
        assert_eq!(LAST_MASK.load(Ordering::SeqCst), 0b110);
        assert!(!periph.timeout_pending());
        Ok(())
    }

    #[test]
    fn test_status_read_before_event_cleared() -> TestResult {
        fn handler(_: RequestMask) {}

        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<2> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(Some(&WdtConfig::default()), Some(handler))?;
        wdt.allocate_channel()?;
        wdt.enable();

        periph.expire();
        wdt.irq_handler();

        assert!(periph.status_read_before_clear());
        assert!(periph.pending_requests().is_empty());
        Ok(())
    }

    #[test]
    fn test_timeout_without_handler_is_cleared() -> TestResult {
        let registry: WdtRegistry<1> = WdtRegistry::new();
        let periph: SimulatedWdt<2> = SimulatedWdt::new();
        let wdt = registry.instance(0, &periph);
        wdt.initialize(Some(&WdtConfig::default()), None)?;
        wdt.allocate_channel()?;
        wdt.enable();

        periph.expire();
        let captured = wdt.irq_handler();

        assert_eq!(captured.map(RequestMask::bits), Some(0b1));
        assert!(!periph.timeout_pending());
        assert!(!periph.interrupt_enabled());
        Ok(())
    }
}
