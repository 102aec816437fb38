//! Millisecond tick counter
//!
//! Every timeout of this crate is measured on a [`TickClock`]. Channels take the clock as a
//! type parameter, so the process-wide [`SysTickClock`] can be swapped for a stepping clock in
//! tests.
//!
//! All tick arithmetic wraps: the elapsed time since `start` is `now.wrapping_sub(start)`,
//! which stays correct across a counter overflow.
//!
//! ```ignore
//! let mut cp = cortex_m::Peripherals::take().unwrap();
//! SysTickClock::start(&mut cp.SYST, 40_000_000)?;
//!
//! #[exception]
//! fn SysTick() {
//!     SysTickClock.tick();
//! }
//! ```

use core::cell::Cell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use critical_section::Mutex;

use crate::error::ConfigError;

/// Timeout value that disables the timeout check of a blocking operation
pub const MAX_DELAY: u32 = 0x00FF_FFFF;

/// A source of millisecond ticks
pub trait TickClock {
    /// Returns the current tick count
    fn now(&self) -> u32;

    /// Advances the tick count by one millisecond
    fn tick(&self);

    /// Busy-waits for at least `ms` milliseconds
    ///
    /// One tick is added to the requested duration, because the first tick may arrive right
    /// after `start` was sampled. [`MAX_DELAY`] waits exactly that many ticks.
    fn delay(&self, ms: u32) {
        let start = self.now();
        let wait = if ms < MAX_DELAY { ms + 1 } else { ms };
        while self.now().wrapping_sub(start) < wait {}
    }
}

impl<T: TickClock + ?Sized> TickClock for &T {
    fn now(&self) -> u32 {
        (**self).now()
    }

    fn tick(&self) {
        (**self).tick()
    }

    fn delay(&self, ms: u32) {
        (**self).delay(ms)
    }
}

/// Returns true if more than `timeout` ticks elapsed since `start`
///
/// A timeout of [`MAX_DELAY`] never expires and a timeout of zero always has.
pub(crate) fn expired<C: TickClock>(clock: &C, start: u32, timeout: u32) -> bool {
    timeout != MAX_DELAY && (timeout == 0 || clock.now().wrapping_sub(start) > timeout)
}

static TICKS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// The process-wide tick counter, advanced from the SysTick exception
#[derive(Debug, Clone, Copy, Default)]
pub struct SysTickClock;

impl SysTickClock {
    /// Programs SysTick for a 1 ms period from the core clock and enables its exception
    ///
    /// The exception handler must call [`TickClock::tick`].
    pub fn start(syst: &mut SYST, core_clock_hz: u32) -> Result<(), ConfigError> {
        let reload = (core_clock_hz / 1000)
            .checked_sub(1)
            .filter(|&r| r != 0 && r <= MAX_DELAY)
            .ok_or(ConfigError::TickReload)?;
        syst.disable_counter();
        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(reload);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();
        debug!("SysTick reload {=u32}", reload);
        Ok(())
    }

    /// Stops tick increments by masking the SysTick exception
    pub fn suspend(syst: &mut SYST) {
        syst.disable_interrupt();
    }

    /// Resumes tick increments after [`suspend`](Self::suspend)
    pub fn resume(syst: &mut SYST) {
        syst.enable_interrupt();
    }
}

impl TickClock for SysTickClock {
    fn now(&self) -> u32 {
        critical_section::with(|cs| TICKS.borrow(cs).get())
    }

    fn tick(&self) {
        critical_section::with(|cs| {
            let ticks = TICKS.borrow(cs);
            ticks.set(ticks.get().wrapping_add(1));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StepClock;

    #[test]
    fn test_delay_adds_one_tick() {
        let clock = StepClock::new(0, 1);
        clock.delay(5);
        // now() was sampled once for start and once per spin; the last sample read 6
        assert_eq!(clock.peek(), 7);
    }

    #[test]
    fn test_delay_max_is_exact() {
        let clock = StepClock::new(0, 0x0010_0000);
        clock.delay(MAX_DELAY);
        assert!(clock.peek().wrapping_sub(0x0010_0000) >= MAX_DELAY);
    }

    #[test]
    fn test_delay_across_wrap() {
        let clock = StepClock::new(u32::MAX - 2, 1);
        clock.delay(4);
        assert_eq!(clock.peek(), 3);
    }

    #[test]
    fn test_expired() {
        let clock = StepClock::new(100, 0);
        assert!(expired(&clock, 100, 0));
        assert!(!expired(&clock, 100, 1));
        assert!(!expired(&clock, 0, MAX_DELAY));
        assert!(expired(&clock, 50, 49));
        assert!(!expired(&clock, 50, 50));
        assert!(!expired(&clock, u32::MAX - 10, 200));
        assert!(expired(&clock, u32::MAX - 10, 20));
    }

    #[test]
    fn test_systick_counts() {
        let clock = SysTickClock;
        let before = clock.now();
        clock.tick();
        clock.tick();
        assert_eq!(clock.now().wrapping_sub(before), 2);
    }

    #[test]
    fn test_reference_clock() {
        let clock = StepClock::new(10, 0);
        let by_ref = &clock;
        by_ref.tick();
        assert_eq!(by_ref.now(), 11);
    }
}
