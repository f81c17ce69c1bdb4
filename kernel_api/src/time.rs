//! Emulated time
//!
//! Guest time is measured in CPU cycles of the emulated processor. Delays
//! requested in host units (microseconds for event signals, nanoseconds for
//! timers and wait timeouts) are converted through a [`ClockRate`] so that
//! deferred work and CPU-visible time stay on the same timeline.

use crate::KernelError;
use core::ops::Add;
use serde::{Deserialize, Serialize};

/// Clock of the emulated application CPU, in cycles per second
pub const BASE_CLOCK_RATE_ARM11: u64 = 268_111_856;

/// Cycles-per-second of the emulated CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ClockRate {
    hz: u64,
}

impl ClockRate {
    /// The application CPU clock
    pub const fn arm11() -> Self {
        Self {
            hz: BASE_CLOCK_RATE_ARM11,
        }
    }

    pub fn new(hz: u64) -> Result<Self, KernelError> {
        if hz == 0 {
            return Err(KernelError::ZeroClockRate);
        }
        Ok(Self { hz })
    }

    pub const fn hz(&self) -> u64 {
        self.hz
    }

    /// Converts microseconds to cycles, saturating at `u64::MAX`
    pub fn us_to_cycles(&self, us: u64) -> u64 {
        scale(us, self.hz, 1_000_000)
    }

    /// Converts nanoseconds to cycles, saturating at `u64::MAX`
    pub fn ns_to_cycles(&self, ns: u64) -> u64 {
        scale(ns, self.hz, 1_000_000_000)
    }

    /// Converts cycles back to whole microseconds
    pub fn cycles_to_us(&self, cycles: u64) -> u64 {
        scale(cycles, 1_000_000, self.hz)
    }
}

impl Default for ClockRate {
    fn default() -> Self {
        Self::arm11()
    }
}

impl TryFrom<u64> for ClockRate {
    type Error = KernelError;

    fn try_from(hz: u64) -> Result<Self, Self::Error> {
        Self::new(hz)
    }
}

impl From<ClockRate> for u64 {
    fn from(rate: ClockRate) -> Self {
        rate.hz
    }
}

fn scale(value: u64, numerator: u64, denominator: u64) -> u64 {
    let wide = value as u128 * numerator as u128 / denominator as u128;
    u64::try_from(wide).unwrap_or(u64::MAX)
}

/// A guest-requested span of time
///
/// Used for wait timeouts and timer periods. The guest passes nanoseconds;
/// conversion to cycles happens in the kernel against its clock rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    nanos: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { nanos: 0 };

    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self {
            nanos: micros.saturating_mul(1_000),
        }
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis.saturating_mul(1_000_000),
        }
    }

    pub const fn as_nanos(&self) -> u64 {
        self.nanos
    }

    pub const fn is_zero(&self) -> bool {
        self.nanos == 0
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, other: Duration) -> Self::Output {
        Duration::from_nanos(self.nanos.saturating_add(other.nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_clock_rejected() {
        assert_eq!(ClockRate::new(0), Err(KernelError::ZeroClockRate));
    }

    #[test]
    fn test_us_to_cycles_at_arm11_rate() {
        let clock = ClockRate::arm11();
        assert_eq!(clock.us_to_cycles(1_000_000), BASE_CLOCK_RATE_ARM11);
        assert_eq!(clock.us_to_cycles(1), 268);
        assert_eq!(clock.us_to_cycles(0), 0);
    }

    #[test]
    fn test_ns_to_cycles() {
        let clock = ClockRate::new(1_000_000_000).unwrap();
        assert_eq!(clock.ns_to_cycles(42), 42);
        let clock = ClockRate::arm11();
        assert_eq!(clock.ns_to_cycles(1_000_000_000), BASE_CLOCK_RATE_ARM11);
    }

    #[test]
    fn test_conversion_saturates() {
        let clock = ClockRate::arm11();
        assert_eq!(clock.us_to_cycles(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_cycles_to_us_round_trip_on_whole_seconds() {
        let clock = ClockRate::arm11();
        let cycles = clock.us_to_cycles(3_000_000);
        assert_eq!(clock.cycles_to_us(cycles), 3_000_000);
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(Duration::from_millis(1), Duration::from_micros(1_000));
        assert_eq!(Duration::from_micros(1).as_nanos(), 1_000);
        assert!(Duration::ZERO.is_zero());
        assert_eq!(
            Duration::from_nanos(5) + Duration::from_nanos(7),
            Duration::from_nanos(12)
        );
    }
}
