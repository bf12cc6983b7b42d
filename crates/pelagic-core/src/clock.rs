//! The day clock: the single source of truth for simulated time.
//!
//! The day counter is the only temporal state in the engine. Everything
//! else (soak times, attraction windows, deactivation thresholds) is
//! derived from it, so it advances with checked arithmetic -- a silent
//! wraparound would reopen every closed attraction window at once.

use crate::error::CoreError;

/// Monotone counter of simulated days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayClock {
    day: u64,
}

impl DayClock {
    /// A clock starting at day zero.
    pub const fn new() -> Self {
        Self { day: 0 }
    }

    /// The current simulated day.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Advance by one day and return the new day.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ClockOverflow`] if the counter would wrap.
    pub fn advance(&mut self) -> Result<u64, CoreError> {
        self.day = self.day.checked_add(1).ok_or(CoreError::ClockOverflow)?;
        Ok(self.day)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_days() {
        let mut clock = DayClock::new();
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.day(), 2);
    }

    #[test]
    fn advance_refuses_overflow() {
        let mut clock = DayClock { day: u64::MAX };
        assert!(matches!(clock.advance(), Err(CoreError::ClockOverflow)));
    }
}
