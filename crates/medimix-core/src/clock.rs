//! Game clock and shift windows.
//!
//! The clock counts game seconds from midnight of day 0 and starts at 07:00.
//! One simulation tick advances it by [`GAME_SECONDS_PER_TICK`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Game seconds covered by one simulation tick.
pub const GAME_SECONDS_PER_TICK: u64 = 60;

/// Seconds in one game hour.
pub const SECONDS_PER_HOUR: u64 = 3_600;

/// Seconds in one game day.
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// Opening time of the pharmacy, in seconds since midnight.
pub const OPENING_SECONDS: u64 = 7 * SECONDS_PER_HOUR;

/// Monotonic game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameClock {
    seconds: u64,
}

impl GameClock {
    /// A clock at an arbitrary number of seconds since day 0 midnight.
    #[must_use]
    pub const fn at(seconds: u64) -> Self {
        Self { seconds }
    }

    /// A clock at `hour:00` on day 0.
    #[must_use]
    pub const fn at_hour(hour: u8) -> Self {
        Self::at(hour as u64 * SECONDS_PER_HOUR)
    }

    /// Seconds since day 0 midnight.
    #[must_use]
    pub const fn seconds(self) -> u64 {
        self.seconds
    }

    /// Zero-based day number.
    #[must_use]
    pub const fn day(self) -> u64 {
        self.seconds / SECONDS_PER_DAY
    }

    /// Hour of the current day, 0-23.
    #[must_use]
    pub const fn hour(self) -> u8 {
        // Always < 24
        #[allow(clippy::cast_possible_truncation)]
        let hour = ((self.seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u8;
        hour
    }

    /// Minute of the current hour, 0-59.
    #[must_use]
    pub const fn minute(self) -> u8 {
        #[allow(clippy::cast_possible_truncation)]
        let minute = ((self.seconds % SECONDS_PER_HOUR) / 60) as u8;
        minute
    }

    /// Advance by one simulation tick.
    pub fn tick(&mut self) {
        self.seconds += GAME_SECONDS_PER_TICK;
    }

    /// The clock `ticks` simulation ticks from now.
    #[must_use]
    pub const fn after_ticks(self, ticks: u64) -> Self {
        Self::at(self.seconds + ticks * GAME_SECONDS_PER_TICK)
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::at(OPENING_SECONDS)
    }
}

impl fmt::Display for GameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} {:02}:{:02}", self.day(), self.hour(), self.minute())
    }
}

/// A daily window of whole hours, `[start, end)`.
///
/// A window whose start is after its end wraps midnight (22-06 covers
/// 22:00 to 05:59). Equal start and end covers the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// First hour inside the window.
    pub start_hour: u8,
    /// First hour after the window.
    pub end_hour: u8,
}

impl ShiftWindow {
    /// Regular opening hours: 07:00 to 17:00.
    pub const BUSINESS_HOURS: Self = Self::new(7, 17);

    /// Day manager shift: 07:00 to 19:00.
    pub const DAY_MANAGEMENT: Self = Self::new(7, 19);

    /// Create a window.
    #[must_use]
    pub const fn new(start_hour: u8, end_hour: u8) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// Whether `hour` falls inside the window.
    #[must_use]
    pub const fn contains_hour(self, hour: u8) -> bool {
        if self.start_hour == self.end_hour {
            true
        } else if self.start_hour < self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    /// Whether the clock's current hour falls inside the window.
    #[must_use]
    pub const fn contains(self, clock: GameClock) -> bool {
        self.contains_hour(clock.hour())
    }

    /// Both hours are valid 24h values.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.start_hour < 24 && self.end_hour < 24
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_opening() {
        let clock = GameClock::default();
        assert_eq!(clock.hour(), 7);
        assert_eq!(clock.minute(), 0);
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.to_string(), "day 0 07:00");
    }

    #[test]
    fn test_tick_advances_one_game_minute() {
        let mut clock = GameClock::default();
        for _ in 0..90 {
            clock.tick();
        }
        assert_eq!(clock.hour(), 8);
        assert_eq!(clock.minute(), 30);
        assert_eq!(clock.after_ticks(60).hour(), 9);
    }

    #[test]
    fn test_clock_rolls_into_next_day() {
        let clock = GameClock::at(SECONDS_PER_DAY + 3 * SECONDS_PER_HOUR);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.hour(), 3);
    }

    #[test]
    fn test_plain_window() {
        let window = ShiftWindow::BUSINESS_HOURS;
        assert!(!window.contains_hour(6));
        assert!(window.contains_hour(7));
        assert!(window.contains_hour(16));
        assert!(!window.contains_hour(17));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let night = ShiftWindow::new(22, 6);
        assert!(night.contains_hour(23));
        assert!(night.contains_hour(0));
        assert!(night.contains_hour(5));
        assert!(!night.contains_hour(6));
        assert!(!night.contains_hour(12));
    }

    #[test]
    fn test_equal_bounds_cover_whole_day() {
        let always = ShiftWindow::new(0, 0);
        assert!((0..24).all(|h| always.contains_hour(h)));
        assert!(!ShiftWindow::new(7, 24).is_valid());
    }
}
