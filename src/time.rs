//! Time sources for the game.
//!
//! - [`RegenClock`]: fixed-timestep accumulator. The draw loop runs at ~60fps
//!   with variable delta; the clock converts that into whole regeneration
//!   ticks (one per second by default), so energy refill is deterministic
//!   and testable.
//! - [`Clock`]: the capability every session receives for "now" and
//!   "today". Nothing reads wall-clock time behind the engine's back.
//!
//! Calendar days are `chrono::NaiveDate` in the player's local time zone,
//! persisted as `YYYY-MM-DD`.

use std::cell::Cell;

use chrono::NaiveDate;

pub struct RegenClock {
    /// Milliseconds per tick (1000 = one energy tick per second)
    ms_per_tick: u64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: u64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<u64>,
}

impl RegenClock {
    pub fn new(ms_per_tick: u64) -> Self {
        Self {
            ms_per_tick: ms_per_tick.max(1),
            accumulator: 0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a timestamp in milliseconds. Returns the number of regeneration
    /// ticks that elapsed since the previous call, however long the gap.
    /// Stalled frames (a backgrounded tab) still count in full; the energy
    /// cap is applied by the caller.
    pub fn update(&mut self, now_ms: u64) -> u64 {
        let delta = match self.last_timestamp {
            Some(prev) => now_ms.saturating_sub(prev),
            None => 0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = self.accumulator / self.ms_per_tick;
        self.accumulator -= ticks * self.ms_per_tick;
        self.total_ticks += ticks;
        ticks
    }
}

/// Source of the current instant and calendar day.
pub trait Clock {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
    /// The player's local calendar day.
    fn today(&self) -> NaiveDate;
}

/// Clock driven by hand. Used by tests and simulations.
pub struct ManualClock {
    now_ms: Cell<u64>,
    today: Cell<NaiveDate>,
}

impl ManualClock {
    pub fn new(now_ms: u64, today: NaiveDate) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            today: Cell::new(today),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set_today(&self, today: NaiveDate) {
        self.today.set(today);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

/// Browser clock backed by `Date`.
#[cfg(target_arch = "wasm32")]
pub struct BrowserClock;

#[cfg(target_arch = "wasm32")]
impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn today(&self) -> NaiveDate {
        let d = js_sys::Date::new_0();
        // Date always reports a valid local day
        NaiveDate::from_ymd_opt(d.get_full_year() as i32, d.get_month() + 1, d.get_date())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_returns_zero_ticks() {
        let mut rc = RegenClock::new(1000);
        assert_eq!(rc.update(0), 0);
    }

    #[test]
    fn one_tick_per_second() {
        let mut rc = RegenClock::new(1000);
        rc.update(0);
        assert_eq!(rc.update(1000), 1);
        assert_eq!(rc.total_ticks, 1);
    }

    #[test]
    fn remainder_carried_over() {
        let mut rc = RegenClock::new(1000);
        rc.update(0);
        assert_eq!(rc.update(1500), 1); // 500ms remainder
        assert_eq!(rc.update(2000), 1); // 500 + 500
        assert_eq!(rc.total_ticks, 2);
    }

    #[test]
    fn sub_tick_frames_accumulate() {
        let mut rc = RegenClock::new(1000);
        rc.update(0);
        let mut total = 0;
        // 60 frames at ~16.67ms each = 1 second
        for i in 1..=60u64 {
            total += rc.update(i * 1000 / 60);
        }
        assert_eq!(total, 1);
    }

    #[test]
    fn stalled_frames_count_in_full() {
        let mut rc = RegenClock::new(1000);
        rc.update(0);
        // Tab backgrounded for a minute: every second still counts
        assert_eq!(rc.update(60_000), 60);
        assert_eq!(rc.update(60_400), 0);
        assert_eq!(rc.update(61_000), 1);
    }

    #[test]
    fn clock_going_backwards_yields_nothing() {
        let mut rc = RegenClock::new(1000);
        rc.update(10_000);
        assert_eq!(rc.update(9_000), 0);
        assert_eq!(rc.update(10_000), 1);
    }

    #[test]
    fn calendar_days_persist_as_iso_dates() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"2025-12-31\"");
        assert_eq!(serde_json::from_str::<NaiveDate>(&json).unwrap(), d);
    }

    #[test]
    fn impossible_days_do_not_parse() {
        for bad in ["\"2024-02-31\"", "\"2023-02-29\"", "\"2024-13-01\"", "\"yesterday\""] {
            assert!(serde_json::from_str::<NaiveDate>(bad).is_err(), "{bad}");
        }
        assert!(serde_json::from_str::<NaiveDate>("\"2024-02-29\"").is_ok());
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(100, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        clock.advance_ms(50);
        assert_eq!(clock.now_ms(), 150);
        clock.set_today(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
