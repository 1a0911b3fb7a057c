//! Level curve over lifetime mined coins.

use crate::config::LevelingConfig;

/// `coins_needed(n)` is the mined total that lifts a player from level `n`
/// to `n + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelCurve {
    base_cost: u64,
    growth: f64,
    max_level: u32,
}

impl LevelCurve {
    pub fn new(config: &LevelingConfig) -> Self {
        Self {
            base_cost: config.base_cost,
            growth: config.growth,
            max_level: config.max_level,
        }
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// `base` for level 0, otherwise `floor(base * growth^n)`. Saturates at
    /// `u64::MAX` for very high levels.
    pub fn coins_needed(&self, n: u32) -> u64 {
        if n == 0 {
            return self.base_cost;
        }
        let raw = (self.base_cost as f64 * self.growth.powi(n as i32)).floor();
        if raw >= u64::MAX as f64 {
            u64::MAX
        } else {
            raw as u64
        }
    }

    /// Climb from `current` while the mined total covers the next step.
    /// Never returns less than `current`.
    pub fn recompute(&self, total_mined: u64, current: u32) -> u32 {
        let mut level = current;
        while level < self.max_level && total_mined >= self.coins_needed(level) {
            level += 1;
        }
        level
    }

    /// Coins still missing for the next level, 0 when already covered.
    pub fn coins_to_rank_up(&self, total_mined: u64, level: u32) -> u64 {
        self.coins_needed(level + 1).saturating_sub(total_mined)
    }

    /// Progress bar value in `0.0..=100.0`.
    pub fn progress_percent(&self, total_mined: u64, level: u32) -> f64 {
        let rank_up = self.coins_to_rank_up(total_mined, level);
        if rank_up == 0 {
            return 100.0;
        }
        let needed = self.coins_needed(level) as f64;
        if needed <= 0.0 {
            return 0.0;
        }
        (100.0 * (needed - rank_up as f64) / needed).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> LevelCurve {
        LevelCurve::new(&LevelingConfig::default())
    }

    #[test]
    fn curve_values() {
        let c = curve();
        assert_eq!(c.coins_needed(0), 1000);
        assert_eq!(c.coins_needed(1), 1500);
        assert_eq!(c.coins_needed(2), 2250);
        assert_eq!(c.coins_needed(3), 3375);
        assert_eq!(c.coins_needed(4), 5062);
    }

    #[test]
    fn recompute_levels() {
        let c = curve();
        assert_eq!(c.recompute(0, 0), 0);
        assert_eq!(c.recompute(999, 0), 0);
        assert_eq!(c.recompute(1000, 0), 1);
        assert_eq!(c.recompute(1400, 0), 1);
        assert_eq!(c.recompute(1500, 0), 2);
        assert_eq!(c.recompute(3375, 0), 4);
    }

    #[test]
    fn recompute_never_lowers_level() {
        assert_eq!(curve().recompute(0, 7), 7);
    }

    #[test]
    fn recompute_stops_at_max_level() {
        assert_eq!(curve().recompute(u64::MAX, 0), 100);
    }

    #[test]
    fn progress_examples() {
        let c = curve();
        // Level 1 at 1400 mined: level 2 is reached at 2250
        assert_eq!(c.coins_to_rank_up(1400, 1), 850);
        let p = c.progress_percent(1400, 1);
        assert!((p - 43.333).abs() < 0.01, "got {p}");
        assert_eq!(c.progress_percent(5000, 1), 100.0);
        assert_eq!(c.progress_percent(0, 0), 0.0);
    }
}
