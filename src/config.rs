//! Economy tuning parameters.
//!
//! All balance numbers live in `config/economy.toml`, which is embedded at
//! build time. `EconomyConfig::default()` mirrors that file so tests and the
//! browser build agree on the same numbers.

use serde::Deserialize;

use crate::error::{GameError, GameResult};

/// Embedded default configuration.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config/economy.toml");

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub initial_max: u64,
    pub initial_tap_value: u64,
    pub regen_per_tick: u64,
    pub regen_period_ms: u64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            initial_max: 3000,
            initial_tap_value: 10,
            regen_per_tick: 1,
            regen_period_ms: 1000,
        }
    }
}

/// Consecutive-tap bonus: every `length`-th tap inside `window_ms` of the
/// previous one pays `bonus` extra coins.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub window_ms: u64,
    pub length: u32,
    pub bonus: u64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            window_ms: 200,
            length: 5,
            bonus: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelingConfig {
    pub base_cost: u64,
    pub growth: f64,
    pub max_level: u32,
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_cost: 1000,
            growth: 1.5,
            max_level: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoosterConfig {
    pub cost_growth: f64,
    pub free_boosts_per_day: u32,
    pub multitap_base_cost: u64,
    pub multitap_increment: u64,
    pub energy_limit_base_cost: u64,
    pub energy_limit_increment: u64,
}

impl Default for BoosterConfig {
    fn default() -> Self {
        Self {
            cost_growth: 1.5,
            free_boosts_per_day: 4,
            multitap_base_cost: 1000,
            multitap_increment: 10,
            energy_limit_base_cost: 1500,
            energy_limit_increment: 500,
        }
    }
}

/// One-time payout for reaching a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct LevelTier {
    pub level: u32,
    pub reward: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub daily_base: u64,
    /// Streak length (after the claim) that pays the elite bonus.
    pub streak_bonus_day: u32,
    pub streak_bonus: u64,
    pub level_tiers: Vec<LevelTier>,
}

impl Default for RewardConfig {
    fn default() -> Self {
        let tiers = [
            (1, 5_000),
            (5, 10_000),
            (10, 30_000),
            (20, 50_000),
            (50, 120_000),
            (100, 700_000),
        ];
        Self {
            daily_base: 50,
            streak_bonus_day: 7,
            streak_bonus: 500,
            level_tiers: tiers
                .iter()
                .map(|&(level, reward)| LevelTier { level, reward })
                .collect(),
        }
    }
}

impl RewardConfig {
    /// Reward for a configured tier, `None` when `level` is not a tier.
    pub fn tier_reward(&self, level: u32) -> Option<u64> {
        self.level_tiers
            .iter()
            .find(|t| t.level == level)
            .map(|t| t.reward)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub limit: usize,
    pub coins_elite_balance: u64,
    pub level_elite_mined: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            coins_elite_balance: 100_000,
            level_elite_mined: 50_000,
        }
    }
}

/// Fixed exchange rates of the mock wallet.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub coins_per_unit: u64,
    pub usdt_per_unit: f64,
    pub vnd_per_usdt: f64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            coins_per_unit: 1000,
            usdt_per_unit: 0.0002,
            vnd_per_usdt: 24_000.0,
        }
    }
}

/// Complete set of economy parameters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub energy: EnergyConfig,
    pub combo: ComboConfig,
    pub leveling: LevelingConfig,
    pub boosters: BoosterConfig,
    pub rewards: RewardConfig,
    pub leaderboard: LeaderboardConfig,
    pub wallet: WalletConfig,
}

impl EconomyConfig {
    /// Parse a TOML document. Sections or keys that are absent keep their
    /// default values.
    pub fn from_toml_str(src: &str) -> GameResult<Self> {
        let config: EconomyConfig =
            toml::from_str(src).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration embedded in the binary.
    pub fn embedded() -> GameResult<Self> {
        Self::from_toml_str(DEFAULT_CONFIG_TOML)
    }

    fn validate(&self) -> GameResult<()> {
        let invalid = |msg: &str| Err(GameError::InvalidConfig(msg.to_string()));
        if self.energy.regen_period_ms == 0 {
            return invalid("energy.regen_period_ms must be positive");
        }
        if self.energy.initial_tap_value == 0 {
            return invalid("energy.initial_tap_value must be positive");
        }
        if self.combo.length == 0 {
            return invalid("combo.length must be positive");
        }
        if self.leveling.growth <= 1.0 {
            return invalid("leveling.growth must be greater than 1");
        }
        if self.boosters.cost_growth <= 1.0 {
            return invalid("boosters.cost_growth must be greater than 1");
        }
        if self.rewards.level_tiers.is_empty() {
            return invalid("rewards.level_tiers must not be empty");
        }
        if self.rewards.level_tiers.iter().any(|t| t.level == 0) {
            return invalid("rewards.level_tiers cannot contain level 0");
        }
        if self.wallet.coins_per_unit == 0 || self.wallet.vnd_per_usdt <= 0.0 {
            return invalid("wallet rates must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_file_matches_default() {
        let parsed = EconomyConfig::embedded().unwrap();
        assert_eq!(parsed, EconomyConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = EconomyConfig::from_toml_str("[combo]\nbonus = 50\n").unwrap();
        assert_eq!(cfg.combo.bonus, 50);
        assert_eq!(cfg.combo.length, 5);
        assert_eq!(cfg.energy.initial_max, 3000);
        assert_eq!(cfg.rewards.tier_reward(100), Some(700_000));
    }

    #[test]
    fn rejects_flat_level_curve() {
        let err = EconomyConfig::from_toml_str("[leveling]\ngrowth = 1.0\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EconomyConfig::from_toml_str("[energy\n").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn tier_lookup() {
        let rewards = RewardConfig::default();
        assert_eq!(rewards.tier_reward(5), Some(10_000));
        assert_eq!(rewards.tier_reward(7), None);
    }
}
