//! Daily streak reward and one-time level rewards.
//!
//! Both claims are exactly-once: the precondition check and the state change
//! happen on the same `&mut` state, and the session persists the result
//! before it becomes visible.

use chrono::NaiveDate;

use crate::config::{EconomyConfig, LevelTier, RewardConfig};
use crate::error::{GameError, GameResult};

use super::economy;
use super::missions;
use super::state::{EconomyState, MissionState, RewardState};

/// Result of a daily claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyClaim {
    /// Total coins credited, elite bonus included.
    pub reward: u64,
    pub elite_bonus: bool,
    /// Streak after this claim.
    pub streak: u32,
    /// Whether this claim completed the "Daily Login" mission.
    pub mission_completed: bool,
}

/// Claim today's login reward.
pub fn claim_daily(
    rewards: &mut RewardState,
    economy: &mut EconomyState,
    missions: &mut MissionState,
    today: NaiveDate,
    config: &EconomyConfig,
) -> GameResult<DailyClaim> {
    if rewards.last_daily_claim == Some(today) {
        return Err(GameError::AlreadyClaimedToday);
    }
    let cfg = &config.rewards;
    let streak = rewards.login_streak_days + 1;

    let mut reward = cfg.daily_base;
    let elite_bonus = !rewards.elite_reward_granted && streak == cfg.streak_bonus_day;
    if elite_bonus {
        reward += cfg.streak_bonus;
        rewards.elite_reward_granted = true;
    }

    economy::add_coins(economy, reward);
    rewards.login_streak_days = streak;
    rewards.last_daily_claim = Some(today);
    let mission_completed = missions::complete_by_title(missions, missions::DAILY_LOGIN);

    Ok(DailyClaim {
        reward,
        elite_bonus,
        streak,
        mission_completed,
    })
}

/// Claim the one-time reward for `target` level. Returns the coins paid.
pub fn claim_level_reward(
    rewards: &mut RewardState,
    economy: &mut EconomyState,
    level: u32,
    target: u32,
    config: &RewardConfig,
) -> GameResult<u64> {
    if rewards.claimed_level_rewards.contains(&target) {
        return Err(GameError::AlreadyClaimed(target));
    }
    if level < target {
        return Err(GameError::LevelTooLow {
            required: target,
            current: level,
        });
    }
    let reward = config
        .tier_reward(target)
        .ok_or(GameError::UnknownLevelTier(target))?;

    economy::add_coins(economy, reward);
    rewards.claimed_level_rewards.insert(target);
    Ok(reward)
}

/// Tiers reached at `level` and not yet paid.
pub fn claimable_tiers(rewards: &RewardState, level: u32, config: &RewardConfig) -> Vec<LevelTier> {
    config
        .level_tiers
        .iter()
        .filter(|t| t.level <= level && !rewards.claimed_level_rewards.contains(&t.level))
        .copied()
        .collect()
}
