//! Booster shop: escalating upgrades and the daily free energy refills.

use chrono::NaiveDate;

use crate::config::{BoosterConfig, EconomyConfig};
use crate::error::{GameError, GameResult};

use super::economy::{self, BoosterEffect};
use super::state::{BoosterKind, BoosterState, EconomyState};

impl BoosterKind {
    /// Effect of one purchase.
    pub fn effect(&self, config: &BoosterConfig) -> BoosterEffect {
        match self {
            BoosterKind::Multitap => BoosterEffect::TapValue(config.multitap_increment),
            BoosterKind::EnergyLimit => BoosterEffect::EnergyMax(config.energy_limit_increment),
        }
    }

    pub fn description(&self, config: &BoosterConfig) -> String {
        match self.effect(config) {
            BoosterEffect::TapValue(n) => format!("+{n} coins per tap"),
            BoosterEffect::EnergyMax(n) => format!("+{n} max energy"),
        }
    }
}

/// Result of a booster purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub kind: BoosterKind,
    pub spent: u64,
    pub new_level: u32,
    pub new_cost: u64,
}

/// `floor(cost * growth)`, never below `cost + 1`.
pub fn next_cost(cost: u64, growth: f64) -> u64 {
    let raw = (cost as f64 * growth).floor();
    let grown = if raw >= u64::MAX as f64 {
        u64::MAX
    } else {
        raw as u64
    };
    grown.max(cost.saturating_add(1))
}

/// Buy one level of `kind`. Fails with `InsufficientCoins` without change.
pub fn purchase(
    economy: &mut EconomyState,
    boosters: &mut BoosterState,
    kind: BoosterKind,
    config: &EconomyConfig,
) -> GameResult<PurchaseOutcome> {
    let cost = boosters.track(kind).next_cost;
    economy::spend_coins(economy, cost)?;
    economy::apply_booster_effect(economy, kind.effect(&config.boosters));

    let track = boosters.track_mut(kind);
    track.level += 1;
    track.next_cost = next_cost(cost, config.boosters.cost_growth);

    Ok(PurchaseOutcome {
        kind,
        spent: cost,
        new_level: track.level,
        new_cost: track.next_cost,
    })
}

/// Refill energy to the maximum using one of today's free boosts. Returns
/// the boosts left.
pub fn use_free_boost(economy: &mut EconomyState, boosters: &mut BoosterState) -> GameResult<u32> {
    if boosters.free_boosts_remaining == 0 {
        return Err(GameError::NoFreeBoostsLeft);
    }
    economy::refill_energy(economy);
    boosters.free_boosts_remaining -= 1;
    Ok(boosters.free_boosts_remaining)
}

/// Top free boosts back up when `today` differs from the last reset day.
/// Returns whether a reset happened.
pub fn reset_free_boosts_if_new_day(
    boosters: &mut BoosterState,
    today: NaiveDate,
    config: &BoosterConfig,
) -> bool {
    if boosters.last_free_boost_reset == Some(today) {
        return false;
    }
    boosters.free_boosts_remaining = config.free_boosts_per_day;
    boosters.last_free_boost_reset = Some(today);
    true
}
