//! Tap economy: coins, energy and the consecutive-tap combo. Pure functions.

use crate::config::{ComboConfig, EconomyConfig};
use crate::error::{GameError, GameResult};

use super::state::{EconomyState, TapCombo};

/// Result of one accepted tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapOutcome {
    /// Coins credited, combo bonus included.
    pub coins_earned: u64,
    pub energy_consumed: u64,
    /// Combo bonus part of `coins_earned` (0 on ordinary taps).
    pub combo_bonus: u64,
}

/// Change applied by a booster purchase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoosterEffect {
    /// Raise the tap value by the given amount.
    TapValue(u64),
    /// Raise maximum energy by the given amount.
    EnergyMax(u64),
}

/// One tap at `now_ms`. Costs `tap_value` energy and credits `tap_value`
/// coins to both the balance and the mined total. Every `combo.length`-th
/// consecutive tap pays an extra `combo.bonus`; a pause of `combo.window_ms`
/// or more restarts the count.
///
/// On `InsufficientEnergy` neither the economy nor the combo changes.
pub fn tap(
    economy: &mut EconomyState,
    combo: &mut TapCombo,
    now_ms: u64,
    config: &EconomyConfig,
) -> GameResult<TapOutcome> {
    let cost = economy.tap_value;
    if economy.energy_current < cost {
        return Err(GameError::InsufficientEnergy {
            required: cost,
            available: economy.energy_current,
        });
    }

    let combo_bonus = advance_combo(combo, now_ms, &config.combo);
    let earned = economy.tap_value + combo_bonus;

    economy.energy_current -= cost;
    economy.coin_balance = economy.coin_balance.saturating_add(earned);
    economy.total_mined_coins = economy.total_mined_coins.saturating_add(earned);

    Ok(TapOutcome {
        coins_earned: earned,
        energy_consumed: cost,
        combo_bonus,
    })
}

/// Count a tap into the combo and return the bonus it pays.
fn advance_combo(combo: &mut TapCombo, now_ms: u64, config: &ComboConfig) -> u64 {
    let expired = match combo.last_tap_ms {
        Some(last) => now_ms.saturating_sub(last) >= config.window_ms,
        None => true,
    };
    if expired {
        combo.count = 0;
    }
    combo.count += 1;
    combo.last_tap_ms = Some(now_ms);

    if config.length > 0 && combo.count >= config.length {
        combo.count = 0;
        config.bonus
    } else {
        0
    }
}

/// Credit coins from rewards. Leaves the mined total alone.
pub fn add_coins(economy: &mut EconomyState, amount: u64) {
    economy.coin_balance = economy.coin_balance.saturating_add(amount);
}

/// Debit coins. Fails without change when the balance is short.
pub fn spend_coins(economy: &mut EconomyState, amount: u64) -> GameResult<()> {
    if economy.coin_balance < amount {
        return Err(GameError::InsufficientCoins {
            required: amount,
            available: economy.coin_balance,
        });
    }
    economy.coin_balance -= amount;
    Ok(())
}

pub fn apply_booster_effect(economy: &mut EconomyState, effect: BoosterEffect) {
    match effect {
        BoosterEffect::TapValue(n) => {
            economy.tap_value = economy.tap_value.saturating_add(n);
        }
        BoosterEffect::EnergyMax(n) => {
            economy.energy_max = economy.energy_max.saturating_add(n);
        }
    }
}

/// Add `ticks * per_tick` energy, capped at the maximum. Returns the energy
/// actually gained.
pub fn regenerate(economy: &mut EconomyState, ticks: u64, per_tick: u64) -> u64 {
    let before = economy.energy_current;
    let gain = ticks.saturating_mul(per_tick);
    economy.energy_current = before.saturating_add(gain).min(economy.energy_max);
    economy.energy_current.saturating_sub(before)
}

/// Fill energy to the maximum. Returns the energy restored.
pub fn refill_energy(economy: &mut EconomyState) -> u64 {
    let restored = economy.energy_max.saturating_sub(economy.energy_current);
    economy.energy_current = economy.energy_max;
    restored
}

/// Format a coin count with thousands separators.
pub fn format_coins(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (EconomyState, TapCombo, EconomyConfig) {
        let cfg = EconomyConfig::default();
        (EconomyState::new(&cfg), TapCombo::default(), cfg)
    }

    #[test]
    fn single_tap_spends_energy_and_earns_coins() {
        let (mut eco, mut combo, cfg) = fresh();
        let out = tap(&mut eco, &mut combo, 0, &cfg).unwrap();
        assert_eq!(
            out,
            TapOutcome {
                coins_earned: 10,
                energy_consumed: 10,
                combo_bonus: 0
            }
        );
        assert_eq!(eco.coin_balance, 10);
        assert_eq!(eco.total_mined_coins, 10);
        assert_eq!(eco.energy_current, 2990);
    }

    #[test]
    fn fifth_rapid_tap_pays_bonus() {
        let (mut eco, mut combo, cfg) = fresh();
        let mut earned = Vec::new();
        for i in 0..5 {
            earned.push(tap(&mut eco, &mut combo, i * 50, &cfg).unwrap().coins_earned);
        }
        assert_eq!(earned, [10, 10, 10, 10, 30]);
        assert_eq!(eco.coin_balance, 70);
        assert_eq!(eco.energy_current, 2950);
        assert_eq!(combo.count, 0);
    }

    #[test]
    fn pause_resets_combo() {
        let (mut eco, mut combo, cfg) = fresh();
        for i in 0..4 {
            tap(&mut eco, &mut combo, i * 50, &cfg).unwrap();
        }
        // 150 -> 350 is a full window: count restarts at 1
        let out = tap(&mut eco, &mut combo, 350, &cfg).unwrap();
        assert_eq!(out.combo_bonus, 0);
        assert_eq!(combo.count, 1);
    }

    #[test]
    fn tap_without_energy_changes_nothing() {
        let (mut eco, mut combo, cfg) = fresh();
        eco.energy_current = 5;
        let before = eco.clone();
        let err = tap(&mut eco, &mut combo, 0, &cfg).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientEnergy {
                required: 10,
                available: 5
            }
        );
        assert_eq!(eco, before);
        assert_eq!(combo, TapCombo::default());
    }

    #[test]
    fn tap_with_exact_energy_succeeds() {
        let (mut eco, mut combo, cfg) = fresh();
        eco.energy_current = 10;
        tap(&mut eco, &mut combo, 0, &cfg).unwrap();
        assert_eq!(eco.energy_current, 0);
    }

    #[test]
    fn add_coins_leaves_mined_alone() {
        let (mut eco, _, _) = fresh();
        add_coins(&mut eco, 500);
        assert_eq!(eco.coin_balance, 500);
        assert_eq!(eco.total_mined_coins, 0);
    }

    #[test]
    fn spend_coins_checks_balance() {
        let (mut eco, _, _) = fresh();
        eco.coin_balance = 100;
        assert_eq!(
            spend_coins(&mut eco, 101),
            Err(GameError::InsufficientCoins {
                required: 101,
                available: 100
            })
        );
        assert_eq!(eco.coin_balance, 100);
        spend_coins(&mut eco, 100).unwrap();
        assert_eq!(eco.coin_balance, 0);
    }

    #[test]
    fn regenerate_caps_at_max() {
        let (mut eco, _, _) = fresh();
        eco.energy_current = 2998;
        assert_eq!(regenerate(&mut eco, 5, 1), 2);
        assert_eq!(eco.energy_current, 3000);
        assert_eq!(regenerate(&mut eco, 5, 1), 0);
    }

    #[test]
    fn booster_effects() {
        let (mut eco, _, _) = fresh();
        apply_booster_effect(&mut eco, BoosterEffect::TapValue(10));
        apply_booster_effect(&mut eco, BoosterEffect::EnergyMax(500));
        assert_eq!(eco.tap_value, 20);
        assert_eq!(eco.energy_max, 3500);
        assert_eq!(eco.energy_current, 3000);
        assert_eq!(refill_energy(&mut eco), 500);
        assert_eq!(eco.energy_current, 3500);
    }

    #[test]
    fn format_coins_groups_thousands() {
        assert_eq!(format_coins(0), "0");
        assert_eq!(format_coins(999), "999");
        assert_eq!(format_coins(1400), "1,400");
        assert_eq!(format_coins(1234567), "1,234,567");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_energy_never_exceeds_max(
            gaps in proptest::collection::vec(0u64..400, 0..200),
            regen_ticks in proptest::collection::vec(0u64..20, 0..50),
        ) {
            let cfg = EconomyConfig::default();
            let mut eco = EconomyState::new(&cfg);
            let mut combo = TapCombo::default();
            let mut now = 0;
            for gap in gaps {
                now += gap;
                let _ = tap(&mut eco, &mut combo, now, &cfg);
                prop_assert!(eco.energy_current <= eco.energy_max);
            }
            for t in regen_ticks {
                regenerate(&mut eco, t, cfg.energy.regen_per_tick);
                prop_assert!(eco.energy_current <= eco.energy_max);
            }
        }

        #[test]
        fn prop_mined_never_decreases(
            ops in proptest::collection::vec((0u8..3, 0u64..2000), 0..100),
        ) {
            let cfg = EconomyConfig::default();
            let mut eco = EconomyState::new(&cfg);
            let mut combo = TapCombo::default();
            let mut now = 0;
            for (op, n) in ops {
                let before = eco.total_mined_coins;
                match op {
                    0 => { now += n % 300; let _ = tap(&mut eco, &mut combo, now, &cfg); }
                    1 => add_coins(&mut eco, n),
                    _ => { let _ = spend_coins(&mut eco, n); }
                }
                prop_assert!(eco.total_mined_coins >= before);
            }
        }

        #[test]
        fn prop_tap_earnings_match_mined_delta(n in 1usize..300) {
            let cfg = EconomyConfig::default();
            let mut eco = EconomyState::new(&cfg);
            let mut combo = TapCombo::default();
            let mut sum = 0;
            for i in 0..n {
                if let Ok(out) = tap(&mut eco, &mut combo, i as u64 * 300, &cfg) {
                    sum += out.coins_earned;
                }
            }
            prop_assert_eq!(eco.total_mined_coins, sum);
            prop_assert_eq!(eco.coin_balance, sum);
        }
    }
}
