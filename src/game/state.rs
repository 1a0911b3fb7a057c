/// Tap Earn account state definitions.
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::config::EconomyConfig;

/// Identity and profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Account {
    pub uid: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub avatar: String,
}

/// Coins and energy.
#[derive(Clone, Debug, PartialEq)]
pub struct EconomyState {
    /// Spendable coins.
    pub coin_balance: u64,
    /// Lifetime coins earned by tapping; drives leveling, never decreases.
    pub total_mined_coins: u64,
    /// Always <= energy_max.
    pub energy_current: u64,
    pub energy_max: u64,
    /// Coins earned (and energy spent) per tap.
    pub tap_value: u64,
}

impl EconomyState {
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            coin_balance: 0,
            total_mined_coins: 0,
            energy_current: config.energy.initial_max,
            energy_max: config.energy.initial_max,
            tap_value: config.energy.initial_tap_value,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LevelState {
    pub level: u32,
}

/// Purchasable upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoosterKind {
    Multitap,
    EnergyLimit,
}

impl BoosterKind {
    /// All booster kinds in display order.
    pub fn all() -> &'static [BoosterKind] {
        &[BoosterKind::Multitap, BoosterKind::EnergyLimit]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            BoosterKind::Multitap => "Multitap",
            BoosterKind::EnergyLimit => "Energy Limit",
        }
    }
}

/// Level and price of one booster kind.
#[derive(Clone, Debug, PartialEq)]
pub struct BoosterTrack {
    /// Starts at 1.
    pub level: u32,
    pub next_cost: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoosterState {
    pub multitap: BoosterTrack,
    pub energy_limit: BoosterTrack,
    pub free_boosts_remaining: u32,
    /// Day the free boosts were last topped up.
    pub last_free_boost_reset: Option<NaiveDate>,
}

impl BoosterState {
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            multitap: BoosterTrack {
                level: 1,
                next_cost: config.boosters.multitap_base_cost,
            },
            energy_limit: BoosterTrack {
                level: 1,
                next_cost: config.boosters.energy_limit_base_cost,
            },
            free_boosts_remaining: config.boosters.free_boosts_per_day,
            last_free_boost_reset: None,
        }
    }

    pub fn track(&self, kind: BoosterKind) -> &BoosterTrack {
        match kind {
            BoosterKind::Multitap => &self.multitap,
            BoosterKind::EnergyLimit => &self.energy_limit,
        }
    }

    pub fn track_mut(&mut self, kind: BoosterKind) -> &mut BoosterTrack {
        match kind {
            BoosterKind::Multitap => &mut self.multitap,
            BoosterKind::EnergyLimit => &mut self.energy_limit,
        }
    }
}

/// Daily streak and one-time level rewards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardState {
    pub login_streak_days: u32,
    pub last_daily_claim: Option<NaiveDate>,
    /// One-shot: set when the streak bonus has been paid.
    pub elite_reward_granted: bool,
    pub claimed_level_rewards: BTreeSet<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USDT")]
    Usdt,
    #[serde(rename = "VND")]
    Vnd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usdt => "USDT",
            Currency::Vnd => "VND",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Recharge,
    #[serde(rename = "Transfer to VND")]
    TransferToVnd,
    #[serde(rename = "Transfer to USDT")]
    TransferToUsdt,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Recharge => "Recharge",
            TransactionKind::TransferToVnd => "Transfer to VND",
            TransactionKind::TransferToUsdt => "Transfer to USDT",
        }
    }
}

/// One wallet history record. Recharge records carry the coin amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: Currency,
    pub timestamp: u64,
}

/// Mock wallet. No real settlement happens.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletState {
    pub address: String,
    pub usdt_balance: f64,
    pub vnd_balance: f64,
    /// Append-only, oldest first.
    pub history: Vec<Transaction>,
}

impl WalletState {
    pub fn new(address: String) -> Self {
        Self {
            address,
            usdt_balance: 0.0,
            vnd_balance: 0.0,
            history: Vec::new(),
        }
    }

    pub fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Usdt => self.usdt_balance,
            Currency::Vnd => self.vnd_balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: u64,
    pub unlock_level: u32,
    #[serde(rename = "isCompleted")]
    pub completed: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionState {
    pub missions: Vec<Mission>,
}

/// Everything persisted for one account.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountState {
    pub account: Account,
    pub economy: EconomyState,
    pub level: LevelState,
    pub boosters: BoosterState,
    pub rewards: RewardState,
    pub wallet: WalletState,
    pub missions: MissionState,
}

impl AccountState {
    /// A fresh account with default balances.
    pub fn new(account: Account, wallet_address: String, config: &EconomyConfig) -> Self {
        Self {
            account,
            economy: EconomyState::new(config),
            level: LevelState::default(),
            boosters: BoosterState::new(config),
            rewards: RewardState::default(),
            wallet: WalletState::new(wallet_address),
            missions: MissionState::default(),
        }
    }
}

/// Consecutive-tap counter. Lives only in the session, never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TapCombo {
    pub count: u32,
    pub last_tap_ms: Option<u64>,
}

#[cfg(test)]
pub(crate) fn test_account(uid: &str) -> Account {
    Account {
        uid: uid.to_string(),
        username: format!("{uid}_name"),
        email: format!("{uid}@example.com"),
        display_name: format!("Chicken_{uid}"),
        avatar: "https://example.com/a.png".to_string(),
    }
}
