//! Conversion between account state and persisted documents.
//!
//! ## Field names
//!
//! - Field names are a contract read by other tools; they stay camelCase.
//! - Loading fills missing fields through `#[serde(default)]`, so older
//!   documents and documents partially written by other clients still load.
//! - Writes merge, so fields this module does not know about are kept.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EconomyConfig;
use crate::error::{GameError, GameResult};
use crate::store::{Collection, Document, DocumentStore, StoreError, StoreResult};

use super::state::{
    Account, AccountState, BoosterTrack, Mission, Transaction, WalletState,
};
use super::wallet;

/// Collections owned by one account. Leaderboards are projections and not listed.
pub const ACCOUNT_COLLECTIONS: [Collection; 7] = [
    Collection::Users,
    Collection::Energy,
    Collection::Boosters,
    Collection::LoginInfo,
    Collection::ClaimedRewards,
    Collection::Wallets,
    Collection::UserMissions,
];

/// Document id inside `collection`. Only wallets use `wallet-{uid}`.
pub fn doc_id(collection: Collection, uid: &str) -> String {
    match collection {
        Collection::Wallets => wallet::wallet_id(uid),
        _ => uid.to_string(),
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UserDoc {
    uid: String,
    username: String,
    email: String,
    avatar: String,
    character_name: String,
    /// Spendable coin balance.
    total_coins: u64,
    total_mined_coins: u64,
    level: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EnergyDoc {
    current_energy: u64,
    max_energy: u64,
    tap_value: u64,
}

impl Default for EnergyDoc {
    fn default() -> Self {
        let cfg = EconomyConfig::default();
        Self {
            current_energy: cfg.energy.initial_max,
            max_energy: cfg.energy.initial_max,
            tap_value: cfg.energy.initial_tap_value,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BoostersDoc {
    multitap_level: u32,
    multitap_upgrade_cost: u64,
    energy_limit_level: u32,
    energy_limit_upgrade_cost: u64,
    free_boosts: u32,
    /// Day the free boosts were last refilled (YYYY-MM-DD).
    last_reset_date: Option<NaiveDate>,
}

impl Default for BoostersDoc {
    fn default() -> Self {
        let cfg = EconomyConfig::default().boosters;
        Self {
            multitap_level: 1,
            multitap_upgrade_cost: cfg.multitap_base_cost,
            energy_limit_level: 1,
            energy_limit_upgrade_cost: cfg.energy_limit_base_cost,
            free_boosts: cfg.free_boosts_per_day,
            last_reset_date: None,
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LoginInfoDoc {
    login_days: u32,
    last_login_date: Option<NaiveDate>,
    elite_reward_given: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct BalanceDoc {
    #[serde(rename = "USDT")]
    usdt: f64,
    #[serde(rename = "VND")]
    vnd: f64,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WalletDoc {
    wallet_id: String,
    user_id: String,
    address: String,
    balance: BalanceDoc,
    transaction_history: Vec<Transaction>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct MissionsDoc {
    missions: Vec<Mission>,
}

fn to_document<T: Serialize>(collection: Collection, id: &str, value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed(collection, id, "not a JSON object".into())),
        Err(e) => Err(malformed(collection, id, e.to_string())),
    }
}

fn from_document<T: DeserializeOwned>(
    collection: Collection,
    id: &str,
    doc: &Document,
) -> StoreResult<T> {
    serde_json::from_value(Value::Object(doc.clone()))
        .map_err(|e| malformed(collection, id, e.to_string()))
}

fn malformed(collection: Collection, id: &str, reason: String) -> StoreError {
    StoreError::Malformed {
        collection: collection.as_str(),
        id: id.to_string(),
        reason,
    }
}

/// Build the document for `collection` from the state.
pub fn document_for(state: &AccountState, collection: Collection) -> StoreResult<Document> {
    let uid = state.account.uid.as_str();
    let id = doc_id(collection, uid);
    match collection {
        Collection::Users => to_document(
            collection,
            &id,
            &UserDoc {
                uid: uid.to_string(),
                username: state.account.username.clone(),
                email: state.account.email.clone(),
                avatar: state.account.avatar.clone(),
                character_name: state.account.display_name.clone(),
                total_coins: state.economy.coin_balance,
                total_mined_coins: state.economy.total_mined_coins,
                level: state.level.level,
            },
        ),
        Collection::Energy => to_document(
            collection,
            &id,
            &EnergyDoc {
                current_energy: state.economy.energy_current,
                max_energy: state.economy.energy_max,
                tap_value: state.economy.tap_value,
            },
        ),
        Collection::Boosters => {
            let b = &state.boosters;
            to_document(
                collection,
                &id,
                &BoostersDoc {
                    multitap_level: b.multitap.level,
                    multitap_upgrade_cost: b.multitap.next_cost,
                    energy_limit_level: b.energy_limit.level,
                    energy_limit_upgrade_cost: b.energy_limit.next_cost,
                    free_boosts: b.free_boosts_remaining,
                    last_reset_date: b.last_free_boost_reset,
                },
            )
        }
        Collection::LoginInfo => to_document(
            collection,
            &id,
            &LoginInfoDoc {
                login_days: state.rewards.login_streak_days,
                last_login_date: state.rewards.last_daily_claim,
                elite_reward_given: state.rewards.elite_reward_granted,
            },
        ),
        // level number -> true
        Collection::ClaimedRewards => Ok(state
            .rewards
            .claimed_level_rewards
            .iter()
            .map(|level| (level.to_string(), Value::Bool(true)))
            .collect()),
        Collection::Wallets => to_document(
            collection,
            &id,
            &WalletDoc {
                wallet_id: id.clone(),
                user_id: uid.to_string(),
                address: state.wallet.address.clone(),
                balance: BalanceDoc {
                    usdt: state.wallet.usdt_balance,
                    vnd: state.wallet.vnd_balance,
                },
                transaction_history: state.wallet.history.clone(),
            },
        ),
        Collection::UserMissions => to_document(
            collection,
            &id,
            &MissionsDoc {
                missions: state.missions.missions.clone(),
            },
        ),
        Collection::LeaderboardByCoins | Collection::LeaderboardByLevel => Err(malformed(
            collection,
            &id,
            "leaderboard rows are projected, not owned".into(),
        )),
    }
}

/// Every document the account owns.
pub fn account_documents(state: &AccountState) -> StoreResult<Vec<(Collection, Document)>> {
    ACCOUNT_COLLECTIONS
        .iter()
        .map(|&c| document_for(state, c).map(|doc| (c, doc)))
        .collect()
}

/// Overwrite the part of the state that `doc` describes.
pub fn apply_document(
    state: &mut AccountState,
    collection: Collection,
    doc: &Document,
) -> StoreResult<()> {
    let id = doc_id(collection, &state.account.uid);
    match collection {
        Collection::Users => {
            let d: UserDoc = from_document(collection, &id, doc)?;
            let account = &mut state.account;
            if !d.username.is_empty() {
                account.username = d.username;
            }
            if !d.email.is_empty() {
                account.email = d.email;
            }
            account.avatar = d.avatar;
            account.display_name = d.character_name;
            state.economy.coin_balance = d.total_coins;
            state.economy.total_mined_coins = d.total_mined_coins;
            state.level.level = d.level;
        }
        Collection::Energy => {
            let d: EnergyDoc = from_document(collection, &id, doc)?;
            state.economy.energy_max = d.max_energy;
            state.economy.energy_current = d.current_energy.min(d.max_energy);
            state.economy.tap_value = d.tap_value;
        }
        Collection::Boosters => {
            let d: BoostersDoc = from_document(collection, &id, doc)?;
            let b = &mut state.boosters;
            b.multitap = BoosterTrack {
                level: d.multitap_level.max(1),
                next_cost: d.multitap_upgrade_cost.max(1),
            };
            b.energy_limit = BoosterTrack {
                level: d.energy_limit_level.max(1),
                next_cost: d.energy_limit_upgrade_cost.max(1),
            };
            b.free_boosts_remaining = d.free_boosts;
            b.last_free_boost_reset = d.last_reset_date;
        }
        Collection::LoginInfo => {
            let d: LoginInfoDoc = from_document(collection, &id, doc)?;
            state.rewards.login_streak_days = d.login_days;
            state.rewards.last_daily_claim = d.last_login_date;
            state.rewards.elite_reward_granted = d.elite_reward_given;
        }
        Collection::ClaimedRewards => {
            // Non-numeric keys and false values are ignored
            state.rewards.claimed_level_rewards = doc
                .iter()
                .filter(|(_, v)| v.as_bool() == Some(true))
                .filter_map(|(k, _)| k.parse().ok())
                .collect::<BTreeSet<u32>>();
        }
        Collection::Wallets => {
            let d: WalletDoc = from_document(collection, &id, doc)?;
            state.wallet = WalletState {
                address: d.address,
                usdt_balance: d.balance.usdt,
                vnd_balance: d.balance.vnd,
                history: d.transaction_history,
            };
        }
        Collection::UserMissions => {
            let d: MissionsDoc = from_document(collection, &id, doc)?;
            state.missions.missions = d.missions;
        }
        Collection::LeaderboardByCoins | Collection::LeaderboardByLevel => {
            return Err(malformed(
                collection,
                &id,
                "leaderboard rows are projected, not owned".into(),
            ));
        }
    }
    Ok(())
}

/// Load the whole account. A missing `users` document means not registered.
pub fn load_account<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    config: &EconomyConfig,
) -> GameResult<AccountState> {
    let Some(user) = store.get_document(Collection::Users, uid)? else {
        return Err(GameError::NotAuthenticated);
    };
    let account = Account {
        uid: uid.to_string(),
        username: String::new(),
        email: String::new(),
        display_name: String::new(),
        avatar: String::new(),
    };
    let mut state = AccountState::new(account, String::new(), config);
    apply_document(&mut state, Collection::Users, &user)?;

    for &collection in &ACCOUNT_COLLECTIONS[1..] {
        let id = doc_id(collection, uid);
        if let Some(doc) = store.get_document(collection, &id)? {
            apply_document(&mut state, collection, &doc)?;
        }
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{test_account, Currency, TransactionKind};
    use crate::store::{MemoryStore, SetOptions};
    use serde_json::json;

    fn sample() -> AccountState {
        let cfg = EconomyConfig::default();
        let mut s = AccountState::new(test_account("u1"), "0xfeed".into(), &cfg);
        s.economy.coin_balance = 400;
        s.economy.total_mined_coins = 1400;
        s.economy.energy_current = 2000;
        s.economy.tap_value = 20;
        s.level.level = 1;
        s.boosters.multitap = BoosterTrack {
            level: 2,
            next_cost: 1500,
        };
        s.boosters.last_free_boost_reset = Some(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        s.rewards.login_streak_days = 3;
        s.rewards.last_daily_claim = Some(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        s.rewards.claimed_level_rewards.insert(1);
        s.wallet.usdt_balance = 0.5;
        s.wallet.history.push(Transaction {
            kind: TransactionKind::Recharge,
            amount: 2500.0,
            currency: Currency::Usdt,
            timestamp: 99,
        });
        s.missions.missions.push(crate::game::missions::daily_login_mission());
        s
    }

    #[test]
    fn field_names_follow_external_contract() {
        let s = sample();
        let users = document_for(&s, Collection::Users).unwrap();
        assert_eq!(users["totalCoins"], json!(400));
        assert_eq!(users["totalMinedCoins"], json!(1400));
        assert_eq!(users["characterName"], json!("Chicken_u1"));
        let energy = document_for(&s, Collection::Energy).unwrap();
        assert_eq!(Value::Object(energy), json!({"currentEnergy": 2000, "maxEnergy": 3000, "tapValue": 20}));
        let login = document_for(&s, Collection::LoginInfo).unwrap();
        assert_eq!(login["lastLoginDate"], json!("2024-03-09"));
        assert_eq!(login["eliteRewardGiven"], json!(false));
        let claimed = document_for(&s, Collection::ClaimedRewards).unwrap();
        assert_eq!(Value::Object(claimed), json!({"1": true}));
        let wallet = document_for(&s, Collection::Wallets).unwrap();
        assert_eq!(wallet["walletId"], json!("wallet-u1"));
        assert_eq!(wallet["balance"]["USDT"], json!(0.5));
        assert_eq!(wallet["transactionHistory"][0]["type"], json!("Recharge"));
        let boosters = document_for(&s, Collection::Boosters).unwrap();
        assert_eq!(boosters["multitapUpgradeCost"], json!(1500));
        assert_eq!(boosters["freeBoosts"], json!(4));
    }

    #[test]
    fn load_restores_what_was_written() {
        let store = MemoryStore::new();
        let s = sample();
        for (c, doc) in account_documents(&s).unwrap() {
            store
                .set_document(c, &doc_id(c, "u1"), doc, SetOptions::merge())
                .unwrap();
        }
        let loaded = load_account(&store, "u1", &EconomyConfig::default()).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn load_unknown_user_is_not_authenticated() {
        let store = MemoryStore::new();
        assert_eq!(
            load_account(&store, "ghost", &EconomyConfig::default()),
            Err(GameError::NotAuthenticated)
        );
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let store = MemoryStore::new();
        let doc = |v: Value| match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        store
            .set_document(Collection::Users, "u2", doc(json!({"totalCoins": 5})), SetOptions::merge())
            .unwrap();
        store
            .set_document(Collection::Boosters, "u2", doc(json!({"freeBoosts": 2, "multitapLevel": 3})), SetOptions::merge())
            .unwrap();
        let s = load_account(&store, "u2", &EconomyConfig::default()).unwrap();
        assert_eq!(s.economy.coin_balance, 5);
        assert_eq!(s.economy.energy_max, 3000);
        assert_eq!(s.boosters.free_boosts_remaining, 2);
        assert_eq!(s.boosters.multitap.level, 3);
        assert_eq!(s.boosters.multitap.next_cost, 1000);
        assert_eq!(s.boosters.energy_limit.next_cost, 1500);
    }

    #[test]
    fn malformed_document_is_reported() {
        let mut s = sample();
        let mut bad = Document::new();
        bad.insert("currentEnergy".into(), json!("lots"));
        let err = apply_document(&mut s, Collection::Energy, &bad).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { collection: "energy", .. }));
        assert_eq!(s, sample());
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        for date in ["2024-02-31", "2023-02-29", "2024-04-31"] {
            let mut s = sample();
            let mut login = Document::new();
            login.insert("loginDays".into(), json!(4));
            login.insert("lastLoginDate".into(), json!(date));
            let err = apply_document(&mut s, Collection::LoginInfo, &login).unwrap_err();
            assert!(matches!(err, StoreError::Malformed { collection: "login_info", .. }), "{date}");

            let mut boosters = Document::new();
            boosters.insert("lastResetDate".into(), json!(date));
            assert!(apply_document(&mut s, Collection::Boosters, &boosters).is_err(), "{date}");
            assert_eq!(s, sample());
        }
        let mut s = sample();
        let mut leap = Document::new();
        leap.insert("lastLoginDate".into(), json!("2024-02-29"));
        apply_document(&mut s, Collection::LoginInfo, &leap).unwrap();
        assert_eq!(s.rewards.last_daily_claim, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn claimed_rewards_ignore_junk_keys() {
        let mut s = sample();
        let mut doc = Document::new();
        doc.insert("5".into(), json!(true));
        doc.insert("10".into(), json!(false));
        doc.insert("daily".into(), json!(true));
        apply_document(&mut s, Collection::ClaimedRewards, &doc).unwrap();
        assert_eq!(s.rewards.claimed_level_rewards.iter().copied().collect::<Vec<_>>(), [5]);
    }
}
