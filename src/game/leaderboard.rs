//! Leaderboard projection: two ranked read views derived from account state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::LeaderboardConfig;
use crate::error::GameResult;
use crate::store::{Collection, Direction, Document, DocumentStore, SetOptions, StoreError, StoreResult};

use super::state::AccountState;

/// Ranking dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Board {
    Coins,
    Level,
}

impl Board {
    pub fn all() -> &'static [Board] {
        &[Board::Coins, Board::Level]
    }

    pub fn collection(&self) -> Collection {
        match self {
            Board::Coins => Collection::LeaderboardByCoins,
            Board::Level => Collection::LeaderboardByLevel,
        }
    }

    /// Document field holding the score.
    pub fn score_field(&self) -> &'static str {
        match self {
            Board::Coins => "totalCoins",
            Board::Level => "level",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Board::Coins => "Top Coins",
            Board::Level => "Top Level",
        }
    }
}

/// One ranked row.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub avatar: String,
    pub score: u64,
    pub is_elite: bool,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct RowDoc {
    character_name: String,
    avatar: String,
    is_elite: bool,
}

/// The row `state` contributes to `board`.
pub fn project(state: &AccountState, board: Board, config: &LeaderboardConfig) -> LeaderboardEntry {
    let (score, is_elite) = match board {
        Board::Coins => (
            state.economy.coin_balance,
            state.economy.coin_balance >= config.coins_elite_balance,
        ),
        Board::Level => (
            u64::from(state.level.level),
            state.economy.total_mined_coins >= config.level_elite_mined,
        ),
    };
    LeaderboardEntry {
        user_id: state.account.uid.clone(),
        display_name: state.account.display_name.clone(),
        avatar: state.account.avatar.clone(),
        score,
        is_elite,
    }
}

fn row_document(entry: &LeaderboardEntry, board: Board) -> Document {
    let mut doc = Document::new();
    doc.insert(
        "characterName".into(),
        Value::String(entry.display_name.clone()),
    );
    doc.insert(board.score_field().into(), Value::from(entry.score));
    doc.insert("avatar".into(), Value::String(entry.avatar.clone()));
    doc.insert("isElite".into(), Value::Bool(entry.is_elite));
    doc
}

fn parse_row(board: Board, id: String, doc: &Document) -> StoreResult<LeaderboardEntry> {
    let row: RowDoc = serde_json::from_value(Value::Object(doc.clone())).map_err(|e| {
        StoreError::Malformed {
            collection: board.collection().as_str(),
            id: id.clone(),
            reason: e.to_string(),
        }
    })?;
    let score = doc
        .get(board.score_field())
        .and_then(Value::as_u64)
        .unwrap_or(0);
    Ok(LeaderboardEntry {
        user_id: id,
        display_name: row.character_name,
        avatar: row.avatar,
        score,
        is_elite: row.is_elite,
    })
}

/// Whether the rows of `before` and `after` differ on any board.
pub fn rows_changed(before: &AccountState, after: &AccountState, config: &LeaderboardConfig) -> bool {
    Board::all()
        .iter()
        .any(|&b| project(before, b, config) != project(after, b, config))
}

/// Upsert both rows of `state`.
pub fn sync<S: DocumentStore + ?Sized>(
    store: &S,
    state: &AccountState,
    config: &LeaderboardConfig,
) -> GameResult<()> {
    for &board in Board::all() {
        let entry = project(state, board, config);
        store.set_document(
            board.collection(),
            &entry.user_id,
            row_document(&entry, board),
            SetOptions::replace(),
        )?;
    }
    debug!(uid = %state.account.uid, "leaderboard rows synced");
    Ok(())
}

/// Highest `limit` rows of `board`, best first. Unreadable rows are skipped.
pub fn top<S: DocumentStore + ?Sized>(
    store: &S,
    board: Board,
    limit: usize,
) -> GameResult<Vec<LeaderboardEntry>> {
    let rows = store.query_top_n(
        board.collection(),
        board.score_field(),
        Direction::Descending,
        limit,
    )?;
    Ok(rows
        .into_iter()
        .filter_map(|(id, doc)| match parse_row(board, id, &doc) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping leaderboard row");
                None
            }
        })
        .collect())
}

/// 1-based rank of `uid` in `entries`.
pub fn rank_of(entries: &[LeaderboardEntry], uid: &str) -> Option<usize> {
    entries.iter().position(|e| e.user_id == uid).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::game::state::test_account;
    use crate::store::MemoryStore;

    fn player(uid: &str, balance: u64, level: u32, mined: u64) -> AccountState {
        let cfg = EconomyConfig::default();
        let mut s = AccountState::new(test_account(uid), String::new(), &cfg);
        s.economy.coin_balance = balance;
        s.economy.total_mined_coins = mined;
        s.level.level = level;
        s
    }

    #[test]
    fn projection_uses_separate_elite_rules() {
        let cfg = LeaderboardConfig::default();
        let s = player("a", 100_000, 3, 10_000);
        let coins = project(&s, Board::Coins, &cfg);
        let level = project(&s, Board::Level, &cfg);
        assert_eq!(coins.score, 100_000);
        assert!(coins.is_elite);
        assert_eq!(level.score, 3);
        assert!(!level.is_elite);

        let s = player("b", 10, 9, 50_000);
        assert!(!project(&s, Board::Coins, &cfg).is_elite);
        assert!(project(&s, Board::Level, &cfg).is_elite);
    }

    #[test]
    fn sync_then_top_orders_best_first() {
        let store = MemoryStore::new();
        let cfg = LeaderboardConfig::default();
        for s in [
            player("a", 500, 2, 0),
            player("b", 900, 1, 0),
            player("c", 100, 7, 0),
        ] {
            sync(&store, &s, &cfg).unwrap();
        }
        let coins = top(&store, Board::Coins, 100).unwrap();
        let ids: Vec<&str> = coins.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
        assert_eq!(coins[0].display_name, "Chicken_b");

        let level = top(&store, Board::Level, 2).unwrap();
        let ids: Vec<&str> = level.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, ["c", "a"]);
        assert_eq!(rank_of(&level, "a"), Some(2));
        assert_eq!(rank_of(&level, "b"), None);
    }

    #[test]
    fn resync_replaces_row() {
        let store = MemoryStore::new();
        let cfg = LeaderboardConfig::default();
        let mut s = player("a", 5, 0, 0);
        sync(&store, &s, &cfg).unwrap();
        s.economy.coin_balance = 50;
        sync(&store, &s, &cfg).unwrap();
        let coins = top(&store, Board::Coins, 10).unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].score, 50);
    }

    #[test]
    fn rows_changed_ignores_unrelated_fields() {
        let cfg = LeaderboardConfig::default();
        let a = player("a", 5, 1, 10);
        let mut b = a.clone();
        b.economy.energy_current -= 10;
        assert!(!rows_changed(&a, &b, &cfg));
        b.economy.coin_balance += 1;
        assert!(rows_changed(&a, &b, &cfg));
    }

    #[test]
    fn top_is_capped() {
        let store = MemoryStore::new();
        let cfg = LeaderboardConfig::default();
        for i in 0..120 {
            sync(&store, &player(&format!("p{i:03}"), i, 0, 0), &cfg).unwrap();
        }
        let rows = top(&store, Board::Coins, cfg.limit).unwrap();
        assert_eq!(rows.len(), 100);
        assert_eq!(rows[0].score, 119);
    }
}
