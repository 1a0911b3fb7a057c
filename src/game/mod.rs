//! Tap Earn: tap to mine coins, spend them on boosters, climb the boards.
//!
//! The engine modules (`economy`, `leveling`, `boosters`, `rewards`,
//! `wallet`, `missions`) are pure functions over [`state::AccountState`].
//! [`session::Session`] runs them against a document store. [`TapGame`] is
//! the browser view: tabs, input dispatch and the message log.

pub mod accounts;
pub mod actions;
pub mod boosters;
pub mod docs;
pub mod economy;
pub mod leaderboard;
pub mod leveling;
pub mod missions;
pub mod render;
pub mod rewards;
pub mod session;
pub mod state;
pub mod wallet;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::error::GameResult;
use crate::input::{ClickState, InputEvent};
use crate::store::DocumentStore;

use actions::*;
use economy::format_coins;
use leaderboard::{Board, LeaderboardEntry};
use session::{GameEvent, Session};
use state::{BoosterKind, Currency};

/// Coins converted by the two recharge buttons.
pub const RECHARGE_SMALL_COINS: u64 = 1_000;
pub const RECHARGE_LARGE_COINS: u64 = 10_000;

/// Frames between leaderboard refreshes while the Ranking tab is open.
const RANKING_REFRESH_FRAMES: u32 = 120;

const MAX_LOG: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Mine,
    Boost,
    Rewards,
    Ranking,
    Wallet,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Mine, Tab::Boost, Tab::Rewards, Tab::Ranking, Tab::Wallet]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Mine => "Mine",
            Tab::Boost => "Boost",
            Tab::Rewards => "Rewards",
            Tab::Ranking => "Ranking",
            Tab::Wallet => "Wallet",
        }
    }

    pub fn action_id(&self) -> u16 {
        match self {
            Tab::Mine => TAB_MINE,
            Tab::Boost => TAB_BOOST,
            Tab::Rewards => TAB_REWARDS,
            Tab::Ranking => TAB_RANKING,
            Tab::Wallet => TAB_WALLET,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Important,
    Error,
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub kind: LogKind,
}

pub struct TapGame {
    pub session: Session<dyn DocumentStore>,
    pub tab: Tab,
    pub board: Board,
    /// Cached rows of `board`.
    pub ranking: Vec<LeaderboardEntry>,
    pub log: Vec<LogEntry>,
    /// Frames left on the tap animation.
    pub tap_flash: u32,
    /// Coins earned by the last tap, shown while `tap_flash` runs.
    pub last_earned: u64,
    frames_since_ranking: u32,
}

impl TapGame {
    pub fn new(session: Session<dyn DocumentStore>) -> Self {
        let name = session.state().account.display_name.clone();
        let mut game = Self {
            session,
            tab: Tab::Mine,
            board: Board::Coins,
            ranking: Vec::new(),
            log: Vec::new(),
            tap_flash: 0,
            last_earned: 0,
            frames_since_ranking: 0,
        };
        game.add_log(&format!("Welcome back, {name}!"), LogKind::Important);
        game.drain_events();
        game
    }

    pub fn add_log(&mut self, text: &str, kind: LogKind) {
        self.log.push(LogEntry {
            text: text.to_string(),
            kind,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// Log the error of a rejected operation. Returns the success value.
    fn report<T>(&mut self, result: GameResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.add_log(&e.to_string(), LogKind::Error);
                None
            }
        }
    }

    fn drain_events(&mut self) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::LevelUp { from, to, unlocked } => {
                    self.add_log(&format!("Level up! {from} → {to}"), LogKind::Important);
                    for tier in unlocked {
                        self.add_log(
                            &format!(
                                "Level {} reward ready: {} coins",
                                tier.level,
                                format_coins(tier.reward)
                            ),
                            LogKind::Important,
                        );
                    }
                }
                GameEvent::FreeBoostsReset { remaining } => {
                    self.add_log(&format!("Free boosts refilled: {remaining} today"), LogKind::Info);
                }
                GameEvent::RemoteUpdate(collection) => {
                    self.add_log(&format!("Synced {}", collection.as_str()), LogKind::Info);
                }
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        if tab == Tab::Ranking {
            self.refresh_ranking();
        }
    }

    fn switch_board(&mut self, board: Board) {
        self.board = board;
        self.refresh_ranking();
    }

    fn refresh_ranking(&mut self) {
        self.frames_since_ranking = 0;
        let rows = self.session.leaderboard(self.board);
        if let Some(rows) = self.report(rows) {
            self.ranking = rows;
        }
    }

    fn tap(&mut self) {
        let result = self.session.tap();
        if let Some(out) = self.report(result) {
            self.last_earned = out.coins_earned;
            self.tap_flash = 6;
            if out.combo_bonus > 0 {
                self.add_log(&format!("Combo! +{} bonus", out.combo_bonus), LogKind::Important);
            }
        }
    }

    fn buy_booster(&mut self, kind: BoosterKind) {
        let result = self.session.purchase_booster(kind);
        if let Some(out) = self.report(result) {
            self.add_log(
                &format!(
                    "{} → Lv.{} (-{} coins)",
                    kind.name(),
                    out.new_level,
                    format_coins(out.spent)
                ),
                LogKind::Info,
            );
        }
    }

    fn use_free_boost(&mut self) {
        let result = self.session.use_free_boost();
        if let Some(left) = self.report(result) {
            self.add_log(&format!("Energy refilled ({left} free boosts left)"), LogKind::Info);
        }
    }

    fn claim_daily(&mut self) {
        let result = self.session.claim_daily();
        if let Some(claim) = self.report(result) {
            self.add_log(
                &format!("Day {} reward: +{} coins", claim.streak, format_coins(claim.reward)),
                LogKind::Important,
            );
            if claim.elite_bonus {
                self.add_log("Streak bonus unlocked!", LogKind::Important);
            }
            if claim.mission_completed {
                self.add_log(&format!("Mission complete: {}", missions::DAILY_LOGIN), LogKind::Info);
            }
        }
    }

    fn claim_level(&mut self, tier_index: usize) {
        let Some(tier) = self
            .session
            .config()
            .rewards
            .level_tiers
            .get(tier_index)
            .copied()
        else {
            return;
        };
        let result = self.session.claim_level_reward(tier.level);
        if let Some(reward) = self.report(result) {
            self.add_log(
                &format!("Level {} reward: +{} coins", tier.level, format_coins(reward)),
                LogKind::Important,
            );
        }
    }

    /// Claim the lowest tier that is ready.
    fn claim_next_level(&mut self) {
        let next = self.session.claimable_level_rewards().first().copied();
        match next {
            Some(tier) => {
                let idx = self
                    .session
                    .config()
                    .rewards
                    .level_tiers
                    .iter()
                    .position(|t| t.level == tier.level);
                if let Some(idx) = idx {
                    self.claim_level(idx);
                }
            }
            None => self.add_log("No level reward is ready", LogKind::Info),
        }
    }

    fn recharge(&mut self, coins: u64) {
        let result = self.session.recharge(coins);
        if let Some(usdt) = self.report(result) {
            self.add_log(
                &format!("Recharged {} coins → {usdt:.4} USDT", format_coins(coins)),
                LogKind::Info,
            );
        }
    }

    /// Move the whole balance of `from` into the other currency.
    fn transfer_all(&mut self, from: Currency) {
        let amount = self.session.state().wallet.balance(from);
        let result = self.session.transfer(from, amount);
        if let Some(credited) = self.report(result) {
            self.add_log(
                &format!("Transferred {amount:.4} {} → {credited:.4}", from.code()),
                LogKind::Info,
            );
        }
    }

    /// Handle an input event. Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        let consumed = match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
        };
        self.drain_events();
        consumed
    }

    fn handle_key(&mut self, key: char) -> bool {
        match key {
            ' ' | 't' => self.tap(),
            '1'..='5' => {
                let idx = (key as u8 - b'1') as usize;
                self.switch_tab(Tab::all()[idx]);
            }
            'm' if self.tab == Tab::Boost => self.buy_booster(BoosterKind::Multitap),
            'e' if self.tab == Tab::Boost => self.buy_booster(BoosterKind::EnergyLimit),
            'f' if self.tab == Tab::Boost => self.use_free_boost(),
            'd' if self.tab == Tab::Rewards => self.claim_daily(),
            'l' if self.tab == Tab::Rewards => self.claim_next_level(),
            'c' if self.tab == Tab::Ranking => self.switch_board(Board::Coins),
            'l' if self.tab == Tab::Ranking => self.switch_board(Board::Level),
            'r' if self.tab == Tab::Wallet => self.recharge(RECHARGE_SMALL_COINS),
            'x' if self.tab == Tab::Wallet => self.recharge(RECHARGE_LARGE_COINS),
            'v' if self.tab == Tab::Wallet => self.transfer_all(Currency::Usdt),
            'u' if self.tab == Tab::Wallet => self.transfer_all(Currency::Vnd),
            _ => return false,
        }
        true
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            TAP => self.tap(),
            TAB_MINE => self.switch_tab(Tab::Mine),
            TAB_BOOST => self.switch_tab(Tab::Boost),
            TAB_REWARDS => self.switch_tab(Tab::Rewards),
            TAB_RANKING => self.switch_tab(Tab::Ranking),
            TAB_WALLET => self.switch_tab(Tab::Wallet),
            FREE_BOOST => self.use_free_boost(),
            id if (BUY_BOOSTER_BASE..FREE_BOOST).contains(&id) => {
                match BoosterKind::all().get((id - BUY_BOOSTER_BASE) as usize) {
                    Some(&kind) => self.buy_booster(kind),
                    None => return false,
                }
            }
            CLAIM_DAILY => self.claim_daily(),
            id if (CLAIM_LEVEL_BASE..BOARD_COINS).contains(&id) => {
                self.claim_level((id - CLAIM_LEVEL_BASE) as usize)
            }
            BOARD_COINS => self.switch_board(Board::Coins),
            BOARD_LEVEL => self.switch_board(Board::Level),
            RECHARGE_SMALL => self.recharge(RECHARGE_SMALL_COINS),
            RECHARGE_LARGE => self.recharge(RECHARGE_LARGE_COINS),
            TRANSFER_TO_VND => self.transfer_all(Currency::Usdt),
            TRANSFER_TO_USDT => self.transfer_all(Currency::Vnd),
            _ => return false,
        }
        true
    }

    /// Once per frame: regenerate energy, apply remote writes, run timers.
    pub fn tick(&mut self) {
        let regen = self.session.tick();
        self.report(regen);
        let daily = self.session.refresh_daily();
        self.report(daily);
        self.session.sync_remote();
        self.drain_events();

        self.tap_flash = self.tap_flash.saturating_sub(1);
        if self.tab == Tab::Ranking {
            self.frames_since_ranking += 1;
            if self.frames_since_ranking >= RANKING_REFRESH_FRAMES {
                self.refresh_ranking();
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
