//! One signed-in player's live game.
//!
//! A [`Session`] is the explicit account context every operation runs in.
//! Mutations go through [`Session::commit`]:
//!
//! 1. clone the current state and run the engine step on the copy
//!    (validation happens first, so a rejected operation changes nothing)
//! 2. recompute the level from the mined total
//! 3. write every document that changed
//! 4. only then replace the in-memory state and refresh the leaderboard rows
//!
//! A failed write in step 3 leaves the in-memory state exactly as before.
//!
//! Writes made by other sessions arrive through store subscriptions. The
//! callbacks only queue documents; [`Session::sync_remote`] applies them
//! (last write wins).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::auth::AvatarStore;
use crate::config::{EconomyConfig, LevelTier};
use crate::error::GameResult;
use crate::store::{Collection, Document, DocumentStore, SetOptions, Subscription};
use crate::time::{Clock, RegenClock};

use super::boosters::{self, PurchaseOutcome};
use super::docs;
use super::economy::{self, TapOutcome};
use super::leaderboard::{self, Board, LeaderboardEntry};
use super::leveling::LevelCurve;
use super::missions;
use super::rewards::{self, DailyClaim};
use super::state::{AccountState, BoosterKind, Currency, TapCombo};
use super::wallet;

/// Notable things that happened, for the view to report.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    LevelUp {
        from: u32,
        to: u32,
        /// Level reward tiers that became claimable.
        unlocked: Vec<LevelTier>,
    },
    FreeBoostsReset {
        remaining: u32,
    },
    /// A document written elsewhere was applied.
    RemoteUpdate(Collection),
}

type Inbox = Rc<RefCell<VecDeque<(Collection, Document)>>>;

pub struct Session<S: DocumentStore + ?Sized> {
    store: Rc<S>,
    config: Rc<EconomyConfig>,
    clock: Rc<dyn Clock>,
    curve: LevelCurve,
    state: AccountState,
    combo: TapCombo,
    regen: RegenClock,
    inbox: Inbox,
    /// Set while this session writes, so its own writes are not queued.
    writing: Rc<Cell<bool>>,
    _subscriptions: Vec<Subscription>,
    events: VecDeque<GameEvent>,
}

impl<S: DocumentStore + ?Sized> Session<S> {
    /// Load `uid` and start its session. Fails with `NotAuthenticated` when
    /// the account has no game data.
    pub fn open(
        store: Rc<S>,
        uid: &str,
        config: Rc<EconomyConfig>,
        clock: Rc<dyn Clock>,
    ) -> GameResult<Self> {
        let state = docs::load_account(&*store, uid, &config)?;

        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let writing = Rc::new(Cell::new(false));
        let subscriptions = docs::ACCOUNT_COLLECTIONS
            .iter()
            .map(|&collection| {
                let inbox = inbox.clone();
                let writing = writing.clone();
                store.subscribe(
                    collection,
                    &docs::doc_id(collection, uid),
                    Box::new(move |doc: &Document| {
                        if !writing.get() {
                            inbox.borrow_mut().push_back((collection, doc.clone()));
                        }
                    }),
                )
            })
            .collect();

        let mut regen = RegenClock::new(config.energy.regen_period_ms);
        regen.update(clock.now_ms());

        let mut session = Self {
            store,
            curve: LevelCurve::new(&config.leveling),
            config,
            clock,
            state,
            combo: TapCombo::default(),
            regen,
            inbox,
            writing,
            _subscriptions: subscriptions,
            events: VecDeque::new(),
        };

        session.refresh_daily()?;
        if let Err(e) = leaderboard::sync(&*session.store, &session.state, &session.config.leaderboard)
        {
            warn!(error = %e, "leaderboard sync on open failed");
        }
        info!(uid = %uid, level = session.state.level.level, "session opened");
        Ok(session)
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn uid(&self) -> &str {
        &self.state.account.uid
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn curve(&self) -> &LevelCurve {
        &self.curve
    }

    pub fn combo(&self) -> &TapCombo {
        &self.combo
    }

    /// The player's current calendar day.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Run `op` on a copy of the state, persist, then publish the copy.
    pub fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut AccountState, &EconomyConfig) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut next = self.state.clone();
        let out = op(&mut next, &self.config)?;

        let from = next.level.level;
        let to = self.curve.recompute(next.economy.total_mined_coins, from);
        next.level.level = to;

        self.persist(&next)?;
        let previous = std::mem::replace(&mut self.state, next);

        if to > from {
            let unlocked = rewards::claimable_tiers(&self.state.rewards, to, &self.config.rewards)
                .into_iter()
                .filter(|t| t.level > from)
                .collect();
            info!(uid = %self.state.account.uid, from, to, "level up");
            self.events.push_back(GameEvent::LevelUp { from, to, unlocked });
        }
        if leaderboard::rows_changed(&previous, &self.state, &self.config.leaderboard) {
            // Rows are derived; the next commit retries a failed sync.
            if let Err(e) = leaderboard::sync(&*self.store, &self.state, &self.config.leaderboard) {
                warn!(error = %e, "leaderboard sync failed");
            }
        }
        Ok(out)
    }

    /// Write the documents of `next` that differ from the current state.
    /// When a write fails, every document already written is restored to
    /// exactly what the store held before the commit.
    fn persist(&self, next: &AccountState) -> GameResult<()> {
        let uid = next.account.uid.as_str();
        let mut changed = Vec::new();
        for &collection in &docs::ACCOUNT_COLLECTIONS {
            let doc = docs::document_for(next, collection)?;
            if doc != docs::document_for(&self.state, collection)? {
                changed.push((collection, doc));
            }
        }

        self.writing.set(true);
        let mut written = Vec::new();
        let mut result = Ok(());
        for (collection, doc) in changed {
            let id = docs::doc_id(collection, uid);
            let attempt = self.store.get_document(collection, &id).and_then(|snapshot| {
                self.store.set_document(collection, &id, doc, SetOptions::merge())?;
                Ok(snapshot)
            });
            match attempt {
                Ok(snapshot) => written.push((collection, id, snapshot)),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        if let Err(e) = &result {
            warn!(uid = %uid, error = %e, "commit rejected by store");
            for (collection, id, snapshot) in written.into_iter().rev() {
                let previous = match snapshot {
                    Some(doc) => Ok(doc),
                    None => docs::document_for(&self.state, collection),
                };
                let restored = previous
                    .and_then(|doc| self.store.set_document(collection, &id, doc, SetOptions::replace()));
                if let Err(e) = restored {
                    warn!(collection = collection.as_str(), error = %e, "rollback write failed");
                }
            }
        }
        self.writing.set(false);
        Ok(result?)
    }

    /// Reset today's free boosts if the day changed since the last reset.
    pub fn refresh_daily(&mut self) -> GameResult<()> {
        let today = self.clock.today();
        if self.state.boosters.last_free_boost_reset == Some(today) {
            return Ok(());
        }
        self.commit(|s, cfg| {
            boosters::reset_free_boosts_if_new_day(&mut s.boosters, today, &cfg.boosters);
            Ok(())
        })?;
        let remaining = self.state.boosters.free_boosts_remaining;
        debug!(%today, remaining, "free boosts reset");
        self.events.push_back(GameEvent::FreeBoostsReset { remaining });
        Ok(())
    }

    /// Advance the regeneration clock to now. Returns the energy gained.
    pub fn tick(&mut self) -> GameResult<u64> {
        let ticks = self.regen.update(self.clock.now_ms());
        let eco = &self.state.economy;
        if ticks == 0 || eco.energy_current >= eco.energy_max {
            return Ok(0);
        }
        let gained = self.commit(|s, cfg| {
            Ok(economy::regenerate(
                &mut s.economy,
                ticks,
                cfg.energy.regen_per_tick,
            ))
        })?;
        debug!(ticks, gained, "energy regenerated");
        Ok(gained)
    }

    pub fn tap(&mut self) -> GameResult<TapOutcome> {
        let now = self.clock.now_ms();
        let mut combo = self.combo.clone();
        let out = self.commit(|s, cfg| economy::tap(&mut s.economy, &mut combo, now, cfg))?;
        self.combo = combo;
        debug!(earned = out.coins_earned, bonus = out.combo_bonus, "tap");
        Ok(out)
    }

    pub fn purchase_booster(&mut self, kind: BoosterKind) -> GameResult<PurchaseOutcome> {
        let out = self.commit(|s, cfg| boosters::purchase(&mut s.economy, &mut s.boosters, kind, cfg))?;
        info!(
            booster = kind.name(),
            level = out.new_level,
            spent = out.spent,
            "booster purchased"
        );
        Ok(out)
    }

    /// Returns the free boosts left today.
    pub fn use_free_boost(&mut self) -> GameResult<u32> {
        self.refresh_daily()?;
        let left = self.commit(|s, _| boosters::use_free_boost(&mut s.economy, &mut s.boosters))?;
        info!(left, "free boost used");
        Ok(left)
    }

    pub fn claim_daily(&mut self) -> GameResult<DailyClaim> {
        let today = self.clock.today();
        let claim = self.commit(|s, cfg| {
            rewards::claim_daily(&mut s.rewards, &mut s.economy, &mut s.missions, today, cfg)
        })?;
        info!(
            reward = claim.reward,
            streak = claim.streak,
            elite = claim.elite_bonus,
            "daily reward claimed"
        );
        Ok(claim)
    }

    pub fn claim_level_reward(&mut self, target: u32) -> GameResult<u64> {
        let reward = self.commit(|s, cfg| {
            let level = s.level.level;
            rewards::claim_level_reward(&mut s.rewards, &mut s.economy, level, target, &cfg.rewards)
        })?;
        info!(target, reward, "level reward claimed");
        Ok(reward)
    }

    /// Returns the USDT credited.
    pub fn recharge(&mut self, coin_amount: u64) -> GameResult<f64> {
        let now = self.clock.now_ms();
        let usdt = self.commit(|s, cfg| {
            wallet::recharge(&mut s.economy, &mut s.wallet, coin_amount, now, &cfg.wallet)
        })?;
        info!(coins = coin_amount, usdt, "wallet recharged");
        Ok(usdt)
    }

    /// Returns the amount credited in the other currency.
    pub fn transfer(&mut self, from: Currency, amount: f64) -> GameResult<f64> {
        let now = self.clock.now_ms();
        let credited = self.commit(|s, cfg| wallet::transfer(&mut s.wallet, from, amount, now, &cfg.wallet))?;
        info!(from = from.code(), amount, credited, "wallet transfer");
        Ok(credited)
    }

    pub fn create_mission(
        &mut self,
        title: &str,
        description: &str,
        reward: u64,
        unlock_level: u32,
    ) -> GameResult<String> {
        self.commit(|s, _| missions::create(&mut s.missions, title, description, reward, unlock_level))
    }

    pub fn complete_mission(&mut self, id: &str) -> GameResult<bool> {
        self.commit(|s, _| Ok(missions::complete(&mut s.missions, id)))
    }

    pub fn update_profile(&mut self, display_name: Option<&str>, avatar: Option<&str>) -> GameResult<()> {
        self.commit(|s, _| super::accounts::edit_profile(&mut s.account, display_name, avatar))?;
        info!(name = %self.state.account.display_name, "profile updated");
        Ok(())
    }

    /// Upload image bytes and use the returned URL as the avatar.
    pub fn upload_avatar(
        &mut self,
        avatars: &mut dyn AvatarStore,
        bytes: &[u8],
        content_type: &str,
    ) -> GameResult<String> {
        let uid = self.state.account.uid.clone();
        let url = avatars.upload(&uid, bytes, content_type)?;
        self.update_profile(None, Some(&url))?;
        Ok(url)
    }

    /// Apply queued documents written elsewhere. Returns how many changed
    /// the state.
    pub fn sync_remote(&mut self) -> usize {
        let pending: Vec<(Collection, Document)> = self.inbox.borrow_mut().drain(..).collect();
        let mut applied = 0;
        for (collection, doc) in pending {
            let mut next = self.state.clone();
            match docs::apply_document(&mut next, collection, &doc) {
                Ok(()) if next != self.state => {
                    self.state = next;
                    applied += 1;
                    self.events.push_back(GameEvent::RemoteUpdate(collection));
                }
                Ok(()) => {}
                Err(e) => warn!(collection = collection.as_str(), error = %e, "ignoring remote document"),
            }
        }
        if applied > 0 {
            debug!(applied, "remote updates applied");
        }
        applied
    }

    pub fn leaderboard(&self, board: Board) -> GameResult<Vec<LeaderboardEntry>> {
        leaderboard::top(&*self.store, board, self.config.leaderboard.limit)
    }

    pub fn claimable_level_rewards(&self) -> Vec<LevelTier> {
        rewards::claimable_tiers(&self.state.rewards, self.state.level.level, &self.config.rewards)
    }

    pub fn progress_percent(&self) -> f64 {
        self.curve
            .progress_percent(self.state.economy.total_mined_coins, self.state.level.level)
    }

    pub fn coins_to_rank_up(&self) -> u64 {
        self.curve
            .coins_to_rank_up(self.state.economy.total_mined_coins, self.state.level.level)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }
}

impl<S: DocumentStore + ?Sized> Drop for Session<S> {
    fn drop(&mut self) {
        debug!(uid = %self.state.account.uid, "session closed");
    }
}
