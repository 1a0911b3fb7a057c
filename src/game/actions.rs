//! Semantic action IDs for Tap Earn click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const TAP: u16 = 0;

// ── Tab navigation ──────────────────────────────────────────────
pub const TAB_MINE: u16 = 10;
pub const TAB_BOOST: u16 = 11;
pub const TAB_REWARDS: u16 = 12;
pub const TAB_RANKING: u16 = 13;
pub const TAB_WALLET: u16 = 14;

// ── Booster shop (base + index into BoosterKind::all()) ─────────
pub const BUY_BOOSTER_BASE: u16 = 100;
pub const FREE_BOOST: u16 = 150;

// ── Rewards ─────────────────────────────────────────────────────
pub const CLAIM_DAILY: u16 = 200;
/// Base + index into the configured level tiers.
pub const CLAIM_LEVEL_BASE: u16 = 210;

// ── Ranking ─────────────────────────────────────────────────────
pub const BOARD_COINS: u16 = 400;
pub const BOARD_LEVEL: u16 = 401;

// ── Wallet ──────────────────────────────────────────────────────
pub const RECHARGE_SMALL: u16 = 500;
pub const RECHARGE_LARGE: u16 = 501;
pub const TRANSFER_TO_VND: u16 = 510;
pub const TRANSFER_TO_USDT: u16 = 511;
