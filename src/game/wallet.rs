//! Mock wallet: coin recharge into USDT and USDT/VND transfers at fixed
//! rates. Nothing here settles real money.

use crate::config::WalletConfig;
use crate::error::{GameError, GameResult};
use crate::rng::SeedRng;

use super::economy;
use super::state::{Currency, EconomyState, Transaction, TransactionKind, WalletState};

/// Wallet document id for a user.
pub fn wallet_id(uid: &str) -> String {
    format!("wallet-{uid}")
}

/// Mock address: `0x` and 40 hex digits.
pub fn generate_address(rng: &mut SeedRng) -> String {
    format!("0x{}", rng.hex(40))
}

pub fn coins_to_usdt(coins: u64, config: &WalletConfig) -> f64 {
    coins as f64 / config.coins_per_unit as f64 * config.usdt_per_unit
}

/// Convert `coin_amount` coins into USDT. Returns the USDT credited.
pub fn recharge(
    economy: &mut EconomyState,
    wallet: &mut WalletState,
    coin_amount: u64,
    now_ms: u64,
    config: &WalletConfig,
) -> GameResult<f64> {
    if coin_amount == 0 {
        return Err(GameError::InvalidAmount("recharge amount must be positive".into()));
    }
    economy::spend_coins(economy, coin_amount)?;
    let usdt = coins_to_usdt(coin_amount, config);
    wallet.usdt_balance += usdt;
    wallet.history.push(Transaction {
        kind: TransactionKind::Recharge,
        amount: coin_amount as f64,
        currency: Currency::Usdt,
        timestamp: now_ms,
    });
    Ok(usdt)
}

/// Move `amount` out of `from` into the other currency. Returns the amount
/// credited on the other side.
pub fn transfer(
    wallet: &mut WalletState,
    from: Currency,
    amount: f64,
    now_ms: u64,
    config: &WalletConfig,
) -> GameResult<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(GameError::InvalidAmount(format!(
            "transfer amount must be positive, got {amount}"
        )));
    }
    let available = wallet.balance(from);
    if amount > available {
        return Err(GameError::InvalidAmount(format!(
            "{amount} {} exceeds balance {available}",
            from.code()
        )));
    }

    let (credited, kind) = match from {
        Currency::Usdt => {
            let vnd = amount * config.vnd_per_usdt;
            wallet.usdt_balance -= amount;
            wallet.vnd_balance += vnd;
            (vnd, TransactionKind::TransferToVnd)
        }
        Currency::Vnd => {
            let usdt = amount / config.vnd_per_usdt;
            wallet.vnd_balance -= amount;
            wallet.usdt_balance += usdt;
            (usdt, TransactionKind::TransferToUsdt)
        }
    };
    wallet.history.push(Transaction {
        kind,
        amount,
        currency: from,
        timestamp: now_ms,
    });
    Ok(credited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;

    fn fresh() -> (EconomyState, WalletState, WalletConfig) {
        let cfg = EconomyConfig::default();
        (
            EconomyState::new(&cfg),
            WalletState::new("0xabc".into()),
            cfg.wallet,
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn recharge_converts_coins() {
        let (mut eco, mut w, cfg) = fresh();
        eco.coin_balance = 5000;
        let usdt = recharge(&mut eco, &mut w, 5000, 7, &cfg).unwrap();
        assert!(close(usdt, 0.001));
        assert!(close(w.usdt_balance, 0.001));
        assert_eq!(eco.coin_balance, 0);
        assert_eq!(w.history.len(), 1);
        assert_eq!(w.history[0].kind, TransactionKind::Recharge);
        assert_eq!(w.history[0].amount, 5000.0);
        assert_eq!(w.history[0].timestamp, 7);
    }

    #[test]
    fn recharge_rejects_overdraw_and_zero() {
        let (mut eco, mut w, cfg) = fresh();
        eco.coin_balance = 100;
        assert_eq!(
            recharge(&mut eco, &mut w, 101, 0, &cfg),
            Err(GameError::InsufficientCoins {
                required: 101,
                available: 100
            })
        );
        assert!(matches!(
            recharge(&mut eco, &mut w, 0, 0, &cfg),
            Err(GameError::InvalidAmount(_))
        ));
        assert_eq!(eco.coin_balance, 100);
        assert!(w.history.is_empty());
    }

    #[test]
    fn transfer_both_ways() {
        let (_, mut w, cfg) = fresh();
        w.usdt_balance = 2.0;
        let vnd = transfer(&mut w, Currency::Usdt, 1.5, 1, &cfg).unwrap();
        assert!(close(vnd, 36_000.0));
        assert!(close(w.usdt_balance, 0.5));
        assert!(close(w.vnd_balance, 36_000.0));

        let usdt = transfer(&mut w, Currency::Vnd, 12_000.0, 2, &cfg).unwrap();
        assert!(close(usdt, 0.5));
        assert!(close(w.usdt_balance, 1.0));
        assert!(close(w.vnd_balance, 24_000.0));

        let kinds: Vec<_> = w.history.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [TransactionKind::TransferToVnd, TransactionKind::TransferToUsdt]
        );
    }

    #[test]
    fn transfer_rejects_bad_amounts() {
        let (_, mut w, cfg) = fresh();
        w.usdt_balance = 1.0;
        for amount in [0.0, -1.0, f64::NAN, 1.01] {
            assert!(matches!(
                transfer(&mut w, Currency::Usdt, amount, 0, &cfg),
                Err(GameError::InvalidAmount(_))
            ));
        }
        assert!(close(w.usdt_balance, 1.0));
        assert!(w.history.is_empty());
    }

    #[test]
    fn address_format() {
        let addr = generate_address(&mut SeedRng::new(5));
        assert!(addr.starts_with("0x"));
        assert_eq!(addr.len(), 42);
        assert_eq!(wallet_id("u1"), "wallet-u1");
    }
}
