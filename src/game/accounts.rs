//! Registration, login and profile rules.

use tracing::info;

use crate::auth::{Authenticator, UserId};
use crate::config::EconomyConfig;
use crate::error::{GameError, GameResult};
use crate::rng::SeedRng;
use crate::store::{Collection, DocumentStore, SetOptions};

use super::docs;
use super::leaderboard;
use super::missions;
use super::state::{Account, AccountState};
use super::wallet;

/// Avatar used until the player picks one.
pub const DEFAULT_AVATAR: &str =
    "https://cdn1.iconfinder.com/data/icons/user-pictures/100/unknown-1024.png";

/// Longest accepted display name, in characters.
pub const MAX_DISPLAY_NAME: usize = 24;

/// Sign-up form.
#[derive(Clone, Debug, Default)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub avatar: Option<&'a str>,
}

/// `Chicken_` followed by a number below 10000.
pub fn random_character_name(rng: &mut SeedRng) -> String {
    format!("Chicken_{}", rng.range(10_000))
}

/// Create credentials and every starting document of a new account.
pub fn register<S: DocumentStore + ?Sized>(
    store: &S,
    auth: &mut dyn Authenticator,
    rng: &mut SeedRng,
    form: &Registration<'_>,
    config: &EconomyConfig,
) -> GameResult<AccountState> {
    let uid = auth.register(form.username, form.password)?;
    let account = Account {
        uid: uid.clone(),
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        display_name: random_character_name(rng),
        avatar: form
            .avatar
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_AVATAR)
            .to_string(),
    };
    let mut state = AccountState::new(account, wallet::generate_address(rng), config);
    state.missions.missions.push(missions::daily_login_mission());

    for (collection, doc) in docs::account_documents(&state)? {
        store.set_document(
            collection,
            &docs::doc_id(collection, &uid),
            doc,
            SetOptions::replace(),
        )?;
    }
    leaderboard::sync(store, &state, &config.leaderboard)?;

    info!(uid = %uid, name = %state.account.display_name, "account registered");
    Ok(state)
}

/// Resolve credentials to a user that has game data.
pub fn login<S: DocumentStore + ?Sized>(
    store: &S,
    auth: &mut dyn Authenticator,
    username: &str,
    password: &str,
) -> GameResult<UserId> {
    let uid = auth.login(username, password)?;
    if store.get_document(Collection::Users, &uid)?.is_none() {
        return Err(GameError::NotAuthenticated);
    }
    info!(uid = %uid, "logged in");
    Ok(uid)
}

/// Validate and apply a profile edit. `None` leaves a field unchanged.
pub fn edit_profile(
    account: &mut Account,
    display_name: Option<&str>,
    avatar: Option<&str>,
) -> GameResult<()> {
    if let Some(name) = display_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidProfile("display name is empty".into()));
        }
        if name.chars().count() > MAX_DISPLAY_NAME {
            return Err(GameError::InvalidProfile(format!(
                "display name is longer than {MAX_DISPLAY_NAME} characters"
            )));
        }
        account.display_name = name.to_string();
    }
    if let Some(url) = avatar {
        let url = url.trim();
        if url.is_empty() {
            return Err(GameError::InvalidProfile("avatar URL is empty".into()));
        }
        account.avatar = url.to_string();
    }
    Ok(())
}
