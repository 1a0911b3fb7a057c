//! External identity and blob capabilities.
//!
//! The game only needs "verify credentials, return a stable user id" and
//! "upload an avatar image, return its URL". Real deployments plug in a
//! hosted service; the in-memory versions here back tests and the offline
//! browser build.

use std::collections::HashMap;

use crate::error::{GameError, GameResult};
use crate::rng::SeedRng;

/// Stable, opaque account identifier.
pub type UserId = String;

pub trait Authenticator {
    /// Create credentials and return the new account's id.
    fn register(&mut self, username: &str, password: &str) -> GameResult<UserId>;

    /// Resolve credentials to an account id.
    fn login(&mut self, username: &str, password: &str) -> GameResult<UserId>;

    /// Replace the password after checking the current one. The account id
    /// does not change.
    fn change_password(&mut self, username: &str, current: &str, new: &str) -> GameResult<()>;
}

pub trait AvatarStore {
    /// Store image bytes for `uid` and return a URL that serves them.
    fn upload(&mut self, uid: &str, bytes: &[u8], content_type: &str) -> GameResult<String>;
}

/// Credentials kept in memory.
pub struct MemoryAuthenticator {
    accounts: HashMap<String, (String, UserId)>,
    rng: SeedRng,
}

impl MemoryAuthenticator {
    pub fn new(seed: u64) -> Self {
        Self {
            accounts: HashMap::new(),
            rng: SeedRng::new(seed),
        }
    }
}

impl Authenticator for MemoryAuthenticator {
    fn register(&mut self, username: &str, password: &str) -> GameResult<UserId> {
        let username = username.trim().to_lowercase();
        if username.is_empty() || password.is_empty() {
            return Err(GameError::InvalidProfile(
                "username and password are required".into(),
            ));
        }
        if self.accounts.contains_key(&username) {
            return Err(GameError::UsernameTaken(username));
        }
        let uid = self.rng.hex(28);
        self.accounts
            .insert(username, (password.to_string(), uid.clone()));
        Ok(uid)
    }

    fn login(&mut self, username: &str, password: &str) -> GameResult<UserId> {
        let username = username.trim().to_lowercase();
        match self.accounts.get(&username) {
            Some((stored, uid)) if stored == password => Ok(uid.clone()),
            _ => Err(GameError::NotAuthenticated),
        }
    }

    fn change_password(&mut self, username: &str, current: &str, new: &str) -> GameResult<()> {
        if new.is_empty() {
            return Err(GameError::InvalidProfile("new password is empty".into()));
        }
        let username = username.trim().to_lowercase();
        match self.accounts.get_mut(&username) {
            Some((stored, _)) if stored == current => {
                *stored = new.to_string();
                Ok(())
            }
            _ => Err(GameError::NotAuthenticated),
        }
    }
}

/// Avatar blobs kept in memory, served from `mem://avatars/...` URLs.
#[derive(Default)]
pub struct MemoryAvatarStore {
    blobs: HashMap<String, (String, Vec<u8>)>,
}

impl MemoryAvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.blobs.get(url).map(|(_, bytes)| bytes.as_slice())
    }
}

impl AvatarStore for MemoryAvatarStore {
    fn upload(&mut self, uid: &str, bytes: &[u8], content_type: &str) -> GameResult<String> {
        if bytes.is_empty() {
            return Err(GameError::InvalidProfile("avatar image is empty".into()));
        }
        let url = format!("mem://avatars/{uid}");
        self.blobs
            .insert(url.clone(), (content_type.to_string(), bytes.to_vec()));
        Ok(url)
    }
}
