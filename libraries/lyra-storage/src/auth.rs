//! Email/password accounts

use async_trait::async_trait;
use lyra_core::error::{LyraError, Result};
use lyra_core::traits::AuthProvider;
use lyra_core::types::UserId;
use std::collections::HashMap;

use crate::MemoryStore;

/// Provider error codes
pub mod codes {
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const EMAIL_IN_USE: &str = "auth/email-already-in-use";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
}

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    uid: UserId,
}

#[derive(Default)]
pub(crate) struct Accounts {
    by_email: HashMap<String, Account>,
    current: Option<UserId>,
}

impl Accounts {
    fn register(&mut self, email: &str, password: &str, uid: UserId) -> Result<UserId> {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(LyraError::auth(codes::INVALID_EMAIL));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(LyraError::auth(codes::WEAK_PASSWORD));
        }
        if self.by_email.contains_key(&email) {
            return Err(LyraError::auth(codes::EMAIL_IN_USE));
        }
        self.by_email.insert(
            email,
            Account {
                password: password.to_string(),
                uid: uid.clone(),
            },
        );
        Ok(uid)
    }
}

impl MemoryStore {
    /// Register an account with a fixed uid without signing it in
    pub fn add_account(&self, email: &str, password: &str, uid: impl Into<UserId>) -> Result<()> {
        self.state().accounts.register(email, password, uid.into())?;
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MemoryStore {
    async fn sign_up(&self, email: &str, password: &str) -> Result<UserId> {
        let mut state = self.state();
        let uid = state.accounts.register(email, password, UserId::generate())?;
        state.accounts.current = Some(uid.clone());
        tracing::info!(uid = %uid, "Account created");
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        let mut state = self.state();
        let email = email.trim().to_lowercase();
        let account = state
            .accounts
            .by_email
            .get(&email)
            .ok_or_else(|| LyraError::auth(codes::USER_NOT_FOUND))?;
        if account.password != password {
            return Err(LyraError::auth(codes::WRONG_PASSWORD));
        }
        let uid = account.uid.clone();
        state.accounts.current = Some(uid.clone());
        tracing::info!(uid = %uid, "Signed in");
        Ok(uid)
    }

    async fn sign_out(&self) -> Result<()> {
        self.state().accounts.current = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<UserId>> {
        Ok(self.state().accounts.current.clone())
    }
}
