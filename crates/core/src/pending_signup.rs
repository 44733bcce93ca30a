//! In-process store of signups awaiting email verification.
//!
//! A signup is held here (keyed by normalized email) between `POST
//! /auth/signup` and a successful `POST /auth/verify-otp`. Each entry carries
//! its own deadline; it is removed when verified, when read after expiry, or
//! by the periodic [`PendingSignups::purge_expired`] sweep.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::CoreError;

/// Default lifetime of a pending signup.
pub const DEFAULT_OTP_TTL: Duration = Duration::from_secs(10 * 60);

/// A registration that has not yet been confirmed with its OTP.
#[derive(Debug, Clone)]
pub struct PendingSignup {
    pub user_name: String,
    pub email: String,
    /// Argon2 PHC hash; the plaintext password never enters the store.
    pub password_hash: String,
    pub otp: String,
}

struct Entry {
    signup: PendingSignup,
    expires_at: Instant,
}

/// Keyed TTL store for [`PendingSignup`]s.
pub struct PendingSignups {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl PendingSignups {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a signup, replacing any earlier pending entry for the same email
    /// (re-registering issues a fresh OTP and deadline).
    pub fn insert(&self, signup: PendingSignup) {
        let entry = Entry {
            expires_at: Instant::now() + self.ttl,
            signup,
        };
        self.lock().insert(entry.signup.email.clone(), entry);
    }

    /// Look up an unexpired entry without consuming it.
    pub fn get(&self, email: &str) -> Option<PendingSignup> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(email) {
            Some(entry) if entry.expires_at > now => Some(entry.signup.clone()),
            Some(_) => {
                entries.remove(email);
                None
            }
            None => None,
        }
    }

    /// Check `otp` for `email` and, on a match, remove and return the entry.
    ///
    /// A wrong OTP leaves the entry in place so the user can retry until the
    /// deadline.
    pub fn verify(&self, email: &str, otp: &str) -> Result<PendingSignup, CoreError> {
        let now = Instant::now();
        let mut entries = self.lock();

        let entry = entries.get(email).ok_or_else(|| {
            CoreError::Validation("No pending signup found or OTP expired".into())
        })?;

        if entry.expires_at <= now {
            entries.remove(email);
            return Err(CoreError::Validation(
                "No pending signup found or OTP expired".into(),
            ));
        }

        if entry.signup.otp != otp {
            return Err(CoreError::Validation("Invalid or expired OTP".into()));
        }

        entries
            .remove(email)
            .map(|e| e.signup)
            .ok_or_else(|| CoreError::Internal("pending signup vanished during verify".into()))
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // The map holds plain data; a panic mid-update cannot leave it torn.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for PendingSignups {
    fn default() -> Self {
        Self::new(DEFAULT_OTP_TTL)
    }
}
