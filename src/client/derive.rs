//! Cancellable off-thread key derivation.
//!
//! Argon2id at interactive parameters runs for a noticeable fraction of
//! a second, so a UI-facing caller derives on a worker thread.  If the
//! user navigates away, `cancel` marks the task; a cancelled task's
//! result is zeroized and discarded at `join`, never applied.  Each
//! task is atomic: one result or one failure, no partial state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use zeroize::Zeroize;

use crate::crypto::kdf::{self, Argon2Params, KEY_LEN, SALT_LEN};
use crate::errors::{Result, VaultError};

pub struct DerivationTask {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<Result<[u8; KEY_LEN]>>,
}

/// Start a derivation on a worker thread.
///
/// The password is moved into the worker and zeroized there once the
/// derivation finishes, whatever the outcome.
pub fn spawn(mut password: Vec<u8>, salt: [u8; SALT_LEN], params: Argon2Params) -> DerivationTask {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    let handle = std::thread::spawn(move || {
        // A cancel that lands before we start saves the whole cost.
        let result = if flag.load(Ordering::Acquire) {
            Err(VaultError::KeyDerivationFailed("derivation cancelled".into()))
        } else {
            kdf::derive(&password, &salt, &params)
        };
        password.zeroize();
        result
    });

    DerivationTask { cancelled, handle }
}

impl DerivationTask {
    /// Mark the task cancelled.  The worker cannot be interrupted
    /// mid-hash, but its result will be discarded at `join`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait for the worker and collect the outcome.
    ///
    /// Returns `None` if the task was cancelled; the derived bytes are
    /// zeroized before being dropped, so a stale result can never be
    /// applied.
    pub fn join(self) -> Option<Result<[u8; KEY_LEN]>> {
        let outcome = match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(VaultError::KeyDerivationFailed(
                "derivation worker panicked".into(),
            )),
        };

        if self.cancelled.load(Ordering::Acquire) {
            if let Ok(mut key) = outcome {
                key.zeroize();
            }
            return None;
        }

        Some(outcome)
    }
}
