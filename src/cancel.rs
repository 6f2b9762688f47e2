// src/cancel.rs

//! Cooperative cancellation for check and mark flows.
//!
//! A `CancelToken` is shared between the CLI signal handler and the pipeline.
//! Stages poll it at their boundaries; backends that can abort an in-flight
//! statement register an interrupt hook so a running query stops promptly
//! instead of waiting for the next poll.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

type InterruptHook = Box<dyn Fn() + Send + Sync>;

/// Shared cancellation flag with registered interrupt hooks
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    hooks: Mutex<Vec<InterruptHook>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and fire every registered interrupt hook
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Ok(hooks) = self.inner.hooks.lock() {
            for hook in hooks.iter() {
                hook();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Error out if cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Register a hook that aborts in-flight work for one backend resource.
    ///
    /// If cancellation already happened the hook fires immediately, so a
    /// connection opened after Ctrl-C never runs its first statement.
    pub fn register_interrupt(&self, hook: impl Fn() + Send + Sync + 'static) {
        let hook: InterruptHook = Box::new(hook);
        if let Ok(mut hooks) = self.inner.hooks.lock() {
            // The flag is tested under the hooks lock. cancel() fires under
            // the same lock, so a racing cancel has either set the flag by
            // now or will see the pushed hook.
            if self.is_cancelled() {
                hook();
            }
            hooks.push(hook);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_fresh_token_passes_check() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_cancel_fails_check() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_hooks_fire_on_cancel() {
        let token = CancelToken::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&fired);
        token.register_interrupt(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        token.cancel();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_registration_fires_immediately() {
        let token = CancelToken::new();
        token.cancel();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        token.register_interrupt(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_registration_racing_cancel_still_fires() {
        // Whichever side wins the race, the hook must fire at least once.
        // It may fire twice when both sides observe it; that is harmless
        // because interrupting an idle connection is a no-op.
        for _ in 0..50 {
            let token = CancelToken::new();
            let fired = Arc::new(AtomicUsize::new(0));

            let canceller = token.clone();
            let handle = std::thread::spawn(move || canceller.cancel());

            let counter = Arc::clone(&fired);
            token.register_interrupt(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            handle.join().unwrap();
            assert!(fired.load(Ordering::SeqCst) >= 1);
        }
    }
}
