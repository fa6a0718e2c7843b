//! Cooperative cancellation for parse sessions.
//!
//! A [`CancelToken`] is a shared flag. The line source checks it before every
//! read, so a cancelled parse stops within one line. The CLI wires the flag to
//! termination signals:
//! - SIGINT (Ctrl+C) via ctrlc handler
//! - SIGTERM and SIGHUP via signal_hook

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag shared between a parse and its owner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancel this token on SIGINT, SIGTERM and SIGHUP.
    ///
    /// Safe to call more than once; duplicate registrations are ignored.
    pub fn register_signal_handlers(&self) {
        let flag = self.cancelled.clone();
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })
        .ok(); // Ignore if handler already set

        #[cfg(unix)]
        {
            use signal_hook::consts::{SIGHUP, SIGTERM};
            use signal_hook::flag::register;
            let _ = register(SIGTERM, self.cancelled.clone());
            let _ = register(SIGHUP, self.cancelled.clone());
        }
    }
}
