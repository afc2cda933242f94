// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding tooltip auto-dismiss timer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::services::Ledger;

/// Dismisses the onboarding tooltips a fixed delay after they are first shown.
///
/// The timer fires at most once per process. It is cancelled when the
/// tooltips are dismissed some other way first, or when the timer is dropped.
pub struct TooltipTimer {
    delay: Duration,
    shown: AtomicBool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TooltipTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            shown: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    /// Note that the tooltips are on screen. The first call while they are
    /// showing starts the countdown; later calls do nothing.
    ///
    /// Returns `true` if a countdown was started.
    pub async fn arm(&self, ledger: Arc<Ledger>) -> bool {
        if !ledger.show_tooltips().await || self.shown.swap(true, Ordering::SeqCst) {
            return false;
        }

        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if ledger.dismiss_tooltips().await {
                tracing::debug!(delay_secs = delay.as_secs(), "Tooltips auto-dismissed");
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(handle);
        }

        tracing::debug!(delay_secs = delay.as_secs(), "Tooltip auto-dismiss armed");
        true
    }

    /// Stop a pending countdown, if any.
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }

    /// Whether a countdown is still running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for TooltipTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
