// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cooperative cancellation for policy calls, and the single-slot scheduler used to coalesce
//! recomputation.
//!
//! An aborted token is not an error: [`abortable`] maps it to `None` and callers must check
//! for the sentinel before applying a result.

use std::future::Future;

pub use tokio_util::sync::CancellationToken;

/// Owning side of a cancellation scope (an interactive flow, a validation session).
///
/// Dropping the source aborts every token handed out by it.
#[derive(Debug, Default)]
pub struct Cancellation {
    token: CancellationToken,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn abort(&self) {
        self.token.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Cancellation {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Awaits `future` unless `token` is (or becomes) cancelled first.
pub async fn abortable<F>(token: &CancellationToken, future: F) -> Option<F::Output>
where
    F: Future,
{
    if token.is_cancelled() {
        return None;
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = future => Some(output),
    }
}

/// Latest-wins slot: scheduling while a value is pending replaces it instead of queueing.
#[derive(Debug)]
pub struct LatestSlot<T> {
    pending: Option<T>,
    replaced: u64,
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self { pending: None, replaced: 0 }
    }

    /// Stores `value`, returning the pending value it superseded, if any.
    pub fn schedule(&mut self, value: T) -> Option<T> {
        let superseded = self.pending.replace(value);
        if superseded.is_some() {
            self.replaced = self.replaced.saturating_add(1);
        }
        superseded
    }

    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of scheduled values that were superseded before being taken.
    pub fn replaced(&self) -> u64 {
        self.replaced
    }
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
