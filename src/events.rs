// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Synchronous typed publish/subscribe used by every stateful component.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// A list of listeners for one event type.
///
/// Listeners run synchronously inside [`EventSource::trigger`], in registration order.
pub struct EventSource<E> {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener<E>)>,
}

impl<E> EventSource<E> {
    pub fn new() -> Self {
        Self { next_id: 0, listeners: Vec::new() }
    }

    pub fn listen(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was already removed.
    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn trigger(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E> Default for EventSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource").field("listeners", &self.listeners.len()).finish()
    }
}
