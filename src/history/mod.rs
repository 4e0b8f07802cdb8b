// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible commands and the undo/redo history built from them.
//!
//! A [`Command`] performs one state transition on a context `C` and returns its own inverse.
//! [`History`] records inverses in frames: either one frame per directly executed command, or
//! one frame per stored [`Batch`]. A discarded batch is rolled back immediately and leaves no
//! frame behind.
//!
//! ```text
//! start_batch ─► execute … execute ─┬─► store    (one undo frame, redo cleared)
//!                                   └─► discard  (inverses replayed, no frame)
//! ```

use thiserror::Error;
use tracing::{debug, trace};

/// A named state transition whose execution yields its inverse.
pub struct Command<C> {
    title: String,
    run: Box<dyn FnOnce(&mut C) -> Command<C>>,
}

impl<C: 'static> Command<C> {
    pub fn new(title: impl Into<String>, run: impl FnOnce(&mut C) -> Command<C> + 'static) -> Self {
        Self { title: title.into(), run: Box::new(run) }
    }

    /// A command that does nothing and is its own inverse.
    pub fn noop(title: impl Into<String>) -> Self {
        let title = title.into();
        Self::new(title.clone(), move |_| Self::noop(title))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn execute(self, ctx: &mut C) -> Command<C> {
        (self.run)(ctx)
    }
}

impl<C> std::fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command").field("title", &self.title).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("batch {open:?} is still open; store or discard it first")]
    BatchInProgress { open: String },
    #[error("batch {title:?} does not belong to the open batch of this history")]
    ForeignBatch { title: String },
}

/// Handle of an open batch. Exactly one of [`History::store`] or [`History::discard`]
/// must be called with it.
#[must_use = "a batch must be stored or discarded"]
#[derive(Debug, PartialEq, Eq)]
pub struct Batch {
    id: u64,
    title: String,
}

impl Batch {
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Inverse commands of one undoable unit, in execution order. Replaying runs them in reverse.
struct Frame<C> {
    title: String,
    commands: Vec<Command<C>>,
}

struct OpenBatch<C> {
    id: u64,
    frame: Frame<C>,
}

pub struct History<C> {
    undo_stack: Vec<Frame<C>>,
    redo_stack: Vec<Frame<C>>,
    open: Option<OpenBatch<C>>,
    next_batch_id: u64,
    capacity: Option<usize>,
}

impl<C: 'static> History<C> {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open: None,
            next_batch_id: 0,
            capacity: None,
        }
    }

    /// Keeps at most `capacity` undo frames; older frames are dropped first.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self { capacity, ..Self::new() }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Frame titles, oldest first.
    pub fn undo_titles(&self) -> Vec<&str> {
        self.undo_stack.iter().map(|frame| frame.title.as_str()).collect()
    }

    pub fn redo_titles(&self) -> Vec<&str> {
        self.redo_stack.iter().map(|frame| frame.title.as_str()).collect()
    }

    pub fn open_batch_title(&self) -> Option<&str> {
        self.open.as_ref().map(|batch| batch.frame.title.as_str())
    }

    pub fn start_batch(&mut self, title: impl Into<String>) -> Result<Batch, HistoryError> {
        if let Some(open) = &self.open {
            return Err(HistoryError::BatchInProgress { open: open.frame.title.clone() });
        }

        let id = self.next_batch_id;
        self.next_batch_id = self.next_batch_id.wrapping_add(1);
        let title = title.into();
        trace!(batch = id, title = %title, "batch opened");
        let frame = Frame { title: title.clone(), commands: Vec::new() };
        self.open = Some(OpenBatch { id, frame });
        Ok(Batch { id, title })
    }

    /// Executes `command` and records its inverse in the open batch, or as a frame of its own
    /// when no batch is open.
    pub fn execute(&mut self, command: Command<C>, ctx: &mut C) {
        let title = command.title.clone();
        let inverse = command.execute(ctx);

        match &mut self.open {
            Some(open) => {
                trace!(batch = open.id, command = %title, "command executed in batch");
                open.frame.commands.push(inverse);
            }
            None => self.push_frame(Frame { title, commands: vec![inverse] }),
        }
    }

    pub fn store(&mut self, batch: Batch) -> Result<(), HistoryError> {
        let open = self.take_open(&batch)?;
        if open.frame.commands.is_empty() {
            trace!(batch = open.id, "empty batch stored without a frame");
            return Ok(());
        }
        self.push_frame(open.frame);
        Ok(())
    }

    /// Rolls back everything executed in `batch` without creating an undo frame.
    pub fn discard(&mut self, batch: Batch, ctx: &mut C) -> Result<(), HistoryError> {
        let open = self.take_open(&batch)?;
        debug!(
            batch = open.id,
            title = %open.frame.title,
            commands = open.frame.commands.len(),
            "batch discarded"
        );
        replay(open.frame.commands, ctx);
        Ok(())
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, ctx: &mut C) -> Result<bool, HistoryError> {
        self.ensure_no_open_batch()?;
        let Some(frame) = self.undo_stack.pop() else {
            return Ok(false);
        };

        trace!(title = %frame.title, undo_stack = self.undo_stack.len(), "undo");
        let commands = replay(frame.commands, ctx);
        self.redo_stack.push(Frame { title: frame.title, commands });
        Ok(true)
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, ctx: &mut C) -> Result<bool, HistoryError> {
        self.ensure_no_open_batch()?;
        let Some(frame) = self.redo_stack.pop() else {
            return Ok(false);
        };

        trace!(title = %frame.title, redo_stack = self.redo_stack.len(), "redo");
        let commands = replay(frame.commands, ctx);
        self.undo_stack.push(Frame { title: frame.title, commands });
        Ok(true)
    }

    /// Forgets all frames. An open batch stays open.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_frame(&mut self, frame: Frame<C>) {
        trace!(
            title = %frame.title,
            commands = frame.commands.len(),
            undo_stack = self.undo_stack.len() + 1,
            "undo frame pushed"
        );
        self.undo_stack.push(frame);
        if !self.redo_stack.is_empty() {
            trace!(cleared = self.redo_stack.len(), "redo stack cleared");
        }
        self.redo_stack.clear();

        if let Some(capacity) = self.capacity {
            let overflow = self.undo_stack.len().saturating_sub(capacity);
            if overflow > 0 {
                self.undo_stack.drain(..overflow);
            }
        }
    }

    fn take_open(&mut self, batch: &Batch) -> Result<OpenBatch<C>, HistoryError> {
        match self.open.take() {
            Some(open) if open.id == batch.id => Ok(open),
            other => {
                self.open = other;
                Err(HistoryError::ForeignBatch { title: batch.title.clone() })
            }
        }
    }

    fn ensure_no_open_batch(&self) -> Result<(), HistoryError> {
        match &self.open {
            Some(open) => Err(HistoryError::BatchInProgress { open: open.frame.title.clone() }),
            None => Ok(()),
        }
    }
}

impl<C: 'static> Default for History<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for History<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("open", &self.open.as_ref().map(|open| open.frame.title.as_str()))
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Runs a frame's commands last-to-first and returns the frame that reverts the replay.
fn replay<C: 'static>(commands: Vec<Command<C>>, ctx: &mut C) -> Vec<Command<C>> {
    commands.into_iter().rev().map(|command| command.execute(ctx)).collect()
}
