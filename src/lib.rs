// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Ontoedit: authoring core for ontology diagram editors.
//!
//! - [`authoring`]: the immutable log of pending entity and relation changes.
//! - [`history`]: reversible commands, batches, undo and redo.
//! - [`validation`]: incremental, cancellable validation of changed entities.
//! - [`editor`]: the controller tying the diagram, history, policy and validation together.

pub mod authoring;
pub mod cancellation;
pub mod config;
pub mod diagram;
pub mod editor;
pub mod events;
pub mod history;
pub mod keyed;
pub mod model;
pub mod policy;
pub mod validation;

pub use authoring::{AuthoringEvent, AuthoringKind, AuthoringState, TemporaryState};
pub use config::EditorConfig;
pub use editor::{Editor, EditorError, EditorEvent};
pub use history::{Batch, Command, History};
pub use validation::{ValidationApi, ValidationState};
