// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Authoring controller.
//!
//! Every mutation opens a history batch, changes the diagram cells, computes the next
//! [`AuthoringState`] and records it through a command, then stores the batch. If anything
//! fails on the way the batch is discarded and no trace is left in history.
//!
//! Policy-driven gestures live in [`gesture`], permission queries in [`capabilities`].

pub mod capabilities;
pub mod commands;
pub mod gesture;

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::authoring::{AuthoringError, AuthoringEvent, AuthoringState, TemporaryState};
use crate::cancellation::LatestSlot;
use crate::config::{ConfigError, EditorConfig};
use crate::diagram::{DiagramError, DiagramModel, Element, GraphEvent, Point};
use crate::events::{EventSource, ListenerId};
use crate::history::{History, HistoryError};
use crate::model::{
    same_link, ElementId, ElementIri, ElementModel, LinkId, LinkKey, LinkModel, LinkTypeIri,
};
use crate::policy::{MetadataApi, PolicyError};
use crate::validation::{
    changed_elements_to_validate, ValidationApi, ValidationPipeline, ValidationState,
};

pub use capabilities::{ElementCapabilities, LinkCapabilities};
pub use commands::EditorCommand;
pub use gesture::{LinkDrop, LinkEnd, LinkGestureOutcome};

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
    #[error(transparent)]
    Diagram(#[from] DiagramError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("element {0} is not on the diagram")]
    ElementNotFound(ElementIri),
    #[error("element cell {0} does not exist")]
    CellNotFound(ElementId),
    #[error("link {0} is not on the diagram")]
    LinkNotFound(LinkKey),
    #[error("element {0} already exists")]
    ElementAlreadyExists(ElementIri),
    #[error("link {0} already exists")]
    LinkAlreadyExists(LinkKey),
    #[error("no metadata policy is configured")]
    MissingMetadataApi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    AuthoringStateChanged,
    TemporaryStateChanged,
    ValidationStateChanged,
    SelectionChanged,
    HistoryChanged,
}

/// Everything history commands operate on.
#[derive(Debug, Default)]
pub struct EditorDocument {
    pub graph: DiagramModel,
    pub authoring: AuthoringState,
}

pub struct Editor {
    document: EditorDocument,
    history: History<EditorDocument>,
    temporary: TemporaryState,
    validation: ValidationState,
    /// Authoring state the last validation pass started from.
    validated: AuthoringState,
    pending_validation: LatestSlot<AuthoringState>,
    selection: BTreeSet<ElementId>,
    metadata: Option<Arc<dyn MetadataApi>>,
    pipeline: Option<ValidationPipeline>,
    config: EditorConfig,
    temporary_link_type: LinkTypeIri,
    next_temporary: u64,
    events: EventSource<EditorEvent>,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        config.validate()?;
        let temporary_link_type = config.gesture.temporary_link_type()?;

        Ok(Self {
            document: EditorDocument::default(),
            history: History::with_capacity(config.history.capacity),
            temporary: TemporaryState::empty(),
            validation: ValidationState::empty(),
            validated: AuthoringState::empty(),
            pending_validation: LatestSlot::new(),
            selection: BTreeSet::new(),
            metadata: None,
            pipeline: None,
            config,
            temporary_link_type,
            next_temporary: 0,
            events: EventSource::new(),
        })
    }

    pub fn with_metadata_api(mut self, api: Arc<dyn MetadataApi>) -> Self {
        self.metadata = Some(api);
        self
    }

    pub fn with_validation_api(mut self, api: Arc<dyn ValidationApi>) -> Self {
        self.pipeline = Some(ValidationPipeline::new(api));
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &DiagramModel {
        &self.document.graph
    }

    pub fn authoring_state(&self) -> &AuthoringState {
        &self.document.authoring
    }

    pub fn temporary_state(&self) -> &TemporaryState {
        &self.temporary
    }

    pub fn validation_state(&self) -> &ValidationState {
        &self.validation
    }

    pub fn selection(&self) -> &BTreeSet<ElementId> {
        &self.selection
    }

    pub fn history(&self) -> &History<EditorDocument> {
        &self.history
    }

    pub fn listen(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        self.events.listen(listener)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.events.unlisten(id)
    }

    pub fn listen_graph(&mut self, listener: impl FnMut(&GraphEvent) + 'static) -> ListenerId {
        self.document.graph.listen(listener)
    }

    /// Replaces the diagram with persisted content and forgets every pending change.
    pub fn load_diagram(
        &mut self,
        elements: Vec<(ElementModel, Point)>,
        links: Vec<LinkModel>,
    ) -> Result<(), EditorError> {
        self.document.graph.clear();
        for (model, position) in elements {
            self.document.graph.create_element(model, position, None);
        }
        for link in &links {
            self.document.graph.create_links(link)?;
        }

        self.document.authoring = AuthoringState::empty();
        self.validated = AuthoringState::empty();
        self.pending_validation.take();
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.cancel_all();
        }
        self.history.reset();
        self.selection.clear();

        debug!(
            elements = self.document.graph.cells().element_count(),
            links = self.document.graph.cells().link_count(),
            "diagram loaded"
        );
        self.set_temporary_state(TemporaryState::empty());
        self.set_validation_state(ValidationState::empty());
        self.events.trigger(&EditorEvent::AuthoringStateChanged);
        self.events.trigger(&EditorEvent::SelectionChanged);
        self.events.trigger(&EditorEvent::HistoryChanged);
        Ok(())
    }

    /// Creates a never-persisted element and shows it at `position`.
    pub fn create_entity(
        &mut self,
        model: ElementModel,
        position: Point,
    ) -> Result<ElementId, EditorError> {
        self.transact("Create new entity", |editor| {
            if editor.document.graph.cells().has_element_iri(model.id()) {
                return Err(EditorError::ElementAlreadyExists(model.id().clone()));
            }
            editor.create_entity_in_batch(model, position)
        })
    }

    /// Replaces the data of an element on every cell showing it.
    pub fn change_entity(
        &mut self,
        target: &ElementIri,
        data: ElementModel,
    ) -> Result<(), EditorError> {
        if self.document.authoring.is_deleted_element(target) {
            debug!(element = %target, "edit of deleted element ignored");
            return Ok(());
        }
        let before = self.element_model(target)?;
        if data.id() != target && self.document.graph.cells().has_element_iri(data.id()) {
            return Err(EditorError::ElementAlreadyExists(data.id().clone()));
        }
        let next = self.document.authoring.change_element(before, data.clone())?;

        self.transact("Edit entity", |editor| {
            let cells = editor.cells_of(target);
            for cell in cells {
                editor.execute(commands::set_element_data(cell, data.clone()));
            }
            editor.execute(commands::set_authoring_state(next));
            Ok(())
        })
    }

    /// Deletes an element. Persisted elements stay on the diagram, marked as deleted; new ones
    /// disappear.
    pub fn delete_entity(&mut self, target: &ElementIri) -> Result<(), EditorError> {
        if self.document.authoring.is_deleted_element(target) {
            debug!(element = %target, "delete of deleted element ignored");
            return Ok(());
        }
        self.transact("Delete entity", |editor| editor.delete_entity_in_batch(target))
    }

    /// Adds a never-persisted link between every pair of cells showing its endpoints.
    pub fn create_new_link(&mut self, link: LinkModel) -> Result<Vec<LinkId>, EditorError> {
        self.transact("Create new link", |editor| editor.create_link_in_batch(link))
    }

    /// Edits a link. Property edits keep the link; a different type or endpoint replaces it.
    pub fn change_link(&mut self, before: &LinkModel, after: LinkModel) -> Result<(), EditorError> {
        if self.document.authoring.is_deleted_link(before) {
            debug!(link = %before.key(), "edit of deleted link ignored");
            return Ok(());
        }
        if same_link(before, &after) {
            return self.transact("Edit link", |editor| {
                let next = editor.document.authoring.change_link(before.clone(), after.clone())?;
                let cells = editor.link_cells(&before.key());
                if cells.is_empty() {
                    return Err(EditorError::LinkNotFound(before.key()));
                }
                for cell in cells {
                    editor.execute(commands::set_link_data(cell, after.clone()));
                }
                editor.execute(commands::set_authoring_state(next));
                Ok(())
            });
        }

        self.transact("Change link", |editor| {
            editor.delete_link_in_batch(before)?;
            editor.create_link_in_batch(after).map(drop)
        })
    }

    pub fn move_link_source(
        &mut self,
        link: &LinkModel,
        source: &ElementIri,
    ) -> Result<Vec<LinkId>, EditorError> {
        let moved = link.clone().with_source(source.clone());
        if moved.key() == link.key() {
            return Ok(self.unmoved_link_cells(link));
        }
        self.transact("Move link source", |editor| editor.move_link_in_batch(link, moved))
    }

    pub fn move_link_target(
        &mut self,
        link: &LinkModel,
        target: &ElementIri,
    ) -> Result<Vec<LinkId>, EditorError> {
        let moved = link.clone().with_target(target.clone());
        if moved.key() == link.key() {
            return Ok(self.unmoved_link_cells(link));
        }
        self.transact("Move link target", |editor| editor.move_link_in_batch(link, moved))
    }

    pub fn delete_link(&mut self, link: &LinkModel) -> Result<(), EditorError> {
        if self.document.authoring.is_deleted_link(link) {
            debug!(link = %link.key(), "delete of deleted link ignored");
            return Ok(());
        }
        self.transact("Delete link", |editor| editor.delete_link_in_batch(link))
    }

    /// Reverts one pending change, on the diagram as well as in the authoring state.
    pub fn discard_change(&mut self, event: &AuthoringEvent) -> Result<(), EditorError> {
        if !self.document.authoring.events().contains(event) {
            debug!(kind = ?event.kind(), "discard of unknown change ignored");
            return Ok(());
        }

        self.transact("Discard change", |editor| {
            match event {
                AuthoringEvent::ChangeElement { before: None, after } => {
                    for cell in editor.cells_of(after.id()) {
                        editor.execute(commands::remove_element(cell));
                    }
                }
                AuthoringEvent::ChangeElement { before: Some(before), after } => {
                    for cell in editor.cells_of(after.id()) {
                        editor.execute(commands::set_element_data(cell, before.clone()));
                    }
                }
                AuthoringEvent::ChangeLink { before: None, after } => {
                    for cell in editor.link_cells(&after.key()) {
                        editor.execute(commands::remove_link(cell));
                    }
                }
                AuthoringEvent::ChangeLink { before: Some(before), after } => {
                    for cell in editor.link_cells(&after.key()) {
                        editor.execute(commands::set_link_data(cell, before.clone()));
                    }
                }
                AuthoringEvent::DeleteElement { .. } | AuthoringEvent::DeleteLink { .. } => {}
            }
            let next = editor.document.authoring.discard(event);
            editor.execute(commands::set_authoring_state(next));
            Ok(())
        })
    }

    /// Moves an element cell. Recorded as a single undo step.
    pub fn move_element(&mut self, id: &ElementId, position: Point) -> Result<(), EditorError> {
        if self.document.graph.get_element(id).is_none() {
            return Err(EditorError::CellNotFound(id.clone()));
        }
        let before = self.document.authoring.clone();
        let frames = self.history_lengths();
        self.execute(commands::set_element_position(id.clone(), position));
        self.after_change(before, frames);
        Ok(())
    }

    /// Replaces the authoring state as one undoable step.
    pub fn set_authoring_state(&mut self, state: AuthoringState) -> Result<(), EditorError> {
        self.transact("Set authoring state", |editor| {
            editor.execute(commands::set_authoring_state(state));
            Ok(())
        })
    }

    pub fn set_temporary_state(&mut self, state: TemporaryState) {
        if self.temporary == state {
            return;
        }
        self.temporary = state;
        self.events.trigger(&EditorEvent::TemporaryStateChanged);
    }

    /// Selects the given cells; unknown ids are skipped.
    pub fn set_selection(&mut self, cells: impl IntoIterator<Item = ElementId>) {
        let graph = &self.document.graph;
        let selection: BTreeSet<ElementId> =
            cells.into_iter().filter(|id| graph.get_element(id).is_some()).collect();
        if selection != self.selection {
            self.selection = selection;
            self.events.trigger(&EditorEvent::SelectionChanged);
        }
    }

    /// Deletes every element shown by a selected cell, as one undo step.
    pub fn remove_selected_elements(&mut self) -> Result<(), EditorError> {
        let targets: BTreeSet<ElementIri> = self
            .selection
            .iter()
            .filter_map(|id| self.document.graph.get_element(id))
            .map(|element| element.iri().clone())
            .filter(|iri| !self.document.authoring.is_deleted_element(iri))
            .collect();
        if targets.is_empty() {
            return Ok(());
        }

        self.transact("Delete selected elements", |editor| {
            for target in &targets {
                editor.delete_entity_in_batch(target)?;
            }
            Ok(())
        })
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let before = self.document.authoring.clone();
        let frames = self.history_lengths();
        let undone = self.history.undo(&mut self.document)?;
        self.after_change(before, frames);
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let before = self.document.authoring.clone();
        let frames = self.history_lengths();
        let redone = self.history.redo(&mut self.document)?;
        self.after_change(before, frames);
        Ok(redone)
    }

    /// Starts the pending validation pass, if any. Returns `true` when a pass started.
    pub fn flush_validation(&mut self) -> bool {
        let Some(target) = self.pending_validation.take() else {
            return false;
        };
        let Some(pipeline) = self.pipeline.as_mut() else {
            return false;
        };

        let graph = Arc::new(self.document.graph.snapshot());
        let changed = changed_elements_to_validate(&self.validated, &target, &graph);
        self.validated = target.clone();
        if changed.is_empty() {
            trace!("validation pass skipped, nothing changed");
            return false;
        }

        let next = pipeline.validate_elements(&changed, graph, &target, &self.validation);
        self.set_validation_state(next);
        true
    }

    /// Applies the next finished validation request.
    ///
    /// `None` when nothing is in flight, otherwise whether the result was still current.
    pub async fn next_validation(&mut self) -> Option<bool> {
        let outcome = self.pipeline.as_mut()?.next_outcome().await?;
        match self.validation.apply(outcome) {
            Some(next) => {
                self.set_validation_state(next);
                Some(true)
            }
            None => Some(false),
        }
    }

    /// Flushes pending work and applies every validation result until nothing is in flight.
    pub async fn run_validation(&mut self) {
        self.flush_validation();
        while self.next_validation().await.is_some() {}
    }

    fn set_validation_state(&mut self, state: ValidationState) {
        if self.validation == state {
            return;
        }
        self.validation = state;
        self.events.trigger(&EditorEvent::ValidationStateChanged);
    }

    fn execute(&mut self, command: EditorCommand) {
        self.history.execute(command, &mut self.document);
    }

    /// Runs `operation` inside a batch: stored on success, discarded on error.
    fn transact<T>(
        &mut self,
        title: &str,
        operation: impl FnOnce(&mut Self) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        let before = self.document.authoring.clone();
        let frames = self.history_lengths();
        let batch = self.history.start_batch(title)?;

        match operation(self) {
            Ok(value) => {
                self.history.store(batch)?;
                self.after_change(before, frames);
                Ok(value)
            }
            Err(err) => {
                debug!(title, error = %err, "operation failed, batch discarded");
                self.history.discard(batch, &mut self.document)?;
                Err(err)
            }
        }
    }

    fn history_lengths(&self) -> (usize, usize) {
        (self.history.undo_len(), self.history.redo_len())
    }

    fn after_change(&mut self, before: AuthoringState, frames: (usize, usize)) {
        let graph = &self.document.graph;
        let selection_len = self.selection.len();
        self.selection.retain(|id| graph.get_element(id).is_some());
        if self.selection.len() != selection_len {
            self.events.trigger(&EditorEvent::SelectionChanged);
        }

        if self.history_lengths() != frames {
            self.events.trigger(&EditorEvent::HistoryChanged);
        }
        if self.document.authoring == before {
            return;
        }

        self.events.trigger(&EditorEvent::AuthoringStateChanged);
        self.schedule_validation();
    }

    fn schedule_validation(&mut self) {
        if !self.config.validation.enabled || self.pipeline.is_none() {
            return;
        }
        if self.pending_validation.schedule(self.document.authoring.clone()).is_some() {
            trace!(
                replaced = self.pending_validation.replaced(),
                "pending validation pass replaced"
            );
        }
        if !self.config.validation.defer {
            self.flush_validation();
        }
    }

    fn element_model(&self, iri: &ElementIri) -> Result<ElementModel, EditorError> {
        self.document
            .graph
            .cells()
            .elements_by_iri(iri)
            .next()
            .map(|element| element.data.clone())
            .ok_or_else(|| EditorError::ElementNotFound(iri.clone()))
    }

    fn cell(&self, id: &ElementId) -> Result<&Element, EditorError> {
        self.document.graph.get_element(id).ok_or_else(|| EditorError::CellNotFound(id.clone()))
    }

    fn cells_of(&self, iri: &ElementIri) -> Vec<ElementId> {
        self.document.graph.cells().elements_by_iri(iri).map(|element| element.id.clone()).collect()
    }

    fn link_cells(&self, key: &LinkKey) -> Vec<LinkId> {
        self.document.graph.cells().links_by_key(key).map(|link| link.id.clone()).collect()
    }

    fn metadata(&self) -> Result<Arc<dyn MetadataApi>, EditorError> {
        self.metadata.clone().ok_or(EditorError::MissingMetadataApi)
    }

    fn create_entity_in_batch(
        &mut self,
        model: ElementModel,
        position: Point,
    ) -> Result<ElementId, EditorError> {
        let cell = self.document.graph.new_element(model.clone(), position, None);
        let id = cell.id.clone();
        self.execute(commands::add_element(cell));
        let next = self.document.authoring.add_element(model);
        self.execute(commands::set_authoring_state(next));
        Ok(id)
    }

    fn delete_entity_in_batch(&mut self, target: &ElementIri) -> Result<(), EditorError> {
        let model = self.element_model(target)?;

        if self.document.authoring.is_new_element(target) {
            for cell in self.cells_of(target) {
                self.execute(commands::remove_element(cell));
            }
        } else {
            // Pending link changes vanish with the element; their cells go back to persisted data.
            let authoring = &self.document.authoring;
            let mut removed = Vec::new();
            let mut reverted = Vec::new();
            let attached =
                self.document.graph.cells().links().filter(|link| link.data.touches(target));
            for link in attached {
                match authoring.link_event(&link.data) {
                    Some(AuthoringEvent::ChangeLink { before: None, .. }) => {
                        removed.push(link.id.clone());
                    }
                    Some(AuthoringEvent::ChangeLink { before: Some(before), .. }) => {
                        reverted.push((link.id.clone(), before.clone()));
                    }
                    _ => {}
                }
            }
            for link in removed {
                self.execute(commands::remove_link(link));
            }
            for (link, data) in reverted {
                self.execute(commands::set_link_data(link, data));
            }
        }

        let next = self.document.authoring.delete_element(&model);
        self.execute(commands::set_authoring_state(next));
        Ok(())
    }

    fn create_link_in_batch(&mut self, link: LinkModel) -> Result<Vec<LinkId>, EditorError> {
        let key = link.key();
        for endpoint in [link.source(), link.target()] {
            if !self.document.graph.cells().has_element_iri(endpoint) {
                return Err(EditorError::ElementNotFound(endpoint.clone()));
            }
        }

        let on_diagram = self.document.graph.cells().links_by_key(&key).next().is_some();
        let restorable = self.document.authoring.is_deleted_link(&link)
            && !self.document.authoring.is_deleted_element(link.source())
            && !self.document.authoring.is_deleted_element(link.target());
        if on_diagram && !restorable {
            return Err(EditorError::LinkAlreadyExists(key));
        }

        let cells = self.document.graph.new_links(&link);
        let ids: Vec<LinkId> = cells.iter().map(|cell| cell.id.clone()).collect();
        for cell in cells {
            self.execute(commands::add_link(cell));
        }
        for id in self.link_cells(&key) {
            self.execute(commands::set_link_data(id, link.clone()));
        }
        let next = self.document.authoring.add_link(link);
        self.execute(commands::set_authoring_state(next));
        Ok(ids)
    }

    fn delete_link_in_batch(&mut self, link: &LinkModel) -> Result<(), EditorError> {
        let key = link.key();
        let cells = self.link_cells(&key);
        if cells.is_empty() && self.document.authoring.link_event(link).is_none() {
            return Err(EditorError::LinkNotFound(key));
        }

        if self.document.authoring.is_new_link(link) {
            for cell in cells {
                self.execute(commands::remove_link(cell));
            }
        }
        let next = self.document.authoring.delete_link(link);
        self.execute(commands::set_authoring_state(next));
        Ok(())
    }

    /// Cells of a link whose endpoint "moved" onto the element it is already attached to.
    fn unmoved_link_cells(&self, link: &LinkModel) -> Vec<LinkId> {
        debug!(link = %link.key(), "link endpoint unchanged, move ignored");
        self.link_cells(&link.key())
    }

    fn move_link_in_batch(
        &mut self,
        link: &LinkModel,
        moved: LinkModel,
    ) -> Result<Vec<LinkId>, EditorError> {
        if self.document.authoring.is_deleted_link(link) {
            return Err(EditorError::LinkNotFound(link.key()));
        }
        if moved.key() == link.key() {
            return Ok(self.unmoved_link_cells(link));
        }
        self.delete_link_in_batch(link)?;
        self.create_link_in_batch(moved)
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("history", &self.history)
            .field("authoring_events", &self.document.authoring.events().len())
            .field("temporary_empty", &self.temporary.is_empty())
            .field("selection", &self.selection)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
