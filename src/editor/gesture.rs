// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Link gestures that ask the metadata policy before committing anything.
//!
//! While the policy is consulted, a temporary link (and, for canvas drops, a placeholder
//! element) is shown inside a preview batch. The preview is always rolled back, whatever the
//! answer; an approved gesture is then committed in a batch of its own, so the undo stack
//! only ever sees the final result.

use tracing::{debug, trace, warn};

use super::{commands, Editor, EditorError};
use crate::authoring::TemporaryState;
use crate::cancellation::{abortable, CancellationToken};
use crate::diagram::{Element, Point};
use crate::history::Batch;
use crate::model::{ElementId, ElementIri, ElementModel, ElementTypeIri, LinkId, LinkModel};
use crate::policy::{LinkDirection, MetadataApi, PolicyError};

/// Where a dragged link was released.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkDrop {
    /// On empty canvas: a new element is generated at `position`.
    Canvas { position: Point },
    /// On an existing element cell.
    Element { target: ElementId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkGestureOutcome {
    Created { element: Option<ElementId>, link: LinkModel, cells: Vec<LinkId> },
    /// The policy refused; nothing changed.
    Rejected,
    /// The gesture was cancelled before the policy answered; nothing changed.
    Cancelled,
}

struct LinkPlan {
    element: Option<ElementModel>,
    link: LinkModel,
}

/// Temporary cells shown during a gesture. Dropping the preview rolls them back, including
/// when the gesture future itself is dropped mid-flight.
struct Preview<'a> {
    editor: &'a mut Editor,
    batch: Option<Batch>,
}

impl<'a> Preview<'a> {
    fn open(editor: &'a mut Editor, title: &str) -> Result<Self, EditorError> {
        let batch = editor.history.start_batch(title)?;
        Ok(Self { editor, batch: Some(batch) })
    }

    fn show(&mut self, source: &Element, drop: &LinkDrop) -> Result<(), EditorError> {
        let editor = &mut *self.editor;
        let (target, placeholder) = match drop {
            LinkDrop::Canvas { position } => {
                let iri = editor.config.gesture.temporary_iri(editor.next_temporary)?;
                editor.next_temporary = editor.next_temporary.saturating_add(1);
                let model = ElementModel::new(iri.clone());
                let group = source.group.clone();
                let cell = editor.document.graph.new_element(model.clone(), *position, group);
                editor.execute(commands::add_element(cell));
                (iri, Some(model))
            }
            LinkDrop::Element { target } => (editor.cell(target)?.iri().clone(), None),
        };

        let link = LinkModel::new(editor.temporary_link_type.clone(), source.iri().clone(), target);
        for cell in editor.document.graph.new_links(&link) {
            editor.execute(commands::add_link(cell));
        }

        let mut temporary = editor.temporary.add_link(link);
        if let Some(model) = placeholder {
            temporary = temporary.add_element(model);
        }
        editor.set_temporary_state(temporary);
        Ok(())
    }
}

impl Drop for Preview<'_> {
    fn drop(&mut self) {
        let Some(batch) = self.batch.take() else {
            return;
        };
        let editor = &mut *self.editor;
        if let Err(err) = editor.history.discard(batch, &mut editor.document) {
            warn!(error = %err, "link preview could not be rolled back");
        }
        editor.set_temporary_state(TemporaryState::empty());
        trace!("link preview removed");
    }
}

/// Asks the policy which link (and element, for canvas drops) the gesture should create.
async fn plan_link(
    metadata: &dyn MetadataApi,
    source: &ElementModel,
    target: Option<&ElementModel>,
    cancellation: &CancellationToken,
) -> Result<Option<LinkPlan>, PolicyError> {
    let (target, element) = match target {
        Some(target) => {
            if !metadata.can_drop_on_element(source, target, cancellation).await? {
                return Ok(None);
            }
            (target.clone(), None)
        }
        None => {
            if !metadata.can_drop_on_canvas(source, cancellation).await? {
                return Ok(None);
            }
            let types = metadata.types_of_elements_dragged_from(source, cancellation).await?;
            let constructible: Vec<ElementTypeIri> = metadata
                .filter_constructible_types(&types, cancellation)
                .await?
                .into_iter()
                .collect();
            let element = metadata.generate_new_element(&constructible, cancellation).await?;
            (element.clone(), Some(element))
        }
    };

    if !metadata.can_link_element(source, cancellation).await? {
        return Ok(None);
    }
    let options = metadata.possible_link_types(source, &target, cancellation).await?;
    let Some(option) = options.into_iter().next() else {
        return Ok(None);
    };

    let link = match option.direction {
        LinkDirection::Out => {
            LinkModel::new(option.link_type, source.id().clone(), target.id().clone())
        }
        LinkDirection::In => {
            LinkModel::new(option.link_type, target.id().clone(), source.id().clone())
        }
    };
    Ok(Some(LinkPlan { element, link }))
}

impl Editor {
    /// Drag-to-link: drops a link started at `source` onto the canvas or another element.
    pub async fn drag_link(
        &mut self,
        source: &ElementId,
        drop: LinkDrop,
        cancellation: &CancellationToken,
    ) -> Result<LinkGestureOutcome, EditorError> {
        let metadata = self.metadata()?;
        let source_cell = self.cell(source)?.clone();
        if self.document.authoring.is_deleted_element(source_cell.iri()) {
            debug!(element = %source_cell.iri(), "link from deleted element rejected");
            return Ok(LinkGestureOutcome::Rejected);
        }
        let target = match &drop {
            LinkDrop::Element { target } => Some(self.cell(target)?.data.clone()),
            LinkDrop::Canvas { .. } => None,
        };

        let decision = {
            let mut preview = Preview::open(self, "Drag link")?;
            preview.show(&source_cell, &drop)?;
            let plan = plan_link(&*metadata, &source_cell.data, target.as_ref(), cancellation);
            abortable(cancellation, plan).await
        };

        let plan = match decision {
            None => {
                debug!(source = %source, "link gesture cancelled");
                return Ok(LinkGestureOutcome::Cancelled);
            }
            Some(result) => result?,
        };
        let Some(LinkPlan { element, link }) = plan else {
            debug!(source = %source, "link gesture rejected by policy");
            return Ok(LinkGestureOutcome::Rejected);
        };

        let position = match drop {
            LinkDrop::Canvas { position } => position,
            LinkDrop::Element { .. } => Point::default(),
        };
        self.transact("Create link", |editor| {
            let element = match element {
                Some(model) => {
                    if editor.document.graph.cells().has_element_iri(model.id()) {
                        return Err(EditorError::ElementAlreadyExists(model.id().clone()));
                    }
                    Some(editor.create_entity_in_batch(model, position)?)
                }
                None => None,
            };
            let cells = editor.create_link_in_batch(link.clone())?;
            Ok(LinkGestureOutcome::Created { element, link, cells })
        })
    }

    /// Moves one end of `link` to `element` if the policy permits the link type there.
    pub async fn reconnect_link(
        &mut self,
        link: &LinkModel,
        end: LinkEnd,
        element: &ElementIri,
        cancellation: &CancellationToken,
    ) -> Result<LinkGestureOutcome, EditorError> {
        let metadata = self.metadata()?;
        if self.document.authoring.is_deleted_link(link) {
            debug!(link = %link.key(), "reconnect of deleted link rejected");
            return Ok(LinkGestureOutcome::Rejected);
        }

        let moved = match end {
            LinkEnd::Source => link.clone().with_source(element.clone()),
            LinkEnd::Target => link.clone().with_target(element.clone()),
        };
        if moved.key() == link.key() {
            let cells = self.unmoved_link_cells(link);
            return Ok(LinkGestureOutcome::Created { element: None, link: moved, cells });
        }
        let source = self.element_model(moved.source())?;
        let target = self.element_model(moved.target())?;

        let query = metadata.possible_link_types(&source, &target, cancellation);
        let options = match abortable(cancellation, query).await {
            None => return Ok(LinkGestureOutcome::Cancelled),
            Some(options) => options?,
        };
        let permitted = options
            .iter()
            .any(|option| {
                &option.link_type == link.link_type() && option.direction == LinkDirection::Out
            });
        if !permitted {
            debug!(link = %link.key(), to = %element, "reconnect not permitted by policy");
            return Ok(LinkGestureOutcome::Rejected);
        }

        let title = match end {
            LinkEnd::Source => "Move link source",
            LinkEnd::Target => "Move link target",
        };
        let cells = self.transact(title, |editor| editor.move_link_in_batch(link, moved.clone()))?;
        Ok(LinkGestureOutcome::Created { element: None, link: moved, cells })
    }
}
