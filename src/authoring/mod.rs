// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pending authoring changes overlaid on the loaded base graph.
//!
//! [`AuthoringState`] is an immutable value: a log of [`AuthoringEvent`]s plus an index derived
//! from it (last write wins per element IRI / link identity). Every transition takes `&self`
//! and returns a new state, so undo only has to restore a previous value.
//!
//! A committed state never holds two events for the same key; transitions drop the events
//! they supersede before appending their own.

pub mod temporary;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use crate::keyed::LinkMap;
use crate::model::{same_link, ElementIri, ElementModel, LinkKey, LinkModel};

pub use temporary::TemporaryState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthoringKind {
    ChangeElement,
    DeleteElement,
    ChangeLink,
    DeleteLink,
}

/// One pending change relative to the persisted state of an entity.
///
/// `before` is the persisted baseline; it is `None` for entities created in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthoringEvent {
    ChangeElement { before: Option<ElementModel>, after: ElementModel },
    DeleteElement { model: ElementModel },
    ChangeLink { before: Option<LinkModel>, after: LinkModel },
    DeleteLink { model: LinkModel },
}

impl AuthoringEvent {
    pub fn kind(&self) -> AuthoringKind {
        match self {
            Self::ChangeElement { .. } => AuthoringKind::ChangeElement,
            Self::DeleteElement { .. } => AuthoringKind::DeleteElement,
            Self::ChangeLink { .. } => AuthoringKind::ChangeLink,
            Self::DeleteLink { .. } => AuthoringKind::DeleteLink,
        }
    }

    /// IRI the event is indexed under, for element events.
    pub fn element_iri(&self) -> Option<&ElementIri> {
        match self {
            Self::ChangeElement { after, .. } => Some(after.id()),
            Self::DeleteElement { model } => Some(model.id()),
            Self::ChangeLink { .. } | Self::DeleteLink { .. } => None,
        }
    }

    /// Link the event is indexed under, for link events.
    pub fn link(&self) -> Option<&LinkModel> {
        match self {
            Self::ChangeLink { after, .. } => Some(after),
            Self::DeleteLink { model } => Some(model),
            Self::ChangeElement { .. } | Self::DeleteElement { .. } => None,
        }
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self, Self::DeleteElement { .. } | Self::DeleteLink { .. })
    }

    /// `true` for creations of entities that were never persisted.
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::ChangeElement { before: None, .. } | Self::ChangeLink { before: None, .. }
        )
    }

    fn targets_element(&self, iri: &ElementIri) -> bool {
        self.element_iri() == Some(iri)
    }

    fn targets_link(&self, key: &LinkKey) -> bool {
        self.link().is_some_and(|link| &link.key() == key)
    }

    fn link_touches(&self, iri: &ElementIri) -> bool {
        self.link().is_some_and(|link| link.touches(iri))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoringIndex {
    pub elements: BTreeMap<ElementIri, AuthoringEvent>,
    pub links: LinkMap<AuthoringEvent>,
}

impl AuthoringIndex {
    fn from_events(events: &[AuthoringEvent]) -> Self {
        let mut index = Self::default();
        for event in events {
            if let Some(iri) = event.element_iri() {
                index.elements.insert(iri.clone(), event.clone());
            } else if let Some(link) = event.link() {
                index.links.insert(link.clone(), event.clone());
            }
        }
        index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("cannot change link identity from {before} to {after}; move the link instead")]
    LinkIdentityChanged { before: LinkKey, after: LinkKey },
    #[error("cannot change IRI of persisted element {iri} to {new_iri}")]
    PersistedIriChange { iri: ElementIri, new_iri: ElementIri },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoringState {
    events: Arc<Vec<AuthoringEvent>>,
    index: Arc<AuthoringIndex>,
}

impl AuthoringState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a state from a log, keeping only the last event per element IRI / link identity.
    pub fn from_events(events: Vec<AuthoringEvent>) -> Self {
        let mut seen_elements = HashSet::new();
        let mut seen_links = HashSet::new();
        let mut kept = Vec::with_capacity(events.len());

        for event in events.into_iter().rev() {
            let fresh = match (event.element_iri(), event.link()) {
                (Some(iri), _) => seen_elements.insert(iri.clone()),
                (None, Some(link)) => seen_links.insert(link.key()),
                (None, None) => false,
            };
            if fresh {
                kept.push(event);
            }
        }
        kept.reverse();

        let index = AuthoringIndex::from_events(&kept);
        Self { events: Arc::new(kept), index: Arc::new(index) }
    }

    pub fn events(&self) -> &[AuthoringEvent] {
        &self.events
    }

    pub fn index(&self) -> &AuthoringIndex {
        &self.index
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn element_event(&self, iri: &ElementIri) -> Option<&AuthoringEvent> {
        self.index.elements.get(iri)
    }

    pub fn link_event(&self, link: &LinkModel) -> Option<&AuthoringEvent> {
        self.index.links.get(link)
    }

    pub fn is_new_element(&self, iri: &ElementIri) -> bool {
        matches!(self.element_event(iri), Some(AuthoringEvent::ChangeElement { before: None, .. }))
    }

    pub fn is_new_link(&self, link: &LinkModel) -> bool {
        matches!(self.link_event(link), Some(AuthoringEvent::ChangeLink { before: None, .. }))
    }

    pub fn is_deleted_element(&self, iri: &ElementIri) -> bool {
        matches!(self.element_event(iri), Some(AuthoringEvent::DeleteElement { .. }))
    }

    /// A link counts as deleted when it was deleted itself or either endpoint was.
    pub fn is_deleted_link(&self, link: &LinkModel) -> bool {
        matches!(self.link_event(link), Some(AuthoringEvent::DeleteLink { .. }))
            || self.is_deleted_element(link.source())
            || self.is_deleted_element(link.target())
    }

    /// Records `item` as created. Re-adding a deleted persisted element keeps its baseline.
    pub fn add_element(&self, item: ElementModel) -> Self {
        let before = match self.element_event(item.id()) {
            Some(AuthoringEvent::ChangeElement { before, .. }) => before.clone(),
            Some(AuthoringEvent::DeleteElement { model }) => Some(model.clone()),
            _ => None,
        };
        let iri = item.id().clone();
        let mut events = self.events_except(|event| event.targets_element(&iri));
        events.push(AuthoringEvent::ChangeElement { before, after: item });
        Self::from_events(events)
    }

    /// Records `item` as created. Re-adding a deleted persisted link keeps its baseline.
    pub fn add_link(&self, item: LinkModel) -> Self {
        let before = match self.link_event(&item) {
            Some(AuthoringEvent::ChangeLink { before, .. }) => before.clone(),
            Some(AuthoringEvent::DeleteLink { model }) => Some(model.clone()),
            _ => None,
        };
        let key = item.key();
        let mut events = self.events_except(|event| event.targets_link(&key));
        events.push(AuthoringEvent::ChangeLink { before, after: item });
        Self::from_events(events)
    }

    /// Records an edit of an element from `before` to `after`.
    ///
    /// The earliest known baseline is preserved across repeated edits. Changing the IRI is
    /// only allowed for elements created in this session; links created in this session that
    /// point at the old IRI are rewritten to the new one.
    pub fn change_element(
        &self,
        before: ElementModel,
        after: ElementModel,
    ) -> Result<Self, AuthoringError> {
        let old_iri = before.id().clone();
        let new_iri = after.id().clone();

        let baseline = match self.element_event(&old_iri) {
            Some(AuthoringEvent::ChangeElement { before: baseline, .. }) => baseline.clone(),
            Some(AuthoringEvent::DeleteElement { model }) => Some(model.clone()),
            _ => Some(before),
        };

        let iri_changed = old_iri != new_iri;
        if iri_changed && baseline.is_some() {
            return Err(AuthoringError::PersistedIriChange { iri: old_iri, new_iri });
        }

        let mut events = Vec::with_capacity(self.events.len() + 1);
        for event in self.events.iter() {
            match event {
                event if event.targets_element(&old_iri) => {}
                AuthoringEvent::ChangeLink { before, after }
                    if iri_changed && after.touches(&old_iri) =>
                {
                    events.push(AuthoringEvent::ChangeLink {
                        before: before.clone(),
                        after: after.clone().with_endpoint_renamed(&old_iri, &new_iri),
                    });
                }
                event => events.push(event.clone()),
            }
        }
        events.push(AuthoringEvent::ChangeElement { before: baseline, after });
        Ok(Self::from_events(events))
    }

    /// Records a property edit of a link. Type and endpoints must stay the same.
    pub fn change_link(&self, before: LinkModel, after: LinkModel) -> Result<Self, AuthoringError> {
        if !same_link(&before, &after) {
            return Err(AuthoringError::LinkIdentityChanged {
                before: before.key(),
                after: after.key(),
            });
        }

        let baseline = match self.link_event(&before) {
            Some(AuthoringEvent::ChangeLink { before: baseline, .. }) => baseline.clone(),
            Some(AuthoringEvent::DeleteLink { model }) => Some(model.clone()),
            _ => Some(before),
        };
        let key = after.key();
        let mut events = self.events_except(|event| event.targets_link(&key));
        events.push(AuthoringEvent::ChangeLink { before: baseline, after });
        Ok(Self::from_events(events))
    }

    /// Deletes an element along with every pending change of links touching it.
    ///
    /// Elements created in this session simply vanish; persisted ones get a single
    /// `DeleteElement` carrying their baseline.
    pub fn delete_element(&self, model: &ElementModel) -> Self {
        let iri = model.id();
        let deleted = match self.element_event(iri) {
            Some(AuthoringEvent::ChangeElement { before: None, .. }) => None,
            Some(AuthoringEvent::ChangeElement { before: Some(baseline), .. }) => {
                Some(baseline.clone())
            }
            Some(AuthoringEvent::DeleteElement { model }) => Some(model.clone()),
            _ => Some(model.clone()),
        };

        let mut events =
            self.events_except(|event| event.targets_element(iri) || event.link_touches(iri));
        if let Some(model) = deleted {
            events.push(AuthoringEvent::DeleteElement { model });
        }
        Self::from_events(events)
    }

    /// Deletes a link. Links created in this session simply vanish.
    pub fn delete_link(&self, model: &LinkModel) -> Self {
        let deleted = match self.link_event(model) {
            Some(AuthoringEvent::ChangeLink { before: None, .. }) => None,
            Some(AuthoringEvent::ChangeLink { before: Some(baseline), .. }) => {
                Some(baseline.clone())
            }
            Some(AuthoringEvent::DeleteLink { model }) => Some(model.clone()),
            _ => Some(model.clone()),
        };

        let key = model.key();
        let mut events = self.events_except(|event| event.targets_link(&key));
        if let Some(model) = deleted {
            events.push(AuthoringEvent::DeleteLink { model });
        }
        Self::from_events(events)
    }

    /// Drops `event` from the log. Discarding the creation of a new element also drops the
    /// link changes attached to it, which would otherwise dangle.
    ///
    /// Returns an equal state when `event` is not part of the log.
    pub fn discard(&self, event: &AuthoringEvent) -> Self {
        let Some(position) = self.events.iter().position(|candidate| candidate == event) else {
            return self.clone();
        };

        let mut events = self.events.as_ref().clone();
        events.remove(position);
        if let AuthoringEvent::ChangeElement { before: None, after } = event {
            events.retain(|candidate| {
                !matches!(
                    candidate,
                    AuthoringEvent::ChangeLink { after: link, .. } if link.touches(after.id())
                )
            });
        }
        Self::from_events(events)
    }

    fn events_except(&self, superseded: impl Fn(&AuthoringEvent) -> bool) -> Vec<AuthoringEvent> {
        self.events.iter().filter(|event| !superseded(event)).cloned().collect()
    }
}
