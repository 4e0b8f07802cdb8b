// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory diagram graph: element and link cells carrying semantic data.
//!
//! Several cells may show the same element IRI; a link cell always connects two element
//! cells. Structural mutations go through [`DiagramModel`], which reports them as
//! [`GraphEvent`]s. [`GraphSnapshot`] is the cloneable, comparable read side.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::trace;

use crate::events::{EventSource, ListenerId};
use crate::model::{ElementId, ElementIri, ElementModel, LinkId, LinkKey, LinkModel, LinkTypeIri};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub data: ElementModel,
    pub position: Point,
    pub group: Option<ElementId>,
}

impl Element {
    pub fn iri(&self) -> &ElementIri {
        self.data.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: LinkId,
    pub data: LinkModel,
    pub source_id: ElementId,
    pub target_id: ElementId,
}

impl Link {
    pub fn attaches(&self, element: &ElementId) -> bool {
        &self.source_id == element || &self.target_id == element
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    ElementAdded(ElementId),
    ElementRemoved(ElementId),
    ElementChanged(ElementId),
    LinkAdded(LinkId),
    LinkRemoved(LinkId),
    LinkChanged(LinkId),
    /// Emitted once after any structural change (cells added or removed).
    CellsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("link {link} references missing element cell {element}")]
    MissingEndpoint { link: LinkId, element: ElementId },
}

/// Immutable view of all cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    elements: BTreeMap<ElementId, Element>,
    links: BTreeMap<LinkId, Link>,
}

impl GraphSnapshot {
    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_link(&self, id: &LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn elements_by_iri<'a>(
        &'a self,
        iri: &'a ElementIri,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.values().filter(move |element| element.iri() == iri)
    }

    pub fn has_element_iri(&self, iri: &ElementIri) -> bool {
        self.elements_by_iri(iri).next().is_some()
    }

    /// The semantic data of every distinct element IRI on the canvas (first cell wins).
    pub fn element_models(&self) -> BTreeMap<&ElementIri, &ElementModel> {
        let mut models = BTreeMap::new();
        for element in self.elements.values() {
            models.entry(element.iri()).or_insert(&element.data);
        }
        models
    }

    /// Link cells attached to the element cell `id`.
    pub fn links_of<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.values().filter(move |link| link.attaches(id))
    }

    /// Link cells showing the relation `key`.
    pub fn links_by_key<'a>(&'a self, key: &'a LinkKey) -> impl Iterator<Item = &'a Link> + 'a {
        self.links.values().filter(move |link| &link.data.key() == key)
    }

    /// Distinct relations whose source is `iri`.
    pub fn outbound_links(&self, iri: &ElementIri) -> Vec<&LinkModel> {
        self.distinct_links(|link| link.source() == iri)
    }

    /// Distinct relations whose target is `iri`.
    pub fn incoming_links(&self, iri: &ElementIri) -> Vec<&LinkModel> {
        self.distinct_links(|link| link.target() == iri)
    }

    pub fn find_link(
        &self,
        link_type: &LinkTypeIri,
        source_id: &ElementId,
        target_id: &ElementId,
    ) -> Option<&Link> {
        self.links.values().find(|link| {
            link.data.link_type() == link_type
                && &link.source_id == source_id
                && &link.target_id == target_id
        })
    }

    fn distinct_links(&self, keep: impl Fn(&LinkModel) -> bool) -> Vec<&LinkModel> {
        let mut seen = BTreeSet::new();
        self.links
            .values()
            .map(|link| &link.data)
            .filter(|data| keep(*data) && seen.insert(data.key()))
            .collect()
    }
}

/// Owner of the diagram cells. Only the editor mutates it during authoring.
#[derive(Debug, Default)]
pub struct DiagramModel {
    cells: GraphSnapshot,
    next_cell: u64,
    events: EventSource<GraphEvent>,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &GraphSnapshot {
        &self.cells
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.cells.clone()
    }

    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.cells.get_element(id)
    }

    pub fn get_link(&self, id: &LinkId) -> Option<&Link> {
        self.cells.get_link(id)
    }

    pub fn find_link(
        &self,
        link_type: &LinkTypeIri,
        source_id: &ElementId,
        target_id: &ElementId,
    ) -> Option<&Link> {
        self.cells.find_link(link_type, source_id, target_id)
    }

    pub fn listen(&mut self, listener: impl FnMut(&GraphEvent) + 'static) -> ListenerId {
        self.events.listen(listener)
    }

    pub fn unlisten(&mut self, id: ListenerId) -> bool {
        self.events.unlisten(id)
    }

    /// Allocates a cell for `data` without adding it to the graph.
    pub fn new_element(
        &mut self,
        data: ElementModel,
        position: Point,
        group: Option<ElementId>,
    ) -> Element {
        let id = ElementId::generated(format!("element-{}", self.allocate()));
        Element { id, data, position, group }
    }

    pub fn create_element(
        &mut self,
        data: ElementModel,
        position: Point,
        group: Option<ElementId>,
    ) -> ElementId {
        let element = self.new_element(data, position, group);
        let id = element.id.clone();
        self.insert_element(element);
        id
    }

    /// Adds (or replaces) a cell under its own id.
    pub fn insert_element(&mut self, element: Element) {
        let id = element.id.clone();
        trace!(element = %id, iri = %element.iri(), "element cell added");
        self.cells.elements.insert(id.clone(), element);
        self.events.trigger(&GraphEvent::ElementAdded(id));
        self.events.trigger(&GraphEvent::CellsChanged);
    }

    /// Removes an element cell and every link cell attached to it.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<(Element, Vec<Link>)> {
        if !self.cells.elements.contains_key(id) {
            return None;
        }

        let attached: Vec<LinkId> = self.cells.links_of(id).map(|link| link.id.clone()).collect();
        let mut removed_links = Vec::with_capacity(attached.len());
        for link_id in attached {
            if let Some(link) = self.cells.links.remove(&link_id) {
                self.events.trigger(&GraphEvent::LinkRemoved(link_id));
                removed_links.push(link);
            }
        }

        let element = self.cells.elements.remove(id)?;
        trace!(element = %id, links = removed_links.len(), "element cell removed");
        self.events.trigger(&GraphEvent::ElementRemoved(id.clone()));
        self.events.trigger(&GraphEvent::CellsChanged);
        Some((element, removed_links))
    }

    /// Allocates one link cell per (source cell, target cell) pair showing `data`'s endpoints
    /// that is not already connected by a link of the same type. Nothing is added.
    pub fn new_links(&mut self, data: &LinkModel) -> Vec<Link> {
        let pairs: Vec<(ElementId, ElementId)> = self
            .cells
            .elements_by_iri(data.source())
            .flat_map(|source| {
                self.cells
                    .elements_by_iri(data.target())
                    .map(move |target| (source.id.clone(), target.id.clone()))
            })
            .filter(|(source_id, target_id)| {
                self.cells.find_link(data.link_type(), source_id, target_id).is_none()
            })
            .collect();

        pairs
            .into_iter()
            .map(|(source_id, target_id)| Link {
                id: LinkId::generated(format!("link-{}", self.allocate())),
                data: data.clone(),
                source_id,
                target_id,
            })
            .collect()
    }

    pub fn create_links(&mut self, data: &LinkModel) -> Result<Vec<LinkId>, DiagramError> {
        let links = self.new_links(data);
        let mut ids = Vec::with_capacity(links.len());
        for link in links {
            ids.push(link.id.clone());
            self.insert_link(link)?;
        }
        Ok(ids)
    }

    pub fn insert_link(&mut self, link: Link) -> Result<(), DiagramError> {
        for endpoint in [&link.source_id, &link.target_id] {
            if !self.cells.elements.contains_key(endpoint) {
                return Err(DiagramError::MissingEndpoint {
                    link: link.id.clone(),
                    element: endpoint.clone(),
                });
            }
        }

        let id = link.id.clone();
        trace!(link = %id, relation = %link.data.key(), "link cell added");
        self.cells.links.insert(id.clone(), link);
        self.events.trigger(&GraphEvent::LinkAdded(id));
        self.events.trigger(&GraphEvent::CellsChanged);
        Ok(())
    }

    pub fn remove_link(&mut self, id: &LinkId) -> Option<Link> {
        let link = self.cells.links.remove(id)?;
        trace!(link = %id, "link cell removed");
        self.events.trigger(&GraphEvent::LinkRemoved(id.clone()));
        self.events.trigger(&GraphEvent::CellsChanged);
        Some(link)
    }

    /// Returns the previous data, or `None` when the cell does not exist.
    pub fn set_element_data(&mut self, id: &ElementId, data: ElementModel) -> Option<ElementModel> {
        let element = self.cells.elements.get_mut(id)?;
        let previous = std::mem::replace(&mut element.data, data);
        self.events.trigger(&GraphEvent::ElementChanged(id.clone()));
        Some(previous)
    }

    pub fn set_link_data(&mut self, id: &LinkId, data: LinkModel) -> Option<LinkModel> {
        let link = self.cells.links.get_mut(id)?;
        let previous = std::mem::replace(&mut link.data, data);
        self.events.trigger(&GraphEvent::LinkChanged(id.clone()));
        Some(previous)
    }

    pub fn set_element_position(&mut self, id: &ElementId, position: Point) -> Option<Point> {
        let element = self.cells.elements.get_mut(id)?;
        let previous = std::mem::replace(&mut element.position, position);
        self.events.trigger(&GraphEvent::ElementChanged(id.clone()));
        Some(previous)
    }

    /// Removes every cell.
    pub fn clear(&mut self) {
        let ids: Vec<ElementId> = self.cells.elements.keys().cloned().collect();
        for id in ids {
            self.remove_element(&id);
        }
        let orphans: Vec<LinkId> = self.cells.links.keys().cloned().collect();
        for id in orphans {
            self.remove_link(&id);
        }
    }

    fn allocate(&mut self) -> u64 {
        let next = self.next_cell;
        self.next_cell = self.next_cell.saturating_add(1);
        next
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{DiagramError, DiagramModel, GraphEvent, Link, Point};
    use crate::model::fixtures::{element, iri, link, link_type, KNOWS};
    use crate::model::LinkId;

    #[test]
    fn create_links_connects_every_cell_pair_once() {
        let mut graph = DiagramModel::new();
        let a1 = graph.create_element(element("urn:a"), Point::default(), None);
        let a2 = graph.create_element(element("urn:a"), Point::new(10.0, 0.0), None);
        let b = graph.create_element(element("urn:b"), Point::new(0.0, 10.0), None);

        let created = graph.create_links(&link("urn:a", "urn:b")).expect("links");
        assert_eq!(created.len(), 2);
        assert!(graph.find_link(&link_type(KNOWS), &a1, &b).is_some());
        assert!(graph.find_link(&link_type(KNOWS), &a2, &b).is_some());

        let again = graph.create_links(&link("urn:a", "urn:b")).expect("links");
        assert!(again.is_empty());
        assert_eq!(graph.cells().outbound_links(&iri("urn:a")).len(), 1);
    }

    #[test]
    fn removing_an_element_removes_attached_links() {
        let mut graph = DiagramModel::new();
        let a = graph.create_element(element("urn:a"), Point::default(), None);
        graph.create_element(element("urn:b"), Point::default(), None);
        graph.create_links(&link("urn:a", "urn:b")).expect("links");

        let (removed, links) = graph.remove_element(&a).expect("removed");
        assert_eq!(removed.iri(), &iri("urn:a"));
        assert_eq!(links.len(), 1);
        assert_eq!(graph.cells().link_count(), 0);
        assert!(graph.remove_element(&a).is_none());
    }

    #[test]
    fn links_need_both_endpoint_cells() {
        let mut graph = DiagramModel::new();
        let a = graph.create_element(element("urn:a"), Point::default(), None);
        let dangling = Link {
            id: LinkId::new("link-x").expect("id"),
            data: link("urn:a", "urn:b"),
            source_id: a.clone(),
            target_id: crate::model::ElementId::new("element-missing").expect("id"),
        };

        assert!(matches!(graph.insert_link(dangling), Err(DiagramError::MissingEndpoint { .. })));
    }

    #[test]
    fn mutations_are_reported_to_listeners() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut graph = DiagramModel::new();
        let sink = seen.clone();
        graph.listen(move |event| sink.borrow_mut().push(event.clone()));

        let a = graph.create_element(element("urn:a"), Point::default(), None);
        graph.set_element_position(&a, Point::new(5.0, 5.0));
        graph.remove_element(&a);

        assert_eq!(
            *seen.borrow(),
            vec![
                GraphEvent::ElementAdded(a.clone()),
                GraphEvent::CellsChanged,
                GraphEvent::ElementChanged(a.clone()),
                GraphEvent::ElementRemoved(a),
                GraphEvent::CellsChanged,
            ]
        );
    }

    #[test]
    fn snapshots_compare_by_content() {
        let mut graph = DiagramModel::new();
        let before = graph.snapshot();
        let a = graph.create_element(element("urn:a"), Point::default(), None);
        assert_ne!(graph.snapshot(), before);

        graph.remove_element(&a);
        assert_eq!(graph.snapshot(), before);
    }
}
