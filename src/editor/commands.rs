// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reversible mutations of an [`EditorDocument`].
//!
//! Each constructor returns a [`Command`] whose execution yields the command restoring the
//! previous state. A command targeting a cell that no longer exists does nothing and returns
//! a no-op inverse.

use tracing::warn;

use super::EditorDocument;
use crate::authoring::AuthoringState;
use crate::diagram::{Element, Link, Point};
use crate::history::Command;
use crate::model::{ElementId, ElementModel, LinkId, LinkModel};

pub type EditorCommand = Command<EditorDocument>;

pub fn add_element(element: Element) -> EditorCommand {
    Command::new("Add element", move |doc: &mut EditorDocument| {
        let id = element.id.clone();
        doc.graph.insert_element(element);
        remove_element(id)
    })
}

/// Removes an element cell together with its attached link cells.
pub fn remove_element(id: ElementId) -> EditorCommand {
    Command::new("Remove element", move |doc: &mut EditorDocument| {
        match doc.graph.remove_element(&id) {
            Some((element, links)) => restore_element(element, links),
            None => Command::noop("Remove element"),
        }
    })
}

fn restore_element(element: Element, links: Vec<Link>) -> EditorCommand {
    Command::new("Restore element", move |doc: &mut EditorDocument| {
        let id = element.id.clone();
        doc.graph.insert_element(element);
        for link in links {
            if let Err(err) = doc.graph.insert_link(link) {
                warn!(error = %err, "link cell not restored");
            }
        }
        remove_element(id)
    })
}

pub fn add_link(link: Link) -> EditorCommand {
    Command::new("Add link", move |doc: &mut EditorDocument| {
        let id = link.id.clone();
        match doc.graph.insert_link(link) {
            Ok(()) => remove_link(id),
            Err(err) => {
                warn!(error = %err, "link cell not added");
                Command::noop("Add link")
            }
        }
    })
}

pub fn remove_link(id: LinkId) -> EditorCommand {
    Command::new("Remove link", move |doc: &mut EditorDocument| match doc.graph.remove_link(&id) {
        Some(link) => add_link(link),
        None => Command::noop("Remove link"),
    })
}

/// Replaces the data of an element cell. When the IRI changes, the endpoints of the link cells
/// attached to this cell are renamed along with it.
pub fn set_element_data(id: ElementId, data: ElementModel) -> EditorCommand {
    Command::new("Set element data", move |doc: &mut EditorDocument| {
        let new_iri = data.id().clone();
        let Some(previous) = doc.graph.set_element_data(&id, data) else {
            return Command::noop("Set element data");
        };

        if previous.id() != &new_iri {
            let attached: Vec<(LinkId, LinkModel)> = doc
                .graph
                .cells()
                .links_of(&id)
                .map(|link| (link.id.clone(), link.data.clone()))
                .collect();
            for (link_id, link_data) in attached {
                let renamed = link_data.with_endpoint_renamed(previous.id(), &new_iri);
                doc.graph.set_link_data(&link_id, renamed);
            }
        }
        set_element_data(id, previous)
    })
}

pub fn set_link_data(id: LinkId, data: LinkModel) -> EditorCommand {
    Command::new("Set link data", move |doc: &mut EditorDocument| {
        match doc.graph.set_link_data(&id, data) {
            Some(previous) => set_link_data(id, previous),
            None => Command::noop("Set link data"),
        }
    })
}

pub fn set_element_position(id: ElementId, position: Point) -> EditorCommand {
    Command::new("Move element", move |doc: &mut EditorDocument| {
        match doc.graph.set_element_position(&id, position) {
            Some(previous) => set_element_position(id, previous),
            None => Command::noop("Move element"),
        }
    })
}

pub fn set_authoring_state(state: AuthoringState) -> EditorCommand {
    Command::new("Set authoring state", move |doc: &mut EditorDocument| {
        let previous = std::mem::replace(&mut doc.authoring, state);
        set_authoring_state(previous)
    })
}
