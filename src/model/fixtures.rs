// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::element::ElementModel;
use super::ids::{ElementIri, ElementTypeIri, LinkTypeIri, PropertyTypeIri};
use super::link::LinkModel;

pub(crate) const PERSON: &str = "http://example.com/Person";
pub(crate) const KNOWS: &str = "http://example.com/knows";
pub(crate) const WORKS_FOR: &str = "http://example.com/worksFor";
pub(crate) const NAME: &str = "http://example.com/name";

pub(crate) fn iri(value: &str) -> ElementIri {
    ElementIri::new(value).expect("element iri")
}

pub(crate) fn link_type(value: &str) -> LinkTypeIri {
    LinkTypeIri::new(value).expect("link type iri")
}

pub(crate) fn property(value: &str) -> PropertyTypeIri {
    PropertyTypeIri::new(value).expect("property iri")
}

/// A `Person` labelled after the last path segment of its IRI.
pub(crate) fn element(value: &str) -> ElementModel {
    let label = value.rsplit(|c: char| c == ':' || c == '/').next().unwrap_or(value);
    ElementModel::new(iri(value))
        .with_type(ElementTypeIri::new(PERSON).expect("element type iri"))
        .with_label(label)
}

pub(crate) fn renamed(model: &ElementModel, label: &str) -> ElementModel {
    let mut next = model.clone();
    next.set_label(label);
    next
}

/// A `knows` link between two IRIs.
pub(crate) fn link(source: &str, target: &str) -> LinkModel {
    LinkModel::new(link_type(KNOWS), iri(source), iri(target))
}

pub(crate) fn typed_link(link_type_iri: &str, source: &str, target: &str) -> LinkModel {
    LinkModel::new(link_type(link_type_iri), iri(source), iri(target))
}

pub(crate) fn noted(model: &LinkModel, note: &str) -> LinkModel {
    model.clone().with_property(property(NAME), vec![note.to_owned()])
}
