// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crate::keyed::LinkMap;
use crate::model::{ElementIri, ElementModel, LinkModel};

/// Entities shown while an interactive gesture is in progress. Never recorded in history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporaryState {
    elements: BTreeMap<ElementIri, ElementModel>,
    links: LinkMap<LinkModel>,
}

impl TemporaryState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.links.is_empty()
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementModel> {
        self.elements.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkModel> {
        self.links.values()
    }

    pub fn has_element(&self, iri: &ElementIri) -> bool {
        self.elements.contains_key(iri)
    }

    pub fn has_link(&self, link: &LinkModel) -> bool {
        self.links.contains(link)
    }

    pub fn add_element(&self, element: ElementModel) -> Self {
        let mut next = self.clone();
        next.elements.insert(element.id().clone(), element);
        next
    }

    pub fn delete_element(&self, iri: &ElementIri) -> Self {
        let mut next = self.clone();
        next.elements.remove(iri);
        next
    }

    pub fn add_link(&self, link: LinkModel) -> Self {
        let mut next = self.clone();
        next.links.insert(link.clone(), link);
        next
    }

    pub fn delete_link(&self, link: &LinkModel) -> Self {
        let mut next = self.clone();
        next.links.remove(link);
        next
    }
}
