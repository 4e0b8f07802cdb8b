// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use super::ids::{ElementIri, LinkTypeIri, PropertyTypeIri};

/// Semantic data of a relation between two entities.
///
/// Two links are the same relation when their [`LinkKey`]s match; properties do not take
/// part in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkModel {
    link_type: LinkTypeIri,
    source: ElementIri,
    target: ElementIri,
    properties: BTreeMap<PropertyTypeIri, Vec<String>>,
}

impl LinkModel {
    pub fn new(link_type: LinkTypeIri, source: ElementIri, target: ElementIri) -> Self {
        Self { link_type, source, target, properties: BTreeMap::new() }
    }

    pub fn with_property(mut self, property: PropertyTypeIri, values: Vec<String>) -> Self {
        self.properties.insert(property, values);
        self
    }

    pub fn link_type(&self) -> &LinkTypeIri {
        &self.link_type
    }

    pub fn source(&self) -> &ElementIri {
        &self.source
    }

    pub fn target(&self) -> &ElementIri {
        &self.target
    }

    pub fn properties(&self) -> &BTreeMap<PropertyTypeIri, Vec<String>> {
        &self.properties
    }

    pub fn key(&self) -> LinkKey {
        LinkKey {
            link_type: self.link_type.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }

    pub fn touches(&self, iri: &ElementIri) -> bool {
        &self.source == iri || &self.target == iri
    }

    pub fn with_source(mut self, source: ElementIri) -> Self {
        self.source = source;
        self
    }

    pub fn with_target(mut self, target: ElementIri) -> Self {
        self.target = target;
        self
    }

    /// Replaces `from` with `to` on whichever endpoints reference it.
    pub fn with_endpoint_renamed(mut self, from: &ElementIri, to: &ElementIri) -> Self {
        if &self.source == from {
            self.source = to.clone();
        }
        if &self.target == from {
            self.target = to.clone();
        }
        self
    }

    pub fn set_property(&mut self, property: PropertyTypeIri, values: Option<Vec<String>>) {
        match values {
            Some(values) => {
                self.properties.insert(property, values);
            }
            None => {
                self.properties.remove(&property);
            }
        }
    }
}

/// Structural identity of a link: (type, source, target).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
    pub link_type: LinkTypeIri,
    pub source: ElementIri,
    pub target: ElementIri,
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.link_type, self.target)
    }
}

pub fn same_link(left: &LinkModel, right: &LinkModel) -> bool {
    left.link_type == right.link_type && left.source == right.source && left.target == right.target
}
