// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use super::ids::{ElementIri, ElementTypeIri, PropertyTypeIri};

pub type ElementTypes = SmallVec<[ElementTypeIri; 2]>;

/// Semantic data of an entity shown on the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementModel {
    id: ElementIri,
    types: ElementTypes,
    label: String,
    properties: BTreeMap<PropertyTypeIri, Vec<String>>,
}

impl ElementModel {
    pub fn new(id: ElementIri) -> Self {
        Self { id, types: SmallVec::new(), label: String::new(), properties: BTreeMap::new() }
    }

    pub fn with_type(mut self, element_type: ElementTypeIri) -> Self {
        if !self.types.contains(&element_type) {
            self.types.push(element_type);
        }
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_property(mut self, property: PropertyTypeIri, values: Vec<String>) -> Self {
        self.properties.insert(property, values);
        self
    }

    pub fn id(&self) -> &ElementIri {
        &self.id
    }

    pub fn types(&self) -> &[ElementTypeIri] {
        &self.types
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn properties(&self) -> &BTreeMap<PropertyTypeIri, Vec<String>> {
        &self.properties
    }

    pub fn property(&self, property: &PropertyTypeIri) -> Option<&[String]> {
        self.properties.get(property).map(Vec::as_slice)
    }

    pub fn set_id(&mut self, id: ElementIri) {
        self.id = id;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_types(&mut self, types: impl IntoIterator<Item = ElementTypeIri>) {
        self.types = types.into_iter().collect();
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
