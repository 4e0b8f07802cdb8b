// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Maps keyed by structural link identity.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::model::{LinkKey, LinkModel};

/// Map from links to values where two [`LinkModel`]s with the same (type, source, target)
/// address the same entry regardless of their properties.
///
/// The model passed to the last `insert` for a key is kept alongside the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMap<V> {
    entries: BTreeMap<LinkKey, (LinkModel, V)>,
}

impl<V> LinkMap<V> {
    pub fn new() -> Self {
        Self { entries: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, link: &LinkModel) -> Option<&V> {
        self.get_by_key(&link.key())
    }

    pub fn get_by_key(&self, key: &LinkKey) -> Option<&V> {
        self.entries.get(key).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, link: &LinkModel) -> Option<&mut V> {
        self.entries.get_mut(&link.key()).map(|(_, value)| value)
    }

    pub fn contains(&self, link: &LinkModel) -> bool {
        self.entries.contains_key(&link.key())
    }

    pub fn insert(&mut self, link: LinkModel, value: V) -> Option<V> {
        self.entries.insert(link.key(), (link, value)).map(|(_, previous)| previous)
    }

    pub fn remove(&mut self, link: &LinkModel) -> Option<V> {
        self.entries.remove(&link.key()).map(|(_, value)| value)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&LinkModel, &V) -> bool) {
        self.entries.retain(|_, (link, value)| keep(link, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LinkModel, &V)> {
        self.entries.values().map(|(link, value)| (link, value))
    }

    pub fn links(&self) -> impl Iterator<Item = &LinkModel> {
        self.entries.values().map(|(link, _)| link)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values().map(|(_, value)| value)
    }
}

impl<V> Default for LinkMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(LinkModel, V)> for LinkMap<V> {
    fn from_iter<I: IntoIterator<Item = (LinkModel, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (link, value) in iter {
            map.insert(link, value);
        }
        map
    }
}

impl<V> IntoIterator for LinkMap<V> {
    type Item = (LinkModel, V);
    type IntoIter = btree_map::IntoValues<LinkKey, (LinkModel, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
